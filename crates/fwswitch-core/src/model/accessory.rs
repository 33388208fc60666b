use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ConfiguredEntry, EntryKind, RemoteObject};

/// Host accessory category. Only switches are exposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum AccessoryCategory {
    #[default]
    Switch,
}

/// The single boolean characteristic a firewall switch exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum Characteristic {
    On,
}

/// Accessory information service values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryInformation {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
}

impl AccessoryInformation {
    pub fn for_entry(kind: EntryKind, entry: &ConfiguredEntry) -> Self {
        let model = match kind {
            EntryKind::Rule => "Firewall-Rule",
            EntryKind::Policy => "UniFi-9-Policy",
        };
        Self {
            manufacturer: "Ubiquiti".into(),
            model: model.into(),
            serial_number: entry.label().to_owned(),
        }
    }
}

/// Payload stored inside a record; it is how a cached accessory is tied
/// back to its configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryContext {
    pub kind: EntryKind,
    pub entry: ConfiguredEntry,
}

/// The host's persisted representation of one exposed switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryRecord {
    pub uuid: Uuid,
    pub display_name: String,
    #[serde(default)]
    pub category: AccessoryCategory,
    pub context: AccessoryContext,
    pub information: AccessoryInformation,
}

impl AccessoryRecord {
    /// A fresh record for an entry that resolved to `remote`.
    pub fn new(
        uuid: Uuid,
        kind: EntryKind,
        entry: &ConfiguredEntry,
        remote: &impl RemoteObject,
    ) -> Self {
        let display_name = entry
            .name()
            .unwrap_or_else(|| remote.display_name())
            .to_owned();
        Self {
            uuid,
            display_name,
            category: AccessoryCategory::Switch,
            context: AccessoryContext {
                kind,
                entry: entry.clone(),
            },
            information: AccessoryInformation::for_entry(kind, entry),
        }
    }
}
