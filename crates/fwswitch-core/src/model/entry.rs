use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which kind of remote object an entry points at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    /// Legacy firewall rule.
    Rule,
    /// Zone-based firewall policy.
    Policy,
}

/// One user-configured switch.
///
/// At least one of `id` / `name` must be set; `id` wins when both match
/// different objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expose the switch as the opposite of the remote `enabled` flag.
    #[serde(default)]
    pub inverted: bool,
}

impl ConfiguredEntry {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// Non-empty id, if configured.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|s| !s.is_empty())
    }

    /// Non-empty name, if configured.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.is_empty())
    }

    /// Short label for log lines: the id, else the name.
    pub fn label(&self) -> &str {
        self.id().or_else(|| self.name()).unwrap_or("<unnamed>")
    }
}
