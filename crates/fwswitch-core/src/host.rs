// ── Home-automation host boundary ──
//
// The host owns accessory persistence and characteristic delivery. This
// crate only calls into it through `AccessoryHost`.

use std::collections::HashSet;
use std::sync::Mutex;

use thiserror::Error;
use uuid::Uuid;

use crate::model::{AccessoryRecord, Characteristic};

#[derive(Debug, Error)]
pub enum HostError {
    /// The host already knows this UUID. Always a reconciliation bug.
    #[error("Accessory {0} is already registered")]
    DuplicateUuid(Uuid),

    #[error("Host rejected the request: {message}")]
    Rejected { message: String },
}

/// Outbound calls to the host.
pub trait AccessoryHost: Send + Sync {
    /// Register new accessories. Must be called at most once per UUID.
    fn register_platform_accessories(
        &self,
        plugin: &str,
        platform: &str,
        records: Vec<AccessoryRecord>,
    ) -> Result<(), HostError>;

    /// Push a characteristic value for an already-registered accessory.
    fn update_characteristic(
        &self,
        uuid: Uuid,
        characteristic: Characteristic,
        value: bool,
    ) -> Result<(), HostError>;
}

/// One pushed characteristic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicUpdate {
    pub uuid: Uuid,
    pub characteristic: Characteristic,
    pub value: bool,
}

/// In-process host: keeps registrations and updates in memory and, like a
/// real host, refuses to register a UUID twice. Seed it with
/// [`MemoryHost::with_cached`] to simulate a restart.
#[derive(Debug, Default)]
pub struct MemoryHost {
    state: Mutex<MemoryHostState>,
}

#[derive(Debug, Default)]
struct MemoryHostState {
    known: HashSet<Uuid>,
    registered: Vec<AccessoryRecord>,
    register_calls: usize,
    updates: Vec<CharacteristicUpdate>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that already persisted `records` in an earlier run.
    pub fn with_cached(records: &[AccessoryRecord]) -> Self {
        let host = Self::default();
        host.state
            .lock()
            .expect("host lock poisoned")
            .known
            .extend(records.iter().map(|r| r.uuid));
        host
    }

    /// Records registered during this run.
    pub fn registered(&self) -> Vec<AccessoryRecord> {
        self.state
            .lock()
            .expect("host lock poisoned")
            .registered
            .clone()
    }

    /// Number of `register_platform_accessories` calls.
    pub fn register_calls(&self) -> usize {
        self.state.lock().expect("host lock poisoned").register_calls
    }

    pub fn updates(&self) -> Vec<CharacteristicUpdate> {
        self.state.lock().expect("host lock poisoned").updates.clone()
    }

    /// Most recent value pushed for `uuid`.
    pub fn last_value(&self, uuid: Uuid) -> Option<bool> {
        self.state
            .lock()
            .expect("host lock poisoned")
            .updates
            .iter()
            .rev()
            .find(|u| u.uuid == uuid)
            .map(|u| u.value)
    }
}

impl AccessoryHost for MemoryHost {
    fn register_platform_accessories(
        &self,
        _plugin: &str,
        _platform: &str,
        records: Vec<AccessoryRecord>,
    ) -> Result<(), HostError> {
        let mut state = self.state.lock().expect("host lock poisoned");
        state.register_calls += 1;
        if let Some(dup) = records.iter().find(|r| state.known.contains(&r.uuid)) {
            return Err(HostError::DuplicateUuid(dup.uuid));
        }
        state.known.extend(records.iter().map(|r| r.uuid));
        state.registered.extend(records);
        Ok(())
    }

    fn update_characteristic(
        &self,
        uuid: Uuid,
        characteristic: Characteristic,
        value: bool,
    ) -> Result<(), HostError> {
        self.state
            .lock()
            .expect("host lock poisoned")
            .updates
            .push(CharacteristicUpdate {
                uuid,
                characteristic,
                value,
            });
        Ok(())
    }
}
