// ── Live switch handlers ──
//
// One handler per bound accessory. GET answers from the last known value
// and refreshes in the background; SET waits for the controller.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::host::AccessoryHost;
use crate::model::{Characteristic, ConfiguredEntry, RemoteObject};
use crate::target::SwitchTarget;
use crate::toggle::apply_inversion;

/// Cheaply cloneable handler bound to one remote object.
pub struct FirewallSwitch<T: SwitchTarget> {
    inner: Arc<SwitchInner<T>>,
}

impl<T: SwitchTarget> Clone for FirewallSwitch<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SwitchInner<T: SwitchTarget> {
    uuid: Uuid,
    entry: ConfiguredEntry,
    target: Arc<T>,
    remote: Mutex<T::Remote>,
    /// Last value shown to the host (after inversion).
    value: AtomicBool,
    host: Arc<dyn AccessoryHost>,
}

impl<T: SwitchTarget> FirewallSwitch<T> {
    /// Bind a handler and push the initial value to the host.
    pub fn new(
        uuid: Uuid,
        entry: ConfiguredEntry,
        target: Arc<T>,
        remote: T::Remote,
        host: Arc<dyn AccessoryHost>,
    ) -> Self {
        let value = apply_inversion(remote.enabled(), entry.inverted);
        let switch = Self {
            inner: Arc::new(SwitchInner {
                uuid,
                entry,
                target,
                remote: Mutex::new(remote),
                value: AtomicBool::new(value),
                host,
            }),
        };
        switch.push(value);
        switch
    }

    pub fn uuid(&self) -> Uuid {
        self.inner.uuid
    }

    pub fn entry(&self) -> &ConfiguredEntry {
        &self.inner.entry
    }

    /// Last known switch value, without touching the network.
    pub fn value(&self) -> bool {
        self.inner.value.load(Ordering::SeqCst)
    }

    /// Snapshot of the bound remote object.
    pub async fn remote(&self) -> T::Remote {
        self.inner.remote.lock().await.clone()
    }

    /// Characteristic GET: return the last known value immediately and
    /// refresh in the background; the refreshed value is pushed to the host.
    pub fn get(&self) -> bool {
        let value = self.value();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let switch = self.clone();
                handle.spawn(async move {
                    if let Err(e) = switch.refresh().await {
                        warn!(uuid = %switch.uuid(), error = %e, "background refresh failed");
                    }
                });
            }
            Err(_) => debug!(uuid = %self.uuid(), "no runtime; skipping background refresh"),
        }
        value
    }

    /// Read the remote state, store it and push it to the host.
    pub async fn refresh(&self) -> Result<bool, CoreError> {
        let enabled = {
            let mut remote = self.inner.remote.lock().await;
            self.inner.target.read_enabled(&mut remote).await?
        };
        let value = apply_inversion(enabled, self.inner.entry.inverted);
        self.inner.value.store(value, Ordering::SeqCst);
        debug!(uuid = %self.uuid(), value, inverted = self.inner.entry.inverted, "refreshed switch");
        self.push(value);
        Ok(value)
    }

    /// Characteristic SET: write through to the controller. The stored
    /// value only changes once the write is confirmed, and follows what the
    /// controller reports back.
    pub async fn set(&self, value: bool) -> Result<(), CoreError> {
        let requested = apply_inversion(value, self.inner.entry.inverted);
        let enabled = {
            let mut remote = self.inner.remote.lock().await;
            self.inner
                .target
                .write_enabled(&mut remote, requested)
                .await?;
            remote.enabled()
        };
        let stored = apply_inversion(enabled, self.inner.entry.inverted);
        if stored != value {
            warn!(uuid = %self.uuid(), requested = value, reported = stored, "controller kept a different value");
            self.push(stored);
        }
        self.inner.value.store(stored, Ordering::SeqCst);
        debug!(uuid = %self.uuid(), value = stored, enabled, "switch set");
        Ok(())
    }

    fn push(&self, value: bool) {
        if let Err(e) =
            self.inner
                .host
                .update_characteristic(self.inner.uuid, Characteristic::On, value)
        {
            warn!(uuid = %self.inner.uuid, error = %e, "characteristic update rejected");
        }
    }
}
