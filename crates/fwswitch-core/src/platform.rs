// ── Accessory reconciliation ──
//
// Aligns the host's cached accessories with the configured entries and the
// objects currently on the controller. Each entry moves through
// unresolved -> resolved -> registered (restored from cache, or new); a
// UUID is registered with the host at most once per process.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::PlatformConfig;
use crate::error::CoreError;
use crate::host::AccessoryHost;
use crate::identity::{accessory_key, accessory_uuid};
use crate::model::{AccessoryRecord, ConfiguredEntry, EntryKind, RemoteObject, Site};
use crate::resolver;
use crate::session::ControllerSession;
use crate::switch::FirewallSwitch;
use crate::target::{PolicyTarget, RuleTarget, SwitchTarget};

/// Plugin identifier passed to the host on registration.
pub const PLUGIN_NAME: &str = "homebridge-unifi-firewall";
/// Platform identifier passed to the host on registration.
pub const PLATFORM_NAME: &str = "UnifiFirewall";

// ── Report types ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReconcileOutcome {
    /// Bound to a record the host restored from its cache.
    Restored,
    /// Registered with the host during this pass.
    Registered,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciledEntry {
    pub kind: EntryKind,
    pub uuid: Uuid,
    pub display_name: String,
    pub remote_id: String,
    pub outcome: ReconcileOutcome,
    /// Switch value after inversion.
    pub value: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub kind: EntryKind,
    pub entry: String,
    pub reason: String,
}

/// What one discovery pass did.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub site: Site,
    pub entries: Vec<ReconciledEntry>,
    pub skipped: Vec<SkippedEntry>,
}

impl DiscoveryReport {
    fn new(site: Site) -> Self {
        Self {
            site,
            entries: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn count(&self, outcome: ReconcileOutcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }
}

// ── Live switches ────────────────────────────────────────────────────

/// A bound switch of either kind.
#[derive(Clone)]
pub enum LiveSwitch {
    Rule(FirewallSwitch<RuleTarget>),
    Policy(FirewallSwitch<PolicyTarget>),
}

impl LiveSwitch {
    pub fn uuid(&self) -> Uuid {
        match self {
            Self::Rule(s) => s.uuid(),
            Self::Policy(s) => s.uuid(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Rule(_) => EntryKind::Rule,
            Self::Policy(_) => EntryKind::Policy,
        }
    }

    /// Last known value, without a background refresh.
    pub fn value(&self) -> bool {
        match self {
            Self::Rule(s) => s.value(),
            Self::Policy(s) => s.value(),
        }
    }

    pub fn get(&self) -> bool {
        match self {
            Self::Rule(s) => s.get(),
            Self::Policy(s) => s.get(),
        }
    }

    pub async fn refresh(&self) -> Result<bool, CoreError> {
        match self {
            Self::Rule(s) => s.refresh().await,
            Self::Policy(s) => s.refresh().await,
        }
    }

    pub async fn set(&self, value: bool) -> Result<(), CoreError> {
        match self {
            Self::Rule(s) => s.set(value).await,
            Self::Policy(s) => s.set(value).await,
        }
    }
}

impl From<FirewallSwitch<RuleTarget>> for LiveSwitch {
    fn from(switch: FirewallSwitch<RuleTarget>) -> Self {
        Self::Rule(switch)
    }
}

impl From<FirewallSwitch<PolicyTarget>> for LiveSwitch {
    fn from(switch: FirewallSwitch<PolicyTarget>) -> Self {
        Self::Policy(switch)
    }
}

// ── Platform ─────────────────────────────────────────────────────────

/// One configured controller exposed to the host.
pub struct FirewallPlatform {
    config: PlatformConfig,
    host: Arc<dyn AccessoryHost>,
    session: ControllerSession,
    /// Records the host restored at startup, plus everything registered since.
    cached: DashMap<Uuid, AccessoryRecord>,
    switches: Mutex<Vec<LiveSwitch>>,
    discovery: tokio::sync::Mutex<()>,
}

impl FirewallPlatform {
    pub fn new(config: PlatformConfig, host: Arc<dyn AccessoryHost>) -> Self {
        let session = ControllerSession::new(config.session.clone());
        debug!(name = %config.name, "platform initialised");
        Self {
            config,
            host,
            session,
            cached: DashMap::new(),
            switches: Mutex::new(Vec::new()),
            discovery: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn session(&self) -> &ControllerSession {
        &self.session
    }

    /// Host callback for each accessory restored from its cache. Called
    /// before [`discover_devices`](Self::discover_devices).
    pub fn configure_accessory(&self, record: AccessoryRecord) {
        info!(name = %record.display_name, uuid = %record.uuid, "loading accessory from cache");
        self.cached.insert(record.uuid, record);
    }

    /// Current state of a cached or registered record.
    pub fn record(&self, uuid: Uuid) -> Option<AccessoryRecord> {
        self.cached.get(&uuid).map(|r| r.value().clone())
    }

    /// Live handler for `uuid`, if one was bound.
    pub fn switch(&self, uuid: Uuid) -> Option<LiveSwitch> {
        self.switches
            .lock()
            .expect("switch list lock poisoned")
            .iter()
            .find(|s| s.uuid() == uuid)
            .cloned()
    }

    pub fn switches(&self) -> Vec<LiveSwitch> {
        self.switches
            .lock()
            .expect("switch list lock poisoned")
            .clone()
    }

    /// Log in, bind the site, and reconcile every configured entry.
    ///
    /// Session and site failures abort the pass and are logged with
    /// remediation steps; a single unresolvable entry is skipped.
    pub async fn discover_devices(&self) -> Result<DiscoveryReport, CoreError> {
        let _pass = self.discovery.lock().await;

        match self.run_discovery().await {
            Ok(report) => Ok(report),
            Err(e) => {
                error!(error = %e, "failed to connect to UniFi controller");
                let steps = e.remediation();
                if !steps.is_empty() {
                    error!("troubleshooting steps:");
                    for (i, step) in steps.iter().enumerate() {
                        error!("{}. {step}", i + 1);
                    }
                }
                Err(e)
            }
        }
    }

    async fn run_discovery(&self) -> Result<DiscoveryReport, CoreError> {
        info!(url = %self.config.session.url, site = %self.config.site, "connecting to UniFi controller");
        self.session.ensure_logged_in().await?;

        let site = resolver::resolve_site(&self.session, &self.config.site).await?;
        let mut pass = Pass {
            report: DiscoveryReport::new(site.clone()),
            bound: HashSet::new(),
            switches: Vec::new(),
        };

        if self.config.rules.is_empty() {
            debug!("no legacy rules configured");
        } else {
            let target = Arc::new(RuleTarget::new(self.session.clone(), site.name.clone()));
            self.reconcile(&target, &self.config.rules, &mut pass).await?;
        }

        if self.config.policies.is_empty() {
            info!("no firewall policies configured");
        } else {
            let target = Arc::new(PolicyTarget::new(
                self.session.clone(),
                site.name.clone(),
                self.config.endpoints.clone(),
            ));
            self.reconcile(&target, &self.config.policies, &mut pass).await?;
        }

        *self.switches.lock().expect("switch list lock poisoned") = pass.switches;
        info!(
            registered = pass.report.count(ReconcileOutcome::Registered),
            restored = pass.report.count(ReconcileOutcome::Restored),
            skipped = pass.report.skipped.len(),
            "discovery complete"
        );
        Ok(pass.report)
    }

    async fn reconcile<T>(
        &self,
        target: &Arc<T>,
        entries: &[ConfiguredEntry],
        pass: &mut Pass,
    ) -> Result<(), CoreError>
    where
        T: SwitchTarget,
        FirewallSwitch<T>: Into<LiveSwitch>,
    {
        for entry in entries {
            // Unresolved -> Resolved
            let remote = match target.resolve(entry).await {
                Ok(remote) => remote,
                Err(e) if e.is_session_fatal() => return Err(e),
                Err(e) => {
                    warn!(kind = %T::KIND, entry = entry.label(), error = %e, "skipping entry");
                    pass.skip(T::KIND, entry, e.to_string());
                    continue;
                }
            };

            let uuid = accessory_uuid(&accessory_key(T::KIND, entry, remote.remote_id()));
            if !pass.bound.insert(uuid) {
                warn!(kind = %T::KIND, entry = entry.label(), %uuid, "another entry already binds this accessory");
                pass.skip(T::KIND, entry, format!("duplicate of accessory {uuid}"));
                continue;
            }

            // Resolved -> Registered
            let restored = self.cached.get_mut(&uuid).map(|mut cached| {
                info!(name = %cached.display_name, %uuid, "restoring accessory from cache");
                cached.context.entry = entry.clone();
                cached.display_name.clone()
            });
            let (outcome, display_name) = if let Some(display_name) = restored {
                (ReconcileOutcome::Restored, display_name)
            } else {
                let record = AccessoryRecord::new(uuid, T::KIND, entry, &remote);
                info!(name = %record.display_name, %uuid, "adding new accessory");
                let display_name = record.display_name.clone();
                self.host
                    .register_platform_accessories(PLUGIN_NAME, PLATFORM_NAME, vec![record.clone()])
                    .map_err(|e| CoreError::Registration {
                        message: e.to_string(),
                    })?;
                self.cached.insert(uuid, record);
                (ReconcileOutcome::Registered, display_name)
            };

            let remote_id = remote.remote_id().to_owned();
            let switch = FirewallSwitch::new(
                uuid,
                entry.clone(),
                Arc::clone(target),
                remote,
                Arc::clone(&self.host),
            );
            pass.report.entries.push(ReconciledEntry {
                kind: T::KIND,
                uuid,
                display_name,
                remote_id,
                outcome,
                value: switch.value(),
            });
            pass.switches.push(switch.into());
        }
        Ok(())
    }

    /// Log out of the controller.
    pub async fn shutdown(&self) {
        self.session.logout().await;
    }
}

/// Bookkeeping for one discovery pass.
struct Pass {
    report: DiscoveryReport,
    bound: HashSet<Uuid>,
    switches: Vec<LiveSwitch>,
}

impl Pass {
    fn skip(&mut self, kind: EntryKind, entry: &ConfiguredEntry, reason: String) {
        self.report.skipped.push(SkippedEntry {
            kind,
            entry: entry.label().to_owned(),
            reason,
        });
    }
}
