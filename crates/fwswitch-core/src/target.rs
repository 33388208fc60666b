// ── Switch targets ──
//
// The capability a switch needs from its remote object: resolve it from a
// configured entry, read its enabled flag, write its enabled flag. Rules and
// policies implement it; reconciliation and the switch handlers are generic
// over it.

use std::future::Future;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::debug;

use crate::config::PolicyEndpoints;
use crate::error::CoreError;
use crate::model::{ConfiguredEntry, EntryKind, RemoteObject, RemotePolicy, RemoteRule};
use crate::resolver;
use crate::session::ControllerSession;
use crate::toggle;

pub trait SwitchTarget: Send + Sync + 'static {
    type Remote: RemoteObject + Clone + Send + Sync + 'static;

    const KIND: EntryKind;

    /// Bind an entry to a remote object. A missing object is an entry-level
    /// error (`RuleNotFound` / `PolicyNotMatched`).
    fn resolve(
        &self,
        entry: &ConfiguredEntry,
    ) -> impl Future<Output = Result<Self::Remote, CoreError>> + Send;

    /// Current remote `enabled` flag. May refresh `remote` in place.
    fn read_enabled(
        &self,
        remote: &mut Self::Remote,
    ) -> impl Future<Output = Result<bool, CoreError>> + Send;

    /// Write the remote `enabled` flag; `remote` is updated only on success.
    fn write_enabled(
        &self,
        remote: &mut Self::Remote,
        enabled: bool,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

async fn drop_rejected_session(session: &ControllerSession, err: &CoreError) {
    if err.is_auth_error() {
        session.invalidate().await;
    }
}

// ── Legacy rules ─────────────────────────────────────────────────────

/// Legacy firewall rules on one site.
///
/// The rule list is fetched once per discovery pass for resolution; reads
/// after that always go back to the controller.
pub struct RuleTarget {
    session: ControllerSession,
    site: String,
    snapshot: OnceCell<Vec<RemoteRule>>,
}

impl RuleTarget {
    pub fn new(session: ControllerSession, site: impl Into<String>) -> Self {
        Self {
            session,
            site: site.into(),
            snapshot: OnceCell::new(),
        }
    }
}

impl SwitchTarget for RuleTarget {
    type Remote = RemoteRule;

    const KIND: EntryKind = EntryKind::Rule;

    async fn resolve(&self, entry: &ConfiguredEntry) -> Result<RemoteRule, CoreError> {
        let rules = self
            .snapshot
            .get_or_try_init(|| resolver::list_rules(&self.session, &self.site))
            .await?;
        resolver::match_rule(rules, entry)
            .cloned()
            .ok_or_else(|| CoreError::RuleNotFound {
                identifier: entry.label().to_owned(),
            })
    }

    async fn read_enabled(&self, remote: &mut RemoteRule) -> Result<bool, CoreError> {
        let result = resolver::list_rules(&self.session, &self.site).await;
        let rules = match result {
            Ok(rules) => rules,
            Err(e) => {
                drop_rejected_session(&self.session, &e).await;
                return Err(e);
            }
        };
        let fresh = rules
            .into_iter()
            .find(|r| r.id == remote.id)
            .ok_or_else(|| CoreError::RuleNotFound {
                identifier: remote.id.clone(),
            })?;
        debug!(rule = %fresh.id, enabled = fresh.enabled, "refreshed firewall rule");
        *remote = fresh;
        Ok(remote.enabled)
    }

    async fn write_enabled(&self, remote: &mut RemoteRule, enabled: bool) -> Result<(), CoreError> {
        let result = toggle::set_rule_enabled(&self.session, &self.site, remote, enabled).await;
        if let Err(ref e) = result {
            drop_rejected_session(&self.session, e).await;
        }
        result
    }
}

// ── Zone-based policies ──────────────────────────────────────────────

/// How long a confirmed policy write is trusted over the listing. The
/// controller may keep serving the old flag for a moment after a write.
pub const POLICY_WRITE_SETTLE: Duration = Duration::from_secs(5);

/// Zone-based policies on one site.
///
/// Reads re-probe the listing, except shortly after a confirmed write,
/// and keep the cached flag when the listing has nothing for the policy.
pub struct PolicyTarget {
    session: ControllerSession,
    site: String,
    endpoints: PolicyEndpoints,
    listing: OnceCell<Vec<RemotePolicy>>,
    written: DashMap<String, Instant>,
}

impl PolicyTarget {
    pub fn new(session: ControllerSession, site: impl Into<String>, endpoints: PolicyEndpoints) -> Self {
        Self {
            session,
            site: site.into(),
            endpoints,
            listing: OnceCell::new(),
            written: DashMap::new(),
        }
    }
}

impl SwitchTarget for PolicyTarget {
    type Remote = RemotePolicy;

    const KIND: EntryKind = EntryKind::Policy;

    async fn resolve(&self, entry: &ConfiguredEntry) -> Result<RemotePolicy, CoreError> {
        let policies = self
            .listing
            .get_or_try_init(|| {
                resolver::list_policies(&self.session, &self.site, &self.endpoints.list)
            })
            .await?;
        resolver::match_policy(policies, entry)
            .cloned()
            .ok_or_else(|| CoreError::PolicyNotMatched {
                identifier: entry.label().to_owned(),
            })
    }

    async fn read_enabled(&self, remote: &mut RemotePolicy) -> Result<bool, CoreError> {
        let written_at = self.written.get(&remote.id).map(|at| *at);
        if written_at.is_some_and(|at| at.elapsed() < POLICY_WRITE_SETTLE) {
            debug!(policy = %remote.id, "recent write; answering from cache");
            return Ok(remote.enabled);
        }

        let result =
            resolver::list_policies(&self.session, &self.site, &self.endpoints.list).await;
        let policies = match result {
            Ok(policies) => policies,
            Err(e) => {
                drop_rejected_session(&self.session, &e).await;
                return Err(e);
            }
        };
        match policies.into_iter().find(|p| p.id == remote.id) {
            Some(fresh) => {
                debug!(policy = %fresh.id, enabled = fresh.enabled, "refreshed firewall policy");
                *remote = fresh;
            }
            None => debug!(policy = %remote.id, "policy not in listing; keeping cached flag"),
        }
        Ok(remote.enabled)
    }

    async fn write_enabled(
        &self,
        remote: &mut RemotePolicy,
        enabled: bool,
    ) -> Result<(), CoreError> {
        let result = toggle::set_policy_enabled(
            &self.session,
            &self.site,
            &self.endpoints.write,
            remote,
            enabled,
        )
        .await;
        match result {
            Ok(()) => {
                self.written.insert(remote.id.clone(), Instant::now());
            }
            Err(ref e) => drop_rejected_session(&self.session, e).await,
        }
        result
    }
}
