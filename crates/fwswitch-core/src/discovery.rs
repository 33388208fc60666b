// ── Discovery ──
//
// Enumerates everything on a site that could be exposed as a switch, so
// users can find the ids and names to put in their configuration.

use fwswitch_api::EndpointTable;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::{PolicyAction, RemotePolicy, RemoteRule};
use crate::resolver;
use crate::session::ControllerSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredRule {
    pub id: String,
    pub index: Option<String>,
    pub name: String,
    pub enabled: bool,
    pub ruleset: Option<String>,
    pub action: Option<String>,
    pub src_address: Option<String>,
    pub dst_address: Option<String>,
    pub dst_port: Option<String>,
}

impl From<RemoteRule> for DiscoveredRule {
    fn from(rule: RemoteRule) -> Self {
        Self {
            index: rule.rule_index.as_ref().map(ToString::to_string),
            id: rule.id,
            name: rule.name,
            enabled: rule.enabled,
            ruleset: rule.ruleset,
            action: rule.action,
            src_address: rule.src_address,
            dst_address: rule.dst_address,
            dst_port: rule.dst_port,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredPolicy {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub action: PolicyAction,
}

impl From<RemotePolicy> for DiscoveredPolicy {
    fn from(policy: RemotePolicy) -> Self {
        Self {
            id: policy.id,
            name: policy.name,
            enabled: policy.enabled,
            action: policy.action,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryResult {
    pub rules: Vec<DiscoveredRule>,
    pub policies: Vec<DiscoveredPolicy>,
}

/// List the legacy rules and zone-based policies on `site`.
///
/// A controller without legacy rules, or without policies, yields an empty
/// list for that half; only session-level failures are returned as errors.
pub async fn discover_rules_and_policies(
    session: &ControllerSession,
    site: &str,
    policy_listing: &EndpointTable,
) -> Result<DiscoveryResult, CoreError> {
    let rules = match resolver::list_rules(session, site).await {
        Ok(rules) => rules,
        Err(e) if e.is_session_fatal() => return Err(e),
        Err(e) => {
            warn!(site, error = %e, "could not list legacy firewall rules");
            Vec::new()
        }
    };
    let policies = resolver::list_policies(session, site, policy_listing).await?;

    info!(
        site,
        rules = rules.len(),
        policies = policies.len(),
        "discovery finished"
    );

    Ok(DiscoveryResult {
        rules: rules.into_iter().map(DiscoveredRule::from).collect(),
        policies: policies.into_iter().map(DiscoveredPolicy::from).collect(),
    })
}
