// ── Rule / policy resolution ──
//
// Fetches the remote collections for a site and matches configured entries
// against them. Listing policies goes through the endpoint prober; running
// out of candidates there means "this controller has no policies", not an
// error.

use fwswitch_api::{EndpointTable, PathVars};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{ConfiguredEntry, RemotePolicy, RemoteRule, Site};
use crate::session::ControllerSession;

// ── Sites ────────────────────────────────────────────────────────────

/// Pick a site: exact name match first, then exact description match.
pub fn select_site<'a>(sites: &'a [Site], wanted: &str) -> Option<&'a Site> {
    if let Some(site) = sites.iter().find(|s| s.name == wanted) {
        return Some(site);
    }
    sites
        .iter()
        .find(|s| s.description.as_deref() == Some(wanted))
}

pub async fn list_sites(session: &ControllerSession) -> Result<Vec<Site>, CoreError> {
    let client = session.client().await?;
    let sites = client.list_sites().await?;
    debug!(count = sites.len(), "listed sites");
    Ok(sites.into_iter().map(Site::from).collect())
}

/// Bind the configured site. Failure here is fatal to discovery.
pub async fn resolve_site(session: &ControllerSession, wanted: &str) -> Result<Site, CoreError> {
    let sites = list_sites(session).await?;
    match select_site(&sites, wanted) {
        Some(site) => {
            info!(
                site = %site.name,
                description = site.description.as_deref().unwrap_or("no description"),
                "using site"
            );
            Ok(site.clone())
        }
        None => Err(CoreError::SiteNotFound {
            name: wanted.to_owned(),
            available: sites.into_iter().map(|s| s.name).collect(),
        }),
    }
}

// ── Legacy rules ─────────────────────────────────────────────────────

pub async fn list_rules(
    session: &ControllerSession,
    site: &str,
) -> Result<Vec<RemoteRule>, CoreError> {
    let client = session.client().await?;
    let rules = client.list_firewall_rules(site).await?;
    debug!(site, count = rules.len(), "listed firewall rules");
    Ok(rules.into_iter().map(RemoteRule::from).collect())
}

/// Find the rule an entry points at.
///
/// The configured id is tried against `_id`, then against `rule_index`;
/// only then is the name compared.
pub fn match_rule<'a>(rules: &'a [RemoteRule], entry: &ConfiguredEntry) -> Option<&'a RemoteRule> {
    if let Some(id) = entry.id() {
        if let Some(rule) = rules.iter().find(|r| r.id == id) {
            return Some(rule);
        }
        if let Some(rule) = rules.iter().find(|r| r.has_index(id)) {
            return Some(rule);
        }
    }
    let name = entry.name()?;
    rules.iter().find(|r| r.name == name)
}

/// Fetch the site's rules once and resolve one entry against them.
pub async fn resolve_rule(
    session: &ControllerSession,
    site: &str,
    entry: &ConfiguredEntry,
) -> Result<RemoteRule, CoreError> {
    let rules = list_rules(session, site).await?;
    match_rule(&rules, entry)
        .cloned()
        .ok_or_else(|| CoreError::RuleNotFound {
            identifier: entry.label().to_owned(),
        })
}

// ── Zone-based policies ──────────────────────────────────────────────

/// List policies through the prober. An exhausted table yields an empty list.
pub async fn list_policies(
    session: &ControllerSession,
    site: &str,
    table: &EndpointTable,
) -> Result<Vec<RemotePolicy>, CoreError> {
    let client = session.client().await?;
    let Some(hit) = client
        .probe_list("policy listing", table, &PathVars::site(site))
        .await
    else {
        warn!(
            site,
            candidates = table.len(),
            "no policy endpoint answered; controller may predate zone-based firewall"
        );
        return Ok(Vec::new());
    };

    let policies: Vec<RemotePolicy> = hit
        .items
        .into_iter()
        .filter_map(RemotePolicy::from_value)
        .collect();
    info!(site, url = %hit.url, count = policies.len(), "found firewall policies");
    Ok(policies)
}

/// Find the policy an entry points at: id over the whole list, then name.
pub fn match_policy<'a>(
    policies: &'a [RemotePolicy],
    entry: &ConfiguredEntry,
) -> Option<&'a RemotePolicy> {
    if let Some(id) = entry.id() {
        if let Some(policy) = policies.iter().find(|p| p.id == id) {
            return Some(policy);
        }
    }
    let name = entry.name()?;
    policies.iter().find(|p| p.name == name)
}
