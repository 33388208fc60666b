// ── Toggle execution ──
//
// Enable/disable writes for rules and policies. Local state changes only
// after the controller has accepted the write.

use fwswitch_api::{EndpointTable, PathVars};
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{RemotePolicy, RemoteRule};
use crate::session::ControllerSession;

/// Map between the remote `enabled` flag and the switch value.
///
/// The mapping is its own inverse, so it serves both directions.
pub fn apply_inversion(value: bool, inverted: bool) -> bool {
    value != inverted
}

/// Save a rule with a new `enabled` value.
pub async fn set_rule_enabled(
    session: &ControllerSession,
    site: &str,
    rule: &mut RemoteRule,
    enabled: bool,
) -> Result<(), CoreError> {
    let client = session.client().await?;

    let mut body = rule.to_legacy();
    body.enabled = enabled;

    match client.update_firewall_rule(site, &body).await {
        Ok(saved) => {
            rule.enabled = saved.map_or(enabled, |s| s.enabled);
            info!(rule = %rule.id, enabled = rule.enabled, "firewall rule saved");
            Ok(())
        }
        Err(e) if e.is_auth_expired() => Err(e.into()),
        Err(e) => {
            warn!(rule = %rule.id, error = %e, "firewall rule save failed");
            Err(CoreError::RemoteWriteFailed {
                target: format!("firewall rule {}", rule.id),
                reason: e.to_string(),
            })
        }
    }
}

/// Write a policy's `enabled` flag through the write table.
///
/// On success the in-memory flag is updated; if every candidate fails it is
/// left at its pre-write value. A rejected session comes back as
/// `AuthenticationFailed` so the caller can log in again.
pub async fn set_policy_enabled(
    session: &ControllerSession,
    site: &str,
    table: &EndpointTable,
    policy: &mut RemotePolicy,
    enabled: bool,
) -> Result<(), CoreError> {
    let client = session.client().await?;
    let vars = PathVars::site(site).with_id(&policy.id);

    match client
        .probe_write("policy write", table, &vars, enabled)
        .await
    {
        Ok(hit) => {
            debug!(policy = %policy.id, url = %hit.url, "policy write accepted");
            policy.enabled = enabled;
            Ok(())
        }
        Err(e) if e.is_auth_expired() => Err(e.into()),
        Err(e) => Err(CoreError::RemoteWriteFailed {
            target: format!("firewall policy {}", policy.id),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inversion_is_symmetric() {
        assert!(apply_inversion(true, false));
        assert!(!apply_inversion(true, true));
        assert!(apply_inversion(false, true));
        for value in [true, false] {
            for inverted in [true, false] {
                assert_eq!(
                    apply_inversion(apply_inversion(value, inverted), inverted),
                    value
                );
            }
        }
    }
}
