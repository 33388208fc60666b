use std::fmt;

use fwswitch_api::FirewallPolicyEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::RemoteObject;

/// What a zone-based policy does with matching traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PolicyAction {
    Allow,
    Block,
    Reject,
    Unknown,
}

impl PolicyAction {
    /// Case-insensitive parse; anything unrecognised is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "allow" | "accept" => Self::Allow,
            "block" | "drop" => Self::Block,
            "reject" => Self::Reject,
            _ => Self::Unknown,
        }
    }
}

/// A zone-based firewall policy.
///
/// `enabled` is the locally cached value: it is updated after a confirmed
/// write and not re-read, since the controller may lag behind its own writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePolicy {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub action: PolicyAction,
    pub site_id: Option<String>,
    pub description: Option<String>,
}

impl RemotePolicy {
    /// Parse one item of a probed listing. Items without an id are dropped.
    pub fn from_value(value: Value) -> Option<Self> {
        match serde_json::from_value::<FirewallPolicyEntry>(value) {
            Ok(entry) => Some(entry.into()),
            Err(e) => {
                debug!(error = %e, "ignoring unparseable policy item");
                None
            }
        }
    }
}

impl From<FirewallPolicyEntry> for RemotePolicy {
    fn from(entry: FirewallPolicyEntry) -> Self {
        Self {
            action: entry
                .action
                .as_deref()
                .map_or(PolicyAction::Unknown, PolicyAction::parse),
            id: entry.id,
            name: entry.name,
            enabled: entry.enabled,
            site_id: entry.site_id,
            description: entry.description,
        }
    }
}

impl RemoteObject for RemotePolicy {
    fn remote_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }
}

impl fmt::Display for RemotePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn action_parses_case_insensitively() {
        assert_eq!(PolicyAction::parse("ALLOW"), PolicyAction::Allow);
        assert_eq!(PolicyAction::parse("Block"), PolicyAction::Block);
        assert_eq!(PolicyAction::parse("reject"), PolicyAction::Reject);
        assert_eq!(PolicyAction::parse("mystery"), PolicyAction::Unknown);
    }

    #[test]
    fn probed_items_become_policies() {
        let policy = RemotePolicy::from_value(json!({
            "_id": "p1",
            "name": "Block IoT",
            "enabled": false,
            "action": "BLOCK",
            "site_id": "s1"
        }))
        .unwrap();
        assert_eq!(policy.id, "p1");
        assert_eq!(policy.action, PolicyAction::Block);
        assert!(!policy.enabled);

        assert!(RemotePolicy::from_value(json!({ "name": "no id" })).is_none());
    }
}
