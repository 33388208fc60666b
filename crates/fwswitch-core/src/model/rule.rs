use fwswitch_api::{LegacyFirewallRule, RuleIndex};
use serde::{Deserialize, Serialize};

use super::RemoteObject;

/// A legacy firewall rule.
///
/// Saving a rule sends the full object back, so everything the controller
/// returned is retained in `extra` and restored by [`RemoteRule::to_legacy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRule {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub rule_index: Option<RuleIndex>,
    pub ruleset: Option<String>,
    pub action: Option<String>,
    pub src_address: Option<String>,
    pub dst_address: Option<String>,
    pub dst_port: Option<String>,
    #[serde(skip)]
    extra: serde_json::Map<String, serde_json::Value>,
    #[serde(skip)]
    site_id: Option<String>,
}

impl RemoteRule {
    /// Rebuild the controller representation, with every field it sent us.
    pub fn to_legacy(&self) -> LegacyFirewallRule {
        LegacyFirewallRule {
            id: self.id.clone(),
            name: Some(self.name.clone()),
            enabled: self.enabled,
            rule_index: self.rule_index.clone(),
            ruleset: self.ruleset.clone(),
            action: self.action.clone(),
            src_address: self.src_address.clone(),
            dst_address: self.dst_address.clone(),
            dst_port: self.dst_port.clone(),
            site_id: self.site_id.clone(),
            extra: self.extra.clone(),
        }
    }

    /// Whether `index` names this rule's `rule_index`.
    pub fn has_index(&self, index: &str) -> bool {
        self.rule_index
            .as_ref()
            .is_some_and(|ri| ri.to_string() == index)
    }
}

impl From<LegacyFirewallRule> for RemoteRule {
    fn from(rule: LegacyFirewallRule) -> Self {
        Self {
            name: rule.name.unwrap_or_else(|| rule.id.clone()),
            id: rule.id,
            enabled: rule.enabled,
            rule_index: rule.rule_index,
            ruleset: rule.ruleset,
            action: rule.action,
            src_address: rule.src_address,
            dst_address: rule.dst_address,
            dst_port: rule.dst_port,
            extra: rule.extra,
            site_id: rule.site_id,
        }
    }
}

impl RemoteObject for RemoteRule {
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
