// Controller response types
//
// Models for the legacy JSON API and the v2 firewall-policy listing. Fields use
// `#[serde(default)]` liberally because the controller is inconsistent about
// field presence across firmware versions.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard UniFi legacy API response envelope.
///
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Metadata from the legacy envelope. `rc` == `"ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Site ─────────────────────────────────────────────────────────────

/// Site from `/api/self/sites`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacySite {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Firewall rule ────────────────────────────────────────────────────

/// `rule_index` is numeric on most firmware but arrives as a string on some.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleIndex {
    Number(i64),
    Text(String),
}

impl fmt::Display for RuleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Legacy firewall rule from `rest/firewallrule`.
///
/// Saving a rule PUTs the whole object back, so every field the controller
/// sent is preserved in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyFirewallRule {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_index: Option<RuleIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruleset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Firewall policy ──────────────────────────────────────────────────

/// Zone-based firewall policy as returned by any of the listing endpoints.
///
/// The v2 API uses `_id`; some proxies re-key it as `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirewallPolicyEntry {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rule_index_accepts_numbers_and_strings() {
        let rule: LegacyFirewallRule = serde_json::from_value(json!({
            "_id": "r1", "name": "Guest", "enabled": true, "rule_index": 2001
        }))
        .unwrap();
        assert_eq!(rule.rule_index, Some(RuleIndex::Number(2001)));

        let rule: LegacyFirewallRule = serde_json::from_value(json!({
            "_id": "r2", "rule_index": "4000"
        }))
        .unwrap();
        assert_eq!(rule.rule_index.unwrap().to_string(), "4000");
        assert!(!rule.enabled);
    }

    #[test]
    fn rule_round_trip_keeps_unknown_fields() {
        let rule: LegacyFirewallRule = serde_json::from_value(json!({
            "_id": "r1", "enabled": false, "protocol": "all", "logging": true
        }))
        .unwrap();
        let back = serde_json::to_value(&rule).unwrap();
        assert_eq!(back["protocol"], "all");
        assert_eq!(back["logging"], true);
        assert_eq!(back["_id"], "r1");
    }

    #[test]
    fn policy_accepts_either_id_key() {
        let a: FirewallPolicyEntry =
            serde_json::from_value(json!({ "_id": "p1", "name": "Block IoT" })).unwrap();
        let b: FirewallPolicyEntry =
            serde_json::from_value(json!({ "id": "p2", "enabled": true })).unwrap();
        assert_eq!(a.id, "p1");
        assert_eq!(b.id, "p2");
        assert!(b.enabled);
    }
}
