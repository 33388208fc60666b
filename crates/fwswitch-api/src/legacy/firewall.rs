// Legacy firewall rule endpoints
//
// Rules live under `rest/firewallrule`. There is no partial update: saving a
// rule PUTs the complete object back to `rest/firewallrule/{_id}`.

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::LegacyFirewallRule;

impl LegacyClient {
    /// List every legacy firewall rule on a site.
    ///
    /// `GET /api/s/{site}/rest/firewallrule`
    pub async fn list_firewall_rules(&self, site: &str) -> Result<Vec<LegacyFirewallRule>, Error> {
        let url = self.site_url(site, "rest/firewallrule")?;
        debug!(site, "listing firewall rules");
        self.get(url).await
    }

    /// Save a legacy firewall rule, returning the controller's copy.
    ///
    /// `PUT /api/s/{site}/rest/firewallrule/{_id}` with the full rule body.
    pub async fn update_firewall_rule(
        &self,
        site: &str,
        rule: &LegacyFirewallRule,
    ) -> Result<Option<LegacyFirewallRule>, Error> {
        let url = self.site_url(site, &format!("rest/firewallrule/{}", rule.id))?;
        debug!(site, rule = %rule.id, enabled = rule.enabled, "saving firewall rule");
        let mut saved: Vec<LegacyFirewallRule> = self.put(url, rule).await?;
        Ok(saved.pop())
    }
}
