//! Zone-based firewall policy handlers.

use tabled::Tabled;

use fwswitch_core::{CoreError, DiscoveredPolicy, RemotePolicy, resolver, toggle};

use crate::cli::{GlobalOpts, PoliciesArgs, PoliciesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Policy table row ────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct PolicyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
}

impl PolicyRow {
    pub(super) fn new(p: &DiscoveredPolicy, color: bool) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            action: p.action.to_string(),
            enabled: output::on_off(p.enabled, color),
        }
    }
}

fn policy_detail(p: &DiscoveredPolicy) -> String {
    format!(
        "ID:       {}\nName:     {}\nAction:   {}\nEnabled:  {}",
        p.id, p.name, p.action, p.enabled
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: PoliciesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let conn = util::connect(global).await?;

    let result = match args.command {
        PoliciesCommand::List => list(&conn, global).await,
        PoliciesCommand::Enable { policy } => set(&conn, &policy, Some(true), global).await,
        PoliciesCommand::Disable { policy } => set(&conn, &policy, Some(false), global).await,
        PoliciesCommand::Toggle { policy } => set(&conn, &policy, None, global).await,
    };

    conn.session.logout().await;
    result
}

async fn list(conn: &util::Connection, global: &GlobalOpts) -> Result<(), CliError> {
    let policies: Vec<DiscoveredPolicy> =
        resolver::list_policies(&conn.session, &conn.site.name, &conn.config.endpoints.list)
            .await?
            .into_iter()
            .map(DiscoveredPolicy::from)
            .collect();

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &policies,
        |p| PolicyRow::new(p, color),
        |p| p.id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Write `enabled`, or flip the current value when `None`.
async fn set(
    conn: &util::Connection,
    identifier: &str,
    enabled: Option<bool>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let site = conn.site.name.as_str();
    let endpoints = &conn.config.endpoints;

    let policies = resolver::list_policies(&conn.session, site, &endpoints.list).await?;
    let mut policy: RemotePolicy = resolver::match_policy(&policies, &util::lookup_entry(identifier))
        .cloned()
        .ok_or_else(|| CoreError::PolicyNotMatched {
            identifier: identifier.to_owned(),
        })?;

    let target = enabled.unwrap_or(!policy.enabled);
    tracing::info!(policy = %policy.id, from = policy.enabled, to = target, "updating policy");
    toggle::set_policy_enabled(&conn.session, site, &endpoints.write, &mut policy, target).await?;

    let shown = DiscoveredPolicy::from(policy);
    let out = output::render_single(&global.output, &shown, policy_detail, |p| p.id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
