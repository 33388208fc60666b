//! Legacy firewall rule handlers.

use tabled::Tabled;

use fwswitch_core::{DiscoveredRule, resolver, toggle};

use crate::cli::{GlobalOpts, RulesArgs, RulesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Rule table row ──────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct RuleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Index")]
    index: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Ruleset")]
    ruleset: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Source")]
    src: String,
    #[tabled(rename = "Destination")]
    dst: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
}

impl RuleRow {
    pub(super) fn new(r: &DiscoveredRule, color: bool) -> Self {
        let dst = match (&r.dst_address, &r.dst_port) {
            (Some(addr), Some(port)) => format!("{addr}:{port}"),
            (Some(addr), None) => addr.clone(),
            (None, Some(port)) => format!("*:{port}"),
            (None, None) => "-".into(),
        };
        Self {
            id: r.id.clone(),
            index: r.index.clone().unwrap_or_else(|| "-".into()),
            name: r.name.clone(),
            ruleset: r.ruleset.clone().unwrap_or_else(|| "-".into()),
            action: r.action.clone().unwrap_or_else(|| "-".into()),
            src: r.src_address.clone().unwrap_or_else(|| "-".into()),
            dst,
            enabled: output::on_off(r.enabled, color),
        }
    }
}

fn rule_detail(r: &DiscoveredRule) -> String {
    [
        format!("ID:       {}", r.id),
        format!("Index:    {}", r.index.as_deref().unwrap_or("-")),
        format!("Name:     {}", r.name),
        format!("Ruleset:  {}", r.ruleset.as_deref().unwrap_or("-")),
        format!("Action:   {}", r.action.as_deref().unwrap_or("-")),
        format!("Enabled:  {}", r.enabled),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: RulesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let conn = util::connect(global).await?;
    let site = conn.site.name.as_str();
    let color = output::should_color(&global.color);

    let result = match args.command {
        RulesCommand::List => {
            let rules: Vec<DiscoveredRule> = resolver::list_rules(&conn.session, site)
                .await?
                .into_iter()
                .map(DiscoveredRule::from)
                .collect();
            let out = output::render_list(
                &global.output,
                &rules,
                |r| RuleRow::new(r, color),
                |r| r.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
        RulesCommand::Enable { rule } => set(&conn, &rule, true, global).await,
        RulesCommand::Disable { rule } => set(&conn, &rule, false, global).await,
    };

    conn.session.logout().await;
    result
}

async fn set(
    conn: &util::Connection,
    identifier: &str,
    enabled: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let site = conn.site.name.as_str();
    let mut rule =
        resolver::resolve_rule(&conn.session, site, &util::lookup_entry(identifier)).await?;

    if rule.enabled == enabled {
        tracing::info!(rule = %rule.id, enabled, "rule already in requested state");
    } else {
        toggle::set_rule_enabled(&conn.session, site, &mut rule, enabled).await?;
    }

    let shown = DiscoveredRule::from(rule);
    let out = output::render_single(&global.output, &shown, rule_detail, |r| r.id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
