//! `fwswitch discover`: everything on the site that can become a switch.

use owo_colors::OwoColorize;

use fwswitch_core::{DiscoveryResult, discover_rules_and_policies};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::policies::PolicyRow;
use super::rules::RuleRow;
use super::util;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let conn = util::connect(global).await?;
    let result = discover_rules_and_policies(
        &conn.session,
        &conn.site.name,
        &conn.config.endpoints.list,
    )
    .await;
    conn.session.logout().await;
    let result = result?;

    let color = output::should_color(&global.color);
    let site = conn.site.description.as_deref().unwrap_or(&conn.site.name);
    let out = output::render_single(
        &global.output,
        &result,
        |r| detail(r, site, color),
        |r| {
            r.rules
                .iter()
                .map(|x| x.id.as_str())
                .chain(r.policies.iter().map(|x| x.id.as_str()))
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.to_owned()
    }
}

fn detail(result: &DiscoveryResult, site: &str, color: bool) -> String {
    let mut sections = Vec::new();

    sections.push(heading(
        &format!("Legacy firewall rules on {site} ({})", result.rules.len()),
        color,
    ));
    if result.rules.is_empty() {
        sections.push("  none".into());
    } else {
        let rows: Vec<RuleRow> = result.rules.iter().map(|r| RuleRow::new(r, color)).collect();
        sections.push(output::render_table(&rows));
    }

    sections.push(String::new());
    sections.push(heading(
        &format!("Firewall policies on {site} ({})", result.policies.len()),
        color,
    ));
    if result.policies.is_empty() {
        sections.push("  none (controller may predate zone-based firewall)".into());
    } else {
        let rows: Vec<PolicyRow> = result
            .policies
            .iter()
            .map(|p| PolicyRow::new(p, color))
            .collect();
        sections.push(output::render_table(&rows));
    }

    sections.join("\n")
}
