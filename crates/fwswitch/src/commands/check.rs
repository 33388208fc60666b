//! `fwswitch check`: a reconciliation pass against an in-memory host.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use fwswitch_core::{
    AccessoryHost, DiscoveryReport, FirewallPlatform, MemoryHost, PlatformConfig,
    ReconcileOutcome, ReconciledEntry, SkippedEntry,
};

use crate::cli::{CheckArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Remote ID")]
    remote_id: String,
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "Switch")]
    value: String,
}

impl EntryRow {
    fn new(e: &ReconciledEntry, color: bool) -> Self {
        Self {
            kind: e.kind.to_string(),
            name: e.display_name.clone(),
            remote_id: e.remote_id.clone(),
            uuid: e.uuid.to_string(),
            outcome: e.outcome.to_string(),
            value: output::on_off(e.value, color),
        }
    }
}

#[derive(Tabled)]
struct SkippedRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Entry")]
    entry: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl From<&SkippedEntry> for SkippedRow {
    fn from(s: &SkippedEntry) -> Self {
        Self {
            kind: s.kind.to_string(),
            entry: s.entry.clone(),
            reason: s.reason.clone(),
        }
    }
}

/// What `check` prints in structured formats.
#[derive(Serialize)]
struct CheckOutput {
    first_run: DiscoveryReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    after_restart: Option<DiscoveryReport>,
}

pub async fn handle(args: CheckArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = util::load_platform_config(global)?;

    let host = Arc::new(MemoryHost::new());
    let first_run = run_pass(&config, Arc::clone(&host), &[], global).await?;

    let after_restart = if args.restart {
        let cached = host.registered();
        info!(cached = cached.len(), "simulating restart");
        let restarted = Arc::new(MemoryHost::with_cached(&cached));
        Some(run_pass(&config, restarted, &cached, global).await?)
    } else {
        None
    };

    let result = CheckOutput {
        first_run,
        after_restart,
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &result,
        |r| detail(r, color),
        |r| {
            r.first_run
                .entries
                .iter()
                .map(|e| e.uuid.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn run_pass(
    config: &PlatformConfig,
    host: Arc<MemoryHost>,
    cached: &[fwswitch_core::AccessoryRecord],
    global: &GlobalOpts,
) -> Result<DiscoveryReport, CliError> {
    let host: Arc<dyn AccessoryHost> = host;
    let platform = FirewallPlatform::new(config.clone(), host);
    for record in cached {
        platform.configure_accessory(record.clone());
    }

    let session = platform.session();
    util::with_retries(global.retries, || async move {
        session.ensure_logged_in().await.map_err(CliError::from)
    })
    .await?;

    let report = platform.discover_devices().await;
    platform.shutdown().await;
    Ok(report?)
}

fn summary(label: &str, report: &DiscoveryReport) -> String {
    let site = report
        .site
        .description
        .as_deref()
        .unwrap_or(&report.site.name);
    format!(
        "{label} (site {site}): {} registered, {} restored, {} skipped",
        report.count(ReconcileOutcome::Registered),
        report.count(ReconcileOutcome::Restored),
        report.skipped.len()
    )
}

fn report_detail(label: &str, report: &DiscoveryReport, color: bool) -> String {
    let mut lines = vec![summary(label, report)];
    if !report.entries.is_empty() {
        let rows: Vec<EntryRow> = report.entries.iter().map(|e| EntryRow::new(e, color)).collect();
        lines.push(output::render_table(&rows));
    }
    if !report.skipped.is_empty() {
        let rows: Vec<SkippedRow> = report.skipped.iter().map(SkippedRow::from).collect();
        lines.push(output::render_table(&rows));
    }
    lines.join("\n")
}

fn detail(result: &CheckOutput, color: bool) -> String {
    let mut out = report_detail("First run", &result.first_run, color);
    if let Some(ref restarted) = result.after_restart {
        out.push_str("\n\n");
        out.push_str(&report_detail("After restart", restarted, color));
    }
    out
}
