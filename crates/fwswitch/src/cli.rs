//! Clap derive structures for the `fwswitch` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fwswitch -- UniFi firewall rules and policies as switches
#[derive(Debug, Parser)]
#[command(
    name = "fwswitch",
    version,
    about = "Toggle UniFi firewall rules and zone-based policies",
    long_about = "Discover, toggle and dry-run UniFi firewall switches.\n\n\
        Legacy firewall rules are read and saved through the classic REST API;\n\
        zone-based policies are found by probing the known endpoint shapes.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration file
    #[arg(long, env = "FWSWITCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Site name or description (overrides config)
    #[arg(long, short = 's', global = true)]
    pub site: Option<String>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Connection attempts after the first, with exponential backoff
    #[arg(long, default_value = "2", global = true)]
    pub retries: u32,
}

// ── Output, Color & Log Enums ────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every legacy rule and policy on the site
    Discover,

    /// Zone-based firewall policies
    #[command(alias = "pol", alias = "p")]
    Policies(PoliciesArgs),

    /// Legacy firewall rules
    #[command(alias = "r")]
    Rules(RulesArgs),

    /// Dry-run a reconciliation pass for the configured entries
    Check(CheckArgs),

    /// Inspect configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Policies ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PoliciesArgs {
    #[command(subcommand)]
    pub command: PoliciesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PoliciesCommand {
    /// List policies
    #[command(alias = "ls")]
    List,

    /// Enable a policy
    Enable {
        /// Policy ID or name
        policy: String,
    },

    /// Disable a policy
    Disable {
        /// Policy ID or name
        policy: String,
    },

    /// Flip a policy's enabled flag
    Toggle {
        /// Policy ID or name
        policy: String,
    },
}

// ── Rules ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// List legacy firewall rules
    #[command(alias = "ls")]
    List,

    /// Enable a rule
    Enable {
        /// Rule ID, rule index or name
        rule: String,
    },

    /// Disable a rule
    Disable {
        /// Rule ID, rule index or name
        rule: String,
    },
}

// ── Check ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Run the pass twice to confirm a restart restores every accessory
    #[arg(long)]
    pub restart: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the effective configuration (secrets redacted)
    Show,

    /// Check the configuration without contacting the controller
    Validate,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }
}
