//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and distinct exit codes.

use miette::Diagnostic;
use thiserror::Error;

use fwswitch_config::ConfigError;
use fwswitch_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const WRITE_FAILED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to controller at {url}: {reason}")]
    #[diagnostic(
        code(fwswitch::connection_failed),
        help(
            "Check that the controller is running and reachable.\n\
             For self-signed certificates set strict_ssl = false."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(fwswitch::timeout),
        help("Raise controller.timeout or check controller responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fwswitch::auth_failed),
        help(
            "Check the username and password, and that the account is a\n\
             local admin (cloud accounts with 2FA cannot log in)."
        )
    )]
    AuthFailed { message: String },

    #[error("No {what} configured for the controller")]
    #[diagnostic(
        code(fwswitch::no_credentials),
        help(
            "Set controller.username and controller.password in the config file,\n\
             or export FWSWITCH_PASSWORD."
        )
    )]
    NoCredentials { what: &'static str },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(fwswitch::not_found),
        help("Run: fwswitch {list_command} to see what the controller has")
    )]
    NotFound {
        resource_type: &'static str,
        identifier: String,
        list_command: &'static str,
    },

    #[error("Site '{name}' not found")]
    #[diagnostic(
        code(fwswitch::site_not_found),
        help("Available sites: {available}\nSet controller.site or pass --site.")
    )]
    SiteNotFound { name: String, available: String },

    // ── Writes ───────────────────────────────────────────────────────

    #[error("Could not update {target}: {reason}")]
    #[diagnostic(
        code(fwswitch::write_failed),
        help("The controller rejected every known write endpoint; the value was left unchanged.")
    )]
    WriteFailed { target: String, reason: String },

    #[error("Accessory registration failed: {message}")]
    #[diagnostic(code(fwswitch::registration))]
    Registration { message: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error: {message}")]
    #[diagnostic(code(fwswitch::api_error))]
    ApiError { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(
        code(fwswitch::validation),
        help("Inspect the effective configuration with: fwswitch config show")
    )]
    Validation { field: String, reason: String },

    #[error("Configuration could not be loaded: {message}")]
    #[diagnostic(
        code(fwswitch::config),
        help("Config file: {path}")
    )]
    Config { message: String, path: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::SiteNotFound { .. } => exit_code::NOT_FOUND,
            Self::WriteFailed { .. } => exit_code::WRITE_FAILED,
            Self::Validation { .. } | Self::Config { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Whether retrying the same connection attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::SiteNotFound { name, available } => Self::SiteNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            CoreError::RuleNotFound { identifier } => Self::NotFound {
                resource_type: "Firewall rule",
                identifier,
                list_command: "rules list",
            },
            CoreError::PolicyNotMatched { identifier } => Self::NotFound {
                resource_type: "Firewall policy",
                identifier,
                list_command: "policies list",
            },
            CoreError::RemoteWriteFailed { target, reason } => Self::WriteFailed { target, reason },
            CoreError::Registration { message } => Self::Registration { message },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Api { message, .. } | CoreError::Internal(message) => {
                Self::ApiError { message }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { what } => Self::NoCredentials { what },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
                path: fwswitch_config::config_path().display().to_string(),
            },
        }
    }
}
