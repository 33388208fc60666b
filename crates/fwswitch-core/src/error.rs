// ── Core error types ──
//
// Domain errors for resolution, toggling and reconciliation. Consumers
// never see HTTP status codes or JSON parse failures directly; the
// `From<fwswitch_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller connection timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Resolution errors ────────────────────────────────────────────
    #[error("Site not found: {name} (available: {})", available.join(", "))]
    SiteNotFound { name: String, available: Vec<String> },

    #[error("Firewall rule not found: {identifier}")]
    RuleNotFound { identifier: String },

    #[error("No firewall policy matches {identifier}")]
    PolicyNotMatched { identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Failed to update {target}: {reason}")]
    RemoteWriteFailed { target: String, reason: String },

    #[error("Accessory registration failed: {message}")]
    Registration { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Errors that make the whole controller unusable. These abort a
    /// discovery pass; everything else only affects a single entry.
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::AuthenticationFailed { .. }
                | Self::Timeout { .. }
                | Self::SiteNotFound { .. }
                | Self::Config { .. }
        )
    }

    /// Whether the session should be dropped and logged in again.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }

    /// Actionable steps for the operator, logged when discovery aborts.
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout { .. } => &[
                "Verify the controller URL is correct and reachable from this host",
                "For self-signed certificates set `strict_ssl = false`",
                "Test the connection with `fwswitch discover`",
            ],
            Self::AuthenticationFailed { .. } => &[
                "Check the configured username and password",
                "Ensure the account has admin privileges on the controller",
                "Use a local account; cloud accounts with 2FA cannot log in",
                "Test the connection with `fwswitch discover`",
            ],
            Self::SiteNotFound { .. } => &[
                "Set `site` to the site name (usually \"default\") or its description",
                "Check the controller URL points at the right controller",
            ],
            Self::Config { .. } => &["Inspect the effective configuration with `fwswitch config show`"],
            _ => &[],
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fwswitch_api::Error> for CoreError {
    fn from(err: fwswitch_api::Error) -> Self {
        match err {
            fwswitch_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            fwswitch_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            fwswitch_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            fwswitch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            fwswitch_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            fwswitch_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            fwswitch_api::Error::LegacyApi { message } => CoreError::Api {
                message,
                status: None,
            },
            fwswitch_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            fwswitch_api::Error::InvalidEndpoint { path, reason } => CoreError::Config {
                message: format!("endpoint {path}: {reason}"),
            },
            err @ fwswitch_api::Error::ProbeExhausted { .. } => CoreError::Api {
                message: err.to_string(),
                status: None,
            },
        }
    }
}
