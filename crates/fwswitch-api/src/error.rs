use thiserror::Error;

/// Transport-level failures. `fwswitch-core` maps these into `CoreError`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login refused, or a 401 on a later call.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Session cookie no longer accepted.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// Connection refused, DNS failure, timeout.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// CA certificate loading or client construction.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-success status other than 401.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Legacy API ──────────────────────────────────────────────────
    /// `meta.rc != "ok"`, or a UniFi OS error object.
    #[error("Legacy API error: {message}")]
    LegacyApi { message: String },

    // ── Data ────────────────────────────────────────────────────────
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Probing ─────────────────────────────────────────────────────
    /// An endpoint template could not be rendered for this request.
    #[error("Unusable endpoint {path}: {reason}")]
    InvalidEndpoint { path: String, reason: String },

    /// Every candidate endpoint for a capability failed.
    #[error("No endpoint accepted {capability} ({attempts} candidates tried)")]
    ProbeExhausted { capability: String, attempts: usize },
}

impl Error {
    /// A fresh login might fix this.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_404_is_not_found() {
        let err = Error::Http {
            status: 404,
            message: "missing".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_auth_expired());
    }

    #[test]
    fn rejected_session_needs_login() {
        assert!(Error::SessionExpired.is_auth_expired());
        let err = Error::Http {
            status: 502,
            message: "bad gateway".into(),
        };
        assert!(!err.is_auth_expired());
        assert!(!err.is_not_found());
    }

    #[test]
    fn exhausted_probe_names_capability() {
        let err = Error::ProbeExhausted {
            capability: "policy write".into(),
            attempts: 3,
        };
        assert_eq!(
            err.to_string(),
            "No endpoint accepted policy write (3 candidates tried)"
        );
    }
}
