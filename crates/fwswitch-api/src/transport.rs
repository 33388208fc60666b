// HTTP client construction
//
// Each controller session carries its own TLS mode and timeout; nothing here
// changes process-wide TLS settings.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;

use crate::error::Error;

/// Certificate verification for controller connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// System trust store.
    System,
    /// Trust an extra PEM-encoded CA.
    CustomCa(PathBuf),
    /// Accept any certificate. Most consoles ship self-signed.
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Session cookies. `LegacyClient::new` adds a jar when this is `None`.
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(30),
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("fwswitch/", env!("CARGO_PKG_VERSION")));

        let builder = match self.tls {
            TlsMode::System => builder,
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
            TlsMode::CustomCa(ref path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    Error::Tls(format!("cannot read CA certificate {}: {e}", path.display()))
                })?;
                let ca = reqwest::Certificate::from_pem(&pem)
                    .map_err(|e| Error::Tls(format!("invalid CA certificate: {e}")))?;
                builder.add_root_certificate(ca)
            }
        };

        let builder = match self.cookie_jar {
            Some(ref jar) => builder.cookie_provider(Arc::clone(jar)),
            None => builder,
        };

        builder
            .build()
            .map_err(|e| Error::Tls(format!("cannot build HTTP client: {e}")))
    }

    #[must_use]
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }
}
