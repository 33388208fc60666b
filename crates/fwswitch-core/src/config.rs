// ── Runtime platform configuration ──
//
// These types describe *how* to reach the controller and *what* to expose.
// They carry credential data and entry lists, but never touch disk.
// `fwswitch-config` (or any other host) builds a `PlatformConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use fwswitch_api::{ControllerPlatform, EndpointTable, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::model::ConfiguredEntry;

/// TLS verification strategy.
///
/// Threaded into each session explicitly; nothing here touches
/// process-wide state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs). Default for local controllers.
    #[default]
    DangerAcceptInvalid,
}

impl TlsVerification {
    /// Map the `strict_ssl` flag onto a verification mode.
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::SystemDefaults
        } else {
            Self::DangerAcceptInvalid
        }
    }
}

/// How to reach and authenticate against one controller.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Controller URL (e.g., `https://192.168.1.1`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Skip platform detection when set.
    pub platform: Option<ControllerPlatform>,
}

impl SessionConfig {
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            platform: None,
        }
    }

    /// Transport settings for this session's HTTP client.
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            cookie_jar: None,
        }
    }
}

/// Candidate tables for the policy capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyEndpoints {
    pub list: EndpointTable,
    pub write: EndpointTable,
}

impl Default for PolicyEndpoints {
    fn default() -> Self {
        Self {
            list: EndpointTable::policy_listing(),
            write: EndpointTable::policy_write(),
        }
    }
}

/// Everything one platform instance needs.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Display name for this platform instance.
    pub name: String,
    pub session: SessionConfig,
    /// Site name or description.
    pub site: String,
    pub rules: Vec<ConfiguredEntry>,
    pub policies: Vec<ConfiguredEntry>,
    pub endpoints: PolicyEndpoints,
}

impl PlatformConfig {
    pub fn new(session: SessionConfig) -> Self {
        Self {
            name: "UniFi Firewall".into(),
            session,
            site: "default".into(),
            rules: Vec::new(),
            policies: Vec::new(),
            endpoints: PolicyEndpoints::default(),
        }
    }
}
