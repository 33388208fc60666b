//! Configuration for fwswitch.
//!
//! TOML file + `FWSWITCH_*` environment, credential resolution (env +
//! plaintext), validation, and translation to `fwswitch_core::PlatformConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use fwswitch_core::{
    ConfiguredEntry, ControllerPlatform, EndpointTable, PlatformConfig, PolicyEndpoints,
    SessionConfig, TlsVerification,
};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "FWSWITCH_CONFIG";
/// Environment variable consulted for the controller password.
pub const PASSWORD_ENV: &str = "FWSWITCH_PASSWORD";

const REDACTED: &str = "********";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {what} configured for the controller")]
    NoCredentials { what: &'static str },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Platform display name.
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub controller: Controller,

    /// Legacy firewall rules to expose.
    #[serde(default)]
    pub rules: Vec<ConfiguredEntry>,

    /// Zone-based firewall policies to expose.
    #[serde(default)]
    pub policies: Vec<ConfiguredEntry>,

    /// Overrides for the built-in policy endpoint tables.
    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            controller: Controller::default(),
            rules: Vec::new(),
            policies: Vec::new(),
            endpoints: Endpoints::default(),
        }
    }
}

fn default_name() -> String {
    "UniFi Firewall".into()
}

/// `[controller]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Controller {
    /// Controller base URL (e.g., "https://192.168.1.1").
    #[serde(default)]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password (plaintext; prefer `password_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Site name or description.
    #[serde(default = "default_site")]
    pub site: String,

    /// Verify the controller's TLS certificate.
    #[serde(default)]
    pub strict_ssl: bool,

    /// Path to custom CA certificate (implies strict verification).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Skip platform detection: "unifi-os" or "classic".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<ControllerPlatform>,
}

impl Default for Controller {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: None,
            password: None,
            password_env: None,
            site: default_site(),
            strict_ssl: false,
            ca_cert: None,
            timeout: default_timeout(),
            platform: None,
        }
    }
}

fn default_site() -> String {
    "default".into()
}
fn default_timeout() -> u64 {
    30
}

/// `[endpoints]` section. Absent tables fall back to the built-ins.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Endpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_list: Option<EndpointTable>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_write: Option<EndpointTable>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$FWSWITCH_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "fwswitch", "fwswitch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fwswitch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from defaults, the TOML file at `path`, then `FWSWITCH_*`
/// environment variables (nested keys separated by `__`).
///
/// A missing file is not an error; validation happens in
/// [`Config::to_platform_config`].
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading configuration");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FWSWITCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Write `config` to `path` as TOML, creating parent directories.
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, config.to_toml()?)?;
    debug!(path = %path.display(), "configuration saved");
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the controller password: `password_env` → `FWSWITCH_PASSWORD`
/// → plaintext `password`.
pub fn resolve_password(controller: &Controller) -> Result<SecretString, ConfigError> {
    // 1. Named env var
    if let Some(ref env_name) = controller.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Well-known env var
    if let Ok(val) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = controller.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials { what: "password" })
}

// ── Validation & translation ────────────────────────────────────────

impl Config {
    /// Structural checks that need no secrets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.controller_url()?;

        for (section, entries) in [("rules", &self.rules), ("policies", &self.policies)] {
            for (i, entry) in entries.iter().enumerate() {
                if entry.id().is_none() && entry.name().is_none() {
                    return Err(invalid(
                        format!("{section}[{i}]"),
                        "needs a non-empty `id` or `name`",
                    ));
                }
            }
        }

        if let Some(ref table) = self.endpoints.policy_list {
            if table.is_empty() {
                return Err(invalid("endpoints.policy_list", "must not be empty"));
            }
            if let Some(c) = table.iter().find(|c| c.is_write()) {
                return Err(invalid(
                    "endpoints.policy_list",
                    format!("listing candidate {} must use GET", c.path),
                ));
            }
        }

        if let Some(ref table) = self.endpoints.policy_write {
            if table.is_empty() {
                return Err(invalid("endpoints.policy_write", "must not be empty"));
            }
            if let Some(c) = table.iter().find(|c| !c.is_write()) {
                return Err(invalid(
                    "endpoints.policy_write",
                    format!("write candidate {} must use PUT or POST", c.path),
                ));
            }
        }

        Ok(())
    }

    fn controller_url(&self) -> Result<url::Url, ConfigError> {
        let raw = self.controller.url.trim();
        if raw.is_empty() {
            return Err(invalid("controller.url", "not set"));
        }
        raw.parse()
            .map_err(|e| invalid("controller.url", format!("invalid URL {raw}: {e}")))
    }

    /// TLS mode from `strict_ssl` and `ca_cert`.
    pub fn tls(&self) -> TlsVerification {
        match self.controller.ca_cert {
            Some(ref ca) => TlsVerification::CustomCa(ca.clone()),
            None => TlsVerification::from_strict(self.controller.strict_ssl),
        }
    }

    /// Validate and build the runtime configuration, resolving credentials.
    pub fn to_platform_config(&self) -> Result<PlatformConfig, ConfigError> {
        self.validate()?;

        let username = self
            .controller
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::NoCredentials { what: "username" })?;
        let password = resolve_password(&self.controller)?;

        let mut session = SessionConfig::new(self.controller_url()?, username, password);
        session.tls = self.tls();
        session.timeout = Duration::from_secs(self.controller.timeout);
        session.platform = self.controller.platform;

        let defaults = PolicyEndpoints::default();
        let endpoints = PolicyEndpoints {
            list: self.endpoints.policy_list.clone().unwrap_or(defaults.list),
            write: self.endpoints.policy_write.clone().unwrap_or(defaults.write),
        };

        let mut platform = PlatformConfig::new(session);
        platform.name.clone_from(&self.name);
        platform.site.clone_from(&self.controller.site);
        platform.rules.clone_from(&self.rules);
        platform.policies.clone_from(&self.policies);
        platform.endpoints = endpoints;
        Ok(platform)
    }

    /// A copy safe to print: secrets replaced.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.controller.password.is_some() {
            copy.controller.password = Some(REDACTED.into());
        }
        copy
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fwswitch_core::{ApiShape, EndpointCandidate};

    use super::*;

    fn base() -> Config {
        let mut config = Config::default();
        config.controller.url = "https://192.168.1.1".into();
        config.controller.username = Some("homebridge".into());
        config.controller.password = Some("hunter2".into());
        config
    }

    #[test]
    fn entries_need_an_identity() {
        let mut config = base();
        config.policies.push(ConfiguredEntry::default());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("policies[0]"));
    }

    #[test]
    fn listing_table_rejects_writes() {
        let mut config = base();
        config.endpoints.policy_list = Some(EndpointTable::policy_write());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "endpoints.policy_list"
        ));
    }

    #[test]
    fn write_table_rejects_reads_and_empties() {
        let mut config = base();
        config.endpoints.policy_write = Some(EndpointTable::new(vec![EndpointCandidate::get(
            ApiShape::V2,
            "firewall-policies",
        )]));
        assert!(config.validate().is_err());

        config.endpoints.policy_write = Some(EndpointTable::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_url_is_reported() {
        let mut config = base();
        config.controller.url = String::new();
        assert!(matches!(
            config.to_platform_config(),
            Err(ConfigError::Validation { ref field, .. }) if field == "controller.url"
        ));
    }

    #[test]
    fn ca_cert_implies_custom_verification() {
        let mut config = base();
        config.controller.ca_cert = Some(PathBuf::from("/etc/ssl/unifi.pem"));
        assert_eq!(
            config.tls(),
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/unifi.pem"))
        );
    }

    #[test]
    fn redaction_hides_password_only() {
        let shown = base().redacted();
        assert_eq!(shown.controller.password.as_deref(), Some(REDACTED));
        assert_eq!(shown.controller.username.as_deref(), Some("homebridge"));

        let toml = shown.to_toml().unwrap();
        assert!(!toml.contains("hunter2"));
        assert!(toml.contains("[controller]"));
    }
}
