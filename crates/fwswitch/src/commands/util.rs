//! Shared helpers for command handlers.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use fwswitch_config::Config;
use fwswitch_core::{ConfiguredEntry, ControllerSession, PlatformConfig, Site, resolver};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// A logged-in session bound to the configured site.
pub struct Connection {
    pub config: PlatformConfig,
    pub session: ControllerSession,
    pub site: Site,
}

/// `--config`, else the default location.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(fwswitch_config::config_path)
}

/// Load the raw config file with environment overrides applied.
pub fn load_file_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = config_file(global);
    let mut config = fwswitch_config::load_config(&path)?;
    if let Some(ref site) = global.site {
        config.controller.site.clone_from(site);
    }
    Ok(config)
}

/// Load, validate and resolve credentials.
pub fn load_platform_config(global: &GlobalOpts) -> Result<PlatformConfig, CliError> {
    Ok(load_file_config(global)?.to_platform_config()?)
}

/// Run `op` until it succeeds, fails with a non-retryable error, or
/// `retries` extra attempts have been spent. Waits `2^attempt` seconds
/// between attempts.
pub async fn with_retries<T, F, Fut>(retries: u32, mut op: F) -> Result<T, CliError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CliError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < retries => {
                let delay = Duration::from_secs(1_u64 << attempt.min(6));
                warn!(
                    attempt = attempt + 1,
                    delay_secs = delay.as_secs(),
                    error = %e,
                    "connection attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Log in (with retries) and bind the configured site.
pub async fn connect(global: &GlobalOpts) -> Result<Connection, CliError> {
    let config = load_platform_config(global)?;
    let session = ControllerSession::new(config.session.clone());

    with_retries(global.retries, || {
        let session = &session;
        async move { session.ensure_logged_in().await.map_err(CliError::from) }
    })
    .await?;

    let site = resolver::resolve_site(&session, &config.site).await?;
    debug!(site = %site.name, "site bound");
    Ok(Connection {
        config,
        session,
        site,
    })
}

/// A lookup entry that matches `identifier` as an id first, then as a name.
pub fn lookup_entry(identifier: &str) -> ConfiguredEntry {
    ConfiguredEntry::by_id(identifier).with_name(identifier)
}
