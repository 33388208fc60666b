// ── Controller session ──
//
// One authenticated handle per controller, shared by every resolver and
// switch bound to it. Login is idempotent and serialised: concurrent
// callers queue on the login mutex and observe the finished login.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fwswitch_api::LegacyClient;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::CoreError;

/// Cheaply cloneable session handle.
#[derive(Clone)]
pub struct ControllerSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    client: OnceCell<LegacyClient>,
    logged_in: Mutex<bool>,
    logins: AtomicUsize,
}

impl ControllerSession {
    /// Create a session. No I/O happens until the first call that needs it.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                config,
                client: OnceCell::new(),
                logged_in: Mutex::new(false),
                logins: AtomicUsize::new(0),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Number of successful logins so far.
    pub fn login_count(&self) -> usize {
        self.inner.logins.load(Ordering::SeqCst)
    }

    /// The HTTP client, built on first use. Detects the platform unless
    /// the configuration pins one.
    async fn raw_client(&self) -> Result<&LegacyClient, CoreError> {
        self.inner
            .client
            .get_or_try_init(|| async {
                let config = &self.inner.config;
                let transport = config.transport();
                let platform = match config.platform {
                    Some(platform) => platform,
                    None => {
                        let detected =
                            LegacyClient::detect_platform(&config.url, &transport).await?;
                        debug!(?detected, "detected controller platform");
                        detected
                    }
                };
                Ok::<_, CoreError>(LegacyClient::new(config.url.clone(), platform, &transport)?)
            })
            .await
    }

    /// Log in unless already authenticated.
    pub async fn ensure_logged_in(&self) -> Result<(), CoreError> {
        let mut logged_in = self.inner.logged_in.lock().await;
        if *logged_in {
            return Ok(());
        }

        let client = self.raw_client().await?;
        let config = &self.inner.config;
        info!(url = %config.url, user = %config.username, "logging in to controller");
        client.login(&config.username, &config.password).await?;

        *logged_in = true;
        self.inner.logins.fetch_add(1, Ordering::SeqCst);
        info!("controller session established");
        Ok(())
    }

    /// An authenticated client.
    pub async fn client(&self) -> Result<&LegacyClient, CoreError> {
        self.ensure_logged_in().await?;
        self.raw_client().await
    }

    /// Force the next call to log in again (after a rejected session).
    pub async fn invalidate(&self) {
        let mut logged_in = self.inner.logged_in.lock().await;
        if *logged_in {
            debug!("invalidating controller session");
        }
        *logged_in = false;
    }

    /// End the session. Failures are logged, not returned.
    pub async fn logout(&self) {
        let mut logged_in = self.inner.logged_in.lock().await;
        if !*logged_in {
            return;
        }
        if let Some(client) = self.inner.client.get() {
            if let Err(e) = client.logout().await {
                warn!(error = %e, "logout failed (non-fatal)");
            }
        }
        *logged_in = false;
        debug!("logged out");
    }
}
