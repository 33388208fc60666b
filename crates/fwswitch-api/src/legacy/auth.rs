// Session login/logout and platform detection
//
// Logging in stores a session cookie in the client's jar and, on UniFi OS,
// a CSRF token for the write calls the toggle path makes later.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::transport::TransportConfig;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    remember: bool,
}

impl LegacyClient {
    /// Authenticate with username/password at the platform's login path.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.absolute_url(self.platform().login_path())?;
        debug!(%url, user = username, "login");

        let request = LoginRequest {
            username,
            password: password.expose_secret(),
            remember: true,
        };
        let resp = self
            .http()
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("controller refused login (HTTP {status}): {detail}"),
            });
        }

        match csrf_header(resp.headers(), "X-CSRF-Token") {
            Some(token) => self.set_csrf_token(token),
            None => debug!("login response carried no CSRF token"),
        }
        Ok(())
    }

    /// End the session. The controller's answer is not inspected; the CSRF
    /// token is dropped either way.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.absolute_url(self.platform().logout_path())?;
        debug!(%url, "logout");

        let sent = self.http().post(url).send().await;
        self.clear_csrf_token();
        sent.map(drop).map_err(Error::Transport)
    }

    /// Tell UniFi OS consoles from classic controllers.
    ///
    /// UniFi OS answers anything but 404 on `/api/auth/login`. Otherwise the
    /// classic `/api/login` must at least be reachable. Detection runs with
    /// the session's own transport so TLS strictness applies here too.
    pub async fn detect_platform(
        base_url: &Url,
        transport: &TransportConfig,
    ) -> Result<ControllerPlatform, Error> {
        let http = transport.build_client()?;
        let root = base_url.as_str().trim_end_matches('/');
        let probe = |platform: ControllerPlatform| {
            Url::parse(&format!("{root}{}", platform.login_path()))
        };

        let unifi_os = probe(ControllerPlatform::UnifiOs)?;
        match http.get(unifi_os.clone()).send().await {
            Ok(resp) if resp.status() != reqwest::StatusCode::NOT_FOUND => {
                debug!(url = %unifi_os, status = %resp.status(), "UniFi OS login path answered");
                return Ok(ControllerPlatform::UnifiOs);
            }
            Ok(_) => debug!(url = %unifi_os, "no UniFi OS login path"),
            Err(e) => debug!(url = %unifi_os, error = %e, "UniFi OS probe failed"),
        }

        let classic = probe(ControllerPlatform::Classic)?;
        http.get(classic.clone())
            .send()
            .await
            .map_err(Error::Transport)?;
        debug!(url = %classic, "classic controller");
        Ok(ControllerPlatform::Classic)
    }
}

/// A CSRF token header value. Header names are case-insensitive.
pub(crate) fn csrf_header(headers: &reqwest::header::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
