// Controller HTTP client
//
// URL construction per platform, the `{meta, data}` envelope, UniFi OS error
// wrappers and CSRF handling. Endpoint groups (auth, sites, firewall rules,
// probing) are inherent methods in sibling files.

use std::sync::RwLock;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::legacy::auth::csrf_header;
use crate::legacy::models::{LegacyResponse, Meta};
use crate::transport::TransportConfig;

/// `{"error":{"code":N,"message":"..."}}`, which UniFi OS sends with HTTP 200.
#[derive(serde::Deserialize)]
struct ConsoleError {
    error: Option<ConsoleErrorBody>,
}

#[derive(serde::Deserialize)]
struct ConsoleErrorBody {
    code: u16,
    message: Option<String>,
}

impl ConsoleErrorBody {
    fn into_error(self) -> Error {
        let message = self.message.unwrap_or_default();
        if self.code == 401 {
            Error::Authentication { message }
        } else {
            Error::LegacyApi {
                message: format!("UniFi OS error {}: {message}", self.code),
            }
        }
    }
}

impl Meta {
    /// `Some` when the envelope reports a failure.
    fn failure(&self) -> Option<Error> {
        (self.rc != "ok").then(|| Error::LegacyApi {
            message: self
                .msg
                .clone()
                .unwrap_or_else(|| format!("rc={}", self.rc)),
        })
    }
}

fn body_preview(body: &str) -> String {
    body.chars().take(200).collect()
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", body_preview(body)),
        body: body.to_owned(),
    })
}

/// HTTP client for one UniFi controller, independent of any site.
pub struct LegacyClient {
    http: reqwest::Client,
    base_url: Url,
    platform: ControllerPlatform,
    /// Sent on every mutating request. Set at login, rotated by
    /// `X-Updated-CSRF-Token`, cleared at logout.
    csrf_token: RwLock<Option<String>>,
}

impl LegacyClient {
    /// Build a client for `base_url` (controller root, e.g.
    /// `https://192.168.1.1` or `https://controller:8443`). A cookie jar is
    /// added when the transport has none, since the session lives in cookies.
    pub fn new(
        base_url: Url,
        platform: ControllerPlatform,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = match transport.cookie_jar {
            Some(_) => transport.build_client()?,
            None => transport.clone().with_cookie_jar().build_client()?,
        };
        Ok(Self::with_client(http, base_url, platform))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, platform: ControllerPlatform) -> Self {
        Self {
            http,
            base_url,
            platform,
            csrf_token: RwLock::new(None),
        }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn platform(&self) -> ControllerPlatform {
        self.platform
    }

    // ── CSRF ─────────────────────────────────────────────────────────

    pub(crate) fn set_csrf_token(&self, token: String) {
        trace!("CSRF token stored");
        *self.csrf_token.write().expect("CSRF lock poisoned") = Some(token);
    }

    pub(crate) fn clear_csrf_token(&self) {
        *self.csrf_token.write().expect("CSRF lock poisoned") = None;
    }

    fn with_csrf(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.csrf_token.read().expect("CSRF lock poisoned").as_deref() {
            Some(token) => builder.header("X-CSRF-Token", token),
            None => builder,
        }
    }

    // ── URLs ─────────────────────────────────────────────────────────

    fn join(&self, tail: &str) -> Result<Url, Error> {
        let root = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{root}{tail}"))?)
    }

    /// `{base}/{path}`
    pub fn absolute_url(&self, path: &str) -> Result<Url, Error> {
        self.join(&format!("/{}", path.trim_start_matches('/')))
    }

    /// `{base}{prefix}/api/{path}`, for controller-level calls.
    pub fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.join(&format!("{}/api/{path}", self.platform.network_prefix()))
    }

    /// `{base}{prefix}/api/s/{site}/{path}`
    pub fn site_url(&self, site: &str, path: &str) -> Result<Url, Error> {
        self.join(&format!("{}/api/s/{site}/{path}", self.platform.network_prefix()))
    }

    /// `{base}{prefix}/v2/api/site/{site}/{path}`
    pub fn v2_url(&self, site: &str, path: &str) -> Result<Url, Error> {
        self.join(&format!(
            "{}/v2/api/site/{site}/{path}",
            self.platform.network_prefix()
        ))
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// GET and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        debug!(%url, "GET");
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        self.enveloped(resp).await
    }

    /// PUT a JSON body and unwrap the envelope.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<Vec<T>, Error> {
        debug!(%url, "PUT");
        let resp = self
            .with_csrf(self.http.put(url).json(body))
            .send()
            .await
            .map_err(Error::Transport)?;
        self.enveloped(resp).await
    }

    /// Send a request and return the body as JSON without assuming a shape.
    ///
    /// `Ok(None)` means an empty body. A failing `meta.rc` or a UniFi OS
    /// error object is still an error.
    pub async fn send_json(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Option<Value>, Error> {
        debug!(%method, %url, "probe request");

        let mut builder = self.http.request(method.clone(), url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        if method != Method::GET {
            builder = self.with_csrf(builder);
        }
        let resp = builder.send().await.map_err(Error::Transport)?;

        let text = self.body_text(resp).await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = decode(&text)?;

        if let Some(meta) = value.get("meta") {
            if let Ok(meta) = serde_json::from_value::<Meta>(meta.clone()) {
                if let Some(err) = meta.failure() {
                    return Err(err);
                }
            }
        }
        Ok(Some(value))
    }

    /// Status and console-error checks; rotates the CSRF token.
    async fn body_text(&self, resp: reqwest::Response) -> Result<String, Error> {
        if let Some(token) = csrf_header(resp.headers(), "X-Updated-CSRF-Token") {
            self.set_csrf_token(token);
        }

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: body_preview(&text),
            });
        }

        let text = resp.text().await.map_err(Error::Transport)?;
        if let Ok(ConsoleError { error: Some(err) }) = serde_json::from_str::<ConsoleError>(&text) {
            return Err(err.into_error());
        }
        Ok(text)
    }

    async fn enveloped<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<Vec<T>, Error> {
        let text = self.body_text(resp).await?;
        let envelope: LegacyResponse<T> = decode(&text)?;
        match envelope.meta.failure() {
            Some(err) => Err(err),
            None => Ok(envelope.data),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str, platform: ControllerPlatform) -> LegacyClient {
        LegacyClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap(), platform)
    }

    #[test]
    fn unifi_os_urls_carry_proxy_prefix() {
        let c = client("https://192.168.1.1", ControllerPlatform::UnifiOs);
        assert_eq!(
            c.site_url("default", "rest/firewallrule").unwrap().as_str(),
            "https://192.168.1.1/proxy/network/api/s/default/rest/firewallrule"
        );
        assert_eq!(
            c.v2_url("default", "firewall-policies").unwrap().as_str(),
            "https://192.168.1.1/proxy/network/v2/api/site/default/firewall-policies"
        );
        assert_eq!(
            c.api_url("self/sites").unwrap().as_str(),
            "https://192.168.1.1/proxy/network/api/self/sites"
        );
    }

    #[test]
    fn classic_urls_have_no_prefix() {
        let c = client("https://controller:8443/", ControllerPlatform::Classic);
        assert_eq!(
            c.site_url("lab", "rest/policy").unwrap().as_str(),
            "https://controller:8443/api/s/lab/rest/policy"
        );
        assert_eq!(
            c.absolute_url("proxy/network/v2/api/site/default/firewall-policies")
                .unwrap()
                .as_str(),
            "https://controller:8443/proxy/network/v2/api/site/default/firewall-policies"
        );
    }

    #[test]
    fn envelope_failure_prefers_message() {
        let meta = Meta {
            rc: "error".into(),
            msg: Some("api.err.NoSiteContext".into()),
        };
        assert!(matches!(
            meta.failure(),
            Some(Error::LegacyApi { ref message }) if message == "api.err.NoSiteContext"
        ));
        let ok = Meta {
            rc: "ok".into(),
            msg: None,
        };
        assert!(ok.failure().is_none());
    }
}
