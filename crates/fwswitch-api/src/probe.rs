// Endpoint probing
//
// The controller's firewall-policy API is not self-describing and has moved
// between firmware generations. Each capability (list policies, write a
// policy) is therefore an ordered table of request shapes; the prober walks
// the table in order and takes the first candidate that succeeds. A new
// controller generation adds a row, nothing else changes.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::Error;
use crate::legacy::client::LegacyClient;

// ── Candidate description ────────────────────────────────────────────

/// HTTP verb of a candidate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    Get,
    Put,
    Post,
}

impl ProbeMethod {
    fn as_method(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Put => Method::PUT,
            Self::Post => Method::POST,
        }
    }
}

/// How a candidate path is anchored on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiShape {
    /// `{base}{prefix}/v2/api/site/{site}/{path}`
    V2,
    /// `{base}{prefix}/api/s/{site}/{path}`
    Legacy,
    /// `{base}{path}`
    Absolute,
}

/// Body layout for write candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteBody {
    /// `[{"_id": id, "enabled": bool}]`
    Batch,
    /// `{"enabled": bool}`
    Single,
}

/// One row of an endpoint table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCandidate {
    pub method: ProbeMethod,
    pub shape: ApiShape,
    /// Path template; `{site}` and `{id}` are substituted per request.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<WriteBody>,
}

impl EndpointCandidate {
    pub fn get(shape: ApiShape, path: impl Into<String>) -> Self {
        Self {
            method: ProbeMethod::Get,
            shape,
            path: path.into(),
            body: None,
        }
    }

    pub fn put(shape: ApiShape, path: impl Into<String>, body: WriteBody) -> Self {
        Self {
            method: ProbeMethod::Put,
            shape,
            path: path.into(),
            body: Some(body),
        }
    }

    /// Resolve this candidate to a concrete URL on `client`.
    pub fn url(&self, client: &LegacyClient, vars: &PathVars<'_>) -> Result<Url, Error> {
        let path = vars.expand(&self.path)?;
        match self.shape {
            ApiShape::V2 => client.v2_url(vars.site, &path),
            ApiShape::Legacy => client.site_url(vars.site, &path),
            ApiShape::Absolute => client.absolute_url(&path),
        }
    }

    /// Render the write body for this candidate.
    pub fn write_body(&self, vars: &PathVars<'_>, enabled: bool) -> Result<Value, Error> {
        match self.body.unwrap_or(WriteBody::Single) {
            WriteBody::Single => Ok(json!({ "enabled": enabled })),
            WriteBody::Batch => {
                let id = vars.id.ok_or_else(|| Error::InvalidEndpoint {
                    path: self.path.clone(),
                    reason: "batch body needs an object id".into(),
                })?;
                Ok(json!([{ "_id": id, "enabled": enabled }]))
            }
        }
    }

    pub fn is_write(&self) -> bool {
        self.method != ProbeMethod::Get
    }
}

/// Values substituted into candidate path templates.
#[derive(Debug, Clone, Copy)]
pub struct PathVars<'a> {
    pub site: &'a str,
    pub id: Option<&'a str>,
}

impl<'a> PathVars<'a> {
    pub fn site(site: &'a str) -> Self {
        Self { site, id: None }
    }

    #[must_use]
    pub fn with_id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }

    fn expand(&self, template: &str) -> Result<String, Error> {
        let path = template.replace("{site}", self.site);
        if path.contains("{id}") {
            let id = self.id.ok_or_else(|| Error::InvalidEndpoint {
                path: template.to_owned(),
                reason: "template uses {id} but no object id was given".into(),
            })?;
            return Ok(path.replace("{id}", id));
        }
        Ok(path)
    }
}

// ── Tables ───────────────────────────────────────────────────────────

/// Ordered list of candidates for one capability. Earlier rows win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointTable {
    candidates: Vec<EndpointCandidate>,
}

impl EndpointTable {
    pub fn new(candidates: Vec<EndpointCandidate>) -> Self {
        Self { candidates }
    }

    /// Known policy listing shapes, newest first.
    pub fn policy_listing() -> Self {
        Self::new(vec![
            EndpointCandidate::get(ApiShape::V2, "firewall-policies"),
            EndpointCandidate::get(
                ApiShape::Absolute,
                "/proxy/network/v2/api/site/{site}/firewall-policies",
            ),
            EndpointCandidate::get(ApiShape::Legacy, "rest/firewallpolicy"),
            EndpointCandidate::get(ApiShape::Legacy, "rest/policy"),
        ])
    }

    /// Known policy write shapes: batch endpoint first, then per-resource.
    pub fn policy_write() -> Self {
        Self::new(vec![
            EndpointCandidate::put(ApiShape::V2, "firewall-policies/batch", WriteBody::Batch),
            EndpointCandidate::put(ApiShape::V2, "firewall-policies/{id}", WriteBody::Single),
            EndpointCandidate::put(
                ApiShape::Absolute,
                "/proxy/network/v2/api/site/{site}/firewall-policies/{id}",
                WriteBody::Single,
            ),
            EndpointCandidate::put(ApiShape::Legacy, "rest/firewallpolicy/{id}", WriteBody::Single),
            EndpointCandidate::put(ApiShape::Legacy, "rest/policy/{id}", WriteBody::Single),
        ])
    }

    /// Append a candidate with the lowest priority.
    pub fn push(&mut self, candidate: EndpointCandidate) {
        self.candidates.push(candidate);
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointCandidate> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl FromIterator<EndpointCandidate> for EndpointTable {
    fn from_iter<I: IntoIterator<Item = EndpointCandidate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ── Probing ──────────────────────────────────────────────────────────

/// The candidate that answered, and what it answered with.
#[derive(Debug, Clone)]
pub struct ProbeHit {
    /// Position of the winning candidate in its table.
    pub index: usize,
    pub url: Url,
    pub items: Vec<Value>,
}

/// Normalize a response body into a collection.
///
/// A `{ "data": ... }` envelope is unwrapped, a bare object becomes a
/// one-element collection, and nulls are dropped.
pub fn unwrap_payload(value: Value) -> Vec<Value> {
    let inner = match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };

    match inner {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().filter(|v| !v.is_null()).collect(),
        single => vec![single],
    }
}

impl LegacyClient {
    /// Try each read candidate in order and return the first non-empty result.
    ///
    /// Failures are logged and skipped; `None` means every candidate failed
    /// or came back empty. Listing candidates must be side-effect free.
    pub async fn probe_list(
        &self,
        capability: &str,
        table: &EndpointTable,
        vars: &PathVars<'_>,
    ) -> Option<ProbeHit> {
        for (index, candidate) in table.iter().enumerate() {
            let url = match candidate.url(self, vars) {
                Ok(url) => url,
                Err(e) => {
                    warn!(capability, path = %candidate.path, error = %e, "skipping candidate");
                    continue;
                }
            };

            match self
                .send_json(candidate.method.as_method(), url.clone(), None)
                .await
            {
                Ok(Some(value)) => {
                    let items = unwrap_payload(value);
                    if items.is_empty() {
                        debug!(capability, %url, "candidate returned no items");
                        continue;
                    }
                    info!(capability, %url, count = items.len(), "endpoint answered");
                    return Some(ProbeHit { index, url, items });
                }
                Ok(None) => debug!(capability, %url, "candidate returned an empty body"),
                Err(e) if e.is_not_found() => debug!(capability, %url, "endpoint not present"),
                Err(e) => warn!(capability, %url, error = %e, "endpoint failed"),
            }
        }

        debug!(capability, attempts = table.len(), "no candidate answered");
        None
    }

    /// Try each write candidate in order until one is accepted.
    ///
    /// Unlike listing, running out of candidates is a hard failure. A
    /// rejected session stops the walk: every later candidate would be
    /// rejected the same way.
    pub async fn probe_write(
        &self,
        capability: &str,
        table: &EndpointTable,
        vars: &PathVars<'_>,
        enabled: bool,
    ) -> Result<ProbeHit, Error> {
        for (index, candidate) in table.iter().enumerate() {
            let prepared = candidate
                .url(self, vars)
                .and_then(|url| Ok((url, candidate.write_body(vars, enabled)?)));
            let (url, body) = match prepared {
                Ok(p) => p,
                Err(e) => {
                    warn!(capability, path = %candidate.path, error = %e, "skipping candidate");
                    continue;
                }
            };

            match self
                .send_json(candidate.method.as_method(), url.clone(), Some(&body))
                .await
            {
                Ok(value) => {
                    info!(capability, %url, enabled, "write accepted");
                    let items = value.map(unwrap_payload).unwrap_or_default();
                    return Ok(ProbeHit { index, url, items });
                }
                Err(e) if e.is_auth_expired() => {
                    warn!(capability, %url, error = %e, "session rejected during write");
                    return Err(e);
                }
                Err(e) => warn!(capability, %url, error = %e, "write rejected"),
            }
        }

        Err(Error::ProbeExhausted {
            capability: capability.to_owned(),
            attempts: table.len(),
        })
    }
}
