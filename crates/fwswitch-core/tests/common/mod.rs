// Shared mock-controller fixtures for the core integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use fwswitch_core::{ControllerPlatform, PlatformConfig, SessionConfig};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const RULES_PATH: &str = "/api/s/default/rest/firewallrule";

/// Session config for a classic controller at the mock server.
pub fn session_config(server: &MockServer) -> SessionConfig {
    let mut session = SessionConfig::new(
        server.uri().parse().unwrap(),
        "homebridge",
        "secret".to_string().into(),
    );
    session.platform = Some(ControllerPlatform::Classic);
    session
}

pub fn platform_config(server: &MockServer) -> PlatformConfig {
    PlatformConfig::new(session_config(server))
}

pub fn envelope(data: Value) -> Value {
    json!({ "meta": { "rc": "ok" }, "data": data })
}

pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

pub async fn mount_sites(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/self/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "_id": "s1", "name": "default", "desc": "Default" },
            { "_id": "s2", "name": "x7k2p9", "desc": "Lab" }
        ]))))
        .mount(server)
        .await;
}

pub async fn mount_rules(server: &MockServer, rules: Value) {
    Mock::given(method("GET"))
        .and(path(RULES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(rules)))
        .mount(server)
        .await;
}

/// A controller that accepts login and serves the two standard sites.
pub async fn controller() -> MockServer {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_sites(&server).await;
    server
}
