#![allow(clippy::unwrap_used)]
// Session lifecycle against a wiremock controller.

mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fwswitch_core::{ControllerSession, CoreError};

async fn slow_login(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_login() {
    let server = MockServer::start().await;
    slow_login(&server, 1).await;

    let session = ControllerSession::new(common::session_config(&server));
    let (a, b, c) = tokio::join!(
        session.ensure_logged_in(),
        session.ensure_logged_in(),
        session.ensure_logged_in()
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert_eq!(session.login_count(), 1);
}

#[tokio::test]
async fn invalidate_forces_a_new_login() {
    let server = MockServer::start().await;
    slow_login(&server, 2).await;

    let session = ControllerSession::new(common::session_config(&server));
    session.ensure_logged_in().await.unwrap();
    session.ensure_logged_in().await.unwrap();
    session.invalidate().await;
    session.ensure_logged_in().await.unwrap();

    assert_eq!(session.login_count(), 2);
}

#[tokio::test]
async fn rejected_credentials_surface_as_authentication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400).set_body_string("api.err.Invalid"))
        .mount(&server)
        .await;

    let session = ControllerSession::new(common::session_config(&server));
    let err = session.ensure_logged_in().await.unwrap_err();

    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert!(err.is_session_fatal());
    assert_eq!(session.login_count(), 0);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let server = common::controller().await;
    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let session = ControllerSession::new(common::session_config(&server));
    session.ensure_logged_in().await.unwrap();
    session.logout().await;
    // Already logged out: no second request.
    session.logout().await;
}

#[tokio::test]
async fn platform_is_detected_when_not_configured() {
    let server = common::controller().await;
    let mut config = common::session_config(&server);
    config.platform = None;

    // No UniFi OS login endpoint on the mock, so this is a classic controller
    // and site listing goes to the unprefixed path.
    let session = ControllerSession::new(config);
    let client = session.client().await.unwrap();
    assert_eq!(client.platform(), fwswitch_core::ControllerPlatform::Classic);
    assert_eq!(client.list_sites().await.unwrap().len(), 2);
}
