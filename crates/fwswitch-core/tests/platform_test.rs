#![allow(clippy::unwrap_used)]
// End-to-end reconciliation against a wiremock controller and an in-memory host.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fwswitch_core::{
    AccessoryCategory, AccessoryContext, AccessoryInformation, AccessoryRecord, ApiShape,
    ConfiguredEntry, CoreError, EndpointCandidate, EndpointTable, EntryKind, FirewallPlatform,
    LiveSwitch, MemoryHost, ReconcileOutcome, WriteBody, accessory_uuid,
};

fn cached_rule_record(id: &str, name: &str) -> AccessoryRecord {
    let entry = ConfiguredEntry::by_id(id).with_name(name);
    AccessoryRecord {
        uuid: accessory_uuid(id),
        display_name: name.into(),
        category: AccessoryCategory::Switch,
        information: AccessoryInformation::for_entry(EntryKind::Rule, &entry),
        context: AccessoryContext {
            kind: EntryKind::Rule,
            entry,
        },
    }
}

async fn guest_rule_controller(enabled: bool) -> MockServer {
    let server = common::controller().await;
    common::mount_rules(
        &server,
        json!([
            { "_id": "42", "name": "Guest", "enabled": enabled, "rule_index": 2000 },
            { "_id": "43", "name": "IoT", "enabled": false, "rule_index": 2001 }
        ]),
    )
    .await;
    server
}

fn only_switch(platform: &FirewallPlatform) -> LiveSwitch {
    let switches = platform.switches();
    assert_eq!(switches.len(), 1);
    switches.into_iter().next().unwrap()
}

// ── Rules ───────────────────────────────────────────────────────────

#[tokio::test]
async fn rule_switch_reflects_remote_state() {
    let server = guest_rule_controller(true).await;
    let mut config = common::platform_config(&server);
    config.rules = vec![ConfiguredEntry::by_id("42").with_name("Guest")];
    let host = Arc::new(MemoryHost::new());
    let platform = FirewallPlatform::new(config, host.clone());

    let report = platform.discover_devices().await.unwrap();
    assert_eq!(report.count(ReconcileOutcome::Registered), 1);

    let switch = only_switch(&platform);
    assert_eq!(switch.uuid(), accessory_uuid("42"));
    assert!(switch.get());
    assert!(switch.refresh().await.unwrap());
    assert_eq!(host.last_value(switch.uuid()), Some(true));

    let registered = host.registered();
    assert_eq!(registered[0].display_name, "Guest");
    assert_eq!(registered[0].information.model, "Firewall-Rule");
    assert_eq!(registered[0].information.manufacturer, "Ubiquiti");
    assert_eq!(registered[0].information.serial_number, "42");
}

#[tokio::test]
async fn inverted_rule_switch_flips_both_ways() {
    let server = guest_rule_controller(true).await;
    Mock::given(method("PUT"))
        .and(path("/api/s/default/rest/firewallrule/42"))
        .and(body_partial_json(json!({ "_id": "42", "enabled": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::envelope(json!([
            { "_id": "42", "name": "Guest", "enabled": false }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = common::platform_config(&server);
    config.rules = vec![ConfiguredEntry::by_id("42").with_name("Guest").inverted(true)];
    let platform = FirewallPlatform::new(config, Arc::new(MemoryHost::new()));
    platform.discover_devices().await.unwrap();

    let switch = only_switch(&platform);
    assert!(!switch.get());

    switch.set(true).await.unwrap();
    assert!(switch.value());
}

#[tokio::test]
async fn rule_switch_stores_the_saved_value() {
    let server = guest_rule_controller(true).await;
    Mock::given(method("PUT"))
        .and(path("/api/s/default/rest/firewallrule/42"))
        .and(body_partial_json(json!({ "_id": "42", "enabled": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::envelope(json!([
            { "_id": "42", "name": "Guest", "enabled": true }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = common::platform_config(&server);
    config.rules = vec![ConfiguredEntry::by_id("42").with_name("Guest")];
    let host = Arc::new(MemoryHost::new());
    let platform = FirewallPlatform::new(config, host.clone());
    platform.discover_devices().await.unwrap();

    let switch = only_switch(&platform);
    switch.set(false).await.unwrap();
    // The controller kept the rule enabled.
    assert!(switch.value());
    assert_eq!(host.last_value(switch.uuid()), Some(true));
}

// ── Policies ────────────────────────────────────────────────────────

#[tokio::test]
async fn policy_resolved_by_name_through_second_listing_candidate() {
    let server = common::controller().await;
    Mock::given(method("GET"))
        .and(path("/v2/api/site/default/firewall-policies"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/rest/firewallpolicy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "p1", "name": "Block IoT", "enabled": false }
        ])))
        .mount(&server)
        .await;

    let mut config = common::platform_config(&server);
    config.policies = vec![ConfiguredEntry::by_name("Block IoT")];
    config.endpoints.list = EndpointTable::new(vec![
        EndpointCandidate::get(ApiShape::V2, "firewall-policies"),
        EndpointCandidate::get(ApiShape::Legacy, "rest/firewallpolicy"),
    ]);
    let host = Arc::new(MemoryHost::new());
    let platform = FirewallPlatform::new(config, host.clone());

    let report = platform.discover_devices().await.unwrap();
    assert_eq!(report.entries[0].remote_id, "p1");

    let switch = only_switch(&platform);
    assert_eq!(switch.uuid(), accessory_uuid("unifi9-policy-p1"));
    assert!(!switch.get());
    assert_eq!(host.registered()[0].information.model, "UniFi-9-Policy");
}

#[tokio::test]
async fn failed_policy_write_snaps_back() {
    let server = common::controller().await;
    Mock::given(method("GET"))
        .and(path("/v2/api/site/default/firewall-policies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "p1", "name": "Block IoT", "enabled": false }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2/api/site/default/firewall-policies/batch"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = common::platform_config(&server);
    config.policies = vec![ConfiguredEntry::by_id("p1")];
    config.endpoints.write = EndpointTable::new(vec![EndpointCandidate::put(
        ApiShape::V2,
        "firewall-policies/batch",
        WriteBody::Batch,
    )]);
    let platform = FirewallPlatform::new(config, Arc::new(MemoryHost::new()));
    platform.discover_devices().await.unwrap();

    let LiveSwitch::Policy(switch) = only_switch(&platform) else {
        panic!("expected a policy switch");
    };
    let err = switch.set(true).await.unwrap_err();

    assert!(matches!(err, CoreError::RemoteWriteFailed { .. }));
    assert!(!switch.value());
    assert!(!switch.remote().await.enabled);
}

#[tokio::test]
async fn confirmed_policy_write_is_read_back_from_cache() {
    let server = common::controller().await;
    Mock::given(method("GET"))
        .and(path("/v2/api/site/default/firewall-policies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "p1", "name": "Block IoT", "enabled": false }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v2/api/site/default/firewall-policies/batch"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut config = common::platform_config(&server);
    config.policies = vec![ConfiguredEntry::by_id("p1").inverted(true)];
    let platform = FirewallPlatform::new(config, Arc::new(MemoryHost::new()));
    platform.discover_devices().await.unwrap();

    let switch = only_switch(&platform);
    assert!(switch.value());
    switch.set(false).await.unwrap();
    // The listing still says disabled; right after the write the cache wins.
    assert!(!switch.refresh().await.unwrap());
}

#[tokio::test]
async fn policy_refresh_follows_controller_changes() {
    let server = common::controller().await;
    Mock::given(method("GET"))
        .and(path("/v2/api/site/default/firewall-policies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "p1", "name": "Block IoT", "enabled": false }
        ])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/api/site/default/firewall-policies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "p1", "name": "Block IoT", "enabled": true }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = common::platform_config(&server);
    config.policies = vec![ConfiguredEntry::by_id("p1")];
    let host = Arc::new(MemoryHost::new());
    let platform = FirewallPlatform::new(config, host.clone());
    platform.discover_devices().await.unwrap();

    let switch = only_switch(&platform);
    assert!(!switch.value());
    assert!(switch.refresh().await.unwrap());
    assert!(switch.value());
    assert_eq!(host.last_value(switch.uuid()), Some(true));
}

#[tokio::test]
async fn policy_missing_from_listing_keeps_cached_flag() {
    let server = common::controller().await;
    Mock::given(method("GET"))
        .and(path("/v2/api/site/default/firewall-policies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "p1", "name": "Block IoT", "enabled": true }
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/api/site/default/firewall-policies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "p2", "name": "Allow Cameras", "enabled": false }
        ])))
        .mount(&server)
        .await;

    let mut config = common::platform_config(&server);
    config.policies = vec![ConfiguredEntry::by_id("p1")];
    let platform = FirewallPlatform::new(config, Arc::new(MemoryHost::new()));
    platform.discover_devices().await.unwrap();

    let switch = only_switch(&platform);
    assert!(switch.refresh().await.unwrap());
    assert!(switch.value());
}

// ── Reconciliation ──────────────────────────────────────────────────

#[tokio::test]
async fn restart_restores_cached_and_registers_new_once() {
    let server = guest_rule_controller(true).await;
    let cached = cached_rule_record("42", "Guest");

    let mut config = common::platform_config(&server);
    config.rules = vec![
        ConfiguredEntry::by_id("42").with_name("Guest"),
        ConfiguredEntry::by_id("43").with_name("IoT"),
    ];
    let host = Arc::new(MemoryHost::with_cached(std::slice::from_ref(&cached)));
    let platform = FirewallPlatform::new(config, host.clone());
    platform.configure_accessory(cached);

    let report = platform.discover_devices().await.unwrap();
    assert_eq!(report.count(ReconcileOutcome::Restored), 1);
    assert_eq!(report.count(ReconcileOutcome::Registered), 1);
    assert_eq!(host.register_calls(), 1);
    assert_eq!(host.registered()[0].uuid, accessory_uuid("43"));

    // A second pass binds the same accessories without registering again.
    let again = platform.discover_devices().await.unwrap();
    assert_eq!(again.count(ReconcileOutcome::Restored), 2);
    assert_eq!(host.register_calls(), 1);
    assert_eq!(platform.switches().len(), 2);
}

#[tokio::test]
async fn restored_record_picks_up_current_entry() {
    let server = guest_rule_controller(true).await;
    let cached = cached_rule_record("42", "Guest");

    let mut config = common::platform_config(&server);
    config.rules = vec![ConfiguredEntry::by_id("42").with_name("Guest").inverted(true)];
    let host = Arc::new(MemoryHost::with_cached(std::slice::from_ref(&cached)));
    let platform = FirewallPlatform::new(config, host);
    platform.configure_accessory(cached);
    platform.discover_devices().await.unwrap();

    let record = platform.record(accessory_uuid("42")).unwrap();
    assert!(record.context.entry.inverted);
    assert!(!platform.switch(accessory_uuid("42")).unwrap().get());
}

#[tokio::test]
async fn unresolvable_entries_are_skipped() {
    let server = guest_rule_controller(true).await;
    let mut config = common::platform_config(&server);
    config.rules = vec![
        ConfiguredEntry::by_id("99").with_name("Missing"),
        ConfiguredEntry::by_id("42"),
    ];
    config.policies = vec![ConfiguredEntry::by_name("Nowhere")];
    let host = Arc::new(MemoryHost::new());
    let platform = FirewallPlatform::new(config, host.clone());

    let report = platform.discover_devices().await.unwrap();
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].entry, "99");
    assert_eq!(report.skipped[1].kind, EntryKind::Policy);
    assert_eq!(host.register_calls(), 1);
}

#[tokio::test]
async fn entries_sharing_an_accessory_bind_once() {
    let server = guest_rule_controller(true).await;
    let mut config = common::platform_config(&server);
    config.rules = vec![
        ConfiguredEntry::by_id("42"),
        ConfiguredEntry::by_id("42").with_name("Guest again"),
    ];
    let host = Arc::new(MemoryHost::new());
    let platform = FirewallPlatform::new(config, host.clone());

    let report = platform.discover_devices().await.unwrap();
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(host.register_calls(), 1);
}

#[tokio::test]
async fn host_registration_failure_propagates() {
    let server = guest_rule_controller(true).await;
    let mut config = common::platform_config(&server);
    config.rules = vec![ConfiguredEntry::by_id("42")];
    // The host knows the UUID but never handed the record back.
    let host = Arc::new(MemoryHost::with_cached(&[cached_rule_record("42", "Guest")]));
    let platform = FirewallPlatform::new(config, host);

    let err = platform.discover_devices().await.unwrap_err();
    assert!(matches!(err, CoreError::Registration { .. }));
}

// ── Session failures ────────────────────────────────────────────────

#[tokio::test]
async fn login_failure_aborts_discovery() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/self/sites"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = common::platform_config(&server);
    config.rules = vec![ConfiguredEntry::by_id("42")];
    let host = Arc::new(MemoryHost::new());
    let platform = FirewallPlatform::new(config, host.clone());

    let err = platform.discover_devices().await.unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert_eq!(host.register_calls(), 0);
}

#[tokio::test]
async fn unknown_site_aborts_discovery() {
    let server = guest_rule_controller(true).await;
    let mut config = common::platform_config(&server);
    config.site = "office".into();
    config.rules = vec![ConfiguredEntry::by_id("42")];
    let platform = FirewallPlatform::new(config, Arc::new(MemoryHost::new()));

    let err = platform.discover_devices().await.unwrap_err();
    assert!(matches!(err, CoreError::SiteNotFound { .. }));
    assert!(platform.switches().is_empty());
}
