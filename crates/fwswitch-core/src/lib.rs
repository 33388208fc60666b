//! Firewall rules and zone-based policies as home-automation switches.
//!
//! This crate owns the domain logic between `fwswitch-api` and a host:
//!
//! - **[`ControllerSession`]**: one shared, lazily authenticated session per
//!   controller. Login is serialised so concurrent callers never race.
//!
//! - **[`resolver`]**: fetches rules and policies for a site and matches
//!   [`ConfiguredEntry`] values against them. Policy listing goes through the
//!   endpoint prober in `fwswitch-api`.
//!
//! - **[`toggle`]**: enable/disable writes, with local state updated only on
//!   confirmed success.
//!
//! - **[`FirewallPlatform`]**: the accessory reconciler. Maps each configured
//!   entry to exactly one host accessory across restarts and binds a
//!   [`FirewallSwitch`] to it. Generic over [`SwitchTarget`], implemented for
//!   legacy rules ([`RuleTarget`]) and policies ([`PolicyTarget`]).
//!
//! - **[`AccessoryHost`]**: the boundary to the home-automation host.
//!   [`MemoryHost`] implements it in-process.

pub mod config;
pub mod discovery;
pub mod error;
pub mod host;
pub mod identity;
pub mod model;
pub mod platform;
pub mod resolver;
pub mod session;
pub mod switch;
pub mod target;
pub mod toggle;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{PlatformConfig, PolicyEndpoints, SessionConfig, TlsVerification};
pub use discovery::{DiscoveredPolicy, DiscoveredRule, DiscoveryResult, discover_rules_and_policies};
pub use error::CoreError;
pub use host::{AccessoryHost, CharacteristicUpdate, HostError, MemoryHost};
pub use identity::{accessory_key, accessory_uuid};
pub use platform::{
    DiscoveryReport, FirewallPlatform, LiveSwitch, PLATFORM_NAME, PLUGIN_NAME, ReconcileOutcome,
    ReconciledEntry, SkippedEntry,
};
pub use session::ControllerSession;
pub use switch::FirewallSwitch;
pub use target::{POLICY_WRITE_SETTLE, PolicyTarget, RuleTarget, SwitchTarget};

pub use model::{
    AccessoryCategory, AccessoryContext, AccessoryInformation, AccessoryRecord, Characteristic,
    ConfiguredEntry, EntryKind, PolicyAction, RemoteObject, RemotePolicy, RemoteRule, Site,
};

// Endpoint tables are part of the configuration surface.
pub use fwswitch_api::{ApiShape, ControllerPlatform, EndpointCandidate, EndpointTable, WriteBody};
