// fwswitch-api: Async transport for UniFi firewall rules and zone-based policies

pub mod auth;
pub mod error;
pub mod legacy;
pub mod probe;
pub mod transport;

pub use auth::ControllerPlatform;
pub use error::Error;
pub use legacy::LegacyClient;
pub use legacy::models::{FirewallPolicyEntry, LegacyFirewallRule, LegacySite, RuleIndex};
pub use probe::{ApiShape, EndpointCandidate, EndpointTable, PathVars, ProbeHit, ProbeMethod, WriteBody};
pub use transport::{TlsMode, TransportConfig};
