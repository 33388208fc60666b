// Controller client modules
//
// Hand-written client for the UniFi controller's session-authenticated
// endpoints: login/logout, site listing, legacy firewall rules, and the
// shape-agnostic requests used by the endpoint prober.

pub mod auth;
pub mod client;
pub mod firewall;
pub mod models;
pub mod sites;

pub use client::LegacyClient;
