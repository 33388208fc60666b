// ── Domain model ──
//
// Canonical types for configured entries, the remote objects they bind to,
// and the accessory records the host persists across restarts.

pub mod accessory;
pub mod entry;
pub mod policy;
pub mod rule;
pub mod site;

pub use accessory::{
    AccessoryCategory, AccessoryContext, AccessoryInformation, AccessoryRecord, Characteristic,
};
pub use entry::{ConfiguredEntry, EntryKind};
pub use policy::{PolicyAction, RemotePolicy};
pub use rule::RemoteRule;
pub use site::Site;

/// Common view over the remote objects a switch can be bound to.
pub trait RemoteObject {
    /// Controller identity (`_id`).
    fn remote_id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn enabled(&self) -> bool;
}
