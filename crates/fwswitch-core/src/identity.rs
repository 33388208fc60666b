// ── Accessory identity ──
//
// Accessory UUIDs are name-based (v5) over a stable key, so the same
// configured entry always lands on the same cached record after a restart.

use uuid::Uuid;

use crate::model::{ConfiguredEntry, EntryKind};

/// Namespace for every accessory UUID this crate derives.
pub const ACCESSORY_NAMESPACE: Uuid = Uuid::from_u128(0x6c1f_3b0e_9a4d_5e27_b8f2_41d7_0c95_a3e6);

/// Prefix that keeps policy keys apart from legacy rule ids.
pub const POLICY_KEY_PREFIX: &str = "unifi9-policy-";

/// Stable key for an entry bound to the remote object `remote_id`.
///
/// The configured id wins over the remote id, so an entry configured by id
/// keeps its accessory even if the controller re-keys the object.
pub fn accessory_key(kind: EntryKind, entry: &ConfiguredEntry, remote_id: &str) -> String {
    let id = entry.id().unwrap_or(remote_id);
    match kind {
        EntryKind::Rule => id.to_owned(),
        EntryKind::Policy => format!("{POLICY_KEY_PREFIX}{id}"),
    }
}

pub fn accessory_uuid(key: &str) -> Uuid {
    Uuid::new_v5(&ACCESSORY_NAMESPACE, key.as_bytes())
}
