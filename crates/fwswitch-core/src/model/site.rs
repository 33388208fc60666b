use serde::{Deserialize, Serialize};

/// A configuration partition on the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    /// Internal short name (`default`, `x7k2p9`); used in URLs.
    pub name: String,
    /// Human-readable description shown in the controller UI.
    pub description: Option<String>,
}

impl From<fwswitch_api::LegacySite> for Site {
    fn from(site: fwswitch_api::LegacySite) -> Self {
        Self {
            id: site.id,
            name: site.name,
            description: site.desc,
        }
    }
}
