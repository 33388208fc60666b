// Sites
//
// The only controller-level listing this crate needs. Rules and policies are
// addressed by the site's short `name`, which users rarely know; the
// description is what the controller UI shows.

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::LegacySite;

impl LegacyClient {
    /// `GET {prefix}/api/self/sites`: every site the logged-in user can see.
    pub async fn list_sites(&self) -> Result<Vec<LegacySite>, Error> {
        let sites: Vec<LegacySite> = self.get(self.api_url("self/sites")?).await?;
        debug!(count = sites.len(), "listed sites");
        Ok(sites)
    }
}
