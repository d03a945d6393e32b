//! Check command.

use super::Error;
use crate::providers::cloudflare::{Updater, Zone};

use tracing::info;

/// Verifies that the credentials used by `updater` can manage the DNS
/// records of the zone named `zone`.
pub async fn execute(updater: &Updater, zone: &str) -> Result<Zone, Error> {
    let zone = updater.check_zone_access(zone).await?;
    info!(zone = %zone.name, id = %zone.id, status = %zone.status, "credentials can manage the zone DNS records");

    Ok(zone)
}
