use super::snapshot::RdsSnapshot;
use super::ServiceInventory;
use crate::engine::{days_until, expiry_from_term, Dimension, PlacementKey};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

/// Build RDS inventories, keyed by instance class and Multi-AZ setting.
///
/// Every listed DB instance counts as running; only active reservations count.
pub(crate) fn collect_rds(snapshot: &RdsSnapshot, now: DateTime<Utc>) -> Result<ServiceInventory> {
    let mut inventory = ServiceInventory::default();

    for db in snapshot.instances.iter().flat_map(|page| &page.db_instances) {
        let key = PlacementKey::new(&db.instance_class, Dimension::MultiAz(db.multi_az));
        inventory.record_running(key, db.identifier.clone());
    }

    let reservations =
        snapshot.reserved.iter().flat_map(|page| &page.reserved).filter(|ri| ri.state == "active");
    for ri in reservations {
        let key = PlacementKey::new(&ri.instance_class, Dimension::MultiAz(ri.multi_az));
        let expiry = expiry_from_term(ri.start_time, ri.duration).with_context(|| {
            format!(
                "Reservation of {} has an out-of-range term of {}s",
                ri.instance_class, ri.duration
            )
        })?;
        inventory.record_reservation(key, ri.count, days_until(expiry, now));
    }

    info!(
        "RDS: {} running, {} reserved",
        inventory.running.total(),
        inventory.reserved.total()
    );
    Ok(inventory)
}
