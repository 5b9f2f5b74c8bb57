mod differ;
mod error;
mod expiry;
mod normalized;
mod regional;
mod types;

use std::collections::BTreeMap;
use tracing::debug;

pub(crate) use differ::diff_inventories;
pub(crate) use expiry::{days_until, expiry_from_term};
pub(crate) use normalized::{reconcile_normalized, reserved_normalized_units};
pub(crate) use regional::allocate_regional;
pub(crate) use types::{
    Dimension, ExpiryIndex, InstanceDiff, InstanceIndex, Inventory, NormalizedReconciliation,
    PlacementKey, ReconciliationResult, ReservationInventory, RunningInventory,
};

pub(crate) use error::EngineError;
#[cfg(test)]
pub(crate) use normalized::{split_instance_type, unit_weight};
#[cfg(test)]
pub(crate) use types::RegionalPool;

/// Split a diff into (unused, unreserved) magnitudes; balanced keys go nowhere.
pub(crate) fn partition_diff(
    diff: &InstanceDiff,
) -> (BTreeMap<PlacementKey, u64>, BTreeMap<PlacementKey, u64>) {
    let mut unused = BTreeMap::new();
    let mut unreserved = BTreeMap::new();
    for (key, &balance) in diff {
        if balance > 0 {
            unused.insert(key.clone(), balance.unsigned_abs());
        } else if balance < 0 {
            unreserved.insert(key.clone(), balance.unsigned_abs());
        }
    }
    (unused, unreserved)
}

/// Reconcile one service: exact-match diff, then regional-benefit allocation.
///
/// Only EC2 reservations carry the `All` dimension, so for the other services
/// the regional pool is empty and allocation is a no-op.
pub(crate) fn reconcile(
    running: &RunningInventory,
    reserved: &ReservationInventory,
) -> ReconciliationResult {
    let (mut diff, pool) = diff_inventories(running, reserved);
    debug!("Diffed {} keys, {} regional pools", diff.len(), pool.len());

    allocate_regional(&mut diff, pool);
    let (unused_reservations, unreserved_instances) = partition_diff(&diff);

    ReconciliationResult {
        unused_reservations,
        unreserved_instances,
        running_total: running.total(),
        reserved_total: reserved.total(),
    }
}
