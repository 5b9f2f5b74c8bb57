use super::types::{InstanceDiff, PlacementKey, RegionalPool};
use tracing::debug;

/// Offset zonal deficits with regional-benefit reservations of the same type.
///
/// Pools are drained in instance-type order and, within a type, deficits are
/// filled in key order until either the deficit or the pool runs out. Whatever is
/// left of each pool is recorded under `(type, All)`, including zero.
pub(crate) fn allocate_regional(diff: &mut InstanceDiff, pool: RegionalPool) {
    for (instance_type, mut remaining) in pool {
        for (key, balance) in diff.iter_mut() {
            if remaining == 0 {
                break;
            }
            if key.instance_type != instance_type || key.dimension.is_regional() || *balance >= 0 {
                continue;
            }

            let covered = remaining.min(-*balance);
            *balance += covered;
            remaining -= covered;
            debug!("Regional {} reservations cover {} of {}", instance_type, covered, key);
        }

        diff.insert(PlacementKey::regional(instance_type), remaining);
    }
}
