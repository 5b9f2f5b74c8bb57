use super::types::{InstanceDiff, RegionalPool, ReservationInventory, RunningInventory};

/// Exact-match diff between reservations and running usage.
///
/// Every zone-bound reservation key gets `reserved - running`; running keys with
/// no reservation get `-running`. Regional (`All`) reservations are kept out of
/// the diff and returned as the pool for [`super::allocate_regional`].
pub(crate) fn diff_inventories(
    running: &RunningInventory,
    reserved: &ReservationInventory,
) -> (InstanceDiff, RegionalPool) {
    let mut diff = InstanceDiff::new();
    let mut pool = RegionalPool::new();

    for (key, count) in reserved.iter() {
        if key.dimension.is_regional() {
            *pool.entry(key.instance_type.clone()).or_insert(0) += i64::from(count);
        } else {
            diff.insert(key.clone(), i64::from(count) - i64::from(running.get(key)));
        }
    }

    for (key, count) in running.iter() {
        if !reserved.contains(key) {
            diff.insert(key.clone(), -i64::from(count));
        }
    }

    (diff, pool)
}
