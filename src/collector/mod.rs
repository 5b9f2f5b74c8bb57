mod ec2;
mod elasticache;
mod rds;
pub(crate) mod snapshot;

use crate::engine::{ExpiryIndex, InstanceIndex, Inventory, PlacementKey};

pub(crate) use ec2::collect_ec2;
pub(crate) use elasticache::collect_elasticache;
pub(crate) use rds::collect_rds;
pub(crate) use snapshot::{load_account_snapshot, AccountSnapshot};

/// Inventories and side indexes for one service of one account.
#[derive(Debug, Clone, Default)]
pub(crate) struct ServiceInventory {
    pub running: Inventory,
    pub reserved: Inventory,
    /// Display identifiers of running resources, reported next to unreserved keys.
    pub instance_ids: InstanceIndex,
    /// Days to expiry of each reservation, reported next to unused keys.
    pub expiry: ExpiryIndex,
}

impl ServiceInventory {
    pub(crate) fn record_running(&mut self, key: PlacementKey, identifier: String) {
        self.instance_ids.entry(key.clone()).or_default().push(identifier);
        self.running.add(key, 1);
    }

    pub(crate) fn record_reservation(&mut self, key: PlacementKey, count: u32, days_left: i64) {
        self.expiry.entry(key.clone()).or_default().push(days_left);
        self.reserved.add(key, count);
    }
}
