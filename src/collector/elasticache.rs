use super::snapshot::ElastiCacheSnapshot;
use super::ServiceInventory;
use crate::engine::{days_until, expiry_from_term, Dimension, PlacementKey};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

/// Build ElastiCache inventories, keyed by node type and cache engine.
pub(crate) fn collect_elasticache(
    snapshot: &ElastiCacheSnapshot,
    now: DateTime<Utc>,
) -> Result<ServiceInventory> {
    let mut inventory = ServiceInventory::default();

    let clusters = snapshot
        .clusters
        .iter()
        .flat_map(|page| &page.cache_clusters)
        .filter(|c| c.cache_cluster_status == "available");
    for cluster in clusters {
        let key =
            PlacementKey::new(&cluster.cache_node_type, Dimension::Engine(cluster.engine.clone()));
        inventory.record_running(key, cluster.cache_cluster_id.clone());
    }

    let reservations = snapshot
        .reserved
        .iter()
        .flat_map(|page| &page.reserved_cache_nodes)
        .filter(|ri| ri.state == "active");
    for ri in reservations {
        // The reservation's product description is the engine name.
        let key = PlacementKey::new(
            &ri.cache_node_type,
            Dimension::Engine(ri.product_description.clone()),
        );
        let expiry = expiry_from_term(ri.start_time, ri.duration).with_context(|| {
            format!(
                "Reservation of {} has an out-of-range term of {}s",
                ri.cache_node_type, ri.duration
            )
        })?;
        inventory.record_reservation(key, ri.cache_node_count, days_until(expiry, now));
    }

    info!(
        "ElastiCache: {} running, {} reserved",
        inventory.running.total(),
        inventory.reserved.total()
    );
    Ok(inventory)
}
