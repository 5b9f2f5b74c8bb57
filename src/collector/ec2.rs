use super::snapshot::{DescribeAccountAttributes, Ec2Instance, Ec2ReservedInstance, Ec2Snapshot};
use super::ServiceInventory;
use crate::engine::{days_until, PlacementKey};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Tag that opts a running instance out of reservation checks.
const SKIP_TAG: &str = "NoReservation";

/// EC2-Classic and EC2-VPC are reconciled separately.
#[derive(Debug, Clone, Default)]
pub(crate) struct Ec2Inventory {
    pub classic: ServiceInventory,
    pub vpc: ServiceInventory,
}

/// True when the account only supports VPC, which makes every reservation a VPC one.
fn is_vpc_only(attributes: &[DescribeAccountAttributes]) -> bool {
    attributes
        .iter()
        .flat_map(|page| &page.account_attributes)
        .find(|attr| attr.attribute_name == "supported-platforms")
        .is_some_and(|attr| {
            attr.attribute_values.len() == 1
                && attr.attribute_values.iter().all(|v| v.attribute_value == "VPC")
        })
}

/// Name tag if set, otherwise the instance id. `None` when the instance opts out.
fn display_name(instance: &Ec2Instance) -> Option<String> {
    let mut name = None;
    for tag in &instance.tags {
        if tag.key == SKIP_TAG && tag.value.eq_ignore_ascii_case("true") {
            return None;
        }
        if tag.key == "Name" && !tag.value.is_empty() {
            name = Some(tag.value.clone());
        }
    }
    Some(name.unwrap_or_else(|| instance.instance_id.clone()))
}

/// Zonal when the reservation is scoped to a zone, or carries a zone and no scope at all.
fn reservation_key(ri: &Ec2ReservedInstance) -> Result<PlacementKey> {
    match (ri.scope.as_deref(), ri.availability_zone.as_deref()) {
        (Some("Availability Zone") | None, Some(zone)) => {
            Ok(PlacementKey::zonal(&ri.instance_type, zone))
        }
        (Some("Availability Zone"), None) => {
            bail!("Zonal reservation of {} has no availability zone", ri.instance_type)
        }
        _ => Ok(PlacementKey::regional(&ri.instance_type)),
    }
}

/// Build EC2 inventories from the account's EC2 responses.
///
/// Only running, non-spot instances without the opt-out tag are counted, and
/// only active reservations. Regional reservations are keyed with `All`.
pub(crate) fn collect_ec2(snapshot: &Ec2Snapshot, now: DateTime<Utc>) -> Result<Ec2Inventory> {
    let mut inventory = Ec2Inventory::default();
    let vpc_only = is_vpc_only(&snapshot.account_attributes);

    let instances = snapshot
        .instances
        .iter()
        .flat_map(|page| &page.reservations)
        .flat_map(|reservation| &reservation.instances);

    for instance in instances {
        if instance.state.name != "running" || instance.spot_instance_request_id.is_some() {
            continue;
        }
        let Some(name) = display_name(instance) else {
            debug!("Skipping {} ({} tag)", instance.instance_id, SKIP_TAG);
            continue;
        };

        let key =
            PlacementKey::zonal(&instance.instance_type, &instance.placement.availability_zone);
        let target = if instance.vpc_id.as_deref().is_some_and(|v| !v.is_empty()) {
            &mut inventory.vpc
        } else {
            &mut inventory.classic
        };
        target.record_running(key, name);
    }

    let reservations = snapshot
        .reserved
        .iter()
        .flat_map(|page| &page.reserved_instances)
        .filter(|ri| ri.state == "active");

    for ri in reservations {
        let key = reservation_key(ri)?;
        let days_left = days_until(ri.end, now);
        let target = if vpc_only || ri.product_description.contains("VPC") {
            &mut inventory.vpc
        } else {
            &mut inventory.classic
        };
        target.record_reservation(key, ri.instance_count, days_left);
    }

    info!(
        "EC2: {} classic / {} vpc running, {} classic / {} vpc reserved",
        inventory.classic.running.total(),
        inventory.vpc.running.total(),
        inventory.classic.reserved.total(),
        inventory.vpc.reserved.total(),
    );

    Ok(inventory)
}
