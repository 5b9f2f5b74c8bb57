use super::differ::diff_inventories;
use super::error::EngineError;
use super::types::{
    NormalizedReconciliation, NormalizedUnits, ReservationInventory, RunningInventory,
};
use super::partition_diff;
use std::collections::BTreeMap;
use tracing::debug;

/// Normalized capacity weight per instance size suffix.
pub(crate) const NORMALIZED_UNIT_TABLE: &[(&str, f64)] = &[
    ("nano", 0.25),
    ("micro", 0.5),
    ("small", 1.0),
    ("medium", 2.0),
    ("large", 4.0),
    ("xlarge", 8.0),
    ("2xlarge", 16.0),
    ("4xlarge", 32.0),
    ("8xlarge", 64.0),
    ("9xlarge", 72.0),
    ("16xlarge", 128.0),
    ("18xlarge", 144.0),
];

/// Split an EC2 instance type into `(family, size)`.
pub(crate) fn split_instance_type(instance_type: &str) -> Result<(&str, &str), EngineError> {
    match instance_type.split_once('.') {
        Some((family, size)) if !family.is_empty() && !size.is_empty() && !size.contains('.') => {
            Ok((family, size))
        }
        _ => Err(EngineError::MalformedInstanceType(instance_type.to_string())),
    }
}

/// Normalized weight of one instance of `instance_type`.
pub(crate) fn unit_weight(instance_type: &str) -> Result<f64, EngineError> {
    let (_, size) = split_instance_type(instance_type)?;
    NORMALIZED_UNIT_TABLE.iter().find(|(name, _)| *name == size).map(|(_, w)| *w).ok_or_else(
        || EngineError::UnknownInstanceSize {
            instance_type: instance_type.to_string(),
            size: size.to_string(),
        },
    )
}

/// Normalized units reserved per family by regional-benefit reservations.
pub(crate) fn reserved_normalized_units(
    reserved: &ReservationInventory,
) -> Result<NormalizedUnits, EngineError> {
    let mut units = NormalizedUnits::new();
    for (key, count) in reserved.iter().filter(|(k, _)| k.dimension.is_regional()) {
        let (family, _) = split_instance_type(&key.instance_type)?;
        *units.entry(family.to_string()).or_insert(0.0) +=
            unit_weight(&key.instance_type)? * f64::from(count);
    }
    Ok(units)
}

/// Coverage of EC2 usage measured in normalized units per family.
///
/// Each key whose exact-size balance is not a surplus debits its family's
/// reserved units by `weight(size) * balance`, and its raw balance is then
/// bumped by one. Families left negative are reported as unreserved units.
pub(crate) fn reconcile_normalized(
    running: &RunningInventory,
    reserved: &ReservationInventory,
    reserved_units: &NormalizedUnits,
) -> Result<NormalizedReconciliation, EngineError> {
    let (mut diff, _) = diff_inventories(running, reserved);
    let mut units = reserved_units.clone();

    for (key, balance) in &mut diff {
        let (family, _) = split_instance_type(&key.instance_type)?;
        if *balance <= 0 {
            let debit = unit_weight(&key.instance_type)? * *balance as f64;
            *units.entry(family.to_string()).or_insert(0.0) += debit;
            *balance += 1;
        }
    }

    let unreserved_units: BTreeMap<String, f64> =
        units.into_iter().filter(|(_, v)| *v < 0.0).map(|(family, v)| (family, -v)).collect();

    let (unused_reservations, _) = partition_diff(&diff);

    debug!(
        "Normalized view: {} families short, {} keys with surplus",
        unreserved_units.len(),
        unused_reservations.len()
    );

    Ok(NormalizedReconciliation {
        unused_reservations,
        unreserved_units,
        running_total: running.total(),
        reserved_total: reserved.total(),
    })
}
