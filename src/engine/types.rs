use std::collections::BTreeMap;
use std::fmt;

/// Where or how a resource runs, as far as reservation matching is concerned.
///
/// Each service only ever produces one zonal variant; `All` is reserved for
/// EC2 regional-benefit reservations that are not bound to a zone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Dimension {
    Zone(String),
    MultiAz(bool),
    Engine(String),
    All,
}

impl Dimension {
    pub(crate) const fn is_regional(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zone(zone) => f.write_str(zone),
            Self::Engine(engine) => f.write_str(engine),
            Self::MultiAz(true) => f.write_str("Multi-AZ"),
            Self::MultiAz(false) => f.write_str("Single-AZ"),
            Self::All => f.write_str("All"),
        }
    }
}

/// Identity under which usage and reservations are matched.
///
/// The derived ordering (instance type first, then dimension) is the iteration
/// order of every map keyed by it, which makes regional allocation reproducible.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct PlacementKey {
    pub instance_type: String,
    pub dimension: Dimension,
}

impl PlacementKey {
    pub(crate) fn new(instance_type: impl Into<String>, dimension: Dimension) -> Self {
        Self { instance_type: instance_type.into(), dimension }
    }

    pub(crate) fn zonal(instance_type: impl Into<String>, zone: impl Into<String>) -> Self {
        Self::new(instance_type, Dimension::Zone(zone.into()))
    }

    pub(crate) fn regional(instance_type: impl Into<String>) -> Self {
        Self::new(instance_type, Dimension::All)
    }
}

impl fmt::Display for PlacementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.instance_type, self.dimension)
    }
}

/// Counts of resources (running or reserved) per placement key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Inventory(BTreeMap<PlacementKey, u32>);

/// Currently running resources per placement key.
pub(crate) type RunningInventory = Inventory;

/// Active reservations per placement key.
pub(crate) type ReservationInventory = Inventory;

impl Inventory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add `count` to the entry for `key`, creating it if needed.
    pub(crate) fn add(&mut self, key: PlacementKey, count: u32) {
        let entry = self.0.entry(key).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Count for `key`; absent keys count as zero.
    pub(crate) fn get(&self, key: &PlacementKey) -> u32 {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub(crate) fn contains(&self, key: &PlacementKey) -> bool {
        self.0.contains_key(key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&PlacementKey, u32)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }

    /// Sum of all counts.
    pub(crate) fn total(&self) -> u64 {
        self.0.values().map(|&v| u64::from(v)).sum()
    }
}

impl FromIterator<(PlacementKey, u32)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (PlacementKey, u32)>>(iter: I) -> Self {
        let mut inventory = Self::new();
        for (key, count) in iter {
            inventory.add(key, count);
        }
        inventory
    }
}

/// `reserved - running` per placement key. Positive is surplus, negative is deficit.
pub(crate) type InstanceDiff = BTreeMap<PlacementKey, i64>;

/// Regional-benefit reservations not yet matched, keyed by instance type.
pub(crate) type RegionalPool = BTreeMap<String, i64>;

/// Normalized capacity units per instance family.
pub(crate) type NormalizedUnits = BTreeMap<String, f64>;

/// Days-to-expiry values per placement key, one per reservation.
pub(crate) type ExpiryIndex = BTreeMap<PlacementKey, Vec<i64>>;

/// Display identifiers (name tag or resource id) of running resources per key.
pub(crate) type InstanceIndex = BTreeMap<PlacementKey, Vec<String>>;

/// Report-ready outcome of reconciling one service's inventories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ReconciliationResult {
    pub unused_reservations: BTreeMap<PlacementKey, u64>,
    pub unreserved_instances: BTreeMap<PlacementKey, u64>,
    pub running_total: u64,
    pub reserved_total: u64,
}

/// Outcome of the normalized-unit view of EC2 coverage.
///
/// `unreserved_units` is keyed by instance family and measured in normalized
/// units. `unused_reservations` is the raw-count side output of the same pass and
/// is adjusted by one per non-surplus key while units are debited, so it does not
/// agree with the exact-match view.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct NormalizedReconciliation {
    pub unused_reservations: BTreeMap<PlacementKey, u64>,
    pub unreserved_units: BTreeMap<String, f64>,
    pub running_total: u64,
    pub reserved_total: u64,
}
