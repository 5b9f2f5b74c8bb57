use crate::collector::ServiceInventory;
use crate::engine::{NormalizedReconciliation, PlacementKey, ReconciliationResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// The report sections, in the order they appear for every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) enum ServiceKind {
    #[serde(rename = "EC2 Classic")]
    Ec2Classic,
    #[serde(rename = "EC2 VPC")]
    Ec2Vpc,
    #[serde(rename = "EC2 Normalized")]
    Ec2Normalized,
    #[serde(rename = "ElastiCache")]
    ElastiCache,
    #[serde(rename = "RDS")]
    Rds,
}

impl ServiceKind {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Ec2Classic => "EC2 Classic",
            Self::Ec2Vpc => "EC2 VPC",
            Self::Ec2Normalized => "EC2 Normalized",
            Self::ElastiCache => "ElastiCache",
            Self::Rds => "RDS",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct UnusedLine {
    pub instance_type: String,
    pub dimension: String,
    pub count: u64,
    pub expires_in_days: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct UnreservedLine {
    pub instance_type: String,
    pub dimension: String,
    pub count: u64,
    pub instances: Vec<String>,
}

/// Family-level shortfall in normalized units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct UnitShortfall {
    pub family: String,
    pub units: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ServiceReport {
    pub service: ServiceKind,
    pub unused: Vec<UnusedLine>,
    pub unreserved: Vec<UnreservedLine>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unreserved_units: Vec<UnitShortfall>,
    pub running_total: u64,
    pub reserved_total: u64,
    /// Set when the section could not be computed; the lists are then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct AccountReport {
    pub account: String,
    pub region: String,
    pub services: Vec<ServiceReport>,
}

fn unused_lines(
    unused: &BTreeMap<PlacementKey, u64>,
    inventory: &ServiceInventory,
) -> Vec<UnusedLine> {
    unused
        .iter()
        .map(|(key, &count)| UnusedLine {
            instance_type: key.instance_type.clone(),
            dimension: key.dimension.to_string(),
            count,
            expires_in_days: inventory.expiry.get(key).cloned().unwrap_or_default(),
        })
        .collect()
}

impl ServiceReport {
    /// Section for an exact-match (plus regional benefit) reconciliation.
    pub(crate) fn exact(
        service: ServiceKind,
        result: &ReconciliationResult,
        inventory: &ServiceInventory,
    ) -> Self {
        let unreserved = result
            .unreserved_instances
            .iter()
            .map(|(key, &count)| UnreservedLine {
                instance_type: key.instance_type.clone(),
                dimension: key.dimension.to_string(),
                count,
                instances: inventory.instance_ids.get(key).cloned().unwrap_or_default(),
            })
            .collect();

        Self {
            service,
            unused: unused_lines(&result.unused_reservations, inventory),
            unreserved,
            unreserved_units: Vec::new(),
            running_total: result.running_total,
            reserved_total: result.reserved_total,
            error: None,
        }
    }

    /// Section for the normalized-unit view; shortfalls are per family.
    pub(crate) fn normalized(
        result: &NormalizedReconciliation,
        inventory: &ServiceInventory,
    ) -> Self {
        let unreserved_units = result
            .unreserved_units
            .iter()
            .map(|(family, &units)| UnitShortfall { family: family.clone(), units })
            .collect();

        Self {
            service: ServiceKind::Ec2Normalized,
            unused: unused_lines(&result.unused_reservations, inventory),
            unreserved: Vec::new(),
            unreserved_units,
            running_total: result.running_total,
            reserved_total: result.reserved_total,
            error: None,
        }
    }

    /// Section that could not be computed, carrying the reason.
    pub(crate) fn failed(service: ServiceKind, error: impl ToString) -> Self {
        Self {
            service,
            unused: Vec::new(),
            unreserved: Vec::new(),
            unreserved_units: Vec::new(),
            running_total: 0,
            reserved_total: 0,
            error: Some(error.to_string()),
        }
    }

    pub(crate) fn has_unreserved(&self) -> bool {
        !self.unreserved.is_empty() || !self.unreserved_units.is_empty()
    }
}
