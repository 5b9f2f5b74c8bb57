use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

pub(crate) const EC2_ACCOUNT_ATTRIBUTES_FILE: &str = "ec2-account-attributes.json";
pub(crate) const EC2_INSTANCES_FILE: &str = "ec2-instances.json";
pub(crate) const EC2_RESERVED_FILE: &str = "ec2-reserved-instances.json";
pub(crate) const RDS_INSTANCES_FILE: &str = "rds-instances.json";
pub(crate) const RDS_RESERVED_FILE: &str = "rds-reserved-instances.json";
pub(crate) const ELC_CLUSTERS_FILE: &str = "elasticache-clusters.json";
pub(crate) const ELC_RESERVED_FILE: &str = "elasticache-reserved-nodes.json";

/// A response document: either one object or the array of pages a paginated call wrote.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Pages<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Pages<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(pages) => pages,
            Self::One(page) => vec![page],
        }
    }
}

// --- EC2 ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DescribeAccountAttributes {
    #[serde(default)]
    pub account_attributes: Vec<AccountAttribute>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AccountAttribute {
    pub attribute_name: String,
    #[serde(default)]
    pub attribute_values: Vec<AttributeValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AttributeValue {
    pub attribute_value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DescribeInstances {
    #[serde(default)]
    pub reservations: Vec<Ec2Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Ec2Reservation {
    #[serde(default)]
    pub instances: Vec<Ec2Instance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Ec2Instance {
    pub instance_id: String,
    pub instance_type: String,
    pub placement: Placement,
    pub state: InstanceState,
    pub spot_instance_request_id: Option<String>,
    pub vpc_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Placement {
    pub availability_zone: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct InstanceState {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Tag {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DescribeReservedInstances {
    #[serde(default)]
    pub reserved_instances: Vec<Ec2ReservedInstance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct Ec2ReservedInstance {
    pub instance_type: String,
    pub availability_zone: Option<String>,
    pub scope: Option<String>,
    pub instance_count: u32,
    pub end: DateTime<Utc>,
    pub state: String,
    #[serde(default)]
    pub product_description: String,
}

// --- RDS ---

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DescribeDbInstances {
    #[serde(rename = "DBInstances", default)]
    pub db_instances: Vec<DbInstance>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DbInstance {
    #[serde(rename = "DBInstanceIdentifier")]
    pub identifier: String,
    #[serde(rename = "DBInstanceClass")]
    pub instance_class: String,
    #[serde(rename = "MultiAZ")]
    pub multi_az: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DescribeReservedDbInstances {
    #[serde(rename = "ReservedDBInstances", default)]
    pub reserved: Vec<ReservedDbInstance>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReservedDbInstance {
    #[serde(rename = "DBInstanceClass")]
    pub instance_class: String,
    #[serde(rename = "MultiAZ")]
    pub multi_az: bool,
    #[serde(rename = "DBInstanceCount")]
    pub count: u32,
    #[serde(rename = "StartTime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "Duration")]
    pub duration: i64,
    #[serde(rename = "State")]
    pub state: String,
}

// --- ElastiCache ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DescribeCacheClusters {
    #[serde(default)]
    pub cache_clusters: Vec<CacheCluster>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CacheCluster {
    pub cache_cluster_id: String,
    pub cache_cluster_status: String,
    pub engine: String,
    pub cache_node_type: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct DescribeReservedCacheNodes {
    #[serde(default)]
    pub reserved_cache_nodes: Vec<ReservedCacheNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ReservedCacheNode {
    pub cache_node_type: String,
    pub product_description: String,
    pub cache_node_count: u32,
    pub start_time: DateTime<Utc>,
    pub duration: i64,
    pub state: String,
}

/// Raw EC2 responses for one account.
#[derive(Debug, Default)]
pub(crate) struct Ec2Snapshot {
    pub account_attributes: Vec<DescribeAccountAttributes>,
    pub instances: Vec<DescribeInstances>,
    pub reserved: Vec<DescribeReservedInstances>,
}

#[derive(Debug, Default)]
pub(crate) struct RdsSnapshot {
    pub instances: Vec<DescribeDbInstances>,
    pub reserved: Vec<DescribeReservedDbInstances>,
}

#[derive(Debug, Default)]
pub(crate) struct ElastiCacheSnapshot {
    pub clusters: Vec<DescribeCacheClusters>,
    pub reserved: Vec<DescribeReservedCacheNodes>,
}

/// Everything collected for one account. Disabled services are `None`.
#[derive(Debug, Default)]
pub(crate) struct AccountSnapshot {
    pub ec2: Ec2Snapshot,
    pub rds: Option<RdsSnapshot>,
    pub elasticache: Option<ElastiCacheSnapshot>,
}

/// Read one response document as a list of pages.
///
/// A missing optional document reads as no pages.
pub(crate) async fn read_pages<T: DeserializeOwned>(path: &Path, required: bool) -> Result<Vec<T>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound && !required => {
            debug!("Optional snapshot {} not present", path.display());
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to read snapshot {}", path.display()));
        }
    };

    let pages: Pages<T> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
    Ok(pages.into_vec())
}

/// Load all response documents of an account, reading files concurrently.
pub(crate) async fn load_account_snapshot(
    dir: &Path,
    rds: bool,
    elasticache: bool,
) -> Result<AccountSnapshot> {
    let attributes_path = dir.join(EC2_ACCOUNT_ATTRIBUTES_FILE);
    let instances_path = dir.join(EC2_INSTANCES_FILE);
    let reserved_path = dir.join(EC2_RESERVED_FILE);
    let rds_instances_path = dir.join(RDS_INSTANCES_FILE);
    let rds_reserved_path = dir.join(RDS_RESERVED_FILE);
    let elc_clusters_path = dir.join(ELC_CLUSTERS_FILE);
    let elc_reserved_path = dir.join(ELC_RESERVED_FILE);

    let ec2 = async {
        let (account_attributes, instances, reserved) = futures::try_join!(
            read_pages(&attributes_path, false),
            read_pages(&instances_path, true),
            read_pages(&reserved_path, true),
        )?;
        Ok::<_, anyhow::Error>(Ec2Snapshot { account_attributes, instances, reserved })
    };

    let rds_snapshot = async {
        if !rds {
            return Ok::<_, anyhow::Error>(None);
        }
        let (instances, reserved) = futures::try_join!(
            read_pages(&rds_instances_path, true),
            read_pages(&rds_reserved_path, true),
        )?;
        Ok::<_, anyhow::Error>(Some(RdsSnapshot { instances, reserved }))
    };

    let elc_snapshot = async {
        if !elasticache {
            return Ok::<_, anyhow::Error>(None);
        }
        let (clusters, reserved) = futures::try_join!(
            read_pages(&elc_clusters_path, true),
            read_pages(&elc_reserved_path, true),
        )?;
        Ok::<_, anyhow::Error>(Some(ElastiCacheSnapshot { clusters, reserved }))
    };

    let (ec2, rds, elasticache) = futures::try_join!(ec2, rds_snapshot, elc_snapshot)?;

    info!(
        "Loaded snapshot from {}: ec2 pages={}, rds={}, elasticache={}",
        dir.display(),
        ec2.instances.len(),
        rds.is_some(),
        elasticache.is_some()
    );

    Ok(AccountSnapshot { ec2, rds, elasticache })
}
