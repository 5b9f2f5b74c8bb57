use crate::collector::snapshot::{
    read_pages, DescribeInstances, ElastiCacheSnapshot, Ec2Snapshot, RdsSnapshot,
    EC2_INSTANCES_FILE, EC2_RESERVED_FILE, RDS_INSTANCES_FILE,
};
use crate::collector::{collect_ec2, collect_elasticache, collect_rds, load_account_snapshot};
use crate::engine::{reserved_normalized_units, Dimension, PlacementKey};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::fs;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 11, 1, 0, 0, 0).unwrap()
}

fn ec2_snapshot(vpc_only: bool) -> Ec2Snapshot {
    let platforms = if vpc_only {
        json!([{"AttributeValue": "VPC"}])
    } else {
        json!([{"AttributeValue": "EC2"}, {"AttributeValue": "VPC"}])
    };
    let attributes = json!({
        "AccountAttributes": [{
            "AttributeName": "supported-platforms",
            "AttributeValues": platforms
        }]
    });
    let instances = json!({
        "Reservations": [{
            "Instances": [
                {
                    "InstanceId": "i-456sdf4g",
                    "InstanceType": "m4.large",
                    "Placement": {"AvailabilityZone": "us-east-1b"},
                    "State": {"Name": "running"},
                    "VpcId": "vpc-1",
                    "Tags": [{"Key": "Name", "Value": "web-1"}]
                },
                {
                    "InstanceId": "i-sdf3f4d6",
                    "InstanceType": "m4.large",
                    "Placement": {"AvailabilityZone": "us-east-1b"},
                    "State": {"Name": "running"},
                    "VpcId": "vpc-1"
                },
                {
                    "InstanceId": "i-dfgeqa53",
                    "InstanceType": "t1.micro",
                    "Placement": {"AvailabilityZone": "us-east-1c"},
                    "State": {"Name": "stopped"}
                },
                {
                    "InstanceId": "i-spot0001",
                    "InstanceType": "m4.large",
                    "Placement": {"AvailabilityZone": "us-east-1b"},
                    "State": {"Name": "running"},
                    "SpotInstanceRequestId": "sir-1",
                    "VpcId": "vpc-1"
                },
                {
                    "InstanceId": "i-skip0001",
                    "InstanceType": "m4.large",
                    "Placement": {"AvailabilityZone": "us-east-1b"},
                    "State": {"Name": "running"},
                    "VpcId": "vpc-1",
                    "Tags": [
                        {"Key": "Name", "Value": "batch"},
                        {"Key": "NoReservation", "Value": "TRUE"}
                    ]
                },
                {
                    "InstanceId": "i-classic01",
                    "InstanceType": "c4.large",
                    "Placement": {"AvailabilityZone": "us-east-1a"},
                    "State": {"Name": "running"}
                }
            ]
        }]
    });
    let reserved = json!({
        "ReservedInstances": [
            {
                "InstanceType": "c4.xlarge",
                "AvailabilityZone": "us-east-1b",
                "Scope": "Availability Zone",
                "InstanceCount": 1,
                "End": "2016-11-22T18:32:12.000Z",
                "State": "active",
                "ProductDescription": "Linux/UNIX (Amazon VPC)"
            },
            {
                "InstanceType": "m4.large",
                "AvailabilityZone": "us-east-1c",
                "Scope": "Availability Zone",
                "InstanceCount": 1,
                "End": "2015-11-22T18:32:12.000Z",
                "State": "retired",
                "ProductDescription": "Linux/UNIX (Amazon VPC)"
            },
            {
                "InstanceType": "m4.large",
                "Scope": "Region",
                "InstanceCount": 2,
                "End": "2017-11-01T00:00:00Z",
                "State": "active",
                "ProductDescription": "Linux/UNIX (Amazon VPC)"
            },
            {
                "InstanceType": "c4.large",
                "AvailabilityZone": "us-east-1a",
                "Scope": "Availability Zone",
                "InstanceCount": 1,
                "End": "2016-11-11T00:00:00Z",
                "State": "active",
                "ProductDescription": "Linux/UNIX"
            }
        ]
    });

    Ec2Snapshot {
        account_attributes: vec![serde_json::from_value(attributes).unwrap()],
        instances: vec![serde_json::from_value(instances).unwrap()],
        reserved: vec![serde_json::from_value(reserved).unwrap()],
    }
}

#[test]
fn test_ec2_running_filters() {
    let inventory = collect_ec2(&ec2_snapshot(false), now()).unwrap();
    let key = PlacementKey::zonal("m4.large", "us-east-1b");

    assert_eq!(inventory.vpc.running.get(&key), 2);
    assert_eq!(inventory.vpc.running.total(), 2);
    assert_eq!(
        inventory.vpc.instance_ids.get(&key),
        Some(&vec!["web-1".to_string(), "i-sdf3f4d6".to_string()])
    );
    assert_eq!(inventory.classic.running.get(&PlacementKey::zonal("c4.large", "us-east-1a")), 1);
    assert_eq!(inventory.classic.running.total(), 1);
}

#[test]
fn test_ec2_reservations_split_by_platform() {
    let inventory = collect_ec2(&ec2_snapshot(false), now()).unwrap();

    assert_eq!(inventory.vpc.reserved.get(&PlacementKey::zonal("c4.xlarge", "us-east-1b")), 1);
    assert_eq!(inventory.vpc.reserved.get(&PlacementKey::regional("m4.large")), 2);
    assert!(
        !inventory.vpc.reserved.contains(&PlacementKey::zonal("m4.large", "us-east-1c")),
        "retired reservations are ignored"
    );
    assert_eq!(inventory.classic.reserved.get(&PlacementKey::zonal("c4.large", "us-east-1a")), 1);
    assert_eq!(inventory.vpc.reserved.total(), 3);
}

#[test]
fn test_ec2_vpc_only_account_treats_all_reservations_as_vpc() {
    let inventory = collect_ec2(&ec2_snapshot(true), now()).unwrap();

    assert_eq!(inventory.classic.reserved.total(), 0, "no classic reservations on VPC-only");
    assert_eq!(inventory.vpc.reserved.total(), 4);
}

#[test]
fn test_ec2_expiry_and_normalized_units() {
    let inventory = collect_ec2(&ec2_snapshot(false), now()).unwrap();

    assert_eq!(
        inventory.vpc.expiry.get(&PlacementKey::zonal("c4.xlarge", "us-east-1b")),
        Some(&vec![21])
    );
    assert_eq!(inventory.vpc.expiry.get(&PlacementKey::regional("m4.large")), Some(&vec![365]));
    assert_eq!(
        inventory.classic.expiry.get(&PlacementKey::zonal("c4.large", "us-east-1a")),
        Some(&vec![10])
    );

    let units = reserved_normalized_units(&inventory.vpc.reserved).unwrap();
    assert_eq!(units.get("m4"), Some(&8.0));
    assert_eq!(units.len(), 1);
}

#[test]
fn test_elasticache_collection() {
    let clusters = json!({
        "CacheClusters": [
            {"CacheClusterId": "test1", "CacheClusterStatus": "available",
             "Engine": "redis", "CacheNodeType": "cache.t2.small"},
            {"CacheClusterId": "test2", "CacheClusterStatus": "stopped",
             "Engine": "redis", "CacheNodeType": "cache.m3.medium"}
        ]
    });
    let reserved = json!({
        "ReservedCacheNodes": [
            {"State": "active", "ProductDescription": "redis", "CacheNodeType": "cache.m1.medium",
             "CacheNodeCount": 1, "StartTime": "2016-09-13T22:09:20Z", "Duration": 31536000},
            {"State": "expired", "ProductDescription": "redis", "CacheNodeType": "cache.t2.small",
             "CacheNodeCount": 1, "StartTime": "2015-09-13T20:22:04Z", "Duration": 31536000}
        ]
    });
    let snapshot = ElastiCacheSnapshot {
        clusters: vec![serde_json::from_value(clusters).unwrap()],
        reserved: vec![serde_json::from_value(reserved).unwrap()],
    };

    let inventory = collect_elasticache(&snapshot, now()).unwrap();
    let running_key = PlacementKey::new("cache.t2.small", Dimension::Engine("redis".into()));
    let reserved_key = PlacementKey::new("cache.m1.medium", Dimension::Engine("redis".into()));

    assert_eq!(inventory.running.total(), 1);
    assert_eq!(inventory.running.get(&running_key), 1);
    assert_eq!(inventory.instance_ids.get(&running_key), Some(&vec!["test1".to_string()]));
    assert_eq!(inventory.reserved.total(), 1);
    assert_eq!(inventory.expiry.get(&reserved_key), Some(&vec![316]));
}

#[test]
fn test_rds_collection() {
    let instances = json!({
        "DBInstances": [
            {"DBInstanceIdentifier": "test1", "DBInstanceClass": "db.t2.medium", "MultiAZ": true},
            {"DBInstanceIdentifier": "test2", "DBInstanceClass": "db.m3.medium", "MultiAZ": false}
        ]
    });
    let reserved = json!({
        "ReservedDBInstances": [
            {"State": "active", "MultiAZ": true, "DBInstanceClass": "db.m4.xlarge",
             "DBInstanceCount": 1, "StartTime": "2016-08-24T20:23:04.753Z", "Duration": 31536000},
            {"State": "retired", "MultiAZ": false, "DBInstanceClass": "db.m4.large",
             "DBInstanceCount": 1, "StartTime": "2015-08-24T20:23:04.753Z", "Duration": 31536000}
        ]
    });
    let snapshot = RdsSnapshot {
        instances: vec![serde_json::from_value(instances).unwrap()],
        reserved: vec![serde_json::from_value(reserved).unwrap()],
    };

    let inventory = collect_rds(&snapshot, now()).unwrap();
    let reserved_key = PlacementKey::new("db.m4.xlarge", Dimension::MultiAz(true));

    assert_eq!(inventory.running.total(), 2);
    assert_eq!(
        inventory.running.get(&PlacementKey::new("db.t2.medium", Dimension::MultiAz(true))),
        1
    );
    assert_eq!(inventory.reserved.get(&reserved_key), 1);
    assert_eq!(inventory.reserved.total(), 1);
    assert_eq!(inventory.expiry.get(&reserved_key), Some(&vec![296]));
}

#[test]
fn test_out_of_range_term_is_an_error() {
    let rds_reserved = json!({
        "ReservedDBInstances": [
            {"State": "active", "MultiAZ": false, "DBInstanceClass": "db.m4.large",
             "DBInstanceCount": 1, "StartTime": "2016-08-24T20:23:04Z",
             "Duration": 1_000_000_000_000_000_i64}
        ]
    });
    let rds = RdsSnapshot {
        instances: Vec::new(),
        reserved: vec![serde_json::from_value(rds_reserved).unwrap()],
    };
    let err = collect_rds(&rds, now()).unwrap_err();
    assert!(format!("{err:#}").contains("db.m4.large"), "error names the class: {err:#}");

    let elc_reserved = json!({
        "ReservedCacheNodes": [
            {"State": "active", "ProductDescription": "redis", "CacheNodeType": "cache.m1.medium",
             "CacheNodeCount": 1, "StartTime": "2016-09-13T22:09:20Z", "Duration": i64::MIN}
        ]
    });
    let elc = ElastiCacheSnapshot {
        clusters: Vec::new(),
        reserved: vec![serde_json::from_value(elc_reserved).unwrap()],
    };
    let err = collect_elasticache(&elc, now()).unwrap_err();
    assert!(format!("{err:#}").contains("cache.m1.medium"), "error names the node type: {err:#}");
}

#[test]
fn test_reservation_without_scope_keys_by_zone() {
    let mut snapshot = ec2_snapshot(false);
    let reserved = json!({
        "ReservedInstances": [
            {"InstanceType": "t3.small", "AvailabilityZone": "us-east-1d", "InstanceCount": 2,
             "End": "2017-01-01T00:00:00Z", "State": "active",
             "ProductDescription": "Linux/UNIX (Amazon VPC)"},
            {"InstanceType": "t3.medium", "InstanceCount": 1,
             "End": "2017-01-01T00:00:00Z", "State": "active",
             "ProductDescription": "Linux/UNIX (Amazon VPC)"}
        ]
    });
    snapshot.reserved.push(serde_json::from_value(reserved).unwrap());

    let inventory = collect_ec2(&snapshot, now()).unwrap();

    assert_eq!(inventory.vpc.reserved.get(&PlacementKey::zonal("t3.small", "us-east-1d")), 2);
    assert!(!inventory.vpc.reserved.contains(&PlacementKey::regional("t3.small")));
    assert_eq!(inventory.vpc.reserved.get(&PlacementKey::regional("t3.medium")), 1);
}

#[tokio::test]
async fn test_read_pages_concatenates_paginated_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(EC2_INSTANCES_FILE);
    let page = |id: &str| {
        json!({"Reservations": [{"Instances": [{
            "InstanceId": id, "InstanceType": "t3.micro",
            "Placement": {"AvailabilityZone": "us-east-1a"}, "State": {"Name": "running"}
        }]}]})
    };
    fs::write(&path, json!([page("i-1"), page("i-2")]).to_string()).unwrap();

    let pages: Vec<DescribeInstances> = read_pages(&path, true).await.unwrap();

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].reservations[0].instances[0].instance_id, "i-2");
}

#[tokio::test]
async fn test_missing_optional_file_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let optional: Vec<DescribeInstances> = read_pages(&path, false).await.unwrap();
    assert!(optional.is_empty(), "absent optional file has no pages");

    let required = read_pages::<DescribeInstances>(&path, true).await;
    assert!(required.is_err(), "absent required file is an error");
}

#[tokio::test]
async fn test_load_account_snapshot_skips_disabled_services() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(EC2_INSTANCES_FILE), r#"{"Reservations": []}"#).unwrap();
    fs::write(dir.path().join(EC2_RESERVED_FILE), r#"{"ReservedInstances": []}"#).unwrap();

    let snapshot = load_account_snapshot(dir.path(), false, false).await.unwrap();
    assert!(snapshot.rds.is_none(), "rds disabled");
    assert!(snapshot.elasticache.is_none(), "elasticache disabled");
    assert_eq!(snapshot.ec2.instances.len(), 1);

    let missing_rds = load_account_snapshot(dir.path(), true, false).await;
    assert!(missing_rds.is_err(), "enabled service needs its files");

    fs::write(dir.path().join(RDS_INSTANCES_FILE), "not json").unwrap();
    assert!(load_account_snapshot(dir.path(), true, false).await.is_err());
}
