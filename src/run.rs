use crate::collector::{
    collect_ec2, collect_elasticache, collect_rds, load_account_snapshot, AccountSnapshot,
    ServiceInventory,
};
use crate::config::{AccountConfig, AppConfig};
use crate::engine::{
    reconcile, reconcile_normalized, reserved_normalized_units, EngineError,
    NormalizedReconciliation,
};
use crate::report::{AccountReport, ServiceKind, ServiceReport};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

fn log_section(account: &str, section: &ServiceReport) {
    info!(
        "{} / {}: {} unused, {} unreserved, {} running, {} reserved",
        account,
        section.service,
        section.unused.len(),
        section.unreserved.len() + section.unreserved_units.len(),
        section.running_total,
        section.reserved_total,
    );
}

/// Normalized-unit view of the VPC inventories; regional reservations supply the units.
fn normalized_vpc(vpc: &ServiceInventory) -> Result<NormalizedReconciliation, EngineError> {
    let reserved_units = reserved_normalized_units(&vpc.reserved)?;
    reconcile_normalized(&vpc.running, &vpc.reserved, &reserved_units)
}

/// Reconcile every enabled service of one account from its collected snapshot.
///
/// Sections are ordered EC2 Classic, EC2 VPC, EC2 Normalized, ElastiCache, RDS.
/// An instance type the normalized-unit table cannot weigh fails only the
/// normalized section.
pub(crate) fn build_account_report(
    account: &AccountConfig,
    snapshot: &AccountSnapshot,
    now: DateTime<Utc>,
) -> Result<AccountReport> {
    let ec2 = collect_ec2(&snapshot.ec2, now)
        .with_context(|| format!("Failed to collect EC2 for [{}]", account.name))?;
    let mut services = Vec::with_capacity(5);

    services.push(ServiceReport::exact(
        ServiceKind::Ec2Classic,
        &reconcile(&ec2.classic.running, &ec2.classic.reserved),
        &ec2.classic,
    ));
    services.push(ServiceReport::exact(
        ServiceKind::Ec2Vpc,
        &reconcile(&ec2.vpc.running, &ec2.vpc.reserved),
        &ec2.vpc,
    ));

    match normalized_vpc(&ec2.vpc) {
        Ok(normalized) => services.push(ServiceReport::normalized(&normalized, &ec2.vpc)),
        Err(err) => {
            warn!("[{}] normalized-unit check failed: {}", account.name, err);
            services.push(ServiceReport::failed(ServiceKind::Ec2Normalized, err));
        }
    }

    if let Some(elc) = &snapshot.elasticache {
        let inventory = collect_elasticache(elc, now)
            .with_context(|| format!("Failed to collect ElastiCache for [{}]", account.name))?;
        let result = reconcile(&inventory.running, &inventory.reserved);
        services.push(ServiceReport::exact(ServiceKind::ElastiCache, &result, &inventory));
    }

    if let Some(rds) = &snapshot.rds {
        let inventory = collect_rds(rds, now)
            .with_context(|| format!("Failed to collect RDS for [{}]", account.name))?;
        let result = reconcile(&inventory.running, &inventory.reserved);
        services.push(ServiceReport::exact(ServiceKind::Rds, &result, &inventory));
    }

    for section in &services {
        log_section(&account.name, section);
    }

    Ok(AccountReport {
        account: account.name.clone(),
        region: account.region.clone(),
        services,
    })
}

/// Load one account's snapshot and reconcile it.
pub(crate) async fn check_account(
    account: &AccountConfig,
    now: DateTime<Utc>,
) -> Result<AccountReport> {
    let snapshot =
        load_account_snapshot(&account.snapshot_dir, account.rds, account.elasticache)
            .await
            .with_context(|| format!("Failed to collect inventory for [{}]", account.name))?;
    build_account_report(account, &snapshot, now)
}

/// Check all configured accounts one after another, in config order.
pub(crate) async fn check_all(config: &AppConfig, now: DateTime<Utc>) -> Result<Vec<AccountReport>> {
    let mut reports = Vec::with_capacity(config.accounts.len());
    for account in &config.accounts {
        info!("Checking account [{}] in {}", account.name, account.region);
        reports.push(check_account(account, now).await?);
    }
    Ok(reports)
}
