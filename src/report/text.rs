use super::model::{AccountReport, ServiceReport};
use std::fmt::Write;

const BANNER: &str = "##########################################################";

fn join<T: ToString>(values: &[T]) -> String {
    values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn render_service(out: &mut String, section: &ServiceReport) -> std::fmt::Result {
    let service = section.service;
    writeln!(out, "-------")?;
    writeln!(out, "Below is the report on {service} reserved instances:")?;

    if let Some(error) = &section.error {
        return writeln!(out, "The {service} check could not be completed: {error}");
    }

    if section.unused.is_empty() {
        writeln!(out, "You have no unused {service} reservations.")?;
    }
    for line in &section.unused {
        write!(
            out,
            "UNUSED RESERVATION!\t({})\t{}\t{}",
            line.count, line.instance_type, line.dimension
        )?;
        if !line.expires_in_days.is_empty() {
            write!(out, "\tExpires in {} days.", join(&line.expires_in_days))?;
        }
        writeln!(out)?;
    }

    if !section.has_unreserved() {
        writeln!(out, "You have no unreserved {service} instances.")?;
    }
    for line in &section.unreserved {
        write!(out, "NOT RESERVED!\t({})\t{}\t{}", line.count, line.instance_type, line.dimension)?;
        if !line.instances.is_empty() {
            write!(out, "\t{}", join(&line.instances))?;
        }
        writeln!(out)?;
    }
    for shortfall in &section.unreserved_units {
        writeln!(out, "NOT RESERVED!\t({})\t{}\tnormalized units", shortfall.units, shortfall.family)?;
    }

    writeln!(out, "({}) running on-demand {service} instances", section.running_total)?;
    writeln!(out, "({}) {service} reservations", section.reserved_total)
}

fn render_account(out: &mut String, report: &AccountReport) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{BANNER}")?;
    writeln!(out, "#### {:>20} Reserved Instances Report  #####", report.account)?;
    writeln!(out, "#### Region: {:<41} #####", report.region)?;
    writeln!(out, "{BANNER}")?;
    for section in &report.services {
        render_service(out, section)?;
    }
    Ok(())
}

/// Plain-text report for all accounts, in the order given.
pub(crate) fn render_text(reports: &[AccountReport]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    for report in reports {
        render_account(&mut out, report)?;
    }
    Ok(out)
}
