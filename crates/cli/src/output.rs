//! Human (table) and machine (newline-delimited JSON) rendering of records

use anyhow::Result;
use colored::Colorize;
use ninite_core::{AppAudit, AppVersion, Status};
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

#[derive(Tabled)]
struct FrozenRow {
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Version")]
    version: String,
}

#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Current")]
    current: bool,
    #[tabled(rename = "Alternate")]
    alternate: bool,
}

#[derive(Tabled)]
struct AuditRow {
    #[tabled(rename = "App")]
    app: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Installed")]
    installed: bool,
}

/// One JSON object per line
pub fn print_json_line<T: Serialize>(record: &T) -> Result<()> {
    println!("{}", serde_json::to_string(record)?);
    Ok(())
}

fn print_table<R: Tabled>(title: &str, rows: Vec<R>) {
    println!("{}", title.cyan().bold());
    println!();
    if rows.is_empty() {
        println!("{}", "No apps reported".yellow());
        return;
    }
    println!("{}", Table::new(rows));
}

pub fn print_statuses(title: &str, records: Vec<Status>) {
    let rows: Vec<StatusRow> = records
        .into_iter()
        .map(|s| StatusRow {
            app: s.app,
            status: s.status,
            reason: s.reason,
        })
        .collect();
    print_table(title, rows);
}

pub fn print_frozen(output: &str, records: Vec<Status>) {
    let rows: Vec<FrozenRow> = records
        .into_iter()
        .map(|s| FrozenRow {
            app: s.app,
            version: s.version,
        })
        .collect();
    print_table(&format!("Offline installer: {}", output), rows);
}

pub fn print_versions(records: Vec<AppVersion>) {
    let rows: Vec<VersionRow> = records
        .into_iter()
        .map(|v| VersionRow {
            app: v.app,
            version: v.version,
            current: v.current_version,
            alternate: v.alternate_version,
        })
        .collect();
    print_table("Available versions", rows);
}

pub fn print_audits(records: Vec<AppAudit>) {
    let rows: Vec<AuditRow> = records
        .into_iter()
        .map(|a| AuditRow {
            app: a.app,
            status: a.status,
            version: a.version,
            installed: a.installed,
        })
        .collect();
    print_table("Audit", rows);
}
