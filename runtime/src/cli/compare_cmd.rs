//! `brandaudit compare <id> <id> [<id>]` — positional comparison of saved audits.

use anyhow::{bail, Result};
use brand_audit::{Audit, Change, ComparisonResult};

use crate::cli::output;
use crate::config::AuditConfig;
use crate::pipeline::compare_audits;
use crate::store::{AuditStore, SqliteAuditStore};

pub async fn run(ids: &[String]) -> Result<()> {
    let config = AuditConfig::from_env();
    let store = SqliteAuditStore::open(&config.db_path)?;

    let mut audits = Vec::with_capacity(ids.len());
    for id in ids {
        match store.get(id)? {
            Some(audit) => audits.push(audit),
            None => bail!("no audit with id '{id}'. Run `brandaudit list` to see saved audits."),
        }
    }

    compare_loaded(&audits)
}

/// Print a comparison as JSON or as a section-by-audit table.
pub fn print_comparison(comparison: &ComparisonResult) {
    if output::is_json() {
        output::print_json(comparison);
        return;
    }

    for (k, audit) in comparison.audits.iter().enumerate() {
        println!("  [{}] {}", k + 1, output::audit_line(audit));
    }
    println!();

    print!("  {:<34}", "Overall");
    for (audit, trend) in comparison.audits.iter().zip(&comparison.overall_trend) {
        print!("{}", cell(audit.overall_score, trend.as_ref()));
    }
    println!();

    for delta in &comparison.section_deltas {
        print!("  {:<34}", delta.name);
        for (k, score) in delta.scores.iter().enumerate() {
            let change = k.checked_sub(1).and_then(|prev| delta.changes.get(prev));
            print!("{}", cell(*score, change));
        }
        println!();
    }
}

fn cell(score: f64, change: Option<&Change>) -> String {
    match change {
        None => format!("{score:>6.1}{:<14}", ""),
        Some(c) => format!("{score:>6.1} ({:<11})", output::change_cell(Some(c))),
    }
}

/// Compare audits already loaded, in the order given.
pub fn compare_loaded(audits: &[Audit]) -> Result<()> {
    let comparison = compare_audits(audits)?;
    print_comparison(&comparison);
    Ok(())
}
