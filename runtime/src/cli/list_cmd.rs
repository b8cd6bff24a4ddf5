//! `brandaudit list` — most recent saved audits.

use anyhow::Result;
use serde_json::json;

use crate::cli::output;
use crate::config::AuditConfig;
use crate::store::{AuditStore, SqliteAuditStore};

pub async fn run(limit: usize) -> Result<()> {
    let config = AuditConfig::from_env();
    let store = SqliteAuditStore::open(&config.db_path)?;
    let audits = store.list_recent(limit)?;

    if output::is_json() {
        let rows: Vec<_> = audits
            .iter()
            .map(|a| {
                json!({
                    "id": a.id,
                    "url": a.url,
                    "title": a.title,
                    "createdAt": a.created_at,
                    "overallScore": a.overall_score,
                    "provenance": a.metadata.provenance,
                })
            })
            .collect();
        output::print_json(&json!({ "audits": rows }));
        return Ok(());
    }

    if audits.is_empty() {
        if !output::is_quiet() {
            println!("  No saved audits. Run `brandaudit audit <url>` to create one.");
        }
        return Ok(());
    }

    for audit in &audits {
        println!("  {}", output::audit_line(audit));
    }
    Ok(())
}
