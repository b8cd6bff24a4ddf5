//! `brandaudit audit <url>` — run the pipeline and save the result.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::cli::output;
use crate::config::AuditConfig;
use crate::pipeline::{AuditOptions, Auditor};
use crate::store::{AuditStore, SqliteAuditStore};

pub async fn run(url: &str, synthetic: bool, no_save: bool, timeout: Option<u64>) -> Result<()> {
    let config = AuditConfig::from_env();
    let auditor = Auditor::from_config(&config);

    if !output::is_quiet() && !output::is_json() {
        println!("  Auditing {url}...\n");
    }

    let options = AuditOptions {
        synthetic_only: synthetic,
        deadline: timeout.map(Duration::from_millis),
    };
    let audit = auditor.generate_audit_with(url, options).await?;

    if !no_save {
        let store = SqliteAuditStore::open(&config.db_path)?;
        store
            .put(&audit)
            .with_context(|| format!("failed to save audit to {}", config.db_path.display()))?;
    }

    if output::is_json() {
        output::print_json(&audit);
        return Ok(());
    }

    output::print_audit(&audit);
    if !output::is_quiet() {
        println!();
        if no_save {
            println!("  Not saved (--no-save).");
        } else {
            println!("  Saved as {}.", audit.id);
        }
    }
    Ok(())
}
