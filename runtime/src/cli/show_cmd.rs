//! `brandaudit show <id>`.

use anyhow::{bail, Result};

use crate::cli::output;
use crate::config::AuditConfig;
use crate::store::{AuditStore, SqliteAuditStore};

pub async fn run(id: &str) -> Result<()> {
    let config = AuditConfig::from_env();
    let store = SqliteAuditStore::open(&config.db_path)?;

    let Some(audit) = store.get(id)? else {
        bail!("no audit with id '{id}'");
    };

    if output::is_json() {
        output::print_json(&audit);
    } else {
        output::print_audit(&audit);
    }
    Ok(())
}
