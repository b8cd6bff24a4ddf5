//! `brandaudit history <url>` — compare the latest saved audits of one site.

use anyhow::{bail, Result};
use brand_audit::comparison::MAX_COMPARED;

use crate::cli::compare_cmd;
use crate::config::AuditConfig;
use crate::pipeline::parse_target;
use crate::store::{AuditStore, SqliteAuditStore};

pub async fn run(url: &str) -> Result<()> {
    let config = AuditConfig::from_env();
    let store = SqliteAuditStore::open(&config.db_path)?;

    let target = parse_target(url)?;
    let audits = store.history_for_url(target.as_str(), MAX_COMPARED)?;
    if audits.is_empty() {
        bail!("no saved audits for {target}. Run `brandaudit audit {url}` first.");
    }

    compare_cmd::compare_loaded(&audits)
}
