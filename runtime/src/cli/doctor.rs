//! Environment readiness check.

use anyhow::Result;
use serde_json::json;

use crate::acquisition::Acquirer;
use crate::cli::output;
use crate::config::AuditConfig;
use crate::renderer::chromium::find_chromium;
use crate::store::{AuditStore, SqliteAuditStore};

/// Report credential, acquisition chain, Chromium and store status.
pub async fn run() -> Result<()> {
    let config = AuditConfig::from_env();
    let strategies = Acquirer::from_config(&config).strategy_names();
    let chromium = find_chromium(config.chromium_path.as_deref());
    let store = SqliteAuditStore::open(&config.db_path).and_then(|s| s.list_recent(1));

    if output::is_json() {
        output::print_json(&json!({
            "model": config.model.as_ref().map(|m| json!({
                "baseUrl": m.base_url,
                "model": m.model,
            })),
            "proxy": config.proxy.as_ref().map(|p| p.endpoint.clone()),
            "chromium": chromium.as_ref().map(|p| p.display().to_string()),
            "strategies": strategies,
            "store": {
                "path": config.db_path.display().to_string(),
                "ok": store.is_ok(),
            },
        }));
        return Ok(());
    }

    println!("Brand Audit Doctor");
    println!("==================");
    println!();

    match &config.model {
        Some(m) => println!("[OK] Model credential set ({} at {})", m.model, m.base_url),
        None => println!(
            "[!!] No model credential. Audits will be scored synthetically. \
             Set BRANDAUDIT_MODEL_API_KEY to enable external scoring."
        ),
    }

    match &config.proxy {
        Some(p) => println!("[OK] Render proxy: {}", p.endpoint),
        None => println!("[--] No render proxy configured (BRANDAUDIT_PROXY_URL)"),
    }

    match &chromium {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!("[--] Chromium not found; no browser fallback without a render proxy"),
    }

    println!("[OK] Acquisition order: {}", strategies.join(" → "));

    match &store {
        Ok(_) => println!("[OK] Audit store: {}", config.db_path.display()),
        Err(e) => println!("[!!] Audit store unusable ({}): {e:#}", config.db_path.display()),
    }

    println!();
    if config.model.is_some() && store.is_ok() {
        println!("Status: READY");
    } else if store.is_ok() {
        println!("Status: READY (synthetic scoring only)");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}
