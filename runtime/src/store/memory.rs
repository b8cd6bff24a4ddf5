//! In-process store for tests and one-shot runs.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use brand_audit::Audit;

use super::{newest_first, AuditStore};

#[derive(Default)]
pub struct MemoryAuditStore {
    audits: Mutex<HashMap<String, Audit>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Result<Vec<Audit>> {
        let audits = self
            .audits
            .lock()
            .map_err(|_| anyhow!("audit store lock poisoned"))?;
        Ok(audits.values().cloned().collect())
    }
}

impl AuditStore for MemoryAuditStore {
    fn put(&self, audit: &Audit) -> Result<()> {
        self.audits
            .lock()
            .map_err(|_| anyhow!("audit store lock poisoned"))?
            .insert(audit.id.clone(), audit.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Audit>> {
        Ok(self
            .audits
            .lock()
            .map_err(|_| anyhow!("audit store lock poisoned"))?
            .get(id)
            .cloned())
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<Audit>> {
        let mut audits = self.snapshot()?;
        newest_first(&mut audits);
        audits.truncate(limit);
        Ok(audits)
    }

    fn history_for_url(&self, url: &str, limit: usize) -> Result<Vec<Audit>> {
        let mut audits: Vec<Audit> = self
            .snapshot()?
            .into_iter()
            .filter(|a| a.url == url)
            .collect();
        newest_first(&mut audits);
        audits.truncate(limit);
        audits.reverse();
        Ok(audits)
    }
}
