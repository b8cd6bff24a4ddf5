//! SQLite-backed audit store.
//!
//! One row per audit id. The full audit is serialized into `audit_data`;
//! `url`, `created_at` and `overall_score` are copied out for querying.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use brand_audit::Audit;
use chrono::SecondsFormat;
use rusqlite::{params, Connection};

use super::AuditStore;

pub struct SqliteAuditStore {
    db: Mutex<Connection>,
}

impl SqliteAuditStore {
    /// Open or create a store at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create store directory: {}", parent.display())
                })?;
            }
        }
        let db = Connection::open(path)
            .with_context(|| format!("failed to open audit store: {}", path.display()))?;
        Self::init(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory().context("failed to open in-memory store")?)
    }

    fn init(db: Connection) -> Result<Self> {
        db.execute_batch(
            "CREATE TABLE IF NOT EXISTS audits (
                id TEXT PRIMARY KEY,
                url TEXT NOT NULL,
                created_at TEXT NOT NULL,
                overall_score REAL NOT NULL,
                audit_data TEXT NOT NULL,
                updated_at TEXT DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS audits_url_created ON audits (url, created_at);",
        )
        .context("failed to create audits table")?;

        Ok(Self { db: Mutex::new(db) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|_| anyhow!("audit store lock poisoned"))
    }

    fn query_audits(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Audit>> {
        let db = self.conn()?;
        let mut stmt = db.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;
        rows.iter().map(|data| decode(data)).collect()
    }
}

fn decode(data: &str) -> Result<Audit> {
    serde_json::from_str(data).context("stored audit_data is not a valid audit")
}

fn timestamp(audit: &Audit) -> String {
    audit.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl AuditStore for SqliteAuditStore {
    fn put(&self, audit: &Audit) -> Result<()> {
        let data = serde_json::to_string(audit).context("failed to serialize audit")?;
        self.conn()?
            .execute(
                "INSERT INTO audits (id, url, created_at, overall_score, audit_data)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    url = excluded.url,
                    created_at = excluded.created_at,
                    overall_score = excluded.overall_score,
                    audit_data = excluded.audit_data,
                    updated_at = CURRENT_TIMESTAMP",
                params![audit.id, audit.url, timestamp(audit), audit.overall_score, data],
            )
            .with_context(|| format!("failed to save audit {}", audit.id))?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Audit>> {
        let db = self.conn()?;
        let result = db.query_row(
            "SELECT audit_data FROM audits WHERE id = ?1",
            params![id],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(data) => decode(&data).map(Some),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<Audit>> {
        self.query_audits(
            "SELECT audit_data FROM audits ORDER BY created_at DESC, id DESC LIMIT ?1",
            params![limit as i64],
        )
    }

    fn history_for_url(&self, url: &str, limit: usize) -> Result<Vec<Audit>> {
        let mut audits = self.query_audits(
            "SELECT audit_data FROM audits WHERE url = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2",
            params![url, limit as i64],
        )?;
        audits.reverse();
        Ok(audits)
    }
}
