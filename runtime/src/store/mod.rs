//! Audit persistence.
//!
//! The pipeline never writes audits itself; callers hand finished audits to
//! an [`AuditStore`]. `put` is an idempotent upsert keyed by audit id.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use brand_audit::Audit;

pub use memory::MemoryAuditStore;
pub use sqlite::SqliteAuditStore;

pub trait AuditStore: Send + Sync {
    /// Insert `audit`, or replace the stored copy with the same id.
    fn put(&self, audit: &Audit) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<Audit>>;
    /// Most recent audits first.
    fn list_recent(&self, limit: usize) -> Result<Vec<Audit>>;
    /// The last `limit` audits of `url`, oldest first, ready for comparison.
    fn history_for_url(&self, url: &str, limit: usize) -> Result<Vec<Audit>>;
}

/// Newest-first ordering shared by the store implementations.
fn newest_first(audits: &mut [Audit]) {
    audits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}
