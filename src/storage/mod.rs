//! Storage abstractions for lineup snapshots.
//!
//! A snapshot is the match list of the last complete cycle. It is written
//! after every successful cycle and read back when a cycle fails, so lookups
//! keep working while the site is unreachable.

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::MatchRecord;

// Re-export for convenience
pub use local::LocalStorage;

/// Persisted form of a completed cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// ISO 8601 timestamp of the save
    pub saved_at: DateTime<Utc>,
    /// Match count
    pub count: usize,
    /// The matches array
    pub matches: Vec<MatchRecord>,
}

impl Snapshot {
    pub fn new(matches: Vec<MatchRecord>) -> Self {
        Self {
            saved_at: Utc::now(),
            count: matches.len(),
            matches,
        }
    }
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Replace the stored snapshot.
    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()>;

    /// Load the stored snapshot, `None` when nothing was saved yet.
    async fn load_snapshot(&self) -> Result<Option<Snapshot>>;
}

/// Storage that keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

#[async_trait]
impl SnapshotStorage for NoopStorage {
    async fn save_snapshot(&self, _snapshot: &Snapshot) -> Result<()> {
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        Ok(None)
    }
}
