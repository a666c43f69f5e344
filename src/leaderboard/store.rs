use anyhow::Result;
use std::sync::Mutex;

use super::types::LeaderboardRow;

/// Capability interface to the shared class leaderboard.
///
/// The engine never touches this; callers compute an aggregate first and
/// hand the finished row in. Keeping the store behind a trait lets tests
/// run against [`MemoryStore`] instead of the network.
///
/// Callers use concrete store types, so the futures stay auto-Send and
/// no extra bounds are needed here.
#[allow(async_fn_in_trait)]
pub trait LeaderboardStore {
    /// Append one submission row.
    async fn append(&self, row: LeaderboardRow) -> Result<()>;

    /// Read every row currently on the sheet.
    async fn read_all(&self) -> Result<Vec<LeaderboardRow>>;

    /// Drop all rows (admin weekly reset).
    async fn clear(&self) -> Result<()>;
}

/// In-memory store used by tests and offline dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<LeaderboardRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<LeaderboardRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }
}

impl LeaderboardStore for MemoryStore {
    async fn append(&self, row: LeaderboardRow) -> Result<()> {
        self.rows.lock().unwrap().push(row);
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<LeaderboardRow>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn clear(&self) -> Result<()> {
        self.rows.lock().unwrap().clear();
        Ok(())
    }
}
