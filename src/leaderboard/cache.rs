use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::types::LeaderboardRow;

const ROWS_CACHE_KEY: &str = "leaderboard:rows";

/// Default freshness window for cached leaderboard reads.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Cached leaderboard rows with the fetch timestamp
#[derive(Debug, Serialize, Deserialize)]
pub struct CachedRows {
    pub rows: Vec<LeaderboardRow>,
    pub fetched_at: u64, // Unix timestamp
}

impl CachedRows {
    /// Seconds since these rows were fetched.
    pub fn age_secs(&self) -> u64 {
        now_unix().saturating_sub(self.fetched_at)
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Get the platform-appropriate cache directory for bunkwise
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("bunkwise/leaderboard-cache"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/bunkwise/leaderboard-cache",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Read cached rows from disk
pub fn read_cached_rows(cache_path: &Path) -> Option<CachedRows> {
    let bytes = cacache::read_sync(cache_path, ROWS_CACHE_KEY).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Write rows to the cache, stamped with the current time
pub fn write_cached_rows(cache_path: &Path, rows: &[LeaderboardRow]) -> Result<()> {
    let cached = CachedRows {
        rows: rows.to_vec(),
        fetched_at: now_unix(),
    };
    let json = serde_json::to_vec(&cached)?;
    cacache::write_sync(cache_path, ROWS_CACHE_KEY, &json)?;
    Ok(())
}

/// Check if cached rows are still fresh within the TTL
pub fn is_cache_fresh(cached: &CachedRows, ttl: Duration) -> bool {
    cached.age_secs() < ttl.as_secs()
}

/// Drop the cache directory (after an admin reset the cached rows lie)
pub fn clear_cache(cache_path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_row() -> LeaderboardRow {
        LeaderboardRow {
            nickname: "SilverEagle33".to_string(),
            student_name: "Rahul Sharma".to_string(),
            section: "Div 1".to_string(),
            overall_pct: 87.5,
            safe_bunks: 5,
            timestamp: Utc::now(),
            week_id: 14,
        }
    }

    fn temp_cache_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bunkwise_cache_test_{}", name))
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let dir = temp_cache_dir("roundtrip");
        let _ = clear_cache(&dir);

        write_cached_rows(&dir, &[sample_row()]).unwrap();
        let cached = read_cached_rows(&dir).unwrap();

        assert_eq!(cached.rows.len(), 1);
        assert_eq!(cached.rows[0].nickname, "SilverEagle33");
        assert!(cached.age_secs() < 5);

        let _ = clear_cache(&dir);
    }

    #[test]
    fn test_missing_cache_is_none() {
        let dir = temp_cache_dir("missing");
        let _ = clear_cache(&dir);
        assert!(read_cached_rows(&dir).is_none());
    }

    #[test]
    fn test_freshness_window() {
        let fresh = CachedRows {
            rows: vec![],
            fetched_at: now_unix(),
        };
        assert!(is_cache_fresh(&fresh, Duration::from_secs(600)));

        let stale = CachedRows {
            rows: vec![],
            fetched_at: now_unix() - 700,
        };
        assert!(!is_cache_fresh(&stale, Duration::from_secs(600)));
    }

    #[test]
    fn test_clear_cache_tolerates_missing_dir() {
        let dir = temp_cache_dir("never_created");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(clear_cache(&dir).is_ok());
    }
}
