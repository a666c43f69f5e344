use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use crate::leaderboard::cache;
use crate::leaderboard::{LeaderboardRow, LeaderboardStore};

/// Where a set of leaderboard rows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowsSource {
    Network,
    CacheFresh,
    /// Network failed; these rows are the last successful read.
    CacheStale,
}

/// Fetch leaderboard rows through the disk cache.
///
/// A fresh cache short-circuits the network entirely. Otherwise the store
/// is asked; success refreshes the cache, failure falls back to whatever
/// stale rows exist (with a warning) so the leaderboard still renders on a
/// train. Only when there is neither network nor cache does this fail.
///
/// This function is called from main for the leaderboard, history and
/// report commands.
pub async fn fetch_rows<S: LeaderboardStore>(
    store: &S,
    cache_path: &Path,
    ttl: Duration,
    refresh: bool,
    verbose: bool,
) -> Result<(Vec<LeaderboardRow>, RowsSource)> {
    if !refresh {
        if let Some(cached) = cache::read_cached_rows(cache_path) {
            if cache::is_cache_fresh(&cached, ttl) {
                if verbose {
                    eprintln!("Using cached leaderboard ({}s old)", cached.age_secs());
                }
                return Ok((cached.rows, RowsSource::CacheFresh));
            }
        }
    }

    match store.read_all().await {
        Ok(rows) => {
            if let Err(e) = cache::write_cached_rows(cache_path, &rows) {
                eprintln!("Warning: could not cache leaderboard rows: {}", e);
            }
            if verbose {
                eprintln!("Fetched {} leaderboard rows", rows.len());
            }
            Ok((rows, RowsSource::Network))
        }
        Err(e) => {
            if let Some(cached) = cache::read_cached_rows(cache_path) {
                eprintln!(
                    "Warning: could not reach the leaderboard ({}); showing rows from {}s ago",
                    e,
                    cached.age_secs()
                );
                Ok((cached.rows, RowsSource::CacheStale))
            } else {
                Err(e)
            }
        }
    }
}
