use super::types::Snapshot;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the default snapshot file path (~/.config/bunkwise/snapshot.json)
pub fn get_snapshot_path() -> PathBuf {
    crate::config::get_config_dir().join("snapshot.json")
}

/// Load the snapshot from a JSON file.
///
/// A missing file starts a fresh empty snapshot. An unparseable file also
/// degrades to an empty snapshot, with a warning -- corrupted local state
/// must never take the session down. A snapshot written by a newer version
/// of the schema is an error; guessing at it could silently drop data.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Ok(Snapshot::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot file at {}", path.display()))?;

    let snapshot: Snapshot = match serde_json::from_str(&content) {
        Ok(s) => s,
        Err(e) => {
            crate::buffered_eprintln!(
                "Warning: snapshot at {} is unreadable ({}); starting fresh",
                path.display(),
                e
            );
            return Ok(Snapshot::new());
        }
    };

    if snapshot.version != 1 {
        anyhow::bail!("Unsupported snapshot version: {}", snapshot.version);
    }

    Ok(snapshot)
}

/// Save the snapshot to a JSON file atomically
///
/// Uses atomic-write-file to ensure the file is never left in a corrupted state.
/// Creates the config directory if it doesn't exist.
pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    crate::config::ensure_config_dir()?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, snapshot).context("Failed to serialize snapshot")?;

    file.commit().context("Failed to save snapshot")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_load_missing_file_returns_empty() {
        let temp_path = env::temp_dir().join("bunkwise_test_missing.json");
        let _ = std::fs::remove_file(&temp_path);

        let snapshot = load_snapshot(&temp_path).unwrap();
        assert_eq!(snapshot.version, 1);
        assert!(snapshot.counts.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_path = env::temp_dir().join("bunkwise_test_roundtrip.json");
        let _ = std::fs::remove_file(&temp_path);

        let mut snapshot = Snapshot::new();
        snapshot.nickname = Some("CrimsonWolf77".to_string());
        snapshot.record("Engineering Physics (TH)".to_string(), 18, 20);
        snapshot.record("Engineering Physics (PR)".to_string(), 9, 10);

        save_snapshot(&temp_path, &snapshot).unwrap();
        let loaded = load_snapshot(&temp_path).unwrap();

        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.nickname.as_deref(), Some("CrimsonWolf77"));
        assert_eq!(loaded.counts.len(), 2);
        assert_eq!(loaded.counts_for("Engineering Physics (TH)").present, 18);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_corrupted_file_degrades_to_empty() {
        let temp_path = env::temp_dir().join("bunkwise_test_corrupt.json");
        std::fs::write(&temp_path, "{not json at all").unwrap();

        let snapshot = load_snapshot(&temp_path).unwrap();
        assert!(snapshot.counts.is_empty());

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_future_version_rejected() {
        let temp_path = env::temp_dir().join("bunkwise_test_future.json");
        std::fs::write(&temp_path, r#"{"version": 9, "counts": {}}"#).unwrap();

        assert!(load_snapshot(&temp_path).is_err());

        let _ = std::fs::remove_file(&temp_path);
    }
}
