use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::SubjectSpec;
use crate::engine::SubjectRecord;

/// Locally persisted session state: per-subject counts keyed by
/// "Name (TH)" plus the generated nickname. Keys that no longer appear in
/// the catalog are kept on load so a timetable edit never destroys counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub counts: HashMap<String, Counts>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub present: u32,
    pub total: u32,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    /// Create a new empty snapshot with version 1
    pub fn new() -> Self {
        Self {
            version: 1,
            nickname: None,
            counts: HashMap::new(),
            updated_at: None,
        }
    }

    /// Counts recorded for a subject key, zeroes if none yet.
    pub fn counts_for(&self, key: &str) -> Counts {
        self.counts.get(key).copied().unwrap_or_default()
    }

    /// Record counts for a subject key.
    pub fn record(&mut self, key: String, present: u32, total: u32) {
        self.counts.insert(key, Counts { present, total });
        self.updated_at = Some(Utc::now());
    }

    /// Drop all recorded counts (nickname survives).
    pub fn reset_counts(&mut self) {
        self.counts.clear();
        self.updated_at = Some(Utc::now());
    }

    /// Join the catalog with the recorded counts into engine records,
    /// preserving catalog order. Subjects with no counts yet come out
    /// as 0/0.
    pub fn records(&self, subjects: &[SubjectSpec]) -> Vec<SubjectRecord> {
        subjects
            .iter()
            .map(|spec| {
                let counts = self.counts_for(&spec.key());
                SubjectRecord {
                    name: spec.name.clone(),
                    kind: spec.kind,
                    per_week: spec.per_week,
                    present: counts.present,
                    total: counts.total,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SessionType;

    fn spec(name: &str, kind: SessionType, per_week: u32) -> SubjectSpec {
        SubjectSpec {
            name: name.to_string(),
            kind,
            per_week,
        }
    }

    #[test]
    fn test_new_snapshot_empty() {
        let snapshot = Snapshot::new();
        assert_eq!(snapshot.version, 1);
        assert!(snapshot.counts.is_empty());
        assert!(snapshot.nickname.is_none());
        assert!(snapshot.updated_at.is_none());
    }

    #[test]
    fn test_record_and_read_back() {
        let mut snapshot = Snapshot::new();
        snapshot.record("Engineering Physics (TH)".to_string(), 18, 20);

        let counts = snapshot.counts_for("Engineering Physics (TH)");
        assert_eq!(counts, Counts { present: 18, total: 20 });
        assert!(snapshot.updated_at.is_some());
    }

    #[test]
    fn test_counts_for_unknown_key_is_zero() {
        let snapshot = Snapshot::new();
        assert_eq!(snapshot.counts_for("Yoga - II (PR)"), Counts::default());
    }

    #[test]
    fn test_records_follow_catalog_order() {
        let mut snapshot = Snapshot::new();
        snapshot.record("B (PR)".to_string(), 5, 10);

        let catalog = vec![
            spec("A", SessionType::Theory, 3),
            spec("B", SessionType::Practical, 1),
        ];
        let records = snapshot.records(&catalog);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "A");
        assert_eq!((records[0].present, records[0].total), (0, 0));
        assert_eq!((records[1].present, records[1].total), (5, 10));
        assert_eq!(records[1].per_week, 1);
    }

    #[test]
    fn test_reset_counts_keeps_nickname() {
        let mut snapshot = Snapshot::new();
        snapshot.nickname = Some("NeonFalcon42".to_string());
        snapshot.record("A (TH)".to_string(), 1, 2);

        snapshot.reset_counts();
        assert!(snapshot.counts.is_empty());
        assert_eq!(snapshot.nickname.as_deref(), Some("NeonFalcon42"));
    }

    #[test]
    fn test_stale_keys_survive_catalog_changes() {
        let mut snapshot = Snapshot::new();
        snapshot.record("Dropped Subject (TH)".to_string(), 9, 12);

        let catalog = vec![spec("A", SessionType::Theory, 3)];
        let records = snapshot.records(&catalog);

        // Not rendered, but not destroyed either
        assert_eq!(records.len(), 1);
        assert_eq!(
            snapshot.counts_for("Dropped Subject (TH)"),
            Counts { present: 9, total: 12 }
        );
    }
}
