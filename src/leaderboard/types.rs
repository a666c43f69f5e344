use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::OverallSummary;

/// One submitted leaderboard entry, exactly the row the shared sheet holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub nickname: String,
    pub student_name: String,
    pub section: String,
    pub overall_pct: f64,
    pub safe_bunks: u32,
    pub timestamp: DateTime<Utc>,
    pub week_id: u32,
}

impl LeaderboardRow {
    /// Build a submission row from an aggregate summary, stamped with the
    /// current time and ISO week.
    pub fn from_summary(
        nickname: &str,
        student_name: &str,
        section: &str,
        summary: &OverallSummary,
    ) -> Self {
        let now = Utc::now();
        Self {
            nickname: nickname.to_string(),
            student_name: student_name.to_string(),
            section: section.to_string(),
            overall_pct: (summary.overall_pct * 100.0).round() / 100.0,
            safe_bunks: summary.total_safe_bunks,
            timestamp: now,
            week_id: now.iso_week().week(),
        }
    }
}

/// Leaderboard ordering: overall percentage descending, then fewer unused
/// bunks first (tighter attendance wins the tie).
pub fn rank_cmp(a: &LeaderboardRow, b: &LeaderboardRow) -> Ordering {
    b.overall_pct
        .partial_cmp(&a.overall_pct)
        .unwrap_or(Ordering::Equal)
        .then(a.safe_bunks.cmp(&b.safe_bunks))
}

/// Sort rows into leaderboard order.
pub fn sort_ranked(rows: &mut [LeaderboardRow]) {
    rows.sort_by(rank_cmp);
}

/// Rows for one section, or everything when `section` is None.
pub fn filter_section(rows: &[LeaderboardRow], section: Option<&str>) -> Vec<LeaderboardRow> {
    rows.iter()
        .filter(|row| section.is_none_or(|s| row.section == s))
        .cloned()
        .collect()
}

/// A student's own submission history: case-insensitive name match,
/// newest first.
pub fn history_for(rows: &[LeaderboardRow], student_name: &str) -> Vec<LeaderboardRow> {
    let needle = student_name.trim().to_lowercase();
    let mut matches: Vec<LeaderboardRow> = rows
        .iter()
        .filter(|row| row.student_name.to_lowercase() == needle)
        .cloned()
        .collect();
    matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(name: &str, section: &str, overall_pct: f64, safe_bunks: u32) -> LeaderboardRow {
        LeaderboardRow {
            nickname: "NeonFalcon42".to_string(),
            student_name: name.to_string(),
            section: section.to_string(),
            overall_pct,
            safe_bunks,
            timestamp: Utc::now(),
            week_id: 14,
        }
    }

    #[test]
    fn test_from_summary_rounds_percent() {
        let summary = OverallSummary {
            overall_pct: 44.54545454,
            total_safe_bunks: 8,
        };
        let r = LeaderboardRow::from_summary("NeonFalcon42", "Rahul Sharma", "Div 1", &summary);
        assert_eq!(r.overall_pct, 44.55);
        assert_eq!(r.safe_bunks, 8);
        assert_eq!(r.week_id, Utc::now().iso_week().week());
    }

    #[test]
    fn test_rank_by_percent_descending() {
        let mut rows = vec![row("a", "Div 1", 72.0, 3), row("b", "Div 1", 91.0, 0)];
        sort_ranked(&mut rows);
        assert_eq!(rows[0].student_name, "b");
    }

    #[test]
    fn test_rank_tie_prefers_fewer_bunks() {
        let mut rows = vec![row("loose", "Div 1", 85.0, 9), row("tight", "Div 1", 85.0, 2)];
        sort_ranked(&mut rows);
        assert_eq!(rows[0].student_name, "tight");
    }

    #[test]
    fn test_filter_section() {
        let rows = vec![row("a", "Div 1", 80.0, 1), row("b", "Div 2", 90.0, 2)];
        let filtered = filter_section(&rows, Some("Div 2"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].student_name, "b");

        assert_eq!(filter_section(&rows, None).len(), 2);
    }

    #[test]
    fn test_history_matches_case_insensitively() {
        let rows = vec![
            row("Rahul Sharma", "Div 1", 80.0, 1),
            row("rahul sharma", "Div 1", 82.0, 2),
            row("Someone Else", "Div 1", 90.0, 0),
        ];
        let history = history_for(&rows, "  RAHUL SHARMA ");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_history_newest_first() {
        let mut older = row("Rahul", "Div 1", 80.0, 1);
        older.timestamp = Utc::now() - Duration::days(7);
        let newer = row("Rahul", "Div 1", 84.0, 2);

        let history = history_for(&[older.clone(), newer.clone()], "Rahul");
        assert_eq!(history[0].overall_pct, 84.0);
        assert_eq!(history[1].overall_pct, 80.0);
    }
}
