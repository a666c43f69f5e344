use super::advisory::{advisory_message, classify_risk, RiskTier, SessionType};
use super::projection::{percentage, safe_bunk_budget, simulate_weeks};

/// One subject's catalog entry plus the counts the user entered.
/// `present <= total` is expected but not enforced; the engine stays total
/// and surfaces inconsistent input as-is.
#[derive(Debug, Clone)]
pub struct SubjectRecord {
    pub name: String,
    pub kind: SessionType,
    pub per_week: u32,
    pub present: u32,
    pub total: u32,
}

impl SubjectRecord {
    /// Stable identifier used as the snapshot key: "Name (TH)".
    pub fn key(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }

    pub fn current_pct(&self) -> f64 {
        percentage(self.present, self.total)
    }
}

/// Everything the UI renders for one subject.
#[derive(Debug, Clone)]
pub struct SubjectAnalysis {
    pub record: SubjectRecord,
    pub current_pct: f64,
    /// Percentage after bunking every session for the bunk window.
    pub bunk_pct: f64,
    /// Percentage after attending every session for the attend window.
    pub attend_pct: f64,
    pub safe_bunks: u32,
    pub tier: RiskTier,
    pub advisory: String,
}

/// Aggregate attendance across all subjects.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallSummary {
    pub overall_pct: f64,
    pub total_safe_bunks: u32,
}

/// Run the full projection bundle for one subject: current percentage,
/// both simulation scenarios, the bunk budget and the advisory line.
pub fn analyze_subject(
    record: &SubjectRecord,
    min_percent: f64,
    bunk_weeks: u32,
    attend_weeks: u32,
) -> SubjectAnalysis {
    let current_pct = record.current_pct();
    let bunk_pct = simulate_weeks(record.present, record.total, record.per_week, bunk_weeks, false);
    let attend_pct =
        simulate_weeks(record.present, record.total, record.per_week, attend_weeks, true);

    SubjectAnalysis {
        current_pct,
        bunk_pct,
        attend_pct,
        safe_bunks: safe_bunk_budget(record.present, record.total, min_percent),
        tier: classify_risk(current_pct, min_percent),
        advisory: advisory_message(current_pct, bunk_pct, min_percent, record.kind),
        record: record.clone(),
    }
}

/// Aggregate all subjects into one summary.
///
/// The overall percentage is total-weighted: `sum(present) / sum(total)`.
/// Safe bunks sum per subject; a bunk saved in one subject cannot offset a
/// deficit in another, so the total is purely additive.
pub fn aggregate(records: &[SubjectRecord], min_percent: f64) -> OverallSummary {
    let present: u64 = records.iter().map(|r| u64::from(r.present)).sum();
    let total: u64 = records.iter().map(|r| u64::from(r.total)).sum();

    let overall_pct = if total == 0 {
        0.0
    } else {
        present as f64 / total as f64 * 100.0
    };

    let total_safe_bunks = records
        .iter()
        .map(|r| safe_bunk_budget(r.present, r.total, min_percent))
        .sum();

    OverallSummary {
        overall_pct,
        total_safe_bunks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, kind: SessionType, per_week: u32, present: u32, total: u32) -> SubjectRecord {
        SubjectRecord {
            name: name.to_string(),
            kind,
            per_week,
            present,
            total,
        }
    }

    #[test]
    fn test_subject_key_format() {
        let r = record("Engineering Physics", SessionType::Practical, 1, 8, 10);
        assert_eq!(r.key(), "Engineering Physics (PR)");
    }

    #[test]
    fn test_analyze_subject_bundle() {
        let r = record("Discrete Mathematics", SessionType::Theory, 3, 45, 50);
        let analysis = analyze_subject(&r, 80.0, 2, 3);

        assert_eq!(analysis.current_pct, 90.0);
        assert_eq!(analysis.safe_bunks, 6);
        assert_eq!(analysis.tier, RiskTier::Safe);
        // bunk 2 weeks: 45/56 = ~80.36, still above minimum -> no warning
        assert!((analysis.bunk_pct - 80.357).abs() < 0.01);
        assert!(!analysis.advisory.contains("under the minimum"));
        // attend 3 weeks: 54/59 = ~91.53
        assert!((analysis.attend_pct - 91.525).abs() < 0.01);
    }

    #[test]
    fn test_analyze_subject_warns_when_bunking_sinks() {
        let r = record("Engineering Graphics", SessionType::Theory, 3, 41, 50);
        let analysis = analyze_subject(&r, 80.0, 2, 3);

        assert_eq!(analysis.current_pct, 82.0);
        assert_eq!(analysis.tier, RiskTier::Borderline);
        // bunk 2 weeks: 41/56 = ~73.2, below 80 -> warning clause
        assert!(analysis.advisory.contains("under the minimum"));
    }

    #[test]
    fn test_aggregate_is_total_weighted() {
        // 9/10 (90%) and 40/100 (40%): simple mean would be 65,
        // total-weighted is 49/110 = ~44.55
        let records = vec![
            record("A", SessionType::Theory, 2, 9, 10),
            record("B", SessionType::Theory, 3, 40, 100),
        ];
        let summary = aggregate(&records, 80.0);
        assert!((summary.overall_pct - 44.545).abs() < 0.01);
    }

    #[test]
    fn test_aggregate_sums_budgets() {
        let records = vec![
            record("A", SessionType::Theory, 2, 45, 50), // budget 6
            record("B", SessionType::Practical, 1, 40, 50), // budget 0
            record("C", SessionType::Theory, 3, 18, 20), // 18/0.8=22.5 -> 22-20 = 2
        ];
        let summary = aggregate(&records, 80.0);
        assert_eq!(summary.total_safe_bunks, 8);
    }

    #[test]
    fn test_aggregate_empty_input() {
        let summary = aggregate(&[], 80.0);
        assert_eq!(summary.overall_pct, 0.0);
        assert_eq!(summary.total_safe_bunks, 0);
    }

    #[test]
    fn test_aggregate_all_zero_totals() {
        let records = vec![record("A", SessionType::Theory, 2, 0, 0)];
        let summary = aggregate(&records, 80.0);
        assert_eq!(summary.overall_pct, 0.0);
        assert_eq!(summary.total_safe_bunks, 0);
    }
}
