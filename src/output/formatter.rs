use std::fmt::Write as _;
use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::engine::{OverallSummary, RiskTier, SubjectAnalysis};
use crate::leaderboard::LeaderboardRow;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a percentage with two decimals, the way the sheet shows them
pub fn format_pct(pct: f64) -> String {
    format!("{:.2}%", pct)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a subject or student name to fit, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn tier_tag(tier: RiskTier, use_colors: bool) -> String {
    if !use_colors {
        return tier.label().to_string();
    }
    match tier {
        RiskTier::Safe => tier.label().green().bold().to_string(),
        RiskTier::Borderline => tier.label().yellow().bold().to_string(),
        RiskTier::Danger => tier.label().red().bold().to_string(),
    }
}

/// Format one subject with detailed multi-line output (for verbose mode)
pub fn format_subject_detail(analysis: &SubjectAnalysis, use_colors: bool) -> String {
    let record = &analysis.record;
    let header = if use_colors {
        format!("{} [{}]", record.key().bold(), tier_tag(analysis.tier, true))
    } else {
        format!("{} [{}]", record.key(), analysis.tier.label())
    };

    format!(
        "{}\n  Counts: {}/{} ({} per week)\n  Current: {}\n  If bunking: {}\n  If attending: {}\n  Safe bunks: {}\n  {}",
        header,
        record.present,
        record.total,
        record.per_week,
        format_pct(analysis.current_pct),
        format_pct(analysis.bunk_pct),
        format_pct(analysis.attend_pct),
        analysis.safe_bunks,
        analysis.advisory,
    )
}

/// Format the full analysis as an aligned table with one advisory line per
/// subject, followed by the overall summary.
/// Columns: Subject, Current, Bunk-scenario, Attend-scenario, Budget, Tier.
pub fn format_analysis_table(
    analyses: &[SubjectAnalysis],
    summary: &OverallSummary,
    bunk_weeks: u32,
    attend_weeks: u32,
    use_colors: bool,
) -> String {
    if analyses.is_empty() {
        return "No subjects configured.".to_string();
    }

    let term_width = get_terminal_width();
    // Fixed columns: counts(9) + 3 percents(3*9) + bunks(6) + tier(10) + gaps
    let fixed = 9 + 27 + 6 + 10 + 6;
    let name_width = term_width
        .map(|w| w.saturating_sub(fixed).clamp(20, 48))
        .unwrap_or(48);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<name_width$}  {:>9}  {:>8}  {:>8}  {:>8}  {:>5}  {}",
        "Subject",
        "Counts",
        "Now",
        format!("Bunk{}w", bunk_weeks),
        format!("Att{}w", attend_weeks),
        "Safe",
        "Tier",
        name_width = name_width,
    );

    for analysis in analyses {
        let record = &analysis.record;
        let name = truncate_name(&record.key(), name_width);
        let counts = format!("{}/{}", record.present, record.total);
        let _ = writeln!(
            out,
            "{:<name_width$}  {:>9}  {:>8}  {:>8}  {:>8}  {:>5}  {}",
            name,
            counts,
            format_pct(analysis.current_pct),
            format_pct(analysis.bunk_pct),
            format_pct(analysis.attend_pct),
            analysis.safe_bunks,
            tier_tag(analysis.tier, use_colors),
            name_width = name_width,
        );
        let advisory = if use_colors {
            format!("  {}", analysis.advisory.dimmed())
        } else {
            format!("  {}", analysis.advisory)
        };
        let _ = writeln!(out, "{}", advisory);
    }

    let overall = format!(
        "Overall: {}  |  Total safe bunks: {}",
        format_pct(summary.overall_pct),
        summary.total_safe_bunks
    );
    let _ = write!(out, "\n{}", if use_colors { overall.bold().to_string() } else { overall });

    out
}

/// Format leaderboard rows as a ranked table.
/// Rows are printed in the order given; sort them first with
/// `leaderboard::sort_ranked`.
pub fn format_leaderboard_table(rows: &[LeaderboardRow], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No leaderboard entries yet.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<18}  {:<8}  {:>9}  {:>5}  {:>4}",
        "#", "Nickname", "Section", "Overall", "Safe", "Week"
    );

    for (idx, row) in rows.iter().enumerate() {
        let index_str = format!("{}.", idx + 1);
        let nickname = truncate_name(&row.nickname, 18);
        let pct = format_pct(row.overall_pct);
        let line = format!(
            "{:>3}  {:<18}  {:<8}  {:>9}  {:>5}  {:>4}",
            index_str, nickname, row.section, pct, row.safe_bunks, row.week_id
        );

        // Podium rows stand out
        if use_colors && idx == 0 {
            let _ = writeln!(out, "{}", line.bold());
        } else if use_colors && idx < 3 {
            let _ = writeln!(out, "{}", line.cyan());
        } else {
            let _ = writeln!(out, "{}", line);
        }
    }

    out.pop();
    out
}

/// Format a student's submission history, newest first
pub fn format_history(rows: &[LeaderboardRow], student_name: &str) -> String {
    if rows.is_empty() {
        return format!(
            "No history found for '{}'. Make sure the name matches your submissions exactly.",
            student_name
        );
    }

    let best = rows
        .iter()
        .map(|r| r.overall_pct)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{}  {:>9}  {:>3} safe bunks  (week {}, as {})",
            row.timestamp.format("%Y-%m-%d %H:%M"),
            format_pct(row.overall_pct),
            row.safe_bunks,
            row.week_id,
            row.nickname
        );
    }
    let _ = write!(
        out,
        "Total submissions: {} | Best overall: {}",
        rows.len(),
        format_pct(best)
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{analyze_subject, SessionType, SubjectRecord};
    use chrono::Utc;

    fn sample_analysis() -> SubjectAnalysis {
        let record = SubjectRecord {
            name: "Engineering Physics".to_string(),
            kind: SessionType::Theory,
            per_week: 2,
            present: 45,
            total: 50,
        };
        analyze_subject(&record, 80.0, 2, 3)
    }

    fn sample_row(nickname: &str, pct: f64, bunks: u32) -> LeaderboardRow {
        LeaderboardRow {
            nickname: nickname.to_string(),
            student_name: "Rahul Sharma".to_string(),
            section: "Div 1".to_string(),
            overall_pct: pct,
            safe_bunks: bunks,
            timestamp: Utc::now(),
            week_id: 14,
        }
    }

    #[test]
    fn test_format_pct_two_decimals() {
        assert_eq!(format_pct(90.0), "90.00%");
        assert_eq!(format_pct(38.4615), "38.46%");
        assert_eq!(format_pct(112.5), "112.50%");
    }

    #[test]
    fn test_truncate_name_unicode_safe() {
        assert_eq!(truncate_name("short", 10), "short");
        assert_eq!(truncate_name("a very long subject name", 10), "a very ...");
        // Multibyte chars counted as chars, not bytes
        assert_eq!(truncate_name("योग और ध्यान कक्षा extra", 10), "योग और ...");
    }

    #[test]
    fn test_subject_detail_plain() {
        let detail = format_subject_detail(&sample_analysis(), false);
        assert!(detail.contains("Engineering Physics (TH) [SAFE]"));
        assert!(detail.contains("Counts: 45/50"));
        assert!(detail.contains("Current: 90.00%"));
        assert!(detail.contains("Safe bunks: 6"));
    }

    #[test]
    fn test_analysis_table_includes_overall() {
        let analyses = vec![sample_analysis()];
        let summary = crate::engine::aggregate(
            &analyses.iter().map(|a| a.record.clone()).collect::<Vec<_>>(),
            80.0,
        );
        let table = format_analysis_table(&analyses, &summary, 2, 3, false);
        assert!(table.contains("Bunk2w"));
        assert!(table.contains("Att3w"));
        assert!(table.contains("Overall: 90.00%"));
        assert!(table.contains("Total safe bunks: 6"));
    }

    #[test]
    fn test_analysis_table_empty() {
        let summary = OverallSummary {
            overall_pct: 0.0,
            total_safe_bunks: 0,
        };
        assert_eq!(
            format_analysis_table(&[], &summary, 2, 3, false),
            "No subjects configured."
        );
    }

    #[test]
    fn test_leaderboard_table_plain() {
        let rows = vec![sample_row("NeonFalcon42", 91.25, 3), sample_row("RedWolf10", 84.0, 0)];
        let table = format_leaderboard_table(&rows, false);
        assert!(table.contains(" 1.  NeonFalcon42"));
        assert!(table.contains("91.25%"));
        assert!(table.contains(" 2.  RedWolf10"));
    }

    #[test]
    fn test_leaderboard_table_empty() {
        assert_eq!(format_leaderboard_table(&[], false), "No leaderboard entries yet.");
    }

    #[test]
    fn test_history_summary_line() {
        let rows = vec![sample_row("NeonFalcon42", 84.0, 2), sample_row("NeonFalcon42", 91.0, 3)];
        let out = format_history(&rows, "Rahul Sharma");
        assert!(out.contains("Total submissions: 2"));
        assert!(out.contains("Best overall: 91.00%"));
    }

    #[test]
    fn test_history_empty_mentions_name() {
        let out = format_history(&[], "Rahul Sharma");
        assert!(out.contains("Rahul Sharma"));
    }
}
