//! Class report export for the admin view: a Markdown summary the class
//! rep can paste anywhere, or a CSV dump of the raw rows. Both consume
//! leaderboard rows the caller already fetched; nothing here does network
//! I/O.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::leaderboard::{sort_ranked, LeaderboardRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Csv,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Csv => "csv",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(format!("unknown report format '{}' (expected markdown or csv)", other)),
        }
    }
}

/// Per-section aggregates for the report's section mix.
fn summarize_by_section(rows: &[LeaderboardRow]) -> Vec<(String, usize, f64)> {
    let mut map: BTreeMap<String, (usize, f64)> = BTreeMap::new();

    for row in rows {
        let entry = map.entry(row.section.clone()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += row.overall_pct;
    }

    map.into_iter()
        .map(|(section, (count, pct_sum))| (section, count, pct_sum / count as f64))
        .collect()
}

/// Build the Markdown class report: section mix, top ten, recent
/// submissions.
pub fn build_markdown_report(rows: &[LeaderboardRow], min_percent: f64) -> String {
    let mut ranked = rows.to_vec();
    sort_ranked(&mut ranked);
    let sections = summarize_by_section(rows);

    let mut output = String::new();

    let _ = writeln!(output, "# Class Attendance Leaderboard Report");
    let _ = writeln!(output, "Minimum required: {:.0}% | Entries: {}", min_percent, rows.len());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Section Mix");

    if sections.is_empty() {
        let _ = writeln!(output, "No submissions yet.");
    } else {
        for (section, count, avg_pct) in sections.iter() {
            let _ = writeln!(
                output,
                "- {}: {} submissions (avg overall {:.1}%)",
                section, count, avg_pct
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Ten");

    if ranked.is_empty() {
        let _ = writeln!(output, "No submissions yet.");
    } else {
        for (idx, row) in ranked.iter().take(10).enumerate() {
            let _ = writeln!(
                output,
                "{}. {} ({}): {:.2}% with {} safe bunks",
                idx + 1,
                row.nickname,
                row.section,
                row.overall_pct,
                row.safe_bunks
            );
        }
    }

    let mut recent = rows.to_vec();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Submissions");

    if recent.is_empty() {
        let _ = writeln!(output, "No submissions yet.");
    } else {
        for row in recent.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} ({}) submitted {:.2}% on {} (week {})",
                row.nickname,
                row.section,
                row.overall_pct,
                row.timestamp.format("%Y-%m-%d %H:%M"),
                row.week_id
            );
        }
    }

    output
}

/// Write the raw rows as CSV, ranked, with the sheet's column order.
pub fn write_csv_report(rows: &[LeaderboardRow], out: &Path) -> Result<()> {
    let mut ranked = rows.to_vec();
    sort_ranked(&mut ranked);

    let mut writer = csv::Writer::from_path(out)
        .with_context(|| format!("Failed to create CSV report at {}", out.display()))?;

    writer.write_record([
        "nickname",
        "student_name",
        "section",
        "overall_pct",
        "safe_bunks",
        "timestamp",
        "week_id",
    ])?;

    for row in &ranked {
        writer.write_record([
            row.nickname.clone(),
            row.student_name.clone(),
            row.section.clone(),
            format!("{:.2}", row.overall_pct),
            row.safe_bunks.to_string(),
            row.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            row.week_id.to_string(),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write CSV report at {}", out.display()))?;

    Ok(())
}
