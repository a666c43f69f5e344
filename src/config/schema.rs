use serde::{Deserialize, Serialize};

use crate::engine::SessionType;

/// Top-level configuration.
///
/// Example YAML:
/// ```yaml
/// min_percent: 80
/// simulation:
///   bunk_weeks: 2
///   attend_weeks: 3
/// subjects:
///   - { name: "Engineering Physics", kind: TH, per_week: 2 }
///   - { name: "Engineering Physics", kind: PR, per_week: 1 }
/// leaderboard:
///   url: "https://sheet-bridge.example.com/class-2026"
///   section: "Div 1"
///   cache_ttl: "10m"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Institutional minimum attendance percentage (50..=100).
    #[serde(default = "default_min_percent")]
    pub min_percent: f64,

    /// Projection windows for the two-point simulation.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Fixed ordered subject catalog. Each entry carries its own weekly
    /// session count, so catalog and timetable can never disagree in length.
    pub subjects: Vec<SubjectSpec>,

    /// Shared class leaderboard; omit to run fully offline.
    #[serde(default)]
    pub leaderboard: Option<LeaderboardConfig>,
}

fn default_min_percent() -> f64 {
    80.0
}

/// One catalog entry: a subject name, its session type, and how many
/// sessions of it run per week.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SubjectSpec {
    pub name: String,
    pub kind: SessionType,
    pub per_week: u32,
}

impl SubjectSpec {
    /// Same key format as SubjectRecord: "Name (TH)".
    pub fn key(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Weeks of all-bunk projection shown in the analysis (default 2).
    #[serde(default = "default_bunk_weeks")]
    pub bunk_weeks: u32,

    /// Weeks of all-attend projection shown in the analysis (default 3).
    #[serde(default = "default_attend_weeks")]
    pub attend_weeks: u32,
}

fn default_bunk_weeks() -> u32 {
    2
}

fn default_attend_weeks() -> u32 {
    3
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            bunk_weeks: default_bunk_weeks(),
            attend_weeks: default_attend_weeks(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LeaderboardConfig {
    /// Base URL of the sheet bridge (GET/POST {url}/rows, POST {url}/clear).
    pub url: String,

    /// Default section/division attached to submissions.
    #[serde(default)]
    pub section: Option<String>,

    /// Human-facing spreadsheet URL for `leaderboard --open`.
    #[serde(default)]
    pub browse_url: Option<String>,

    /// How long cached leaderboard reads stay fresh (humantime string,
    /// e.g. "10m"). Default 10 minutes.
    #[serde(default)]
    pub cache_ttl: Option<String>,

    /// Class-rep code gating destructive operations (`bunkwise clear`).
    #[serde(default)]
    pub admin_code: Option<String>,
}

impl Config {
    /// The stock first-year timetable written by `bunkwise init`.
    pub fn default_catalog() -> Vec<SubjectSpec> {
        use crate::engine::SessionType::{Practical, Project, Theory};

        let entries: [(&str, SessionType, u32); 11] = [
            ("Engineering Physics", Theory, 2),
            ("Engineering Physics", Practical, 1),
            ("Engineering Graphics", Theory, 3),
            ("Engineering Graphics", Practical, 1),
            ("Foundations of Programming", Theory, 3),
            ("Foundations of Programming", Practical, 2),
            ("Discrete Mathematics with Graph Theory", Theory, 3),
            ("Foundations of Computer Architecture and System Design", Theory, 3),
            ("Foundations of Computer Architecture and System Design", Project, 1),
            ("Yoga - II", Practical, 1),
            ("Foundations of Peace", Theory, 2),
        ];

        entries
            .into_iter()
            .map(|(name, kind, per_week)| SubjectSpec {
                name: name.to_string(),
                kind,
                per_week,
            })
            .collect()
    }
}
