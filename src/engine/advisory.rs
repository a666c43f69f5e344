use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Margin (in percentage points) above the required minimum that still
/// counts as comfortable. Sitting inside this band is BORDERLINE.
pub const SAFE_MARGIN: f64 = 8.0;

/// How a subject's sessions are held. Practical and project sessions carry
/// stricter attendance policies than theory lectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    #[serde(rename = "TH")]
    Theory,
    #[serde(rename = "PR")]
    Practical,
    #[serde(rename = "PJ")]
    Project,
}

impl SessionType {
    pub fn code(&self) -> &'static str {
        match self {
            SessionType::Theory => "TH",
            SessionType::Practical => "PR",
            SessionType::Project => "PJ",
        }
    }

    /// Practical and project sessions have no attendance slack.
    pub fn is_strict(&self) -> bool {
        matches!(self, SessionType::Practical | SessionType::Project)
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TH" => Ok(SessionType::Theory),
            "PR" => Ok(SessionType::Practical),
            "PJ" => Ok(SessionType::Project),
            other => Err(format!("unknown session type '{}' (expected TH, PR or PJ)", other)),
        }
    }
}

/// Three-tier risk classification for a current attendance percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskTier {
    Safe,
    Borderline,
    Danger,
}

impl RiskTier {
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Safe => "SAFE",
            RiskTier::Borderline => "BORDERLINE",
            RiskTier::Danger => "DANGER",
        }
    }

    /// Severity weight; higher is better.
    pub fn severity(&self) -> f64 {
        match self {
            RiskTier::Safe => 1.0,
            RiskTier::Borderline => 0.6,
            RiskTier::Danger => 0.2,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a current percentage against the required minimum.
/// Tiers are checked most-safe first; the first match wins.
pub fn classify_risk(current_pct: f64, min_percent: f64) -> RiskTier {
    if current_pct >= min_percent + SAFE_MARGIN {
        RiskTier::Safe
    } else if current_pct >= min_percent {
        RiskTier::Borderline
    } else {
        RiskTier::Danger
    }
}

/// Compose the advisory line for one subject.
///
/// Base message from the risk tier, then a warning when the bunk-scenario
/// projection falls under the minimum, then a strictness note for
/// practical/project sessions. Each clause is appended independently
/// whenever its predicate holds; none of them suppresses the others.
pub fn advisory_message(
    current_pct: f64,
    simulated_pct: f64,
    min_percent: f64,
    kind: SessionType,
) -> String {
    let mut msg = match classify_risk(current_pct, min_percent) {
        RiskTier::Safe => "Comfortable margin. One bunk a week stays safe.".to_string(),
        RiskTier::Borderline => "Safe zone, barely. Keep bunks under control.".to_string(),
        RiskTier::Danger => "Danger! Attend everything for the next two weeks.".to_string(),
    };

    if simulated_pct < min_percent {
        msg.push_str(" Bunking the coming weeks puts you under the minimum.");
    }
    if kind.is_strict() {
        msg.push_str(" Practical sessions are strict, zero slack.");
    }

    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        // min 80: 88 is SAFE, 80 is BORDERLINE, 79.9 is DANGER
        assert_eq!(classify_risk(88.0, 80.0), RiskTier::Safe);
        assert_eq!(classify_risk(80.0, 80.0), RiskTier::Borderline);
        assert_eq!(classify_risk(79.9, 80.0), RiskTier::Danger);
    }

    #[test]
    fn test_tier_just_under_margin() {
        assert_eq!(classify_risk(87.9, 80.0), RiskTier::Borderline);
    }

    #[test]
    fn test_severity_weights() {
        assert_eq!(RiskTier::Safe.severity(), 1.0);
        assert_eq!(RiskTier::Borderline.severity(), 0.6);
        assert_eq!(RiskTier::Danger.severity(), 0.2);
    }

    #[test]
    fn test_advisory_base_only() {
        let msg = advisory_message(90.0, 85.0, 80.0, SessionType::Theory);
        assert!(msg.starts_with("Comfortable margin"));
        assert!(!msg.contains("under the minimum"));
        assert!(!msg.contains("zero slack"));
    }

    #[test]
    fn test_advisory_simulation_warning_appended() {
        let msg = advisory_message(82.0, 76.0, 80.0, SessionType::Theory);
        assert!(msg.starts_with("Safe zone"));
        assert!(msg.contains("under the minimum"));
    }

    #[test]
    fn test_advisory_strict_clause_appended() {
        let msg = advisory_message(90.0, 85.0, 80.0, SessionType::Practical);
        assert!(msg.contains("zero slack"));
    }

    #[test]
    fn test_advisory_clauses_compose_in_order() {
        // Danger base + sim warning + strict clause all present, in order
        let msg = advisory_message(70.0, 65.0, 80.0, SessionType::Project);
        let danger = msg.find("Danger!").unwrap();
        let sim = msg.find("under the minimum").unwrap();
        let strict = msg.find("zero slack").unwrap();
        assert!(danger < sim && sim < strict);
    }

    #[test]
    fn test_session_type_parse() {
        assert_eq!("TH".parse::<SessionType>().unwrap(), SessionType::Theory);
        assert_eq!("pr".parse::<SessionType>().unwrap(), SessionType::Practical);
        assert_eq!("Pj".parse::<SessionType>().unwrap(), SessionType::Project);
        assert!("LAB".parse::<SessionType>().is_err());
    }

    #[test]
    fn test_strictness() {
        assert!(!SessionType::Theory.is_strict());
        assert!(SessionType::Practical.is_strict());
        assert!(SessionType::Project.is_strict());
    }
}
