use std::collections::HashSet;

use super::schema::Config;

/// Validate the configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if !(50.0..=100.0).contains(&config.min_percent) {
        errors.push(format!(
            "min_percent: must be between 50 and 100, got {}",
            config.min_percent
        ));
    }

    if config.simulation.bunk_weeks < 1 {
        errors.push("simulation.bunk_weeks: must be at least 1".to_string());
    }
    if config.simulation.attend_weeks < 1 {
        errors.push("simulation.attend_weeks: must be at least 1".to_string());
    }

    if config.subjects.is_empty() {
        errors.push("subjects: at least one subject is required".to_string());
    }

    let mut seen = HashSet::new();
    for (i, subject) in config.subjects.iter().enumerate() {
        if subject.name.trim().is_empty() {
            errors.push(format!("subjects[{}].name: must not be empty", i));
        }
        if subject.per_week < 1 {
            errors.push(format!(
                "subjects[{}].per_week: must be at least 1 (subject '{}')",
                i, subject.name
            ));
        }
        if !seen.insert(subject.key()) {
            errors.push(format!(
                "subjects[{}]: duplicate entry '{}'",
                i,
                subject.key()
            ));
        }
    }

    if let Some(ref lb) = config.leaderboard {
        if lb.url.trim().is_empty() {
            errors.push("leaderboard.url: must not be empty".to_string());
        }
        if let Some(ref ttl) = lb.cache_ttl {
            if let Err(e) = humantime::parse_duration(ttl) {
                errors.push(format!("leaderboard.cache_ttl: invalid duration '{}' - {}", ttl, e));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
