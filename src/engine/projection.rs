//! Pure attendance arithmetic. Every function here is total over its
//! numeric domain: zero totals short-circuit to 0 instead of dividing,
//! and nothing clamps a percentage to 100 (over-100 input is surfaced
//! as entered so data-entry mistakes stay visible).

/// Attendance percentage for `present` out of `total` sessions.
/// Returns 0 when no sessions have been held yet.
pub fn percentage(present: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(present) / f64::from(total) * 100.0
}

/// Back-fill a present count from a percent-only entry
/// ("I'm at 85% out of roughly 40 classes").
pub fn present_from_percent(percent: f64, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (percent.max(0.0) / 100.0 * f64::from(total)).round() as u32
}

/// Maximum number of additional sessions that can be skipped (total grows,
/// present stays fixed) while the percentage stays at or above `min_percent`.
///
/// Largest `b >= 0` with `present / (total + b) >= min_percent / 100`,
/// i.e. `floor(present / (min_percent/100)) - total`, clamped at zero.
/// No history (`total == 0`) means no budget to project from.
pub fn safe_bunk_budget(present: u32, total: u32, min_percent: f64) -> u32 {
    if total == 0 || min_percent <= 0.0 {
        return 0;
    }
    let reachable_total = (f64::from(present) / (min_percent / 100.0)).floor();
    let budget = reachable_total - f64::from(total);
    if budget > 0.0 {
        budget as u32
    } else {
        0
    }
}

/// Project the percentage after `weeks` more weeks of classes.
///
/// `per_week * weeks` new sessions occur. With `attend_all` every one of
/// them is attended; without it every one is skipped. There is no partial
/// attendance rate in between -- this is a two-point simulation.
pub fn simulate_weeks(present: u32, total: u32, per_week: u32, weeks: u32, attend_all: bool) -> f64 {
    let add = per_week * weeks;
    let new_present = if attend_all { present + add } else { present };
    percentage(new_present, total + add)
}

/// Best-effort recovery projection: attend every remaining session until
/// the end of term.
pub fn end_of_term_projection(present: u32, total: u32, per_week: u32, weeks_remaining: u32) -> f64 {
    simulate_weeks(present, total, per_week, weeks_remaining, true)
}
