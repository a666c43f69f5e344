//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

use crate::engine::RiskTier;

pub const TITLE_COLOR: Color = Color::Cyan;
pub const MUTED: Color = Color::Gray;

pub const ROW_ALT_BG: Color = Color::Indexed(235);
pub const INDEX_COLOR: Color = Color::DarkGray;

pub const HEADER_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);
pub const ROW_SELECTED: Style = Style::new().add_modifier(Modifier::REVERSED);

pub const STATUS_BAR_BG: Color = Color::Indexed(236);
pub const STATUS_KEY_COLOR: Color = Color::Cyan;
pub const FLASH_SUCCESS: Color = Color::Green;
pub const FLASH_ERROR: Color = Color::Red;

pub const BAR_EMPTY: Color = Color::DarkGray;

/// Traffic-light color for a risk tier
pub fn tier_color(tier: RiskTier) -> Color {
    match tier {
        RiskTier::Safe => Color::Green,
        RiskTier::Borderline => Color::Yellow,
        RiskTier::Danger => Color::Red,
    }
}

/// Color for a raw percentage against the configured minimum
pub fn pct_color(pct: f64, min_percent: f64) -> Color {
    tier_color(crate::engine::classify_risk(pct, min_percent))
}
