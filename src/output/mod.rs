pub mod formatter;

pub use formatter::{
    format_analysis_table, format_history, format_leaderboard_table, format_pct,
    format_subject_detail, should_use_colors,
};
