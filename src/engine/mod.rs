pub mod advisory;
pub mod projection;
pub mod summary;

pub use advisory::{advisory_message, classify_risk, RiskTier, SessionType, SAFE_MARGIN};
pub use projection::{
    end_of_term_projection, percentage, present_from_percent, safe_bunk_budget, simulate_weeks,
};
pub use summary::{aggregate, analyze_subject, OverallSummary, SubjectAnalysis, SubjectRecord};
