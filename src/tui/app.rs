use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::engine::{
    aggregate, analyze_subject, present_from_percent, OverallSummary, SubjectAnalysis,
};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Form,
    Analysis,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    /// Entering the present count for the selected subject
    EditPresent,
    /// Entering a percent-only figure instead of a present count
    EditPercent,
    /// Entering the total count (second step of either edit flow)
    EditTotal,
    /// Entering the student name ahead of a leaderboard submission
    NameInput,
    Help,
}

/// First edit step staged while the total is being typed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingEdit {
    None,
    Present(u32),
    Percent(f64),
}

pub struct App {
    pub config: Config,
    pub snapshot: Snapshot,
    pub snapshot_path: PathBuf,
    pub table_state: ratatui::widgets::TableState,
    pub current_view: View,
    pub input_mode: InputMode,
    pub input: String,
    pub pending_edit: PendingEdit,
    pub name_input: String,
    pub analysis: Vec<SubjectAnalysis>,
    pub summary: OverallSummary,
    pub flash_message: Option<(String, Instant)>,
    /// Student name queued for submission; the run loop takes it and
    /// spawns the store call so the form never blocks.
    pub submit_request: Option<String>,
    pub is_submitting: bool,
    pub spinner_frame: usize,
    pub should_quit: bool,
    pub verbose: bool,
}

impl App {
    pub fn new(config: Config, snapshot: Snapshot, snapshot_path: PathBuf, verbose: bool) -> Self {
        let mut table_state = ratatui::widgets::TableState::default();
        if !config.subjects.is_empty() {
            table_state.select(Some(0));
        }

        let mut app = Self {
            config,
            snapshot,
            snapshot_path,
            table_state,
            current_view: View::Form,
            input_mode: InputMode::Normal,
            input: String::new(),
            pending_edit: PendingEdit::None,
            name_input: String::new(),
            analysis: Vec::new(),
            summary: OverallSummary {
                overall_pct: 0.0,
                total_safe_bunks: 0,
            },
            flash_message: None,
            submit_request: None,
            is_submitting: false,
            spinner_frame: 0,
            should_quit: false,
            verbose,
        };
        app.recompute();
        app
    }

    /// Re-run the engine over the current snapshot. Cheap enough to call
    /// after every edit.
    pub fn recompute(&mut self) {
        let records = self.snapshot.records(&self.config.subjects);
        let sim = &self.config.simulation;
        self.analysis = records
            .iter()
            .map(|r| analyze_subject(r, self.config.min_percent, sim.bunk_weeks, sim.attend_weeks))
            .collect();
        self.summary = aggregate(&records, self.config.min_percent);
    }

    pub fn subject_count(&self) -> usize {
        self.config.subjects.len()
    }

    pub fn next_row(&mut self) {
        let len = self.subject_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.subject_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_analysis(&self) -> Option<&SubjectAnalysis> {
        self.table_state.selected().and_then(|i| self.analysis.get(i))
    }

    pub fn toggle_view(&mut self) {
        self.current_view = match self.current_view {
            View::Form => View::Analysis,
            View::Analysis => View::Form,
        };
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    /// Start the present/total edit flow for the selected subject
    pub fn start_count_edit(&mut self) {
        if self.table_state.selected().is_some() {
            self.input_mode = InputMode::EditPresent;
            self.input.clear();
            self.pending_edit = PendingEdit::None;
        }
    }

    /// Start the percent-only edit flow for the selected subject
    pub fn start_percent_edit(&mut self) {
        if self.table_state.selected().is_some() {
            self.input_mode = InputMode::EditPercent;
            self.input.clear();
            self.pending_edit = PendingEdit::None;
        }
    }

    /// Confirm the current input step. Present/percent stage the value and
    /// advance to the total; the total commits the edit to the snapshot.
    pub fn confirm_edit_input(&mut self) {
        match self.input_mode {
            InputMode::EditPresent => match self.input.parse::<u32>() {
                Ok(present) => {
                    self.pending_edit = PendingEdit::Present(present);
                    self.input_mode = InputMode::EditTotal;
                    self.input.clear();
                }
                Err(_) => {
                    self.show_flash(format!("Invalid count: '{}'", self.input));
                    self.cancel_edit();
                }
            },
            InputMode::EditPercent => match self.input.parse::<f64>() {
                Ok(percent) if (0.0..=100.0).contains(&percent) => {
                    self.pending_edit = PendingEdit::Percent(percent);
                    self.input_mode = InputMode::EditTotal;
                    self.input.clear();
                }
                _ => {
                    self.show_flash(format!("Invalid percent: '{}'", self.input));
                    self.cancel_edit();
                }
            },
            InputMode::EditTotal => {
                let total = match self.input.parse::<u32>() {
                    Ok(t) => t,
                    Err(_) => {
                        self.show_flash(format!("Invalid count: '{}'", self.input));
                        self.cancel_edit();
                        return;
                    }
                };
                let present = match self.pending_edit {
                    PendingEdit::Present(p) => p,
                    PendingEdit::Percent(pct) => present_from_percent(pct, total),
                    PendingEdit::None => {
                        self.cancel_edit();
                        return;
                    }
                };
                self.commit_counts(present, total);
            }
            _ => {}
        }
    }

    fn commit_counts(&mut self, present: u32, total: u32) {
        let key = match self
            .table_state
            .selected()
            .and_then(|i| self.config.subjects.get(i))
        {
            Some(spec) => spec.key(),
            None => {
                self.cancel_edit();
                return;
            }
        };

        self.snapshot.record(key.clone(), present, total);

        if let Err(e) = crate::snapshot::save_snapshot(&self.snapshot_path, &self.snapshot) {
            self.show_flash(format!("Failed to save snapshot: {}", e));
        } else if present > total {
            // Surfaced, not clamped; the form just points it out
            self.show_flash(format!("Saved {} = {}/{} (present exceeds total?)", key, present, total));
        } else {
            self.show_flash(format!("Saved {} = {}/{}", key, present, total));
        }

        self.recompute();
        self.input_mode = InputMode::Normal;
        self.input.clear();
        self.pending_edit = PendingEdit::None;
    }

    pub fn cancel_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
        self.pending_edit = PendingEdit::None;
    }

    /// Start the submission flow (asks for the student name first)
    pub fn start_name_input(&mut self) {
        if self.config.leaderboard.is_none() {
            self.show_flash("No leaderboard configured. Add one with `bunkwise init`.".to_string());
            return;
        }
        if self.is_submitting {
            self.show_flash("A submission is already in flight.".to_string());
            return;
        }
        self.input_mode = InputMode::NameInput;
        self.name_input.clear();
    }

    pub fn confirm_name_input(&mut self) {
        let name = self.name_input.trim().to_string();
        if name.is_empty() {
            self.show_flash("Please enter your name before submitting.".to_string());
            return;
        }
        self.submit_request = Some(name);
        self.input_mode = InputMode::Normal;
        self.name_input.clear();
    }

    pub fn cancel_name_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.name_input.clear();
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SimulationConfig, SubjectSpec};
    use crate::engine::SessionType;

    fn test_app() -> App {
        let config = Config {
            min_percent: 80.0,
            simulation: SimulationConfig::default(),
            subjects: vec![
                SubjectSpec {
                    name: "Engineering Physics".to_string(),
                    kind: SessionType::Theory,
                    per_week: 2,
                },
                SubjectSpec {
                    name: "Engineering Physics".to_string(),
                    kind: SessionType::Practical,
                    per_week: 1,
                },
            ],
            leaderboard: None,
        };
        let path = std::env::temp_dir().join("bunkwise_tui_test_snapshot.json");
        let _ = std::fs::remove_file(&path);
        App::new(config, Snapshot::new(), path, false)
    }

    #[test]
    fn test_initial_state_selects_first_subject() {
        let app = test_app();
        assert_eq!(app.table_state.selected(), Some(0));
        assert_eq!(app.analysis.len(), 2);
        assert_eq!(app.summary.overall_pct, 0.0);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = test_app();
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(1));
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(0));
        app.previous_row();
        assert_eq!(app.table_state.selected(), Some(1));
    }

    #[test]
    fn test_count_edit_flow_commits_and_recomputes() {
        let mut app = test_app();
        app.start_count_edit();
        assert_eq!(app.input_mode, InputMode::EditPresent);

        app.input.push_str("18");
        app.confirm_edit_input();
        assert_eq!(app.input_mode, InputMode::EditTotal);
        assert_eq!(app.pending_edit, PendingEdit::Present(18));

        app.input.push_str("20");
        app.confirm_edit_input();
        assert_eq!(app.input_mode, InputMode::Normal);

        let counts = app.snapshot.counts_for("Engineering Physics (TH)");
        assert_eq!((counts.present, counts.total), (18, 20));
        assert_eq!(app.analysis[0].current_pct, 90.0);
        assert!(app.summary.overall_pct > 0.0);

        let _ = std::fs::remove_file(&app.snapshot_path);
    }

    #[test]
    fn test_percent_edit_back_fills_present() {
        let mut app = test_app();
        app.start_percent_edit();
        app.input.push_str("85");
        app.confirm_edit_input();
        assert_eq!(app.pending_edit, PendingEdit::Percent(85.0));

        app.input.push_str("40");
        app.confirm_edit_input();

        let counts = app.snapshot.counts_for("Engineering Physics (TH)");
        assert_eq!((counts.present, counts.total), (34, 40));

        let _ = std::fs::remove_file(&app.snapshot_path);
    }

    #[test]
    fn test_invalid_input_cancels_edit() {
        let mut app = test_app();
        app.start_count_edit();
        app.input.push_str("abc");
        app.confirm_edit_input();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.flash_message.is_some());
        assert!(app.snapshot.counts.is_empty());
    }

    #[test]
    fn test_submit_without_leaderboard_flashes() {
        let mut app = test_app();
        app.start_name_input();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.flash_message.as_ref().unwrap().0.contains("No leaderboard"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut app = test_app();
        app.config.leaderboard = Some(crate::config::LeaderboardConfig {
            url: "https://bridge.example.com".to_string(),
            section: None,
            browse_url: None,
            cache_ttl: None,
            admin_code: None,
        });
        app.start_name_input();
        assert_eq!(app.input_mode, InputMode::NameInput);

        app.name_input.push_str("   ");
        app.confirm_name_input();
        assert_eq!(app.input_mode, InputMode::NameInput);
        assert!(app.submit_request.is_none());

        app.name_input.clear();
        app.name_input.push_str("Rahul Sharma");
        app.confirm_name_input();
        assert_eq!(app.submit_request.as_deref(), Some("Rahul Sharma"));
    }
}
