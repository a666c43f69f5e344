pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::leaderboard::{LeaderboardRow, LeaderboardStore, SheetStore};
use crate::nickname::{self, NicknameRng};
use event::{Event, EventHandler};

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();

    let mut events = EventHandler::new(250); // 250ms tick

    // In-flight leaderboard submission, polled from the draw loop
    let mut pending_submit: Option<
        tokio::task::JoinHandle<Result<anyhow::Result<()>, tokio::time::error::Elapsed>>,
    > = None;

    loop {
        // Draw UI
        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        // Handle events
        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        // Launch a queued submission (name was just confirmed)
        if pending_submit.is_none() {
            if let Some(student_name) = app.submit_request.take() {
                match start_submission(&mut app, &student_name).await {
                    Ok(handle) => {
                        pending_submit = Some(handle);
                        app.is_submitting = true;
                    }
                    Err(e) => app.show_flash(format!("Failed to submit: {}", e)),
                }
            }
        }

        // Check if the background submission has completed
        if let Some(handle) = &mut pending_submit {
            if handle.is_finished() {
                let handle = pending_submit.take().unwrap();
                match handle.await {
                    Ok(Ok(Ok(()))) => {
                        let nick = app.snapshot.nickname.clone().unwrap_or_default();
                        app.show_flash(format!("Submitted as {}!", nick));
                    }
                    Ok(Ok(Err(e))) => {
                        app.show_flash(format!("Failed to submit: {}", e));
                    }
                    Ok(Err(_elapsed)) => {
                        app.show_flash("Submission timed out (20s). Try again.".to_string());
                    }
                    Err(e) => {
                        app.show_flash(format!("Submission task panicked: {}", e));
                    }
                }
                app.is_submitting = false;
            }
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    Ok(())
}

/// Build the row for the current aggregate and spawn the store call.
/// The nickname is generated on first submission and persisted so the
/// student keeps the same alias on the board.
async fn start_submission(
    app: &mut App,
    student_name: &str,
) -> anyhow::Result<tokio::task::JoinHandle<Result<anyhow::Result<()>, tokio::time::error::Elapsed>>>
{
    let lb = app
        .config
        .leaderboard
        .clone()
        .ok_or_else(|| anyhow::anyhow!("No leaderboard configured"))?;

    if app.snapshot.nickname.is_none() {
        let mut rng = NicknameRng::from_entropy();
        app.snapshot.nickname = Some(nickname::generate(&mut rng));
        crate::snapshot::save_snapshot(&app.snapshot_path, &app.snapshot)?;
    }
    let nick = app.snapshot.nickname.clone().unwrap_or_default();
    let section = lb.section.clone().unwrap_or_else(|| "Other".to_string());

    let row = LeaderboardRow::from_summary(&nick, student_name, &section, &app.summary);

    // Token is optional for appends; use env or keyring if present, but
    // never prompt while ratatui owns the terminal
    let token = match crate::credentials::get_token_from_env() {
        Some(t) => Some(t),
        None => crate::credentials::get_token().await.ok(),
    };
    let store = SheetStore::new(&lb.url, token)?;

    Ok(tokio::spawn(async move {
        tokio::time::timeout(Duration::from_secs(20), store.append(row)).await
    }))
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => {
            match key.code {
                // Quit
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.should_quit = true
                }

                // Navigation
                KeyCode::Char('j') | KeyCode::Down => app.next_row(),
                KeyCode::Char('k') | KeyCode::Up => app.previous_row(),

                // Edit counts / percent for the selected subject
                KeyCode::Enter | KeyCode::Char('e') => app.start_count_edit(),
                KeyCode::Char('p') => app.start_percent_edit(),

                // Tab switching
                KeyCode::Tab => app.toggle_view(),

                // Submit to leaderboard
                KeyCode::Char('s') => app.start_name_input(),

                // Help
                KeyCode::Char('?') => app.show_help(),

                _ => {}
            }
        }
        app::InputMode::EditPresent | app::InputMode::EditTotal => {
            match key.code {
                KeyCode::Enter => app.confirm_edit_input(),
                KeyCode::Esc => app.cancel_edit(),
                KeyCode::Backspace => {
                    app.input.pop();
                }
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    app.input.push(c);
                }
                // Ignore all other keys (don't propagate to Normal mode)
                _ => {}
            }
        }
        app::InputMode::EditPercent => {
            match key.code {
                KeyCode::Enter => app.confirm_edit_input(),
                KeyCode::Esc => app.cancel_edit(),
                KeyCode::Backspace => {
                    app.input.pop();
                }
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                    app.input.push(c);
                }
                _ => {}
            }
        }
        app::InputMode::NameInput => {
            match key.code {
                KeyCode::Enter => app.confirm_name_input(),
                KeyCode::Esc => app.cancel_name_input(),
                KeyCode::Backspace => {
                    app.name_input.pop();
                }
                KeyCode::Char(c) if c.is_alphanumeric() || c == ' ' || c == '.' || c == '-' => {
                    app.name_input.push(c);
                }
                _ => {}
            }
        }
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}
