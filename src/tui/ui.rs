use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};

use crate::output::formatter::format_pct;
use crate::tui::app::{App, InputMode, View};
use crate::tui::theme;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 8 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Tabs(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    match app.current_view {
        View::Form => render_form(frame, chunks[2], app),
        View::Analysis => render_analysis(frame, chunks[2], app),
    }
    render_status_bar(frame, chunks[3], app);

    // Render overlays based on input mode
    match app.input_mode {
        InputMode::EditPresent | InputMode::EditPercent | InputMode::EditTotal => {
            render_edit_popup(frame, app)
        }
        InputMode::NameInput => render_name_popup(frame, app),
        InputMode::Help => render_help_popup(frame),
        InputMode::Normal => {}
    }

    // Render submitting overlay on top of everything
    if app.is_submitting {
        render_submitting_overlay(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        "Bunkwise",
        Style::default().fg(theme::TITLE_COLOR).bold(),
    )];

    let right = format!(
        "min {:.0}%  ·  {} subjects",
        app.config.min_percent,
        app.subject_count()
    );
    let left_len = "Bunkwise".len();
    let padding_len = (area.width as usize).saturating_sub(left_len + right.len());
    spans.push(Span::raw(" ".repeat(padding_len)));
    spans.push(Span::styled(right, Style::default().fg(theme::MUTED)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles = vec!["Form", "Analysis"];
    let selected = match app.current_view {
        View::Form => 0,
        View::Analysis => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(theme::MUTED))
        .highlight_style(Style::default().fg(theme::TITLE_COLOR).bold().reversed())
        .divider(" | ");

    frame.render_widget(tabs, area);
}

fn render_form(frame: &mut Frame, area: Rect, app: &mut App) {
    if app.analysis.is_empty() {
        let empty_msg = Paragraph::new("No subjects configured")
            .alignment(Alignment::Center)
            .block(Block::default());
        frame.render_widget(empty_msg, area);
        return;
    }

    let min = app.config.min_percent;
    let rows: Vec<Row> = app
        .analysis
        .iter()
        .enumerate()
        .map(|(idx, analysis)| {
            let record = &analysis.record;
            let index = format!("{}.", idx + 1);
            let now = if record.total == 0 {
                Span::styled("--", Style::default().fg(theme::MUTED))
            } else {
                Span::styled(
                    format_pct(analysis.current_pct),
                    Style::default().fg(theme::pct_color(analysis.current_pct, min)),
                )
            };

            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme::ROW_ALT_BG)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(index).style(Style::default().fg(theme::INDEX_COLOR)),
                Cell::from(record.name.clone()),
                Cell::from(record.kind.code()),
                Cell::from(format!("{}", record.per_week)),
                Cell::from(format!("{}", record.present)),
                Cell::from(format!("{}", record.total)),
                Cell::from(Line::from(now)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Subject", "Type", "/wk", "Present", "Total", "Now"])
                .style(theme::HEADER_STYLE)
                .bottom_margin(1),
        )
        .row_highlight_style(theme::ROW_SELECTED);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_analysis(frame: &mut Frame, area: Rect, app: &mut App) {
    if app.analysis.is_empty() {
        let empty_msg = Paragraph::new("No subjects configured")
            .alignment(Alignment::Center)
            .block(Block::default());
        frame.render_widget(empty_msg, area);
        return;
    }

    // Table on top, advisory + overall panel below
    let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(4)]).split(area);

    let min = app.config.min_percent;
    let sim = app.config.simulation.clone();
    let rows: Vec<Row> = app
        .analysis
        .iter()
        .enumerate()
        .map(|(idx, analysis)| {
            let record = &analysis.record;
            let tier_style = Style::default().fg(theme::tier_color(analysis.tier));

            let mut pct_spans = vec![Span::styled(
                format!("{:>7} ", format_pct(analysis.current_pct)),
                tier_style,
            )];
            pct_spans.extend(pct_bar(analysis.current_pct, min, 10).spans);

            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme::ROW_ALT_BG)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(record.key()),
                Cell::from(Line::from(pct_spans)),
                Cell::from(format_pct(analysis.bunk_pct)),
                Cell::from(format_pct(analysis.attend_pct)),
                Cell::from(format!("{}", analysis.safe_bunks)),
                Cell::from(Span::styled(analysis.tier.label(), tier_style)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(19),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(5),
        Constraint::Length(10),
    ];

    let bunk_header = format!("Bunk{}w", sim.bunk_weeks);
    let attend_header = format!("Att{}w", sim.attend_weeks);
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec![
                "Subject",
                "Now",
                bunk_header.as_str(),
                attend_header.as_str(),
                "Safe",
                "Tier",
            ])
            .style(theme::HEADER_STYLE)
            .bottom_margin(1),
        )
        .row_highlight_style(theme::ROW_SELECTED);

    frame.render_stateful_widget(table, chunks[0], &mut app.table_state);

    // Advisory for the selected subject plus the overall line
    let advisory = app
        .selected_analysis()
        .map(|a| a.advisory.clone())
        .unwrap_or_default();
    let overall = format!(
        "Overall {}  ·  {} total safe bunks",
        format_pct(app.summary.overall_pct),
        app.summary.total_safe_bunks
    );

    let panel = Paragraph::new(vec![
        Line::from(Span::styled(advisory, Style::default().fg(theme::MUTED))),
        Line::from(Span::styled(overall, Style::default().bold())),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::bordered());

    frame.render_widget(panel, chunks[1]);
}

/// Bar showing a percentage against the 0..=100 scale, colored by tier
fn pct_bar(pct: f64, min_percent: f64, width: usize) -> Line<'static> {
    let ratio = (pct / 100.0).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let bar_color = theme::pct_color(pct, min_percent);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled("█".repeat(filled), Style::default().fg(bar_color)));
    }
    if empty > 0 {
        spans.push(Span::styled("░".repeat(empty), Style::default().fg(theme::BAR_EMPTY)));
    }

    Line::from(spans)
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let text = if let Some((ref msg, _)) = app.flash_message {
        let msg_color = if msg.starts_with("Failed") || msg.starts_with("Invalid") || msg.contains("error") {
            theme::FLASH_ERROR
        } else if msg.starts_with("Saved") || msg.starts_with("Submitted") {
            theme::FLASH_SUCCESS
        } else {
            Color::White
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints: Vec<(&str, &str)> = match app.input_mode {
            InputMode::Normal => match app.current_view {
                View::Form => vec![
                    ("j/k", ":nav "),
                    ("e", ":edit counts "),
                    ("p", ":edit % "),
                    ("Tab", ":analysis "),
                    ("s", ":submit "),
                    ("?", ":help "),
                    ("q", ":quit"),
                ],
                View::Analysis => vec![
                    ("j/k", ":nav "),
                    ("Tab", ":form "),
                    ("s", ":submit "),
                    ("?", ":help "),
                    ("q", ":quit"),
                ],
            },
            _ => vec![("Enter", ":confirm "), ("Esc", ":cancel")],
        };

        let mut spans = Vec::new();
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(theme::STATUS_KEY_COLOR)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme::STATUS_BAR_BG)),
        area,
    );
}

/// Render the count/percent input popup
fn render_edit_popup(frame: &mut Frame, app: &App) {
    let subject = app
        .selected_analysis()
        .map(|a| a.record.key())
        .unwrap_or_default();
    let title = match app.input_mode {
        InputMode::EditPresent => format!(" Present - {} ", subject),
        InputMode::EditPercent => format!(" Current % - {} ", subject),
        InputMode::EditTotal => format!(" Total - {} ", subject),
        _ => String::new(),
    };

    let popup_area = centered_rect_fixed(46, 5, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered().title(title);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);

    let input_text = format!("{}|", app.input);
    frame.render_widget(Paragraph::new(input_text), chunks[0]);

    let help = Paragraph::new("Enter: confirm | Esc: cancel")
        .style(Style::default().fg(theme::MUTED));
    frame.render_widget(help, chunks[1]);
}

/// Render the student-name input popup for submissions
fn render_name_popup(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(46, 5, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered().title(" Submit - your name ");
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);

    let input_text = format!("{}|", app.name_input);
    frame.render_widget(Paragraph::new(input_text), chunks[0]);

    let help = Paragraph::new("Enter: submit | Esc: cancel")
        .style(Style::default().fg(theme::MUTED));
    frame.render_widget(help, chunks[1]);
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect { x, y, width, height }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame) {
    let popup_area = centered_rect_fixed(52, 14, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered().title(" Keyboard Shortcuts ");
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let key_style = Style::default().fg(Color::Cyan).bold();
    let help_lines = vec![
        Line::from(vec![Span::styled("j / Down      ", key_style), Span::raw("Move down")]),
        Line::from(vec![Span::styled("k / Up        ", key_style), Span::raw("Move up")]),
        Line::from(vec![
            Span::styled("e / Enter     ", key_style),
            Span::raw("Edit present/total counts"),
        ]),
        Line::from(vec![
            Span::styled("p             ", key_style),
            Span::raw("Edit as percent (present is derived)"),
        ]),
        Line::from(vec![
            Span::styled("Tab           ", key_style),
            Span::raw("Toggle Form/Analysis"),
        ]),
        Line::from(vec![
            Span::styled("s             ", key_style),
            Span::raw("Submit overall result to leaderboard"),
        ]),
        Line::from(vec![Span::styled("?             ", key_style), Span::raw("Show/hide this help")]),
        Line::from(vec![Span::styled("q / Ctrl-c    ", key_style), Span::raw("Quit")]),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(theme::MUTED),
        )),
    ];

    frame.render_widget(Paragraph::new(help_lines), inner);
}

/// Render the submission spinner overlay
fn render_submitting_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(30, 3, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered();
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    // Braille spinner animation
    let spinner_chars = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let spinner = spinner_chars[app.spinner_frame % 10];

    let text = format!("{} Submitting...", spinner);
    let loading_text = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(loading_text, inner);
}
