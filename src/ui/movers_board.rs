//! Movers board screen rendering
//!
//! Renders the top gainers and top losers side by side, with the current
//! selection, any symbol marked for comparison, and a status bar showing
//! where the data came from (live, cached, or stale fallback).

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::Mover;

/// Color for a percentage move (green up, red down)
fn change_color(pct: f64) -> Color {
    if pct > 0.0 {
        Color::Green
    } else if pct < 0.0 {
        Color::Red
    } else {
        Color::Gray
    }
}

/// Formats a percentage move with an explicit sign
fn format_pct(pct: f64) -> String {
    format!("{:+.2}%", pct)
}

/// Formats a price in dollars
fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Truncates a company name to fit a column
fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let cut: String = name.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Builds one display row for a mover
fn mover_line(mover: &Mover, selected: bool, picked: bool) -> Line<'static> {
    let marker = if picked { "» " } else { "  " };
    let base = if selected {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::styled(marker.to_string(), base.fg(Color::Cyan)),
        Span::styled(format!("{:<7}", mover.symbol), base.fg(Color::White)),
        Span::styled(format!("{:<22}", truncate_name(&mover.name, 20)), base),
        Span::styled(format!("{:>10}", format_price(mover.price)), base),
        Span::styled(
            format!("{:>9}", format_pct(mover.changes_percentage)),
            base.fg(change_color(mover.changes_percentage)),
        ),
    ])
}

/// Renders one side of the board (gainers or losers)
fn render_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    movers: &[&Mover],
    selected: Option<usize>,
    picked: &Option<String>,
) {
    let mut lines = Vec::with_capacity(movers.len());
    for (i, mover) in movers.iter().enumerate() {
        let is_picked = picked.as_deref() == Some(mover.symbol.as_str());
        lines.push(mover_line(mover, selected == Some(i), is_picked));
    }

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Builds the provenance label for the status bar
fn provenance_span(app: &App) -> Span<'static> {
    match &app.board {
        Some(board) if board.stale => Span::styled(
            "STALE (provider unavailable, showing last known data)",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Some(board) if board.from_cache => {
            Span::styled("cached", Style::default().fg(Color::DarkGray))
        }
        Some(_) => Span::styled("live", Style::default().fg(Color::Green)),
        None => Span::styled("no data", Style::default().fg(Color::DarkGray)),
    }
}

/// Renders the movers board view
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(2),
        ])
        .split(frame.area());

    // Title bar
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            "Market Movers",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        provenance_span(app),
    ]));
    frame.render_widget(title, chunks[0]);

    // Gainers and losers side by side
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let (gainers, losers) = match &app.board {
        Some(board) => (
            board.value.top_gainers.iter().collect::<Vec<_>>(),
            board.value.top_losers.iter().collect::<Vec<_>>(),
        ),
        None => (Vec::new(), Vec::new()),
    };

    // The selection index runs across gainers first, then losers
    let gainer_count = gainers.len();
    let (sel_gainer, sel_loser) = if app.selected_index < gainer_count {
        (Some(app.selected_index), None)
    } else {
        (None, Some(app.selected_index - gainer_count))
    };

    render_list(frame, columns[0], "Top Gainers", &gainers, sel_gainer, &app.pick);
    render_list(frame, columns[1], "Top Losers", &losers, sel_loser, &app.pick);

    // Status bar: message (if any) plus key hints
    let mut status_lines = Vec::new();
    if let Some(message) = &app.status {
        status_lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(pick) = &app.pick {
        status_lines.push(Line::from(Span::styled(
            format!("Comparing {} with… (pick a second symbol)", pick),
            Style::default().fg(Color::Cyan),
        )));
    } else if let Some(refreshed) = app.last_refresh {
        status_lines.push(Line::from(Span::styled(
            format!("Updated {}", refreshed.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        )));
    }
    status_lines.push(Line::from(Span::styled(
        "↑↓ select · Enter mark/compare · r refresh · ? help · q quit",
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(status_lines), chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_color_by_sign() {
        assert_eq!(change_color(3.2), Color::Green);
        assert_eq!(change_color(-0.1), Color::Red);
        assert_eq!(change_color(0.0), Color::Gray);
    }

    #[test]
    fn test_format_pct_has_explicit_sign() {
        assert_eq!(format_pct(4.879), "+4.88%");
        assert_eq!(format_pct(-12.5), "-12.50%");
        assert_eq!(format_pct(0.0), "+0.00%");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(231.5), "$231.50");
        assert_eq!(format_price(0.071), "$0.07");
    }

    #[test]
    fn test_truncate_name_short_unchanged() {
        assert_eq!(truncate_name("Apple Inc.", 20), "Apple Inc.");
    }

    #[test]
    fn test_truncate_name_long_gets_ellipsis() {
        let truncated = truncate_name("Very Long Corporation Name Holdings Ltd", 20);
        assert!(truncated.chars().count() <= 20);
        assert!(truncated.ends_with('…'));
    }
}
