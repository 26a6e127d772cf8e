//! Comparison chart screen rendering
//!
//! Renders two symbols' rebased performance series on a single chart. Both
//! series start at 100 on the earliest shared trading day, so the vertical
//! axis reads as "percent of starting value".

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::{App, Comparison};
use crate::compare::AlignedPoint;

/// Chart color for series A
const SERIES_A_COLOR: Color = Color::Cyan;

/// Chart color for series B
const SERIES_B_COLOR: Color = Color::Magenta;

/// Computes padded y-axis bounds covering both series
fn y_bounds(points: &[AlignedPoint]) -> [f64; 2] {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for point in points {
        min = min.min(point.a).min(point.b);
        max = max.max(point.a).max(point.b);
    }
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 200.0];
    }
    // 5% headroom so lines don't hug the frame
    let pad = ((max - min) * 0.05).max(1.0);
    [min - pad, max + pad]
}

/// Builds x-axis date labels: first, middle, and last shared day
fn x_labels(points: &[AlignedPoint]) -> Vec<String> {
    match points.len() {
        0 => Vec::new(),
        1 => vec![points[0].date.format("%Y-%m-%d").to_string()],
        n => vec![
            points[0].date.format("%Y-%m-%d").to_string(),
            points[n / 2].date.format("%Y-%m-%d").to_string(),
            points[n - 1].date.format("%Y-%m-%d").to_string(),
        ],
    }
}

/// Formats a series' net move since the base day, e.g. "+23.4%"
fn net_move(points: &[AlignedPoint], pick_a: bool) -> String {
    match points.last() {
        Some(last) => {
            let value = if pick_a { last.a } else { last.b };
            format!("{:+.1}%", value - 100.0)
        }
        None => "n/a".to_string(),
    }
}

/// Renders the comparison view
pub fn render(frame: &mut Frame, app: &App) {
    let Some(comparison) = &app.comparison else {
        let placeholder = Paragraph::new("No comparison loaded. Press Esc to go back.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(placeholder, frame.area());
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(2),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], comparison);
    render_chart(frame, chunks[1], comparison);

    let hints = Paragraph::new(Line::from(Span::styled(
        "Esc back · q quit · ? help",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(hints, chunks[2]);
}

/// Renders the header line: legend, net moves, and staleness warning
fn render_header(frame: &mut Frame, area: ratatui::layout::Rect, comparison: &Comparison) {
    let mut spans = vec![
        Span::styled(
            comparison.symbol_a.clone(),
            Style::default().fg(SERIES_A_COLOR).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", net_move(&comparison.points, true)),
            Style::default().fg(SERIES_A_COLOR),
        ),
        Span::raw("  vs  "),
        Span::styled(
            comparison.symbol_b.clone(),
            Style::default().fg(SERIES_B_COLOR).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", net_move(&comparison.points, false)),
            Style::default().fg(SERIES_B_COLOR),
        ),
        Span::styled(
            format!("  ({} shared trading days)", comparison.points.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if comparison.stale {
        spans.push(Span::styled(
            "  STALE DATA",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders the rebased line chart itself
fn render_chart(frame: &mut Frame, area: ratatui::layout::Rect, comparison: &Comparison) {
    let data_a: Vec<(f64, f64)> = comparison
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.a))
        .collect();
    let data_b: Vec<(f64, f64)> = comparison
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.b))
        .collect();

    let datasets = vec![
        Dataset::default()
            .name(comparison.symbol_a.as_str())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(SERIES_A_COLOR))
            .data(&data_a),
        Dataset::default()
            .name(comparison.symbol_b.as_str())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(SERIES_B_COLOR))
            .data(&data_b),
    ];

    let x_max = (comparison.points.len().saturating_sub(1)).max(1) as f64;
    let bounds = y_bounds(&comparison.points);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Performance, rebased to 100 ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, x_max])
                .labels(x_labels(&comparison.points).into_iter().map(Line::from)),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds(bounds)
                .labels([
                    Line::from(format!("{:.0}", bounds[0])),
                    Line::from("100".to_string()),
                    Line::from(format!("{:.0}", bounds[1])),
                ]),
        );

    frame.render_widget(chart, area);
}
