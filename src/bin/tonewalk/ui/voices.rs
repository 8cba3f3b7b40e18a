//! Voices and connectors panels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::View;

/// Width of the level meter in characters.
const METER_WIDTH: usize = 12;

fn meter(level: f32) -> String {
    // 0.15 is the loudest a single voice gets
    let filled = ((level / 0.15) * METER_WIDTH as f32).round().clamp(0.0, METER_WIDTH as f32) as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(METER_WIDTH - filled))
}

/// Live voices with their level, plus the current selection.
pub fn render_voices(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().title(" Voices ").borders(Borders::ALL);

    let mut lines = vec![Line::from(vec![
        Span::styled("selected: ", Style::default().fg(Color::DarkGray)),
        Span::styled(view.selection.join(", "), Style::default().fg(Color::Yellow)),
    ])];

    if view.voices.is_empty() {
        lines.push(Line::from(Span::styled(
            "  (silent)",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for voice in &view.voices {
        let pitch = if voice.frequency == 0.0 {
            "rest".to_string()
        } else {
            format!("{:7.2}Hz", voice.frequency)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<14}", voice.key), Style::default().fg(Color::White)),
            Span::styled(format!("{pitch:>10} "), Style::default().fg(Color::Cyan)),
            Span::styled(format!("{:<9}", voice.waveform.as_str()), Style::default().fg(Color::DarkGray)),
            Span::styled(meter(voice.target), Style::default().fg(Color::Green)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Connectors with their counters.
pub fn render_edges(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().title(" Connectors ").borders(Borders::ALL);

    let lines: Vec<Line> = view
        .edges
        .iter()
        .map(|edge| {
            let travelling = edge.label.contains(':');
            Line::from(vec![
                Span::raw(format!("{:>6} → {:<6} ", edge.start, edge.end)),
                Span::styled(
                    format!("[{}]", edge.label),
                    Style::default().fg(if travelling {
                        Color::Magenta
                    } else {
                        Color::DarkGray
                    }),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
