//! Transport bar widget - tempo, listening state, beat position and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::View;

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

fn flag(name: &str, on: bool) -> Span<'static> {
    Span::styled(
        format!("{name} {}  ", if on { "on" } else { "off" }),
        Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
    )
}

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, view: &View, audio_stats: &AudioStats) {
    let block = Block::default().title(" tonewalk ").borders(Borders::ALL);

    let (symbol, state) = if view.listening {
        ("▶", "Listening")
    } else {
        ("⏸", "Muted")
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" BPM: {:.0}  ", view.tempo),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{symbol} {state}  "),
            Style::default().fg(if view.listening {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!("{}  ", view.position),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("step {}  queued {}  ", view.beat.step, view.queued),
            Style::default().fg(Color::DarkGray),
        ),
        flag("multiplayer", view.multiplayer),
        flag("proximity", view.proximity),
        Span::styled(
            format!("{:.1}kHz  ", view.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
