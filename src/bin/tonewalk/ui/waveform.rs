//! Output level strip

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Sparkline},
    Frame,
};

/// Mixed voices rarely get near full scale; this is the top of the strip.
const FULL_SCALE: f32 = 0.5;

/// Bar height resolution.
const STEPS: f32 = 100.0;

/// Peak level of each column's share of the buffer, scaled to `STEPS`.
fn column_peaks(samples: &[f32], columns: usize) -> Vec<u64> {
    if samples.is_empty() || columns == 0 {
        return Vec::new();
    }
    let per_column = samples.len().div_ceil(columns);
    samples
        .chunks(per_column)
        .map(|chunk| {
            let peak = chunk.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
            ((peak / FULL_SCALE).min(1.0) * STEPS).round() as u64
        })
        .collect()
}

/// Render the mixer output as a rolling peak meter
pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32], rendering: usize) {
    let columns = area.width.saturating_sub(2) as usize;
    let peaks = column_peaks(audio_buffer, columns);

    let block = Block::default()
        .title(format!(" Output ({rendering} voices) "))
        .borders(Borders::ALL);
    let strip = Sparkline::default()
        .block(block)
        .data(&peaks)
        .max(STEPS as u64)
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(strip, area);
}
