//! TUI module for tonewalk
//!
//! Owns the client loop: the look-ahead interval drives `wake`, every redraw
//! drives `frame`.

pub mod state;
mod transport;
mod voices;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::time::{Duration, Instant};
use tonewalk::{engine::Interval, host::Session, protocol::Vector};
use tracing::{info, warn};

use crate::demo::ADA;

pub use state::{TerminalClient, View};

use transport::{render_transport, AudioStats};
use voices::{render_edges, render_voices};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

/// Display cadence, about 60 fps.
const FRAME: Duration = Duration::from_millis(16);

/// Canvas units the listener moves per arrow key.
const NUDGE: f32 = 50.0;

const TEMPO_STEP: f64 = 5.0;
const MIN_TEMPO: f64 = 20.0;

/// UI application state
pub struct UiApp {
    client: TerminalClient,
    wake: Interval,
    /// Ring buffer receiver for audio samples
    audio_rx: Consumer<f32>,
    /// Audio sample buffer for visualization
    audio_buffer: Vec<f32>,
    /// The other player while they are away from the canvas.
    away: Option<Session>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(client: TerminalClient, lookahead: Duration, audio_rx: Consumer<f32>) -> Self {
        Self {
            client,
            wake: Interval::new(lookahead),
            audio_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            away: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            if self.wake.poll(Instant::now()) {
                self.client.wake();
            }
            self.client.frame();

            self.poll_audio();

            let view = View::capture(&self.client);
            terminal.draw(|frame| self.render(frame, &view))?;

            // Sleep until the next wake-up or redraw, whichever comes first
            let timeout = self.wake.remaining(Instant::now()).min(FRAME);
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.client.set_listening(false);
        Ok(())
    }

    /// Poll for new audio samples from ring buffer
    fn poll_audio(&mut self) {
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                self.client.toggle_listening();
            }
            KeyCode::Char('m') => {
                let enabled = !self.client.presence().multiplayer;
                self.client.set_multiplayer(enabled);
            }
            KeyCode::Char('p') => {
                let enabled = !self.client.presence().proximity;
                self.client.set_proximity(enabled);
            }
            KeyCode::Char('a') => self.toggle_ada(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.change_tempo(TEMPO_STEP),
            KeyCode::Char('-') => self.change_tempo(-TEMPO_STEP),
            KeyCode::Left => self.nudge(-NUDGE, 0.0),
            KeyCode::Right => self.nudge(NUDGE, 0.0),
            KeyCode::Up => self.nudge(0.0, -NUDGE),
            KeyCode::Down => self.nudge(0.0, NUDGE),
            _ => {}
        }
    }

    fn change_tempo(&mut self, delta: f64) {
        let tempo = (self.client.scheduler().tempo() + delta).max(MIN_TEMPO);
        if let Err(err) = self.client.set_tempo(tempo) {
            warn!(%err, "tempo rejected");
        }
    }

    /// Send the other player away, or bring them back where they left off.
    fn toggle_ada(&mut self) {
        let canvas = self.client.exchange_mut().endpoint_mut().canvas_mut();
        match self.away.take() {
            Some(session) => {
                info!(session = %session.id, "joined");
                canvas.join(session);
            }
            None => {
                self.away = canvas.leave(&ADA.into());
                if self.away.is_some() {
                    info!(session = ADA, "left");
                }
            }
        }
    }

    /// Move the local listener; distances change with the next snapshot.
    fn nudge(&mut self, dx: f32, dy: f32) {
        let canvas = self.client.exchange_mut().endpoint_mut().canvas_mut();
        let Some(session) = canvas.current_session() else {
            return;
        };
        let id = session.id.clone();
        let at = session.position.unwrap_or(Vector::ORIGIN);
        canvas.move_session(&id, Vector::new(at.x + dx, at.y + dy));
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame, view: &View) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(8),    // Voices and connectors
                Constraint::Length(8), // Waveform
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_transport(frame, chunks[0], view, &stats);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);
        render_voices(frame, panels[0], view);
        render_edges(frame, panels[1], view);

        render_waveform(frame, chunks[2], &self.audio_buffer, view.rendering);

        let listener = view
            .listener
            .map(|v| format!("  listener ({:.0}, {:.0})", v.x, v.y))
            .unwrap_or_default();
        let help = Paragraph::new(format!(
            " [Q] Quit  [Space] Listen  [M] Multiplayer  [P] Proximity  [A] Ada  [+/-] Tempo  [Arrows] Move{listener}"
        ))
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
