//! The canvas side of the exchange.
//!
//! Every PING is answered with a fresh snapshot. A PING whose beat changed
//! first walks the current session's selection one step.

pub mod canvas;
pub mod snapshot;

pub use canvas::{Canvas, CanvasNode, Connector, NodeKind, Session};
pub use snapshot::build_snapshot;

use tracing::{debug, trace};

use crate::{
    protocol::{Exchange, Message, TextEndpoint, WorldSnapshot},
    sequencing::{BeatState, GraphWalker, WalkOutcome},
    Result,
};

#[derive(Debug, Default)]
pub struct Host {
    canvas: Canvas,
    walker: GraphWalker,
    last_walk: Option<WalkOutcome>,
}

impl Host {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            ..Default::default()
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Outcome of the most recent beat tick.
    pub fn last_walk(&self) -> Option<&WalkOutcome> {
        self.last_walk.as_ref()
    }

    /// Answer one PING.
    pub fn handle(&mut self, beat: Option<BeatState>) -> WorldSnapshot {
        self.walker.observe(&mut self.canvas);

        if let Some(beat) = beat.filter(|b| b.changed) {
            let outcome = self.walker.tick(&mut self.canvas);
            debug!(step = beat.step, arrivals = outcome.arrivals, "beat");
            self.last_walk = Some(outcome);
        }

        build_snapshot(&self.canvas)
    }
}

impl Exchange for Host {
    fn round_trip(&mut self, beat: Option<BeatState>) -> Result<WorldSnapshot> {
        Ok(self.handle(beat))
    }
}

impl TextEndpoint for Host {
    fn handle_text(&mut self, request: &str) -> Result<String> {
        trace!(request, "received");
        let beat = Message::from_json(request)?.into_ping()?;
        Message::pong(self.handle(beat)).to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dsp::Waveform,
        ids::{NodeId, SessionId},
        protocol::Vector,
        sequencing::GraphHost,
    };

    fn host() -> Host {
        let mut canvas = Canvas::new();
        canvas.add_tone("a", 440.0, Waveform::Sine, Vector::ORIGIN);
        canvas.add_tone("b", 550.0, Waveform::Sine, Vector::ORIGIN);
        canvas.connect("ab", "a", "b", 1);
        canvas.join(Session::new("me", "Me"));
        canvas.select(&"me".into(), vec!["a".into()]);
        Host::new(canvas)
    }

    fn changed(step: u64) -> Option<BeatState> {
        Some(BeatState {
            step,
            changed: true,
        })
    }

    #[test]
    fn ping_without_beat_does_not_walk() {
        let mut host = host();
        let snapshot = host.handle(None);
        assert!(snapshot.current_session().unwrap().oscillators.contains_key("a"));
        assert!(host.last_walk().is_none());
    }

    #[test]
    fn unchanged_beat_does_not_walk() {
        let mut host = host();
        host.handle(Some(BeatState {
            step: 4,
            changed: false,
        }));
        assert_eq!(host.canvas().selection(), [NodeId::from("a")]);
    }

    #[test]
    fn changed_beat_walks_before_snapshot() {
        let mut host = host();
        let snapshot = host.handle(changed(1));
        let mine = snapshot.current_session().unwrap();
        assert!(mine.oscillators.contains_key("b"));
        assert!(!mine.oscillators.contains_key("a"));
        assert_eq!(host.last_walk().map(|w| w.arrivals), Some(1));
    }

    #[test]
    fn answers_json_pings() {
        let mut host = host();
        let reply = host
            .handle_text(r#"{"type":"PING","beat":{"step":1,"change":true}}"#)
            .unwrap();
        let snapshot = Message::from_json(&reply).unwrap().into_pong().unwrap();
        assert_eq!(snapshot.current_session_id.as_str(), "me");
        assert!(snapshot.users[&SessionId::from("me")].oscillators.contains_key("b"));
    }

    #[test]
    fn rejects_pong_requests() {
        let mut host = host();
        let pong = Message::pong(WorldSnapshot::default()).to_json().unwrap();
        assert!(host.handle_text(&pong).is_err());
    }
}
