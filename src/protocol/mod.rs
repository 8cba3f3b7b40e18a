//! The request/response channel between an audio client and the canvas host.
//!
//! Exactly one PONG answers each PING. [`Exchange`] models the channel as a
//! synchronous round trip, so a slow host throttles how fast beats advance.

pub mod message;
pub mod snapshot;

pub use message::Message;
pub use snapshot::{SessionPresence, ToneDescriptor, Vector, WorldSnapshot};

use crate::{sequencing::BeatState, Result};

/// Send one PING, get back the snapshot from its PONG.
pub trait Exchange {
    fn round_trip(&mut self, beat: Option<BeatState>) -> Result<WorldSnapshot>;
}

impl<X: Exchange + ?Sized> Exchange for &mut X {
    fn round_trip(&mut self, beat: Option<BeatState>) -> Result<WorldSnapshot> {
        (**self).round_trip(beat)
    }
}

/// Something that answers encoded messages with encoded messages.
pub trait TextEndpoint {
    fn handle_text(&mut self, request: &str) -> Result<String>;
}

/// An [`Exchange`] that goes through the JSON wire format.
#[derive(Debug)]
pub struct JsonExchange<E> {
    endpoint: E,
}

impl<E: TextEndpoint> JsonExchange<E> {
    pub fn new(endpoint: E) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn endpoint_mut(&mut self) -> &mut E {
        &mut self.endpoint
    }

    pub fn into_inner(self) -> E {
        self.endpoint
    }
}

impl<E: TextEndpoint> Exchange for JsonExchange<E> {
    fn round_trip(&mut self, beat: Option<BeatState>) -> Result<WorldSnapshot> {
        let request = Message::ping(beat).to_json()?;
        let reply = self.endpoint.handle_text(&request)?;
        Message::from_json(&reply)?.into_pong()
    }
}
