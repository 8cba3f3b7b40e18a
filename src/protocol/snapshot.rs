use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::{
    dsp::Waveform,
    ids::{NodeId, SessionId},
};

/// A point on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
}

impl Vector {
    pub const ORIGIN: Vector = Vector { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vector) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One tone-producing node as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneDescriptor {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    /// Hz; 0 is a rest.
    pub frequency: f32,
    pub wave: Waveform,
    pub x: f32,
    pub y: f32,
}

impl ToneDescriptor {
    pub fn position(&self) -> Vector {
        Vector::new(self.x, self.y)
    }

    pub fn is_rest(&self) -> bool {
        self.frequency == 0.0
    }
}

/// What one session is doing right now.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPresence {
    pub session_id: SessionId,
    /// Display name.
    pub user: String,
    pub position: Option<Vector>,
    /// Active tones, keyed by tone node id.
    #[serde(deserialize_with = "tones_lenient")]
    pub oscillators: BTreeMap<NodeId, ToneDescriptor>,
    /// Distance from the requesting session to each active tone.
    pub distances: BTreeMap<NodeId, f32>,
    pub selection: Vec<NodeId>,
}

/// The whole shared world as seen by the session that asked for it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    /// The requesting session; empty when the host has none yet.
    pub current_session_id: SessionId,
    pub users: BTreeMap<SessionId, SessionPresence>,
    /// Every tone node on the canvas.
    #[serde(deserialize_with = "tones_lenient")]
    pub widgets: BTreeMap<NodeId, ToneDescriptor>,
}

impl WorldSnapshot {
    /// Number of active tones across all sessions.
    pub fn active_tones(&self) -> usize {
        self.users.values().map(|u| u.oscillators.len()).sum()
    }

    pub fn current_session(&self) -> Option<&SessionPresence> {
        self.users.get(&self.current_session_id)
    }
}

/// Decode a tone map entry by entry. A descriptor we cannot read (unknown
/// wave, non-numeric frequency) is dropped on its own instead of failing the
/// whole snapshot.
fn tones_lenient<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<NodeId, ToneDescriptor>, D::Error> {
    let raw = BTreeMap::<NodeId, serde_json::Value>::deserialize(deserializer)?;
    let mut tones = BTreeMap::new();
    for (id, value) in raw {
        match ToneDescriptor::deserialize(value) {
            Ok(tone) => {
                tones.insert(id, tone);
            }
            Err(err) => warn!(tone = %id, %err, "dropping unreadable tone"),
        }
    }
    Ok(tones)
}
