use std::{collections::BTreeMap, fmt};

use crate::{
    dsp::Waveform,
    ids::{NodeId, SessionId},
    io::VoiceHandle,
};

/// Identifies a voice: one session playing one tone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceKey {
    pub session: SessionId,
    pub tone: NodeId,
}

impl VoiceKey {
    pub fn new(session: impl Into<SessionId>, tone: impl Into<NodeId>) -> Self {
        Self {
            session: session.into(),
            tone: tone.into(),
        }
    }
}

impl fmt::Display for VoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.session, self.tone)
    }
}

/// A live tone in the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub handle: VoiceHandle,
    pub waveform: Waveform,
    pub frequency: f32,
    /// Gain the voice is at or ramping towards.
    pub target: f32,
}

/// The voices one client currently has alive, at most one per key.
#[derive(Debug, Default)]
pub struct VoiceRegistry {
    voices: BTreeMap<VoiceKey, Voice>,
}

impl VoiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn contains(&self, key: &VoiceKey) -> bool {
        self.voices.contains_key(key)
    }

    pub fn get(&self, key: &VoiceKey) -> Option<&Voice> {
        self.voices.get(key)
    }

    pub fn get_mut(&mut self, key: &VoiceKey) -> Option<&mut Voice> {
        self.voices.get_mut(key)
    }

    /// Returns the voice previously stored under `key`, if any.
    pub fn insert(&mut self, key: VoiceKey, voice: Voice) -> Option<Voice> {
        self.voices.insert(key, voice)
    }

    pub fn remove(&mut self, key: &VoiceKey) -> Option<Voice> {
        self.voices.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VoiceKey, &Voice)> {
        self.voices.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &VoiceKey> {
        self.voices.keys()
    }

    /// Move every voice out of `other` into this registry.
    pub fn merge(&mut self, other: VoiceRegistry) {
        self.voices.extend(other.voices);
    }
}
