use crate::{dsp::Waveform, synth::voice::VoiceKey};

/// One change to the set of live voices.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceOp {
    /// Create a silent voice and ramp it in to `target` (rests keep 0).
    Start {
        key: VoiceKey,
        frequency: f32,
        waveform: Waveform,
        target: f32,
    },
    /// Ramp a live voice to a new level.
    Retarget { key: VoiceKey, target: f32 },
    /// Fade out, stop, forget.
    Release { key: VoiceKey },
}

impl VoiceOp {
    pub fn key(&self) -> &VoiceKey {
        match self {
            VoiceOp::Start { key, .. } | VoiceOp::Retarget { key, .. } | VoiceOp::Release { key } => {
                key
            }
        }
    }
}

/// Every operation one snapshot calls for, computed before any is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub ops: Vec<VoiceOp>,
    /// Keys the snapshot wants audible, whether or not they needed an op.
    pub wanted: usize,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn starts(&self) -> usize {
        self.count(|op| matches!(op, VoiceOp::Start { .. }))
    }

    pub fn retargets(&self) -> usize {
        self.count(|op| matches!(op, VoiceOp::Retarget { .. }))
    }

    pub fn releases(&self) -> usize {
        self.count(|op| matches!(op, VoiceOp::Release { .. }))
    }

    fn count(&self, pred: impl Fn(&VoiceOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}
