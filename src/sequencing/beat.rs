use std::fmt;

use serde::{Deserialize, Serialize};

/// Client-side beat counter sent with every PING.
///
/// `step` only ever grows while output is enabled; muting, or a snapshot with
/// nothing to play, resets it to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BeatState {
    pub step: u64,
    #[serde(rename = "change")]
    pub changed: bool,
}

impl BeatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more beat.
    pub fn advance(&mut self) {
        self.step += 1;
        self.changed = true;
    }

    pub fn reset(&mut self) {
        self.step = 0;
        self.changed = false;
    }

    pub fn position(&self) -> BeatPosition {
        BeatPosition::from_step(self.step)
    }
}

/// A step shown as `bar.beat.sixteenth`, each part 1-based and wrapping at 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatPosition {
    pub bar: u8,
    pub beat: u8,
    pub sixteenth: u8,
}

impl BeatPosition {
    pub fn from_step(step: u64) -> Self {
        Self {
            bar: ((step / 16) % 4 + 1) as u8,
            beat: ((step / 4) % 4 + 1) as u8,
            sixteenth: (step % 4 + 1) as u8,
        }
    }
}

impl fmt::Display for BeatPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.bar, self.beat, self.sixteenth)
    }
}
