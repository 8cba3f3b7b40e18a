//! In-memory clock and backend for tests, benches and offline runs.

use std::cell::Cell;

use crate::{
    dsp::Waveform,
    io::backend::{AudioBackend, AudioClock, VoiceHandle},
    Error, Result,
};

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(now: f64) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl AudioClock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// One call made against a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Unlock,
    Create {
        voice: VoiceHandle,
        frequency: f32,
        waveform: Waveform,
    },
    Ramp {
        voice: VoiceHandle,
        target: f32,
        over_seconds: f64,
        at: f64,
    },
    Stop {
        voice: VoiceHandle,
        at: f64,
    },
}

/// Backend that renders nothing and records every call.
///
/// Creation fails the same way the mixer does: for negative or non-finite
/// frequencies. With `queue_full` set every call is refused like a mixer
/// whose command ring has no room, and nothing is recorded.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub clock: ManualClock,
    pub calls: Vec<BackendCall>,
    pub queue_full: bool,
    next_handle: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return and forget the calls recorded so far.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn accept(&self) -> Result<()> {
        if self.queue_full {
            Err(Error::CommandQueueFull)
        } else {
            Ok(())
        }
    }
}

impl AudioClock for RecordingBackend {
    fn now(&self) -> f64 {
        self.clock.now()
    }
}

impl AudioBackend for RecordingBackend {
    fn unlock(&mut self) {
        self.calls.push(BackendCall::Unlock);
    }

    fn create_tone(&mut self, frequency: f32, waveform: Waveform) -> Result<VoiceHandle> {
        self.accept()?;
        if !frequency.is_finite() || frequency < 0.0 {
            return Err(Error::InvalidFrequency(frequency));
        }
        self.next_handle += 1;
        let voice = VoiceHandle(self.next_handle);
        self.calls.push(BackendCall::Create {
            voice,
            frequency,
            waveform,
        });
        Ok(voice)
    }

    fn ramp_gain(&mut self, voice: VoiceHandle, target: f32, over_seconds: f64) -> Result<()> {
        self.accept()?;
        let at = self.now();
        self.calls.push(BackendCall::Ramp {
            voice,
            target,
            over_seconds,
            at,
        });
        Ok(())
    }

    fn stop_tone(&mut self, voice: VoiceHandle, at: f64) -> Result<()> {
        self.accept()?;
        self.calls.push(BackendCall::Stop { voice, at });
        Ok(())
    }
}
