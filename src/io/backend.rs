use std::fmt;

use crate::{dsp::Waveform, Result};

/// Opaque handle to one live tone inside an audio backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceHandle(pub u64);

impl fmt::Display for VoiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source of audio-clock time, in seconds.
///
/// The clock only moves forward and is the time base every scheduled note
/// and gain ramp is expressed in.
pub trait AudioClock {
    fn now(&self) -> f64;
}

impl<C: AudioClock + ?Sized> AudioClock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

impl<C: AudioClock + ?Sized> AudioClock for &mut C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Where voices are made audible.
///
/// A tone is created silent (gain 0) and started immediately. All level
/// changes are linear ramps starting now; stopping is scheduled and the
/// backend releases the tone's resources once the stop time has passed.
///
/// Every call that can fail to reach the backend says so. A caller that
/// gets an error still owns the voice and must try again.
pub trait AudioBackend: AudioClock {
    /// Play a silent buffer so the output device starts rendering.
    fn unlock(&mut self);

    fn create_tone(&mut self, frequency: f32, waveform: Waveform) -> Result<VoiceHandle>;

    fn ramp_gain(&mut self, voice: VoiceHandle, target: f32, over_seconds: f64) -> Result<()>;

    /// Stop the tone at audio-clock time `at`.
    fn stop_tone(&mut self, voice: VoiceHandle, at: f64) -> Result<()>;
}

impl<B: AudioBackend + ?Sized> AudioBackend for &mut B {
    fn unlock(&mut self) {
        (**self).unlock()
    }

    fn create_tone(&mut self, frequency: f32, waveform: Waveform) -> Result<VoiceHandle> {
        (**self).create_tone(frequency, waveform)
    }

    fn ramp_gain(&mut self, voice: VoiceHandle, target: f32, over_seconds: f64) -> Result<()> {
        (**self).ramp_gain(voice, target, over_seconds)
    }

    fn stop_tone(&mut self, voice: VoiceHandle, at: f64) -> Result<()> {
        (**self).stop_tone(voice, at)
    }
}
