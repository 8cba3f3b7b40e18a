//! Software mixer - the audio backend the terminal client plays through.
//!
//! Split in two halves, like the synth message rings: [`MixerHandle`] lives on
//! the control loop and implements [`AudioBackend`]; [`Mixer`] lives in the
//! audio callback and renders. Commands cross over an `rtrb` ring, and the
//! audio clock comes back as an atomic frame counter, so the audio thread
//! never takes a lock.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::warn;

use crate::{
    dsp::{oscillator::OscillatorBlock, GainRamp, Waveform},
    io::backend::{AudioBackend, AudioClock, VoiceHandle},
    Error, Result,
};

/// Control → audio thread message.
#[derive(Debug, Clone, Copy)]
pub enum MixerCommand {
    Unlock,
    Create {
        voice: VoiceHandle,
        frequency: f32,
        waveform: Waveform,
    },
    Ramp {
        voice: VoiceHandle,
        target: f32,
        over_seconds: f32,
    },
    Stop {
        voice: VoiceHandle,
        at_frame: u64,
    },
}

/// State shared between both halves.
#[derive(Debug, Default)]
struct Shared {
    frames: AtomicU64,
    active_voices: AtomicUsize,
    /// Voice slots claimed by the control side and not yet freed by the
    /// audio side. Counts creations still in the ring and fading voices.
    claimed: AtomicUsize,
    unlocked: AtomicBool,
}

/// Create a connected mixer pair.
///
/// `max_voices` bounds the audio-side voice table; it is allocated up front.
/// The control side refuses a creation once every slot is claimed, so the
/// audio thread never has to drop one.
pub fn mixer(sample_rate: f32, max_voices: usize, command_capacity: usize) -> (MixerHandle, Mixer) {
    let (tx, rx) = RingBuffer::new(command_capacity);
    let shared = Arc::new(Shared::default());

    let handle = MixerHandle {
        tx,
        shared: shared.clone(),
        sample_rate,
        max_voices,
        next_voice: 0,
    };
    let mixer = Mixer {
        rx,
        shared,
        sample_rate,
        max_voices,
        voices: Vec::with_capacity(max_voices),
        frame: 0,
        dropped: 0,
    };
    (handle, mixer)
}

/// Control-side half of the mixer.
pub struct MixerHandle {
    tx: Producer<MixerCommand>,
    shared: Arc<Shared>,
    sample_rate: f32,
    max_voices: usize,
    next_voice: u64,
}

impl MixerHandle {
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Voices the audio thread was rendering at the end of its last block.
    pub fn active_voices(&self) -> usize {
        self.shared.active_voices.load(Ordering::Relaxed)
    }

    /// Voice slots in use, including creations the audio thread has not
    /// seen yet and voices still fading out.
    pub fn claimed_voices(&self) -> usize {
        self.shared.claimed.load(Ordering::Acquire)
    }

    pub fn is_unlocked(&self) -> bool {
        self.shared.unlocked.load(Ordering::Relaxed)
    }

    fn send(&mut self, command: MixerCommand) -> Result<()> {
        self.tx.push(command).map_err(|_| Error::CommandQueueFull)
    }
}

impl AudioClock for MixerHandle {
    fn now(&self) -> f64 {
        self.shared.frames.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }
}

impl AudioBackend for MixerHandle {
    fn unlock(&mut self) {
        if let Err(err) = self.send(MixerCommand::Unlock) {
            warn!("mixer unlock not delivered: {err}");
        }
    }

    fn create_tone(&mut self, frequency: f32, waveform: Waveform) -> Result<VoiceHandle> {
        if !frequency.is_finite() || frequency < 0.0 || frequency >= self.sample_rate / 2.0 {
            return Err(Error::InvalidFrequency(frequency));
        }
        if self.claimed_voices() >= self.max_voices {
            return Err(Error::VoiceLimit(self.max_voices));
        }

        let voice = VoiceHandle(self.next_voice);
        // Claim before sending so the audio side can never free it first
        self.shared.claimed.fetch_add(1, Ordering::AcqRel);
        let sent = self.send(MixerCommand::Create {
            voice,
            frequency,
            waveform,
        });
        if let Err(err) = sent {
            self.shared.claimed.fetch_sub(1, Ordering::AcqRel);
            return Err(err);
        }
        self.next_voice += 1;
        Ok(voice)
    }

    fn ramp_gain(&mut self, voice: VoiceHandle, target: f32, over_seconds: f64) -> Result<()> {
        self.send(MixerCommand::Ramp {
            voice,
            target,
            over_seconds: over_seconds as f32,
        })
    }

    fn stop_tone(&mut self, voice: VoiceHandle, at: f64) -> Result<()> {
        let at_frame = (at.max(0.0) * self.sample_rate as f64).ceil() as u64;
        self.send(MixerCommand::Stop { voice, at_frame })
    }
}

struct MixerVoice {
    handle: VoiceHandle,
    osc: OscillatorBlock,
    gain: GainRamp,
    stop_at: Option<u64>,
}

/// Audio-side half of the mixer. Call [`Mixer::render_block`] from the
/// output callback.
pub struct Mixer {
    rx: Consumer<MixerCommand>,
    shared: Arc<Shared>,
    sample_rate: f32,
    max_voices: usize,
    voices: Vec<MixerVoice>,
    frame: u64,
    dropped: u64,
}

impl Mixer {
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Voice creations the audio thread had no room for. Stays at zero as
    /// long as every creation goes through [`MixerHandle`].
    pub fn dropped_voices(&self) -> u64 {
        self.dropped
    }

    /// Current gain of a live voice.
    pub fn voice_gain(&self, voice: VoiceHandle) -> Option<f32> {
        self.voices
            .iter()
            .find(|v| v.handle == voice)
            .map(|v| v.gain.level())
    }

    /// Render one mono block, applying every queued command first.
    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Ok(command) = self.rx.pop() {
            self.apply(command);
        }

        out.fill(0.0);
        let block_start = self.frame;
        let sample_rate = self.sample_rate;

        for voice in &mut self.voices {
            for (i, o) in out.iter_mut().enumerate() {
                if voice.stop_at.is_some_and(|stop| block_start + i as u64 >= stop) {
                    break;
                }
                let level = voice.gain.next_sample();
                *o += voice.osc.next_sample(sample_rate) * level;
            }
        }

        self.frame += out.len() as u64;
        let frame = self.frame;
        // Stopped voices release their slot once the stop time has passed
        let before = self.voices.len();
        self.voices
            .retain(|v| v.stop_at.map_or(true, |stop| frame < stop));
        self.free_slots(before - self.voices.len());

        self.shared
            .active_voices
            .store(self.voices.len(), Ordering::Relaxed);
        self.shared.frames.store(self.frame, Ordering::Release);
    }

    fn apply(&mut self, command: MixerCommand) {
        match command {
            MixerCommand::Unlock => {
                self.shared.unlocked.store(true, Ordering::Relaxed);
            }
            MixerCommand::Create {
                voice,
                frequency,
                waveform,
            } => {
                // Never grow the table on the audio thread
                if self.voices.len() >= self.max_voices {
                    self.dropped += 1;
                    self.free_slots(1);
                    return;
                }
                self.voices.push(MixerVoice {
                    handle: voice,
                    osc: OscillatorBlock::new(waveform, frequency),
                    gain: GainRamp::new(0.0),
                    stop_at: None,
                });
            }
            MixerCommand::Ramp {
                voice,
                target,
                over_seconds,
            } => {
                let sample_rate = self.sample_rate;
                if let Some(v) = self.voices.iter_mut().find(|v| v.handle == voice) {
                    v.gain.ramp_to(target, over_seconds, sample_rate);
                }
            }
            MixerCommand::Stop { voice, at_frame } => {
                if let Some(v) = self.voices.iter_mut().find(|v| v.handle == voice) {
                    v.stop_at = Some(at_frame);
                }
            }
        }
    }

    fn free_slots(&self, count: usize) {
        if count > 0 {
            self.shared.claimed.fetch_sub(count, Ordering::AcqRel);
        }
    }
}
