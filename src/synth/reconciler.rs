/*
Presence Reconciliation
=======================

The host pushes a full WorldSnapshot with every PONG. The reconciler turns the
difference between that snapshot and the voices it already owns into a plan,
then applies the plan to the audio backend:

  snapshot wants      registry has       op
  ───────────────     ────────────       ─────────────────────────────────
  key                 -                  Start    (gain 0 → target in 125 ms)
  key                 key                Retarget (→ target in 50 ms), only
                                                   if the target moved
  -                   key                Release  (→ 0 in 250 ms, stop 50 ms
                                                   after the ramp ends)

A key is (session, tone). Only our own session is wanted unless multiplayer
is on.

Loudness
--------

    base      = 0.1 for square, 0.15 otherwise   (square is perceptually louder)
    loudness  = base · (1 - min(1, distance / 700))

Distance only counts with proximity on; otherwise every tone plays at base.
Rests (0 Hz) are started like any other tone but never leave gain 0.

Skipping a Retarget whose target is unchanged is what makes applying the same
snapshot twice a no-op.

A voice only leaves the registry once the backend has accepted its stop.
When the backend refuses (its command queue is full) the voice stays
registered, and the next pass releases it again. A refused level change
leaves the recorded target alone for the same reason.
*/

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::{
    config::PresenceConfig,
    dsp::Waveform,
    io::{AudioBackend, VoiceHandle},
    protocol::{ToneDescriptor, WorldSnapshot},
    synth::{
        message::{Plan, VoiceOp},
        voice::{Voice, VoiceKey, VoiceRegistry},
    },
    Result, MAX_DISTANCE,
};

/// Seconds a released voice takes to fade to silence.
pub const FADE_OUT: f64 = 0.25;
/// Extra seconds between the end of the fade and the stop.
pub const STOP_MARGIN: f64 = 0.05;
/// Seconds a live voice takes to reach a new level.
pub const RETARGET: f64 = 0.05;
/// Seconds a new voice takes to ramp in.
pub const FADE_IN: f64 = 0.125;

/// Peak gain for a waveform at zero distance.
pub fn base_level(waveform: Waveform) -> f32 {
    match waveform {
        Waveform::Square => 0.1,
        _ => 0.15,
    }
}

/// Gain for a tone `distance` canvas units away.
pub fn loudness(waveform: Waveform, distance: f32) -> f32 {
    let falloff = if distance.is_nan() {
        0.0
    } else {
        (distance / MAX_DISTANCE).clamp(0.0, 1.0)
    };
    base_level(waveform) * (1.0 - falloff)
}

/// Counts from one applied plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub started: usize,
    pub retargeted: usize,
    pub released: usize,
    /// Voices the backend refused to create.
    pub failed: usize,
    /// Releases and level changes the backend refused; retried next pass.
    pub deferred: usize,
    /// Keys the snapshot wanted audible.
    pub wanted: usize,
}

impl ReconcileReport {
    /// The snapshot had nothing for us to play.
    pub fn is_idle(&self) -> bool {
        self.wanted == 0
    }
}

struct Wanted<'a> {
    tone: &'a ToneDescriptor,
    distance: f32,
}

/// Owns the client's voices and keeps them in line with the latest snapshot.
#[derive(Debug, Default)]
pub struct Reconciler {
    voices: VoiceRegistry,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voices(&self) -> &VoiceRegistry {
        &self.voices
    }

    /// Work out what `snapshot` asks for. `None` when the snapshot does not
    /// say who we are yet.
    pub fn plan(&self, snapshot: &WorldSnapshot, presence: PresenceConfig) -> Option<Plan> {
        if snapshot.current_session_id.is_empty() {
            debug!("snapshot without a current session, skipping");
            return None;
        }

        let wanted = wanted_voices(snapshot, presence);
        let mut plan = Plan {
            ops: Vec::new(),
            wanted: wanted.len(),
        };

        for (key, voice) in self.voices.iter() {
            match wanted.get(key) {
                None => plan.ops.push(VoiceOp::Release { key: key.clone() }),
                Some(w) => {
                    let target = if voice.frequency == 0.0 {
                        0.0
                    } else {
                        loudness(voice.waveform, w.distance)
                    };
                    if target != voice.target {
                        plan.ops.push(VoiceOp::Retarget {
                            key: key.clone(),
                            target,
                        });
                    }
                }
            }
        }

        for (key, w) in wanted {
            if self.voices.contains(&key) {
                continue;
            }
            let target = if w.tone.is_rest() {
                0.0
            } else {
                loudness(w.tone.wave, w.distance)
            };
            plan.ops.push(VoiceOp::Start {
                key,
                frequency: w.tone.frequency,
                waveform: w.tone.wave,
                target,
            });
        }

        Some(plan)
    }

    /// Issue a plan's operations against `backend`.
    ///
    /// New voices are collected separately and only join the registry once
    /// the whole plan has been applied.
    pub fn apply<B: AudioBackend + ?Sized>(&mut self, plan: Plan, backend: &mut B) -> ReconcileReport {
        let now = backend.now();
        let mut report = ReconcileReport {
            wanted: plan.wanted,
            ..Default::default()
        };
        let mut fresh = VoiceRegistry::new();

        for op in plan.ops {
            match op {
                VoiceOp::Release { key } => {
                    let Some(handle) = self.voices.get(&key).map(|v| v.handle) else {
                        continue;
                    };
                    match fade_out(backend, handle, now) {
                        Ok(()) => {
                            self.voices.remove(&key);
                            debug!(voice = %key, %handle, "released");
                            report.released += 1;
                        }
                        Err(err) => {
                            warn!(voice = %key, %err, "release deferred");
                            report.deferred += 1;
                        }
                    }
                }
                VoiceOp::Retarget { key, target } => {
                    if let Some(voice) = self.voices.get_mut(&key) {
                        match backend.ramp_gain(voice.handle, target, RETARGET) {
                            Ok(()) => {
                                voice.target = target;
                                report.retargeted += 1;
                            }
                            Err(err) => {
                                warn!(voice = %key, %err, "level change deferred");
                                report.deferred += 1;
                            }
                        }
                    }
                }
                VoiceOp::Start {
                    key,
                    frequency,
                    waveform,
                    target,
                } => match backend.create_tone(frequency, waveform) {
                    Ok(handle) => {
                        // A refused fade-in leaves the voice silent; recording
                        // gain 0 makes the next pass ramp it up
                        let mut level = 0.0;
                        if target > 0.0 {
                            match backend.ramp_gain(handle, target, FADE_IN) {
                                Ok(()) => level = target,
                                Err(err) => {
                                    warn!(voice = %key, %err, "fade-in deferred");
                                    report.deferred += 1;
                                }
                            }
                        }
                        debug!(voice = %key, %handle, frequency, %waveform, "started");
                        fresh.insert(
                            key,
                            Voice {
                                handle,
                                waveform,
                                frequency,
                                target: level,
                            },
                        );
                        report.started += 1;
                    }
                    Err(err) => {
                        warn!(voice = %key, %err, "could not start voice");
                        report.failed += 1;
                    }
                },
            }
        }

        self.voices.merge(fresh);
        report
    }

    /// Plan and apply in one go.
    pub fn reconcile<B: AudioBackend + ?Sized>(
        &mut self,
        snapshot: &WorldSnapshot,
        presence: PresenceConfig,
        backend: &mut B,
    ) -> Option<ReconcileReport> {
        let plan = self.plan(snapshot, presence)?;
        Some(self.apply(plan, backend))
    }

    /// Fade out every voice. Returns how many were released.
    ///
    /// Voices whose stop the backend refused stay registered; call again
    /// to retry them.
    pub fn release_all<B: AudioBackend + ?Sized>(&mut self, backend: &mut B) -> usize {
        let now = backend.now();
        let keys: Vec<VoiceKey> = self.voices.keys().cloned().collect();
        let mut released = 0;
        for key in keys {
            let Some(handle) = self.voices.get(&key).map(|v| v.handle) else {
                continue;
            };
            match fade_out(backend, handle, now) {
                Ok(()) => {
                    self.voices.remove(&key);
                    released += 1;
                }
                Err(err) => warn!(voice = %key, %err, "release deferred"),
            }
        }
        if released > 0 {
            debug!(released, left = self.voices.len(), "released all voices");
        }
        released
    }
}

/// Schedule the stop first: once it is accepted the voice is guaranteed to
/// end, even if the fade itself is refused.
fn fade_out<B: AudioBackend + ?Sized>(backend: &mut B, handle: VoiceHandle, now: f64) -> Result<()> {
    backend.stop_tone(handle, now + FADE_OUT + STOP_MARGIN)?;
    if let Err(err) = backend.ramp_gain(handle, 0.0, FADE_OUT) {
        warn!(%handle, %err, "fade dropped, voice will stop without it");
    }
    Ok(())
}

fn wanted_voices(snapshot: &WorldSnapshot, presence: PresenceConfig) -> BTreeMap<VoiceKey, Wanted<'_>> {
    let mut wanted = BTreeMap::new();
    for (session, user) in &snapshot.users {
        if !presence.multiplayer && *session != snapshot.current_session_id {
            continue;
        }
        for (tone_id, tone) in &user.oscillators {
            let distance = if presence.proximity {
                user.distances.get(tone_id).copied().unwrap_or(0.0)
            } else {
                0.0
            };
            wanted.insert(
                VoiceKey::new(session.clone(), tone_id.clone()),
                Wanted { tone, distance },
            );
        }
    }
    wanted
}
