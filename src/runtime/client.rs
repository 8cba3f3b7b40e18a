use tracing::{debug, info, warn};

use crate::{
    config::{Config, PresenceConfig},
    engine::{BeatChanged, Scheduler},
    io::AudioBackend,
    protocol::{Exchange, WorldSnapshot},
    sequencing::BeatState,
    synth::{ReconcileReport, Reconciler},
    Result,
};

/// What one call to [`Client::frame`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub beat: Option<BeatChanged>,
    pub reconcile: Option<ReconcileReport>,
}

/// One participant's audio pipeline.
///
/// The host loop drives it through two ports: [`Client::wake`] on the
/// look-ahead interval and [`Client::frame`] on the display cadence. Each
/// beat the scheduler lets through becomes a PING; the snapshot in the PONG
/// is reconciled into voices straight away.
pub struct Client<B, X> {
    backend: B,
    exchange: X,
    scheduler: Scheduler,
    reconciler: Reconciler,
    beat: BeatState,
    presence: PresenceConfig,
    listening: bool,
    last_snapshot: Option<WorldSnapshot>,
}

impl<B: AudioBackend, X: Exchange> Client<B, X> {
    pub fn new(config: &Config, backend: B, exchange: X) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            exchange,
            scheduler: Scheduler::new(&config.scheduler)?,
            reconciler: Reconciler::new(),
            beat: BeatState::new(),
            presence: config.presence,
            listening: false,
            last_snapshot: None,
        })
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn presence(&self) -> PresenceConfig {
        self.presence
    }

    pub fn beat(&self) -> BeatState {
        self.beat
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn exchange(&self) -> &X {
        &self.exchange
    }

    pub fn exchange_mut(&mut self) -> &mut X {
        &mut self.exchange
    }

    /// The snapshot from the most recent PONG.
    pub fn last_snapshot(&self) -> Option<&WorldSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Turn output on or off.
    ///
    /// Switching on starts the scheduler and sends a first PING without a
    /// beat so whatever is already selected becomes audible. Switching off
    /// fades every voice out and stops the scheduler.
    pub fn set_listening(&mut self, listening: bool) {
        if listening == self.listening {
            return;
        }
        self.listening = listening;

        if listening {
            info!("listening");
            self.scheduler.start(&mut self.backend);
            self.connect();
        } else {
            let released = self.reconciler.release_all(&mut self.backend);
            self.scheduler.stop();
            self.beat.reset();
            info!(released, "muted");
        }
    }

    pub fn toggle_listening(&mut self) -> bool {
        self.set_listening(!self.listening);
        self.listening
    }

    /// Send the beat-less PING.
    pub fn connect(&mut self) -> Option<ReconcileReport> {
        self.ping(None)
    }

    pub fn set_multiplayer(&mut self, enabled: bool) {
        debug!(enabled, "multiplayer");
        self.presence.multiplayer = enabled;
    }

    pub fn set_proximity(&mut self, enabled: bool) {
        debug!(enabled, "proximity");
        self.presence.proximity = enabled;
    }

    /// Change tempo; applies to notes queued from now on.
    pub fn set_tempo(&mut self, bpm: f64) -> Result<()> {
        self.scheduler.set_tempo(bpm)
    }

    /// Look-ahead port. Returns how many notes were queued.
    pub fn wake(&mut self) -> usize {
        self.scheduler.wake(&self.backend)
    }

    /// Display-cadence port.
    pub fn frame(&mut self) -> FrameReport {
        if !self.listening && !self.reconciler.voices().is_empty() {
            // Releases the backend refused while muting
            let released = self.reconciler.release_all(&mut self.backend);
            debug!(released, left = self.reconciler.voices().len(), "retried release");
        }

        let Some(changed) = self.scheduler.drain(&self.backend) else {
            return FrameReport::default();
        };

        self.beat.advance();
        if !self.listening {
            self.beat.reset();
            return FrameReport {
                beat: Some(changed),
                reconcile: None,
            };
        }

        FrameReport {
            beat: Some(changed),
            reconcile: self.ping(Some(self.beat)),
        }
    }

    fn ping(&mut self, beat: Option<BeatState>) -> Option<ReconcileReport> {
        let snapshot = match self.exchange.round_trip(beat) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(%err, "exchange failed");
                return None;
            }
        };

        let report = self
            .reconciler
            .reconcile(&snapshot, self.presence, &mut self.backend);
        if let Some(report) = report {
            if report.is_idle() {
                self.beat.reset();
            }
            if report.started + report.released + report.deferred > 0 {
                debug!(
                    started = report.started,
                    released = report.released,
                    deferred = report.deferred,
                    voices = self.reconciler.voices().len(),
                    "reconciled"
                );
            }
        }
        self.last_snapshot = Some(snapshot);
        report
    }
}
