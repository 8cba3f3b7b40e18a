use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, info, warn};

use crate::{
    config::SchedulerConfig,
    io::backend::{AudioBackend, AudioClock},
    Error, Result,
};

/*
Look-ahead Scheduling
=====================

Timers on a control loop are late by an unpredictable few milliseconds, so a
sequencer that simply fires "now" on every timer wake-up drifts and jitters.
Instead we split the work into two loops that share one queue:

  wake (every ~25 ms)              frame (display cadence, ~16 ms)
  ───────────────────              ───────────────────────────────
  while next_note < now + 100ms:   pop every note whose time < now
      push (step, next_note)       keep only the last popped step
      next_note += sixteenth       if it differs from the last emitted
      step = (step + 1) % 16           emit BeatChanged(step)

   time ─────────────────────────────────────────────────────────→
          │ now          │ now + schedule_ahead
          ●──────●──────●┆     ← notes already queued, exact times
                         ┆●    ← not yet: outside the window

Note times are computed from the audio clock, not from when the timer
happened to fire, so spacing is exact no matter how late a wake-up is. The
window is wider than the wake interval, so one late wake-up never leaves a
gap in the queue.

The sixteenth length uses the tempo in effect when that note is queued. A
tempo change therefore never moves notes already in the queue; it only
affects the spacing from the next queued note onward.

The queue is a single-producer/single-consumer ring: only `wake` pushes and
only `drain` pops, and times are strictly increasing, so no lock is needed.
*/

/// Sixteenth notes per bar; the step counter wraps at this value.
pub const STEPS_PER_BAR: u8 = 16;

/// A note placed on the queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledNote {
    pub step: u8,
    pub time: f64,
}

/// Emitted by [`Scheduler::drain`] when the sounding step moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatChanged {
    pub step: u8,
    /// Scheduled audio-clock time of the step.
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Running,
}

pub struct Scheduler {
    tempo: f64,
    schedule_ahead: f64,
    state: PlayState,
    current_step: u8,
    next_note_time: f64,
    last_emitted: Option<u8>,
    unlocked: bool,
    tx: Producer<ScheduledNote>,
    rx: Consumer<ScheduledNote>,
}

impl Scheduler {
    pub fn new(config: &SchedulerConfig) -> Result<Self> {
        check_tempo(config.tempo)?;
        let (tx, rx) = RingBuffer::new(config.queue_capacity.max(1));
        Ok(Self {
            tempo: config.tempo,
            schedule_ahead: config.schedule_ahead.as_secs_f64(),
            state: PlayState::Stopped,
            current_step: 0,
            next_note_time: 0.0,
            last_emitted: None,
            unlocked: false,
            tx,
            rx,
        })
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Change the tempo for notes queued from now on.
    pub fn set_tempo(&mut self, bpm: f64) -> Result<()> {
        check_tempo(bpm)?;
        debug!(from = self.tempo, to = bpm, "tempo change");
        self.tempo = bpm;
        Ok(())
    }

    /// Length of one sixteenth note at the current tempo, in seconds.
    pub fn sixteenth(&self) -> f64 {
        0.25 * (60.0 / self.tempo)
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlayState::Running
    }

    /// Notes waiting in the queue.
    pub fn queued(&self) -> usize {
        self.rx.slots()
    }

    /// Start playback at the backend's current time.
    ///
    /// The first start also unlocks the backend, before any voice exists.
    pub fn start<B: AudioBackend + ?Sized>(&mut self, backend: &mut B) {
        if !self.unlocked {
            backend.unlock();
            self.unlocked = true;
        }
        if self.is_running() {
            return;
        }

        // Whatever a previous run left behind is stale now
        while self.rx.pop().is_ok() {}
        self.last_emitted = None;
        self.current_step = 0;
        self.next_note_time = backend.now();
        self.state = PlayState::Running;
        info!(tempo = self.tempo, at = self.next_note_time, "scheduler started");
    }

    pub fn stop(&mut self) {
        if self.is_running() {
            self.state = PlayState::Stopped;
            info!("scheduler stopped");
        }
    }

    pub fn toggle<B: AudioBackend + ?Sized>(&mut self, backend: &mut B) -> PlayState {
        match self.state {
            PlayState::Stopped => self.start(backend),
            PlayState::Running => self.stop(),
        }
        self.state
    }

    /// Wake-source port: queue every note due within the look-ahead window.
    ///
    /// Returns how many notes were queued.
    pub fn wake<C: AudioClock + ?Sized>(&mut self, clock: &C) -> usize {
        if !self.is_running() {
            return 0;
        }
        let horizon = clock.now() + self.schedule_ahead;
        let mut queued = 0;

        while self.next_note_time < horizon {
            let note = ScheduledNote {
                step: self.current_step,
                time: self.next_note_time,
            };
            if self.tx.push(note).is_err() {
                // Picked up again on the next wake from the same note
                warn!(queued = self.queued(), "note queue full, deferring");
                break;
            }
            queued += 1;
            self.next_note_time += self.sixteenth();
            self.current_step = (self.current_step + 1) % STEPS_PER_BAR;
        }
        queued
    }

    /// Display-cadence port: consume every note whose time has passed.
    ///
    /// A backlog collapses into a single event for the most advanced step.
    pub fn drain<C: AudioClock + ?Sized>(&mut self, clock: &C) -> Option<BeatChanged> {
        let now = clock.now();
        let mut latest = None;

        while let Ok(note) = self.rx.peek() {
            if note.time >= now {
                break;
            }
            latest = self.rx.pop().ok();
        }

        let note = latest?;
        if self.last_emitted == Some(note.step) {
            return None;
        }
        self.last_emitted = Some(note.step);
        Some(BeatChanged {
            step: note.step,
            time: note.time,
        })
    }
}

fn check_tempo(bpm: f64) -> Result<()> {
    if bpm.is_finite() && bpm > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTempo(bpm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::testing::{BackendCall, RecordingBackend};
    use std::time::Duration;

    fn config(tempo: f64) -> SchedulerConfig {
        SchedulerConfig {
            tempo,
            ..SchedulerConfig::default()
        }
    }

    fn drain_times(scheduler: &mut Scheduler) -> Vec<f64> {
        let mut times = Vec::new();
        while let Ok(note) = scheduler.rx.pop() {
            times.push(note.time);
        }
        times
    }

    #[test]
    fn spacing_is_a_sixteenth_at_tempo() {
        for tempo in [60.0, 90.0, 133.0, 240.0] {
            let mut backend = RecordingBackend::new();
            let mut scheduler = Scheduler::new(&config(tempo)).unwrap();
            scheduler.start(&mut backend);

            for _ in 0..40 {
                scheduler.wake(&backend);
                backend.clock.advance(0.025);
            }
            let times = drain_times(&mut scheduler);
            assert!(times.len() > 3);
            let expected = 0.25 * 60.0 / tempo;
            for pair in times.windows(2) {
                assert!(((pair[1] - pair[0]) - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn tempo_change_only_affects_future_notes() {
        let mut backend = RecordingBackend::new();
        let mut scheduler = Scheduler::new(&config(120.0)).unwrap();
        scheduler.start(&mut backend);

        // 120 bpm → 0.125 s sixteenths; window 0.1 s queues just t=0
        scheduler.wake(&backend);
        backend.clock.advance(0.1);
        scheduler.wake(&backend);
        scheduler.set_tempo(60.0).unwrap();
        backend.clock.advance(0.6);
        scheduler.wake(&backend);

        let times = drain_times(&mut scheduler);
        assert_eq!(times.len(), 5);
        assert_eq!(times[0], 0.0);
        assert!((times[1] - 0.125).abs() < 1e-9);
        // already fixed when 0.125 was queued, before the change
        assert!((times[2] - 0.25).abs() < 1e-9);
        // queued after the change: 0.25 s apart
        assert!((times[3] - 0.5).abs() < 1e-9);
        assert!((times[4] - 0.75).abs() < 1e-9);
    }

    #[test]
    fn rejects_invalid_tempo() {
        assert!(Scheduler::new(&config(0.0)).is_err());
        let mut scheduler = Scheduler::new(&config(90.0)).unwrap();
        assert!(scheduler.set_tempo(f64::NAN).is_err());
        assert!(scheduler.set_tempo(-10.0).is_err());
        assert_eq!(scheduler.tempo(), 90.0);
    }

    #[test]
    fn backlog_coalesces_to_one_event() {
        let mut backend = RecordingBackend::new();
        let mut scheduler = Scheduler::new(&config(120.0)).unwrap();
        scheduler.start(&mut backend);

        // Ten wakes with no drain in between
        for _ in 0..10 {
            scheduler.wake(&backend);
            backend.clock.advance(0.125);
        }
        let queued = scheduler.queued();
        assert!(queued >= 10);

        backend.clock.advance(5.0);
        let event = scheduler.drain(&backend).expect("one beat event");
        assert_eq!(event.step, ((queued - 1) % 16) as u8);
        assert_eq!(scheduler.queued(), 0);
        assert_eq!(scheduler.drain(&backend), None);
    }

    #[test]
    fn steps_wrap_every_bar() {
        let mut backend = RecordingBackend::new();
        let mut scheduler = Scheduler::new(&config(120.0)).unwrap();
        scheduler.start(&mut backend);

        let mut steps = Vec::new();
        for _ in 0..40 {
            scheduler.wake(&backend);
            backend.clock.advance(0.125);
            if let Some(event) = scheduler.drain(&backend) {
                steps.push(event.step);
            }
        }
        assert_eq!(&steps[..18], &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0, 1]);
    }

    #[test]
    fn unchanged_step_is_not_emitted_twice() {
        let mut backend = RecordingBackend::new();
        let mut scheduler = Scheduler::new(&config(120.0)).unwrap();
        scheduler.start(&mut backend);

        scheduler.wake(&backend);
        backend.clock.advance(0.01);
        assert_eq!(scheduler.drain(&backend).map(|e| e.step), Some(0));
        backend.clock.advance(0.01);
        assert_eq!(scheduler.drain(&backend), None);
    }

    #[test]
    fn stopped_scheduler_queues_nothing() {
        let mut backend = RecordingBackend::new();
        let mut scheduler = Scheduler::new(&config(120.0)).unwrap();
        assert_eq!(scheduler.wake(&backend), 0);

        scheduler.start(&mut backend);
        scheduler.stop();
        backend.clock.advance(1.0);
        assert_eq!(scheduler.wake(&backend), 0);
    }

    #[test]
    fn unlock_happens_once() {
        let mut backend = RecordingBackend::new();
        let mut scheduler = Scheduler::new(&config(120.0)).unwrap();
        assert_eq!(scheduler.toggle(&mut backend), PlayState::Running);
        assert_eq!(scheduler.toggle(&mut backend), PlayState::Stopped);
        assert_eq!(scheduler.toggle(&mut backend), PlayState::Running);
        assert_eq!(backend.count(|c| *c == BackendCall::Unlock), 1);
    }

    #[test]
    fn restart_discards_stale_notes() {
        let mut backend = RecordingBackend::new();
        let mut scheduler = Scheduler::new(&config(120.0)).unwrap();
        scheduler.start(&mut backend);
        scheduler.wake(&backend);
        scheduler.stop();

        backend.clock.advance(2.0);
        scheduler.start(&mut backend);
        assert_eq!(scheduler.queued(), 0);
        scheduler.wake(&backend);
        backend.clock.advance(0.001);
        let event = scheduler.drain(&backend).unwrap();
        assert_eq!(event.step, 0);
        assert!((event.time - 2.0).abs() < 1e-9);
    }

    #[test]
    fn full_queue_defers_without_losing_notes() {
        let mut backend = RecordingBackend::new();
        let mut scheduler = Scheduler::new(&SchedulerConfig {
            tempo: 120.0,
            queue_capacity: 4,
            schedule_ahead: Duration::from_millis(100),
            ..SchedulerConfig::default()
        })
        .unwrap();
        scheduler.start(&mut backend);

        backend.clock.advance(1.0);
        assert_eq!(scheduler.wake(&backend), 4);
        let times = drain_times(&mut scheduler);
        assert_eq!(scheduler.wake(&backend), 4);
        let more = drain_times(&mut scheduler);
        assert!((more[0] - (times[3] + 0.125)).abs() < 1e-9);
    }
}
