use std::time::{Duration, Instant};

/// Fixed-period wake source polled from a host loop.
///
/// The host calls [`Interval::poll`] as often as it likes; it reports due at
/// most once per period. Missed periods are not replayed: the scheduler's
/// look-ahead window absorbs late wake-ups, so catching up would only queue
/// the same notes sooner.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next: Option<Instant>,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns true when a wake-up is due at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next {
            Some(next) if now < next => false,
            _ => {
                self.next = Some(now + self.period);
                true
            }
        }
    }

    /// Time left until the next wake-up is due.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next
            .map_or(Duration::ZERO, |next| next.saturating_duration_since(now))
    }
}
