use crate::MIN_TIME;

/*
Linear Gain Ramp
================

Voices never jump in level. Every change of loudness is a straight line from
the level we are at right now to the requested target:

  Level
   target ┤            ______________
          │          ╱
          │        ╱
    start ┤______╱
          └──────┬─────┬──────────────→ Time
               ramp   ramp
               start  end

Like the release stage of an envelope, the ramp snapshots its starting level
and total sample count when it begins and interpolates:

    level = start + (target - start) · elapsed / total

so it lands on the target exactly, with no accumulated rounding error. A new
ramp requested mid-ramp starts from wherever the previous one had got to.
*/

#[derive(Debug, Clone)]
pub struct GainRamp {
    level: f32,
    start_level: f32,
    target: f32,
    total_samples: u32,
    elapsed_samples: u32,
}

impl GainRamp {
    pub fn new(level: f32) -> Self {
        Self {
            level,
            start_level: level,
            target: level,
            total_samples: 0,
            elapsed_samples: 0,
        }
    }

    /// Jump straight to `level`, cancelling any ramp in flight.
    pub fn set(&mut self, level: f32) {
        self.level = level;
        self.start_level = level;
        self.target = level;
        self.total_samples = 0;
        self.elapsed_samples = 0;
    }

    /// Start a linear ramp from the current level to `target`.
    pub fn ramp_to(&mut self, target: f32, seconds: f32, sample_rate: f32) {
        if seconds <= MIN_TIME {
            self.set(target);
            return;
        }
        self.start_level = self.level;
        self.target = target;
        self.total_samples = (seconds * sample_rate).round().max(1.0) as u32;
        self.elapsed_samples = 0;
    }

    /// Advance by one sample and return the level for that sample.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.elapsed_samples < self.total_samples {
            self.elapsed_samples += 1;
            let progress = self.elapsed_samples as f32 / self.total_samples as f32;
            self.level = self.start_level + (self.target - self.start_level) * progress;
            if self.elapsed_samples == self.total_samples {
                self.level = self.target;
            }
        }
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_ramping(&self) -> bool {
        self.elapsed_samples < self.total_samples
    }
}

impl Default for GainRamp {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    #[test]
    fn reaches_target_exactly_at_ramp_end() {
        let mut ramp = GainRamp::new(0.0);
        ramp.ramp_to(0.15, 0.125, SAMPLE_RATE);

        for _ in 0..124 {
            ramp.next_sample();
        }
        assert!(ramp.is_ramping());
        assert!(ramp.level() < 0.15);

        ramp.next_sample();
        assert!(!ramp.is_ramping());
        assert_eq!(ramp.level(), 0.15);
    }

    #[test]
    fn ramps_down_monotonically() {
        let mut ramp = GainRamp::new(0.1);
        ramp.ramp_to(0.0, 0.25, SAMPLE_RATE);

        let mut previous = ramp.level();
        for _ in 0..250 {
            let level = ramp.next_sample();
            assert!(level <= previous);
            previous = level;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn retarget_starts_from_current_level() {
        let mut ramp = GainRamp::new(0.0);
        ramp.ramp_to(1.0, 0.1, SAMPLE_RATE);
        for _ in 0..50 {
            ramp.next_sample();
        }
        let midway = ramp.level();
        ramp.ramp_to(0.0, 0.1, SAMPLE_RATE);
        let first = ramp.next_sample();
        assert!((first - midway * 0.99).abs() < 1e-4);
    }

    #[test]
    fn zero_length_ramp_jumps() {
        let mut ramp = GainRamp::new(0.2);
        ramp.ramp_to(0.05, 0.0, SAMPLE_RATE);
        assert_eq!(ramp.level(), 0.05);
        assert!(!ramp.is_ramping());
    }
}
