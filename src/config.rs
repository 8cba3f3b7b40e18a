//! Client configuration.
//!
//! Everything has a sensible default, so a config file only needs the keys
//! it wants to change:
//!
//! ```toml
//! [scheduler]
//! tempo = 120.0
//! lookahead_ms = 25
//!
//! [presence]
//! multiplayer = true
//! ```

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: SchedulerConfig,
    pub presence: PresenceConfig,
    pub mixer: MixerConfig,
}

/// Look-ahead scheduler timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Tempo in beats per minute. One step is a sixteenth note.
    pub tempo: f64,
    /// How often the wake source runs the enqueue step.
    #[serde(rename = "lookahead_ms", with = "millis")]
    pub lookahead: Duration,
    /// How far ahead of the audio clock notes are queued.
    #[serde(rename = "schedule_ahead_ms", with = "millis")]
    pub schedule_ahead: Duration,
    /// Capacity of the note queue.
    pub queue_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tempo: 90.0,
            lookahead: Duration::from_millis(25),
            schedule_ahead: Duration::from_millis(100),
            queue_capacity: 64,
        }
    }
}

/// Which sessions are audible and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Play every session's tones, not only our own.
    pub multiplayer: bool,
    /// Attenuate tones by their canvas distance from us.
    pub proximity: bool,
}

/// Software mixer sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    pub max_voices: usize,
    pub command_capacity: usize,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            max_voices: 256,
            command_capacity: 1024,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.scheduler;
        if !(s.tempo.is_finite() && s.tempo > 0.0) {
            return Err(Error::InvalidTempo(s.tempo));
        }
        if s.lookahead.is_zero() {
            return Err(Error::InvalidConfig("lookahead_ms must be above zero".into()));
        }
        if s.schedule_ahead <= s.lookahead {
            return Err(Error::InvalidConfig(format!(
                "schedule_ahead_ms ({}) must exceed lookahead_ms ({})",
                s.schedule_ahead.as_millis(),
                s.lookahead.as_millis()
            )));
        }
        if s.queue_capacity == 0 || self.mixer.max_voices == 0 || self.mixer.command_capacity == 0 {
            return Err(Error::InvalidConfig("capacities must be above zero".into()));
        }
        Ok(())
    }

    /// Set the tempo in beats per minute
    pub fn tempo(mut self, bpm: f64) -> Self {
        self.scheduler.tempo = bpm;
        self
    }

    pub fn multiplayer(mut self, enabled: bool) -> Self {
        self.presence.multiplayer = enabled;
        self
    }

    pub fn proximity(mut self, enabled: bool) -> Self {
        self.presence.proximity = enabled;
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
