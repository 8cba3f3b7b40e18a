//! Error types for tonewalk.

use thiserror::Error;

/// Error type for tonewalk operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid tempo: {0}. Must be a finite number above zero")]
    InvalidTempo(f64),

    #[error("Invalid frequency: {0} Hz")]
    InvalidFrequency(f32),

    #[error("Mixer command queue is full")]
    CommandQueueFull,

    #[error("Mixer voice table is full ({0} voices)")]
    VoiceLimit(usize),

    #[error("Malformed message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("Unexpected message: expected {expected}, got {got}")]
    UnexpectedMessage {
        expected: &'static str,
        got: &'static str,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tonewalk operations.
pub type Result<T> = std::result::Result<T, Error>;
