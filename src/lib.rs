pub mod config;
pub mod dsp;
pub mod engine; // Look-ahead scheduling and the software mixer
pub mod error;
pub mod host; // Canvas-side graph walking and snapshot building
pub mod ids;
pub mod io;
pub mod protocol; // PING/PONG exchange shapes
pub mod runtime;
pub mod sequencing; // Edge counters, graph walker, beat state
pub mod synth; // Voice registry and presence reconciliation

pub use config::Config;
pub use error::{Error, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

/// Canvas distance at which a tone becomes inaudible.
pub const MAX_DISTANCE: f32 = 700.0;
