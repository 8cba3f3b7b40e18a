// Purpose - external interfaces: the audio backend seam and its test doubles

pub mod backend;
pub mod testing;

pub use backend::{AudioBackend, AudioClock, VoiceHandle};

