pub mod mixer;
pub mod scheduler;
pub mod wake;

pub use mixer::{mixer, Mixer, MixerHandle};
pub use scheduler::{BeatChanged, PlayState, Scheduler};
pub use wake::Interval;
