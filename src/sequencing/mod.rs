pub mod beat;
pub mod edge;
pub mod notes;
pub mod walker;

pub use beat::{BeatPosition, BeatState};
pub use edge::{EdgeState, EdgeStep};
pub use walker::{GraphHost, GraphWalker, WalkOutcome};
