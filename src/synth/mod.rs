pub mod message;
pub mod reconciler;
pub mod voice;

pub use message::{Plan, VoiceOp};
pub use reconciler::{loudness, ReconcileReport, Reconciler};
pub use voice::{Voice, VoiceKey, VoiceRegistry};
