//! Real-world scenario benchmarks.
//!
//! A busy session: many participants, dozens of live voices, a large
//! canvas walked every beat.

mod mixer;
mod reconcile;
mod walk;

pub use mixer::bench_mixer;
pub use reconcile::bench_reconcile;
pub use walk::bench_walk;
