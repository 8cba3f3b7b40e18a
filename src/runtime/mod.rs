//! Client-side pipeline: scheduler, beat counter, exchange and reconciler.
//!
//! The front end owns the loop and calls the two ports:
//!
//! ```ignore
//! let mut client = Client::new(&config, backend, exchange)?;
//! client.set_listening(true);
//! loop {
//!     if wake.poll(Instant::now()) {
//!         client.wake();
//!     }
//!     client.frame();
//! }
//! ```

pub mod client;

pub use client::{Client, FrameReport};
