//! recconv - converts recorded MOV files to H.264/AAC M4V
//!
//! This library crate exposes the queue and config loading for the binary
//! and for integration testing.

pub mod config;
pub mod queue;

pub use queue::{ConversionQueue, QueueStats};
