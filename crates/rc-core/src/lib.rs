//! rc-core: shared error type, configuration, and queue events.
//!
//! This crate is the foundational dependency for the other rc-* crates and
//! the `recconv` binary.

pub mod config;
pub mod error;
pub mod events;

pub use error::{ConversionResult, Error, Result};
