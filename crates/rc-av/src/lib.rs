//! # rc-av
//!
//! Transcoding engine management and the MOV conversion pipeline.
//!
//! This crate provides:
//!
//! - **Engine discovery** ([`ToolRegistry`]) -- find the ffmpeg executable
//!   from config, a bundled copy next to the binary, or `PATH`.
//! - **Command execution** ([`ToolCommand`]) -- async builder that runs an
//!   external process with an exact argument vector and captures its output.
//! - **Transcoder invoker** ([`Transcoder`], [`FfmpegTranscoder`]) -- one
//!   logged engine invocation per call.
//! - **Artifact naming** ([`Artifacts`]) -- the output and intermediate file
//!   paths derived from a source file.
//! - **Conversion pipeline** ([`convert`], [`convert_file`]) -- the fixed
//!   four-stage audio/video re-encode and remux.

pub mod artifacts;
pub mod command;
pub mod pipeline;
pub mod tools;
pub mod transcoder;

// ---- Re-exports for convenience ----

pub use artifacts::Artifacts;
pub use command::{render_command_line, ToolCommand, ToolOutput};
pub use pipeline::{convert, convert_file, Stage};
pub use tools::{ToolInfo, ToolRegistry};
pub use transcoder::{CommandLog, FfmpegTranscoder, Transcoder};
