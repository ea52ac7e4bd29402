//! Unified error type for recconv.
//!
//! All crates funnel their failures into [`Error`]. The queue reduces any
//! error to its display string via [`ConversionResult`], so the messages here
//! are what ends up in the log trail.

use std::path::{Path, PathBuf};

/// Unified error type covering all failure modes in recconv.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transcoding engine could not be spawned or exited unsuccessfully.
    #[error("Engine error [{tool}]: {message}")]
    Engine {
        /// Name of the engine executable (e.g. "ffmpeg").
        tool: String,
        /// Exit code, if the process ran to completion.
        code: Option<i32>,
        /// Captured diagnostic output or the spawn failure description.
        message: String,
    },

    /// Deleting an intermediate artifact (or writing the output) failed.
    #[error("Filesystem error [{}]: {source}", .path.display())]
    Filesystem {
        /// The file that could not be handled.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An external tool is missing or unusable.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Configuration could not be parsed or is invalid.
    #[error("Config error: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Convenience constructor for [`Error::Engine`].
    pub fn engine(tool: impl Into<String>, code: Option<i32>, message: impl Into<String>) -> Self {
        Error::Engine {
            tool: tool.into(),
            code,
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Filesystem`].
    pub fn filesystem(path: &Path, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the transcoding engine itself.
    pub fn is_engine(&self) -> bool {
        matches!(self, Error::Engine { .. })
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of one conversion as seen by the queue: `None` on success,
/// otherwise the display string of the error that stopped the pipeline.
pub type ConversionResult = Option<String>;
