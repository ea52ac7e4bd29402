//! The [`Transcoder`] trait: one engine invocation per call.
//!
//! [`FfmpegTranscoder`] is the production implementation. It renders a
//! readable command line into its [`CommandLog`], then runs the engine with
//! the exact argument vector.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::command::ToolCommand;
use crate::tools::{ToolRegistry, FFMPEG};

/// Sink for the human-readable line logged before each invocation.
pub struct CommandLog {
    callback: Box<dyn Fn(&str) + Send + Sync>,
}

impl CommandLog {
    /// Create a new sink from the given callback.
    pub fn new(callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Sink that forwards every line to `tracing` at info level.
    pub fn tracing() -> Self {
        Self::new(|line| tracing::info!("{line}"))
    }

    /// Sink that discards every line.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Emit one line.
    pub fn log(&self, line: &str) {
        (self.callback)(line);
    }
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::tracing()
    }
}

impl std::fmt::Debug for CommandLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandLog").finish_non_exhaustive()
    }
}

/// Issues single transcoding-engine invocations.
///
/// Implementations must spawn at most one process per call and must not
/// retry.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Run the engine with `args` and wait for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`rc_core::Error::Engine`] on spawn failure or non-zero exit.
    async fn invoke(&self, args: &[String]) -> rc_core::Result<()>;
}

/// [`Transcoder`] backed by an ffmpeg executable.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
    log: Arc<CommandLog>,
}

impl FfmpegTranscoder {
    /// Create an invoker for the engine at `program`, logging to `tracing`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            log: Arc::new(CommandLog::tracing()),
        }
    }

    /// Create an invoker using the ffmpeg resolved by `tools`.
    pub fn from_registry(tools: &ToolRegistry) -> rc_core::Result<Self> {
        Ok(Self::new(tools.require(FFMPEG)?))
    }

    /// Builder: replace the command log sink.
    pub fn with_log(mut self, log: CommandLog) -> Self {
        self.log = Arc::new(log);
        self
    }

    /// Path of the engine executable.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn invoke(&self, args: &[String]) -> rc_core::Result<()> {
        let mut cmd = ToolCommand::new(self.program.clone());
        cmd.args(args.iter().cloned());

        self.log.log(&format!("executing: {}", cmd.display()));

        cmd.execute().await?;
        Ok(())
    }
}
