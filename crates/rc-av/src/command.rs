//! Builder for executing external tool commands.
//!
//! The process is always started from an exact argument vector. The quoted
//! form produced by [`render_command_line`] is for log lines only and is
//! never handed to a shell.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use rc_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> rc_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffmpeg"))
///     .arg("-v").arg("error")
///     .arg("-i").arg("/recordings/My Clip.mov")
///     .args(["-vn", "-c:a", "pcm_f32le", "-y", "/recordings/My Clip-tmp-audio.wav"])
///     .execute()
///     .await?;
/// println!("{}", output.stderr);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Run the process in `dir` instead of the current directory.
    pub fn current_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// The exact argument vector that will be passed to the process.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Human-readable command line for logging.
    pub fn display(&self) -> String {
        render_command_line(&self.program, &self.args)
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - Returns [`rc_core::Error::Engine`] if spawning the process fails.
    /// - Returns [`rc_core::Error::Engine`] if the process exits with a
    ///   non-zero status (message includes stderr, or stdout when stderr is
    ///   empty).
    pub async fn execute(&self) -> rc_core::Result<ToolOutput> {
        let program_name = program_name(&self.program);

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }

        let child = cmd
            .spawn()
            .map_err(|e| rc_core::Error::engine(&program_name, None, format!("failed to spawn: {e}")))?;

        let output = child.wait_with_output().await.map_err(|e| {
            rc_core::Error::engine(
                &program_name,
                None,
                format!("I/O error waiting for process: {e}"),
            )
        })?;

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            let diagnostic = if tool_output.stderr.trim().is_empty() {
                tool_output.stdout.trim()
            } else {
                tool_output.stderr.trim()
            };
            return Err(rc_core::Error::engine(
                program_name,
                output.status.code(),
                format!("exited with {}: {}", output.status, diagnostic),
            ));
        }

        Ok(tool_output)
    }
}

/// Render a command line for log output.
///
/// Arguments containing whitespace are wrapped in double quotes, with
/// embedded double quotes escaped as `\"`. Everything else is emitted as is.
pub fn render_command_line(program: &Path, args: &[String]) -> String {
    let mut line = program.to_string_lossy().to_string();
    for arg in args {
        line.push(' ');
        if arg.chars().any(char::is_whitespace) {
            line.push('"');
            line.push_str(&arg.replace('"', "\\\""));
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}

fn program_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string_lossy().to_string())
}
