//! Transcoding engine discovery.
//!
//! The [`ToolRegistry`] resolves the ffmpeg executable once at startup so the
//! pipeline only ever sees a runnable path. Resolution order: the configured
//! path, a bundled copy in `<exe dir>/ffmpeg/`, then `PATH`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Name of the transcoding engine.
pub const FFMPEG: &str = "ffmpeg";

/// Known tool names that the registry manages.
const KNOWN_TOOLS: &[&str] = &[FFMPEG];

/// Directory next to the executable that may hold a bundled engine.
const BUNDLE_DIR: &str = "ffmpeg";

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Version string (first line of `-version` output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry holding discovered tool paths.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, PathBuf>,
}

impl ToolRegistry {
    /// Discover tools using the config override, the bundle directory next
    /// to the running executable, and finally `PATH`.
    pub fn discover(tools_config: &rc_core::config::ToolsConfig) -> Self {
        let bundle_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(BUNDLE_DIR)));
        Self::discover_in(tools_config, bundle_dir.as_deref())
    }

    /// Like [`discover`](Self::discover) with an explicit bundle directory.
    pub fn discover_in(
        tools_config: &rc_core::config::ToolsConfig,
        bundle_dir: Option<&Path>,
    ) -> Self {
        let mut tools = HashMap::new();

        for &name in KNOWN_TOOLS {
            let custom_path = match name {
                FFMPEG => tools_config.ffmpeg_path.as_deref(),
                _ => None,
            };

            let resolved = custom_path
                .filter(|p| {
                    let exists = p.exists();
                    if !exists {
                        tracing::warn!("configured {name} path {} does not exist", p.display());
                    }
                    exists
                })
                .map(Path::to_path_buf)
                .or_else(|| bundle_dir.map(|dir| dir.join(executable_name(name))).filter(|p| p.is_file()))
                .or_else(|| which::which(name).ok());

            match resolved {
                Some(path) => {
                    tracing::debug!("resolved {name} at {}", path.display());
                    tools.insert(name.to_string(), path);
                }
                None => tracing::debug!("{name} not found"),
            }
        }

        Self { tools }
    }

    /// Registry with a fixed path for one tool, bypassing discovery.
    pub fn with_tool(name: &str, path: impl Into<PathBuf>) -> Self {
        let mut tools = HashMap::new();
        tools.insert(name.to_string(), path.into());
        Self { tools }
    }

    /// Return the path for the given tool, or an [`rc_core::Error::Tool`] if
    /// the tool was not found during discovery.
    pub fn require(&self, name: &str) -> rc_core::Result<&Path> {
        self.tools
            .get(name)
            .map(PathBuf::as_path)
            .ok_or_else(|| rc_core::Error::tool(name, format!("{name} not found; is it installed and in PATH?")))
    }

    /// Check all known tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        KNOWN_TOOLS
            .iter()
            .map(|&name| match self.tools.get(name) {
                Some(path) => ToolInfo {
                    name: name.to_string(),
                    available: true,
                    version: detect_version(path),
                    path: Some(path.clone()),
                },
                None => ToolInfo {
                    name: name.to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            })
            .collect()
    }
}

fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

/// Run `<tool> -version` and return the first line of stdout.
fn detect_version(path: &Path) -> Option<String> {
    let output = std::process::Command::new(path).arg("-version").output().ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}
