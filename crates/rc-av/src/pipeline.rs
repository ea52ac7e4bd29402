//! MOV to M4V conversion pipeline.
//!
//! Four engine invocations per file, strictly in order:
//!
//! 1. extract the audio track as uncompressed float PCM,
//! 2. encode that to AAC at 96 kbit/s (then drop the PCM file),
//! 3. encode the video track to H.264 at 5 Mbit/s, 8-bit 4:2:0,
//! 4. remux video and audio without re-encoding, cut to the shorter stream
//!    (then drop both intermediates).
//!
//! Decoding to PCM first avoids a direct lossy-to-lossy audio re-encode.
//! yuv420p keeps the result playable in stock desktop players.
//!
//! A failing stage stops the run. Intermediates written by earlier stages
//! are left on disk in that case.

use std::path::{Path, PathBuf};

use crate::artifacts::Artifacts;
use crate::transcoder::Transcoder;

const AUDIO_RAW_CODEC: &str = "pcm_f32le";
const AUDIO_CODEC: &str = "aac";
const AUDIO_BITRATE: &str = "96k";
const VIDEO_CODEC: &str = "libx264";
const VIDEO_BITRATE: &str = "5000k";
const PIXEL_FORMAT: &str = "yuv420p";

/// One engine invocation within the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ExtractAudio,
    EncodeAudio,
    EncodeVideo,
    Remux,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 4] = [
        Stage::ExtractAudio,
        Stage::EncodeAudio,
        Stage::EncodeVideo,
        Stage::Remux,
    ];

    /// Short name used in log lines.
    pub fn name(self) -> &'static str {
        match self {
            Stage::ExtractAudio => "extract-audio",
            Stage::EncodeAudio => "encode-audio",
            Stage::EncodeVideo => "encode-video",
            Stage::Remux => "remux",
        }
    }

    /// Engine arguments for this stage.
    pub fn args(self, artifacts: &Artifacts) -> Vec<String> {
        let source = path_arg(artifacts.source());
        let mut args = vec!["-v".to_string(), "error".to_string()];
        match self {
            Stage::ExtractAudio => {
                args.extend(["-i".into(), source]);
                args.extend(["-vn", "-c:a", AUDIO_RAW_CODEC].map(String::from));
                args.extend(["-y".into(), path_arg(&artifacts.audio_raw())]);
            }
            Stage::EncodeAudio => {
                args.extend(["-i".into(), path_arg(&artifacts.audio_raw())]);
                args.extend(["-c:a", AUDIO_CODEC, "-b:a", AUDIO_BITRATE].map(String::from));
                args.extend(["-y".into(), path_arg(&artifacts.audio_final())]);
            }
            Stage::EncodeVideo => {
                args.extend(["-i".into(), source]);
                args.extend(
                    ["-an", "-c:v", VIDEO_CODEC, "-b:v", VIDEO_BITRATE, "-pix_fmt", PIXEL_FORMAT]
                        .map(String::from),
                );
                args.extend(["-y".into(), path_arg(&artifacts.video_final())]);
            }
            Stage::Remux => {
                args.extend(["-i".into(), path_arg(&artifacts.video_final())]);
                args.extend(["-i".into(), path_arg(&artifacts.audio_final())]);
                args.extend(["-c:v", "copy", "-c:a", "copy", "-shortest"].map(String::from));
                args.extend(["-y".into(), path_arg(&artifacts.output())]);
            }
        }
        args
    }

    /// Intermediates no longer needed once this stage has succeeded.
    pub fn consumed(self, artifacts: &Artifacts) -> Vec<PathBuf> {
        match self {
            Stage::EncodeAudio => vec![artifacts.audio_raw()],
            Stage::Remux => vec![artifacts.audio_final(), artifacts.video_final()],
            Stage::ExtractAudio | Stage::EncodeVideo => Vec::new(),
        }
    }
}

/// Convert `source` to `.m4v`, returning the output path.
///
/// # Errors
///
/// - [`rc_core::Error::Engine`] from the first stage whose invocation fails;
///   later stages are not run.
/// - [`rc_core::Error::Filesystem`] if an intermediate cannot be deleted.
pub async fn convert(engine: &dyn Transcoder, source: &Path) -> rc_core::Result<PathBuf> {
    let artifacts = Artifacts::for_source(source);

    for stage in Stage::ALL {
        tracing::debug!(stage = stage.name(), source = %source.display(), "running stage");
        engine.invoke(&stage.args(&artifacts)).await?;

        for path in stage.consumed(&artifacts) {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| rc_core::Error::filesystem(&path, e))?;
        }
    }

    Ok(artifacts.output())
}

/// Run [`convert`] and reduce the outcome to a [`rc_core::ConversionResult`].
pub async fn convert_file(engine: &dyn Transcoder, source: &Path) -> rc_core::ConversionResult {
    match convert(engine, source).await {
        Ok(output) => {
            tracing::debug!(output = %output.display(), "conversion finished");
            None
        }
        Err(e) => {
            let left = leftover_intermediates(&Artifacts::for_source(source)).await;
            if !left.is_empty() {
                tracing::debug!(source = %source.display(), ?left, "intermediates left on disk");
            }
            Some(e.to_string())
        }
    }
}

/// Intermediates of `artifacts` that currently exist.
async fn leftover_intermediates(artifacts: &Artifacts) -> Vec<PathBuf> {
    let mut left = Vec::new();
    for path in artifacts.intermediates() {
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            left.push(path);
        }
    }
    left
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
