//! Output and intermediate file naming.
//!
//! Given a source `X.mov`, the pipeline writes `X.m4v` and uses
//! `X-tmp-audio.wav`, `X-tmp-audio.m4a` and `X-tmp-video.m4v` while it runs.
//! All files live next to the source. Names are fixed for compatibility with
//! existing recordings folders.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension stripped from the source to form the base path.
const SOURCE_EXTENSION: &str = "mov";
/// Extension of the final output.
const OUTPUT_EXTENSION: &str = "m4v";

const AUDIO_RAW_SUFFIX: &str = "-tmp-audio.wav";
const AUDIO_FINAL_SUFFIX: &str = "-tmp-audio.m4a";
const VIDEO_FINAL_SUFFIX: &str = "-tmp-video.m4v";

/// Every path one conversion touches, derived from its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    source: PathBuf,
    base: PathBuf,
}

impl Artifacts {
    /// Derive the artifact paths for `source`.
    ///
    /// A trailing lowercase `.mov` is stripped. Any other extension,
    /// including `.MOV`, stays part of the base name, so `clip.avi` converts
    /// to `clip.avi.m4v` and `X.MOV` never collides with `X.mov`.
    pub fn for_source(source: &Path) -> Self {
        let is_mov = source
            .extension()
            .is_some_and(|ext| ext == SOURCE_EXTENSION);
        let base = if is_mov {
            source.with_extension("")
        } else {
            source.to_path_buf()
        };
        Self {
            source: source.to_path_buf(),
            base,
        }
    }

    /// The source recording.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Source path without its `.mov` extension.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Uncompressed float PCM audio extracted from the source.
    pub fn audio_raw(&self) -> PathBuf {
        self.with_suffix(AUDIO_RAW_SUFFIX)
    }

    /// AAC-encoded audio.
    pub fn audio_final(&self) -> PathBuf {
        self.with_suffix(AUDIO_FINAL_SUFFIX)
    }

    /// H.264-encoded video without audio.
    pub fn video_final(&self) -> PathBuf {
        self.with_suffix(VIDEO_FINAL_SUFFIX)
    }

    /// The remuxed result.
    pub fn output(&self) -> PathBuf {
        self.with_suffix(&format!(".{OUTPUT_EXTENSION}"))
    }

    /// All intermediate files, in the order the pipeline creates them.
    pub fn intermediates(&self) -> [PathBuf; 3] {
        [self.audio_raw(), self.audio_final(), self.video_final()]
    }

    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.base.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }
}
