//! Shared test harness for integration tests.
//!
//! Provides [`RecordingEngine`], an in-process [`Transcoder`] that records
//! every invocation, and [`write_fake_ffmpeg`], which writes a shell script
//! standing in for the real ffmpeg executable.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rc_av::Transcoder;
use tokio::sync::{oneshot, Notify};

/// In-process engine that records calls and writes the output file named by
/// the last argument.
#[derive(Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<Vec<String>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
    hold: Mutex<Option<oneshot::Receiver<()>>>,
    /// Signalled when the first invocation has started.
    pub started: Notify,
    fail_source: Option<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every invocation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Block the first invocation until the returned sender fires.
    pub fn held(mut self) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        self.hold = Mutex::new(Some(rx));
        (self, tx)
    }

    /// Fail every invocation whose arguments mention `source`.
    pub fn failing_for(mut self, source: &Path) -> Self {
        self.fail_source = Some(source.to_string_lossy().to_string());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Source file of each pipeline run, in the order the runs started.
    pub fn sources(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter(|args| args.iter().any(|a| a == "pcm_f32le"))
            .map(|args| args[3].clone())
            .collect()
    }
}

#[async_trait]
impl Transcoder for RecordingEngine {
    async fn invoke(&self, args: &[String]) -> rc_core::Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().push(args.to_vec());
        self.started.notify_one();

        let hold = self.hold.lock().take();
        if let Some(rx) = hold {
            let _ = rx.await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = if self
            .fail_source
            .as_ref()
            .is_some_and(|s| args.iter().any(|a| a == s))
        {
            Err(rc_core::Error::engine("ffmpeg", Some(1), "fake engine refused input"))
        } else {
            let out = args.last().expect("output argument");
            std::fs::write(out, b"data").map_err(rc_core::Error::from)
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Create an empty source recording named `name` in `dir`.
pub fn source_in(dir: &Path, name: &str) -> PathBuf {
    let source = dir.join(name);
    std::fs::write(&source, b"mov").unwrap();
    source
}

/// Names of `*-tmp-*` files left in `dir`, sorted.
pub fn leftovers(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| n.contains("-tmp-"))
        .collect();
    names.sort();
    names
}

/// A fake ffmpeg shell script and the files it records into.
#[cfg(unix)]
pub struct FakeFfmpeg {
    pub path: PathBuf,
    pub args_log: PathBuf,
    pub count_file: PathBuf,
}

#[cfg(unix)]
impl FakeFfmpeg {
    /// Argument vectors of every recorded invocation.
    pub fn invocations(&self) -> Vec<Vec<String>> {
        let log = std::fs::read_to_string(&self.args_log).unwrap_or_default();
        let mut calls = Vec::new();
        let mut current = Vec::new();
        for line in log.lines() {
            if line == "--end--" {
                calls.push(std::mem::take(&mut current));
            } else {
                current.push(line.to_string());
            }
        }
        calls
    }
}

/// Write an executable script into `dir` that behaves like ffmpeg for the
/// pipeline: it logs its arguments one per line, touches its last argument
/// and exits 0. When `fail_on` is set, that invocation (1-based) instead
/// prints a message to stderr and exits 1. `-version` prints a banner.
#[cfg(unix)]
pub fn write_fake_ffmpeg(dir: &Path, fail_on: Option<usize>) -> FakeFfmpeg {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("ffmpeg");
    let args_log = dir.join("args.log");
    let count_file = dir.join("calls");
    let script = format!(
        r#"#!/bin/sh
if [ "$1" = "-version" ]; then
    echo "ffmpeg version 0.0-fake"
    exit 0
fi
n=$(( $(cat '{count}' 2>/dev/null || echo 0) + 1 ))
echo "$n" > '{count}'
for a in "$@"; do printf '%s\n' "$a" >> '{log}'; done
printf '%s\n' '--end--' >> '{log}'
if [ "$n" -eq {fail_on} ]; then
    echo "fake ffmpeg failure on call $n" >&2
    exit 1
fi
for a in "$@"; do last="$a"; done
: > "$last"
exit 0
"#,
        count = count_file.display(),
        log = args_log.display(),
        fail_on = fail_on.unwrap_or(0),
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

    FakeFfmpeg {
        path,
        args_log,
        count_file,
    }
}
