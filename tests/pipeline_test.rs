//! Pipeline tests against a real child process.
//!
//! A shell script stands in for ffmpeg so these tests exercise process
//! spawning, exit-status handling, and the exact argument vector.

#![cfg(unix)]

mod common;

use std::sync::Arc;

use common::{leftovers, source_in, write_fake_ffmpeg};
use parking_lot::Mutex;
use rc_av::{convert, convert_file, CommandLog, FfmpegTranscoder};

fn capture() -> (CommandLog, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    (
        CommandLog::new(move |line| sink.lock().push(line.to_string())),
        lines,
    )
}

#[tokio::test]
async fn successful_run_leaves_only_output() {
    let dir = tempfile::tempdir().unwrap();
    let fake = write_fake_ffmpeg(dir.path(), None);
    let source = source_in(dir.path(), "clip.mov");
    let engine = FfmpegTranscoder::new(&fake.path).with_log(CommandLog::noop());

    let result = convert_file(&engine, &source).await;

    assert!(result.is_none(), "unexpected failure: {result:?}");
    assert!(dir.path().join("clip.m4v").exists());
    assert!(leftovers(dir.path()).is_empty());
    assert_eq!(fake.invocations().len(), 4);
}

#[tokio::test]
async fn third_invocation_failure_reports_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let fake = write_fake_ffmpeg(dir.path(), Some(3));
    let source = source_in(dir.path(), "clip.mov");
    let engine = FfmpegTranscoder::new(&fake.path).with_log(CommandLog::noop());

    let result = convert_file(&engine, &source).await;

    let error = result.expect("conversion should fail");
    assert!(error.contains("fake ffmpeg failure on call 3"), "{error}");
    assert_eq!(fake.invocations().len(), 3);
    assert!(!dir.path().join("clip.m4v").exists());
    // Stage 2 output is not cleaned up on failure.
    assert_eq!(leftovers(dir.path()), ["clip-tmp-audio.m4a"]);
}

#[tokio::test]
async fn engine_failure_carries_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let fake = write_fake_ffmpeg(dir.path(), Some(1));
    let source = source_in(dir.path(), "clip.mov");
    let engine = FfmpegTranscoder::new(&fake.path).with_log(CommandLog::noop());

    let err = convert(&engine, &source).await.unwrap_err();

    match err {
        rc_core::Error::Engine { tool, code, .. } => {
            assert_eq!(tool, "ffmpeg");
            assert_eq!(code, Some(1));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn log_line_is_quoted_but_argv_is_exact() {
    let dir = tempfile::tempdir().unwrap();
    let fake = write_fake_ffmpeg(dir.path(), None);
    let source = source_in(dir.path(), "My File.mov");
    let (log, lines) = capture();
    let engine = FfmpegTranscoder::new(&fake.path).with_log(log);

    convert(&engine, &source).await.unwrap();

    let lines = lines.lock();
    assert_eq!(lines.len(), 4);
    let quoted = format!("\"{}\"", source.display());
    assert!(lines[0].starts_with("executing: "), "{}", lines[0]);
    assert!(lines[0].contains(&quoted), "{}", lines[0]);
    assert!(lines[0].contains(" -vn "), "{}", lines[0]);
    assert!(!lines[0].contains("\"-vn\""), "{}", lines[0]);

    let first = &fake.invocations()[0];
    assert_eq!(
        first,
        &[
            "-v".to_string(),
            "error".into(),
            "-i".into(),
            source.to_string_lossy().to_string(),
            "-vn".into(),
            "-c:a".into(),
            "pcm_f32le".into(),
            "-y".into(),
            dir.path()
                .join("My File-tmp-audio.wav")
                .to_string_lossy()
                .to_string(),
        ]
    );
    assert!(dir.path().join("My File.m4v").exists());
}

#[tokio::test]
async fn missing_engine_is_engine_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = source_in(dir.path(), "clip.mov");
    let engine = FfmpegTranscoder::new(dir.path().join("no-such-ffmpeg")).with_log(CommandLog::noop());

    let error = convert_file(&engine, &source).await.expect("spawn should fail");

    assert!(error.contains("failed to spawn"), "{error}");
    assert!(leftovers(dir.path()).is_empty());
}
