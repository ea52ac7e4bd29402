//! Single-flight conversion queue.
//!
//! [`ConversionQueue`] accepts paths at any rate and feeds them to the
//! conversion pipeline one at a time, in submission order. Enqueueing never
//! waits. The first enqueue on an idle queue starts a drain task; later
//! enqueues only append. The drain task runs until the queue is empty and
//! then stops.
//!
//! The job list and the `draining` flag share one lock, so a drain task that
//! sees an empty queue clears the flag before any new enqueue can look at it.
//!
//! # Example
//!
//! ```rust,ignore
//! let queue = ConversionQueue::new(Arc::new(engine), Arc::new(EventBus::default()));
//! queue.enqueue("/recordings/a.mov");
//! queue.enqueue("/recordings/b.mov");
//! queue.wait_idle().await;
//! ```

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use rc_av::Transcoder;
use rc_core::events::{EventBus, QueueEvent};
use rc_core::ConversionResult;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{info, warn};

/// Tally of finished jobs since the queue was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Default)]
struct QueueState {
    jobs: VecDeque<PathBuf>,
    draining: bool,
    stats: QueueStats,
}

struct Inner {
    engine: Arc<dyn Transcoder>,
    events: Arc<EventBus>,
    state: Mutex<QueueState>,
    busy: watch::Sender<bool>,
    runtime: Handle,
}

/// Handle to the conversion queue. Cheap to clone.
#[derive(Clone)]
pub struct ConversionQueue {
    inner: Arc<Inner>,
}

impl ConversionQueue {
    /// Create an empty queue that converts with `engine` and reports to
    /// `events`.
    ///
    /// Must be called from within a Tokio runtime; drain tasks are spawned
    /// on that runtime even when [`enqueue`](Self::enqueue) is called from
    /// another thread.
    pub fn new(engine: Arc<dyn Transcoder>, events: Arc<EventBus>) -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                engine,
                events,
                state: Mutex::new(QueueState::default()),
                busy,
                runtime: Handle::current(),
            }),
        }
    }

    /// Append `path` to the tail of the queue and start draining if idle.
    ///
    /// The outcome of the conversion is only logged and published as a
    /// [`QueueEvent::Finished`].
    pub fn enqueue(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let mut state = self.inner.state.lock();
        state.jobs.push_back(path.clone());
        let depth = state.jobs.len();
        info!(path = %path.display(), depth, "added to queue");
        self.inner.events.broadcast(QueueEvent::Queued { path, depth });

        if !state.draining {
            state.draining = true;
            self.inner.busy.send_replace(true);
            self.inner.runtime.spawn(drain(self.inner.clone()));
        }
    }

    /// Number of jobs waiting or in progress.
    pub fn depth(&self) -> usize {
        self.inner.state.lock().jobs.len()
    }

    /// Whether a drain task is currently running.
    pub fn is_draining(&self) -> bool {
        self.inner.state.lock().draining
    }

    /// Finished job counts.
    pub fn stats(&self) -> QueueStats {
        self.inner.state.lock().stats
    }

    /// Wait until the queue is empty and no drain task is running.
    pub async fn wait_idle(&self) {
        let mut busy = self.inner.busy.subscribe();
        // The sender lives in `inner`, which we hold, so this cannot fail.
        let _ = busy.wait_for(|busy| !*busy).await;
    }
}

/// Convert queued jobs head-first until the queue is empty.
async fn drain(inner: Arc<Inner>) {
    loop {
        let path = {
            let mut state = inner.state.lock();
            match state.jobs.front() {
                Some(path) => path.clone(),
                None => {
                    state.draining = false;
                    inner.events.broadcast(QueueEvent::Idle);
                    inner.busy.send_replace(false);
                    info!("queue drained");
                    return;
                }
            }
        };

        inner.events.broadcast(QueueEvent::Started { path: path.clone() });

        let result = convert_isolated(&inner, path.clone()).await;
        match result {
            None => info!(path = %path.display(), "converting succeeded"),
            Some(ref error) => warn!(path = %path.display(), error = %error, "converting failed"),
        }

        let depth = {
            let mut state = inner.state.lock();
            state.jobs.pop_front();
            if result.is_none() {
                state.stats.succeeded += 1;
            } else {
                state.stats.failed += 1;
            }
            state.jobs.len()
        };
        info!(path = %path.display(), depth, "removed from queue");
        inner.events.broadcast(QueueEvent::Finished {
            path,
            error: result,
            depth,
        });
    }
}

/// Run one conversion on its own task so a panicking engine fails the job
/// instead of killing the drain loop.
async fn convert_isolated(inner: &Arc<Inner>, path: PathBuf) -> ConversionResult {
    let engine = inner.engine.clone();
    let job = inner
        .runtime
        .spawn(async move { rc_av::convert_file(engine.as_ref(), &path).await });
    match job.await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Some("conversion panicked".to_string()),
        Err(e) => Some(format!("conversion aborted: {e}")),
    }
}
