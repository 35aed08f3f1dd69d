//! Buffered append-only stream writer with a periodic flush task
//!
//! Each [`StreamWriter`] owns exactly one file handle for its lifetime.
//! Appends go to an in-memory buffer; a background Tokio task flushes the
//! buffer on a fixed schedule so the event-delivery path never waits on
//! disk latency. A writer whose file cannot be opened is constructed in a
//! disabled state: the failure is logged once and every append becomes a
//! no-op, because a logging subsystem failure must never surface on the
//! write path.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::ChatlogError;

/// Schedule for a writer's background flush task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    /// Delay before the first flush
    pub delay: Duration,
    /// Interval between flushes
    pub interval: Duration,
}

impl Default for FlushPolicy {
    /// Flush immediately once, then every minute.
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            interval: Duration::from_secs(60),
        }
    }
}

/// One append-only log file plus its flush task.
///
/// The file path is derived once at creation and never changes; day
/// rotation always creates a new writer rather than repointing this one.
pub struct StreamWriter {
    path: PathBuf,
    /// `None` when the open failed or the writer has been closed.
    inner: Arc<Mutex<Option<BufWriter<File>>>>,
    flush_task: Mutex<Option<JoinHandle<()>>>,
}

impl StreamWriter {
    /// Open `path` in append mode, creating intermediate directories, and
    /// start the periodic flush task on `runtime`.
    ///
    /// Never fails: on an I/O error the failure is reported once to the
    /// operational log and the returned writer is inert.
    pub fn open(
        path: impl Into<PathBuf>,
        policy: FlushPolicy,
        runtime: &tokio::runtime::Handle,
    ) -> Self {
        let path = path.into();
        let inner = match Self::open_file(&path) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(err) => {
                error!(target: "chatlog", error = %err, "failed to open log stream; stream disabled");
                None
            }
        };
        let enabled = inner.is_some();
        let inner = Arc::new(Mutex::new(inner));

        let flush_task = enabled.then(|| {
            let shared = Arc::clone(&inner);
            let flush_path = path.clone();
            // tokio intervals panic on a zero period
            let interval = policy.interval.max(Duration::from_millis(1));
            let start = tokio::time::Instant::now() + policy.delay;
            runtime.spawn(async move {
                let mut ticks = tokio::time::interval_at(start, interval);
                loop {
                    ticks.tick().await;
                    flush_buffer(&shared, &flush_path);
                }
            })
        });

        Self {
            path,
            inner,
            flush_task: Mutex::new(flush_task),
        }
    }

    fn open_file(path: &Path) -> Result<File, ChatlogError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ChatlogError::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| ChatlogError::FileOpen {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Append `line` plus a trailing newline to the buffer.
    ///
    /// No-op on a disabled or closed writer. Write errors are not
    /// surfaced here; a short write shows up on the flush path instead.
    pub fn append(&self, line: &str) {
        let mut guard = self.inner.lock();
        if let Some(writer) = guard.as_mut() {
            if let Err(error) = writeln!(writer, "{line}") {
                debug!(target: "chatlog", path = %self.path.display(), %error, "buffered append failed");
            }
        }
    }

    /// Force buffered bytes out to the OS now.
    ///
    /// Failures are logged and retried on the next flush tick.
    pub fn flush(&self) {
        flush_buffer(&self.inner, &self.path);
    }

    /// Whether this writer still holds an open handle.
    pub fn is_active(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Path this writer appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop the flush task, flush remaining bytes, and close the handle.
    ///
    /// Idempotent. The flush body runs under the writer lock with no
    /// await point, so aborting the task cannot tear a flush; acquiring
    /// the lock afterwards waits out any flush already in flight before
    /// the handle goes away.
    pub fn close(&self) {
        if let Some(task) = self.flush_task.lock().take() {
            task.abort();
        }

        let writer = self.inner.lock().take();
        let Some(mut writer) = writer else {
            return;
        };
        if let Err(source) = writer.flush() {
            let err = ChatlogError::Flush {
                path: self.path.clone(),
                source,
            };
            warn!(target: "chatlog", error = %err, "final flush failed");
        }
        let file = match writer.into_inner() {
            Ok(file) => file,
            Err(err) => {
                let err = ChatlogError::Close {
                    path: self.path.clone(),
                    source: err.into_error(),
                };
                warn!(target: "chatlog", error = %err, "closing log stream failed");
                return;
            }
        };
        if let Err(source) = file.sync_all() {
            let err = ChatlogError::Close {
                path: self.path.clone(),
                source,
            };
            warn!(target: "chatlog", error = %err, "closing log stream failed");
        }
    }
}

impl Drop for StreamWriter {
    fn drop(&mut self) {
        self.close();
    }
}

fn flush_buffer(inner: &Mutex<Option<BufWriter<File>>>, path: &Path) {
    let mut guard = inner.lock();
    if let Some(writer) = guard.as_mut() {
        if let Err(source) = writer.flush() {
            let err = ChatlogError::Flush {
                path: path.to_path_buf(),
                source,
            };
            warn!(target: "chatlog", error = %err, "flush failed; retrying on next tick");
        }
    }
}
