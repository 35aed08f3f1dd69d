//! Multiplexed log routing with lazy day rotation
//!
//! The [`LogRouter`] owns the only shared mutable structure in the
//! subsystem: the map from [`StreamKey`] to live [`StreamWriter`]. A
//! single mutex serializes every map mutation, so concurrent appends for
//! different keys cannot race on writer creation and a rotation can never
//! interleave with an in-flight lookup.
//!
//! Rotation is lazy: the day number is checked on each append, never by a
//! proactive timer. A quiet stream simply stays on its last day's writer
//! until something is written again.

use std::collections::HashMap;
use std::mem;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::classify::StreamKey;
use crate::writer::{FlushPolicy, StreamWriter};

/// Lifecycle phase of a router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterPhase {
    /// Accepting appends
    Running,
    /// Draining writers; appends are dropped
    ShuttingDown,
    /// Fully drained; appends are dropped
    Shutdown,
}

struct RouterState {
    phase: RouterPhase,
    /// Rotation epoch. Every writer in `writers` was created under this day.
    day: u32,
    base: PathBuf,
    writers: HashMap<StreamKey, Arc<StreamWriter>>,
}

/// Owns the dynamic set of per-stream writers.
///
/// Writers are created lazily on the first append to a key and destroyed
/// on day rollover, on [`reset`](LogRouter::reset), or on
/// [`shutdown`](LogRouter::shutdown). No writer outlives its day or the
/// router.
pub struct LogRouter {
    state: Mutex<RouterState>,
    flush: FlushPolicy,
    runtime: tokio::runtime::Handle,
}

impl LogRouter {
    /// Create a router rooted at `base`, starting on the host's current day.
    ///
    /// Must be called from within a Tokio runtime; the runtime drives the
    /// writers' flush tasks.
    pub fn new(base: impl Into<PathBuf>, start_day: u32, flush: FlushPolicy) -> Self {
        Self {
            state: Mutex::new(RouterState {
                phase: RouterPhase::Running,
                day: start_day,
                base: base.into(),
                writers: HashMap::new(),
            }),
            flush,
            runtime: tokio::runtime::Handle::current(),
        }
    }

    /// Append `line` to the stream named by `key`, rotating first if
    /// `day_now` has advanced past the current day.
    ///
    /// Rotation is atomic: the stale writer set is drained and replaced
    /// under the router lock before any lookup for the new day, and the
    /// triggering write lands in a fresh writer, never a stale one. The
    /// append itself also happens under the lock, so a concurrent
    /// rotation or shutdown cannot close the writer between lookup and
    /// append.
    ///
    /// Appends after shutdown begins are dropped silently; the host may
    /// deliver a final event after shutdown and that must not reopen a
    /// file.
    pub fn append(&self, key: &StreamKey, day_now: u32, line: &str) {
        let mut state = self.state.lock();
        if state.phase != RouterPhase::Running {
            debug!(target: "chatlog", stream = %key, "append after shutdown dropped");
            return;
        }

        if day_now > state.day {
            let stale = mem::take(&mut state.writers);
            info!(
                target: "chatlog",
                from = state.day,
                to = day_now,
                streams = stale.len(),
                "day rollover; rotating log streams"
            );
            for writer in stale.into_values() {
                writer.close();
            }
            state.day = day_now;
        }

        let writer = match state.writers.get(key) {
            Some(writer) => Arc::clone(writer),
            None => {
                let path = key.log_path(&state.base, state.day);
                debug!(target: "chatlog", stream = %key, path = %path.display(), "opening log stream");
                let writer = Arc::new(StreamWriter::open(path, self.flush, &self.runtime));
                state.writers.insert(key.clone(), Arc::clone(&writer));
                writer
            }
        };
        writer.append(line);
    }

    /// Close and discard every live writer without a day change.
    ///
    /// Used on configuration change; the next append lazily recreates
    /// streams under `new_base` when one is given. No-op unless running.
    pub fn reset(&self, new_base: Option<PathBuf>) {
        let mut state = self.state.lock();
        if state.phase != RouterPhase::Running {
            return;
        }
        let writers = mem::take(&mut state.writers);
        info!(target: "chatlog", streams = writers.len(), "resetting log streams");
        for writer in writers.into_values() {
            writer.close();
        }
        if let Some(base) = new_base {
            state.base = base;
        }
    }

    /// Flush and close every writer and stop accepting appends.
    ///
    /// Idempotent, and completes even when individual flushes or closes
    /// fail; those errors are logged by the writers and swallowed.
    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        if state.phase == RouterPhase::Shutdown {
            return;
        }
        state.phase = RouterPhase::ShuttingDown;
        let writers = mem::take(&mut state.writers);
        info!(target: "chatlog", streams = writers.len(), "shutting down log router");
        for writer in writers.into_values() {
            writer.close();
        }
        state.phase = RouterPhase::Shutdown;
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RouterPhase {
        self.state.lock().phase
    }

    /// The rotation day currently in effect.
    pub fn current_day(&self) -> u32 {
        self.state.lock().day
    }

    /// Number of live writers.
    pub fn stream_count(&self) -> usize {
        self.state.lock().writers.len()
    }
}

impl Drop for LogRouter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
