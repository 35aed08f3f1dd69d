//! Plugin surface: the host-facing ingestion entry point
//!
//! [`ChatLogger`] is what the host adapter wires its event subscriptions
//! to. It holds the configuration snapshot and the [`LogRouter`], and
//! exposes exactly one ingestion call, [`handle_event`], which never
//! returns an error: a broken logging subsystem must stay invisible to
//! the event-delivery path.
//!
//! [`handle_event`]: ChatLogger::handle_event

use parking_lot::RwLock;
use tracing::info;

use crate::classify;
use crate::config::LogConfig;
use crate::events::{GameEvent, WorldTime};
use crate::router::{LogRouter, RouterPhase};
use crate::writer::FlushPolicy;

/// The chat logging plugin.
pub struct ChatLogger {
    config: RwLock<LogConfig>,
    router: LogRouter,
}

impl ChatLogger {
    /// Start the logger with the default flush schedule.
    ///
    /// `start_day` is the host's current day; the config is sanitized
    /// before use. Must be called from within a Tokio runtime.
    pub fn new(config: LogConfig, start_day: u32) -> Self {
        Self::with_flush_policy(config, start_day, FlushPolicy::default())
    }

    /// Start the logger with an explicit flush schedule.
    pub fn with_flush_policy(mut config: LogConfig, start_day: u32, flush: FlushPolicy) -> Self {
        config.sanitize();
        let router = LogRouter::new(config.chatlog_path.clone(), start_day, flush);
        info!(
            target: "chatlog",
            path = %config.chatlog_path.display(),
            day = start_day,
            enabled = config.enabled,
            "chat logger started"
        );
        Self {
            config: RwLock::new(config),
            router,
        }
    }

    /// Ingest one host event.
    ///
    /// No-op while logging is disabled or after shutdown. Classification
    /// failures (tags that name no stream) are silently skipped.
    pub fn handle_event(&self, time: WorldTime, event: &GameEvent) {
        let (enabled, log_dms) = {
            let config = self.config.read();
            (config.enabled, config.log_direct_messages)
        };
        if !enabled {
            return;
        }
        if let Some((key, line)) = classify::classify(event, time, log_dms) {
            self.router.append(&key, time.day, &line);
        }
    }

    /// Apply a configuration change.
    ///
    /// Sanitizes the new settings, swaps the snapshot, and resets the
    /// router so the next write recreates its streams under the possibly
    /// new base path. Existing log files do not move.
    pub fn update_config(&self, mut new: LogConfig) {
        new.sanitize();
        let path = new.chatlog_path.clone();
        *self.config.write() = new;
        info!(target: "chatlog", path = %path.display(), "configuration changed; resetting streams");
        self.router.reset(Some(path));
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> LogConfig {
        self.config.read().clone()
    }

    /// The underlying router, mainly for observability.
    pub fn router(&self) -> &LogRouter {
        &self.router
    }

    /// Flush and close every stream; further events are dropped.
    /// Idempotent.
    pub fn shutdown(&self) {
        self.router.shutdown();
    }

    /// Plugin status string for the host's plugin list.
    pub fn status(&self) -> &'static str {
        match self.router.phase() {
            RouterPhase::Running => "Running",
            RouterPhase::ShuttingDown => "Shutting down",
            RouterPhase::Shutdown => "Shutdown",
        }
    }
}
