//! Logging configuration
//!
//! A plain data object read by the logger, persisted as JSON with the
//! host's PascalCase field convention. The logger holds an owned snapshot;
//! a change is applied explicitly through
//! [`ChatLogger::update_config`](crate::logger::ChatLogger::update_config),
//! which resets the router so the next write recreates its streams under
//! the new settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ChatlogError;

/// When to tell players that chat is being logged.
///
/// Deciding *whether* to notify is config policy and lives here; actually
/// delivering an in-game notification is the host's business.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyPolicy {
    /// On every login
    AllLogin,
    /// Only on a player's first login
    #[default]
    FirstLogin,
    /// Never
    Never,
}

impl NotifyPolicy {
    /// Whether a player logging in should be notified under this policy.
    pub fn should_notify(self, first_login: bool) -> bool {
        match self {
            NotifyPolicy::AllLogin => true,
            NotifyPolicy::FirstLogin => first_login,
            NotifyPolicy::Never => false,
        }
    }
}

/// Chat logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LogConfig {
    /// Master switch; nothing is written while this is false
    pub enabled: bool,
    /// When to notify players about logging
    pub notify_users: NotifyPolicy,
    /// Whether direct (player to player) messages are logged at all
    pub log_direct_messages: bool,
    /// Root directory of the log tree; must be absolute and not name a file
    pub chatlog_path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            notify_users: NotifyPolicy::default(),
            log_direct_messages: false,
            chatlog_path: Self::default_log_path(),
        }
    }
}

impl LogConfig {
    /// Default log tree location under the server's working directory.
    pub fn default_log_path() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("Mods")
            .join("ChatLogger")
            .join("Logs")
    }

    /// Reset the log path to the default when the configured value is
    /// unusable: empty, relative, or naming a file rather than a
    /// directory.
    ///
    /// Returns `true` when the path was reset.
    pub fn sanitize(&mut self) -> bool {
        let path = &self.chatlog_path;
        let invalid =
            path.as_os_str().is_empty() || !path.is_absolute() || path.extension().is_some();
        if invalid {
            warn!(
                target: "chatlog",
                path = %path.display(),
                "invalid chatlog path; falling back to default"
            );
            self.chatlog_path = Self::default_log_path();
        }
        invalid
    }

    /// Load settings from a JSON file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ChatlogError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&raw)?;
        config.sanitize();
        Ok(config)
    }

    /// Persist settings as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ChatlogError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}
