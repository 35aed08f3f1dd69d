//! Host event types consumed at the ingestion boundary
//!
//! The host application pushes these notifications into [`ChatLogger`]
//! together with a [`WorldTime`] snapshot of its simulation clock. The
//! types are serde-derived so recorded event streams can be replayed
//! through the CLI.
//!
//! [`ChatLogger`]: crate::logger::ChatLogger

use serde::{Deserialize, Serialize};

/// Snapshot of the host's simulation clock, delivered with each event.
///
/// `day` is the rotation epoch: it is monotonically non-decreasing from
/// the logger's perspective (the host never rewinds it). `seconds` is
/// seconds-of-day and may run past 86 400; consumers take it modulo 24h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldTime {
    /// Day number since world creation
    pub day: u32,
    /// Seconds elapsed since midnight of `day`
    pub seconds: u32,
}

impl WorldTime {
    /// Create a clock snapshot from a day number and seconds-of-day.
    pub fn new(day: u32, seconds: u32) -> Self {
        Self { day, seconds }
    }
}

/// What happened to a user's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerEventKind {
    /// First ever appearance in the world
    Joined,
    /// Session started
    LoggedIn,
    /// Session ended
    LoggedOut,
}

/// A single notification from the host's event bus.
///
/// Delivery order across distinct events is whatever the host provides;
/// the logger does not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A chat message was sent somewhere (channel or direct message)
    ChatSent {
        /// Display name of the sender (may contain markup)
        sender: String,
        /// Destination tag, e.g. `#general` or `@Bob`
        tag: String,
        /// Message body (may contain markup)
        text: String,
    },
    /// A user joined the world, logged in, or logged out
    Player {
        /// Display name of the user (may contain markup)
        user: String,
        /// Which lifecycle transition occurred
        kind: PlayerEventKind,
    },
}
