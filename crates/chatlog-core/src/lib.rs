//! Chat Log Core Library
//!
//! Durable, per-stream chat logging for a game server host. Incoming
//! chat and login notifications are appended as timestamped text lines to
//! append-only files on disk, one file per logical stream per in-game
//! day.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Host adapter (ChatLogger, logger module)                       │
//! │  - single ingestion entry point, config snapshot                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Classification (classify module, pure)                         │
//! │  - event → StreamKey + formatted "[HH:MM:SS] sender: text" line │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Routing (LogRouter, router module)                             │
//! │  - StreamKey → StreamWriter map, lazy creation, day rotation    │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Output (StreamWriter, writer module)                           │
//! │  - one append-only file handle + periodic flush task each       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## On-disk layout
//!
//! ```text
//! {chatlog_path}/
//! ├── Channel/
//! │   └── town/
//! │       ├── Day 5.txt
//! │       └── Day 6.txt
//! ├── DM/
//! │   └── Ann-Bob/
//! │       └── Day 5.txt
//! └── Login/
//!     └── Day 5.txt
//! ```
//!
//! Files are only ever appended to; a new day supersedes them with a
//! fresh file rather than truncating.
//!
//! ## Usage
//!
//! ```ignore
//! use chatlog_core::{ChatLogger, GameEvent, LogConfig, WorldTime};
//!
//! let mut config = LogConfig::default();
//! config.enabled = true;
//!
//! // start_day comes from the host's simulation clock
//! let logger = ChatLogger::new(config, 5);
//!
//! // wired to the host's event bus by the embedding layer
//! logger.handle_event(
//!     WorldTime::new(5, 3723),
//!     &GameEvent::ChatSent {
//!         sender: "Ann".into(),
//!         tag: "#town".into(),
//!         text: "hello".into(),
//!     },
//! );
//!
//! logger.shutdown();
//! ```
//!
//! No error from this subsystem ever reaches the host's event-delivery
//! path; failures go to the `chatlog` tracing target and the affected
//! stream falls silent.

pub mod classify;
pub mod config;
pub mod error;
pub mod events;
pub mod logger;
pub mod router;
pub mod writer;

// Re-exports
pub use classify::{classify, format_time, strip_markup, StreamKey};
pub use config::{LogConfig, NotifyPolicy};
pub use error::ChatlogError;
pub use events::{GameEvent, PlayerEventKind, WorldTime};
pub use logger::ChatLogger;
pub use router::{LogRouter, RouterPhase};
pub use writer::{FlushPolicy, StreamWriter};
