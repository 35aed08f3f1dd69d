//! Event classification and line formatting
//!
//! Pure, stateless mapping from a host event to a stream key and a
//! formatted log line. Everything with lifecycle or I/O concerns lives in
//! [`router`](crate::router) and [`writer`](crate::writer); this module is
//! the formatting glue in between.

use std::fmt;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::events::{GameEvent, PlayerEventKind, WorldTime};

/// Matches markup-style tags (`<b>`, `<color=...>`, ...) embedded in
/// free-text fields by the host's rich-text chat.
static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new("<[^>]*>").expect("valid markup regex"));

/// Tag prefix for public channel messages.
pub const CHANNEL_SIGIL: char = '#';
/// Tag prefix for direct (player to player) messages.
pub const DM_SIGIL: char = '@';

const SECONDS_PER_DAY: u32 = 86_400;

/// Identifier of one logical log stream.
///
/// Keys are case-sensitive. Names are reduced to a single path component
/// at construction (tags are untrusted input and must not steer a writer
/// outside the log tree), and the direct-message variant is canonicalized
/// (participants in lexicographic order) so A→B and B→A resolve to the
/// same stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StreamKey {
    /// Public channel, keyed by channel name without the sigil
    Channel(String),
    /// Direct-message pair, participants sorted
    Direct(String, String),
    /// The shared stream for join/login/logout events
    Login,
}

impl StreamKey {
    /// Key for a public channel.
    ///
    /// `None` when the name sanitizes down to nothing usable.
    pub fn channel(name: impl AsRef<str>) -> Option<Self> {
        stream_name(name.as_ref()).map(Self::Channel)
    }

    /// Canonical key for a direct-message pair.
    ///
    /// Symmetric: `direct(a, b) == direct(b, a)`. `None` when either
    /// participant name sanitizes down to nothing usable.
    pub fn direct(a: impl AsRef<str>, b: impl AsRef<str>) -> Option<Self> {
        let a = stream_name(a.as_ref())?;
        let b = stream_name(b.as_ref())?;
        Some(if a <= b {
            Self::Direct(a, b)
        } else {
            Self::Direct(b, a)
        })
    }

    /// Derive the on-disk path for this stream on a given day.
    ///
    /// Layout: `{base}/{category}/{stream}/Day {day}.txt`, with the login
    /// stream directly under its category directory. The path is derived
    /// once per writer; rotation opens a new writer rather than repointing
    /// an existing one.
    pub fn log_path(&self, base: &Path, day: u32) -> PathBuf {
        let file = format!("Day {day}.txt");
        match self {
            StreamKey::Channel(name) => base.join("Channel").join(name).join(file),
            StreamKey::Direct(a, b) => base.join("DM").join(format!("{a}-{b}")).join(file),
            StreamKey::Login => base.join("Login").join(file),
        }
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKey::Channel(name) => write!(f, "channel/{name}"),
            StreamKey::Direct(a, b) => write!(f, "dm/{a}-{b}"),
            StreamKey::Login => write!(f, "login"),
        }
    }
}

/// Map a host event to a stream key and a formatted line.
///
/// Returns `None` for events that should not be logged: chat tags that
/// are neither channel nor DM shaped, and DMs while DM logging is
/// disabled.
pub fn classify(
    event: &GameEvent,
    time: WorldTime,
    log_direct_messages: bool,
) -> Option<(StreamKey, String)> {
    match event {
        GameEvent::ChatSent { sender, tag, text } => {
            let key = chat_stream(tag, sender, log_direct_messages)?;
            let line = format!(
                "[{}] {}: {}",
                format_time(time.seconds),
                strip_markup(sender),
                strip_markup(text)
            );
            Some((key, line))
        }
        GameEvent::Player { user, kind } => {
            let what = match kind {
                PlayerEventKind::Joined => "joined the world",
                PlayerEventKind::LoggedIn => "logged in",
                PlayerEventKind::LoggedOut => "logged out",
            };
            let line = format!("[{}] {} {}.", format_time(time.seconds), strip_markup(user), what);
            Some((StreamKey::Login, line))
        }
    }
}

/// Resolve a chat destination tag to a stream key.
fn chat_stream(tag: &str, sender: &str, log_direct_messages: bool) -> Option<StreamKey> {
    let tag = strip_markup(tag);
    if let Some(channel) = tag.strip_prefix(CHANNEL_SIGIL) {
        StreamKey::channel(channel)
    } else if let Some(recipient) = tag.strip_prefix(DM_SIGIL) {
        if !log_direct_messages {
            return None;
        }
        StreamKey::direct(sender, recipient)
    } else {
        None
    }
}

/// Reduce an untrusted name to a single, safe path component.
///
/// Strips markup, replaces path separators, and rejects names that are
/// empty or dots-only (`.` / `..` are directory navigation, not names).
fn stream_name(raw: &str) -> Option<String> {
    let name: String = strip_markup(raw)
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    if name.is_empty() || name.chars().all(|c| c == '.') {
        return None;
    }
    Some(name)
}

/// Remove markup-style `<...>` tags from a string.
///
/// Idempotent: stripping an already-stripped string is a no-op.
pub fn strip_markup(text: &str) -> String {
    MARKUP_TAG.replace_all(text, "").into_owned()
}

/// Format seconds-of-day as zero-padded `HH:MM:SS`.
///
/// Values past 86 400 wrap around midnight.
pub fn format_time(seconds_of_day: u32) -> String {
    let secs = seconds_of_day % SECONDS_PER_DAY;
    chrono::NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
        .unwrap_or(chrono::NaiveTime::MIN)
        .format("%H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_tag_maps_to_channel_stream() {
        let event = GameEvent::ChatSent {
            sender: "Ann".to_string(),
            tag: "#town".to_string(),
            text: "hi".to_string(),
        };

        let (key, _) = classify(&event, WorldTime::new(1, 0), false).unwrap();
        assert_eq!(key, StreamKey::Channel("town".to_string()));
        assert_eq!(key.to_string(), "channel/town");
    }

    #[test]
    fn test_dm_key_is_symmetric() {
        assert_eq!(
            StreamKey::direct("Ann", "Bob"),
            StreamKey::direct("Bob", "Ann")
        );
        assert_eq!(
            StreamKey::direct("Ann", "Bob").unwrap().to_string(),
            "dm/Ann-Bob"
        );
    }

    #[test]
    fn test_dm_skipped_when_disabled() {
        let event = GameEvent::ChatSent {
            sender: "Ann".to_string(),
            tag: "@Bob".to_string(),
            text: "psst".to_string(),
        };

        assert!(classify(&event, WorldTime::new(1, 0), false).is_none());
        assert!(classify(&event, WorldTime::new(1, 0), true).is_some());
    }

    #[test]
    fn test_unknown_tag_shape_not_logged() {
        let event = GameEvent::ChatSent {
            sender: "Ann".to_string(),
            tag: "whisper".to_string(),
            text: "hi".to_string(),
        };

        assert!(classify(&event, WorldTime::new(1, 0), true).is_none());
    }

    #[test]
    fn test_empty_channel_name_not_logged() {
        let event = GameEvent::ChatSent {
            sender: "Ann".to_string(),
            tag: "#".to_string(),
            text: "hi".to_string(),
        };

        assert!(classify(&event, WorldTime::new(1, 0), true).is_none());
    }

    #[test]
    fn test_dots_only_stream_names_not_logged() {
        for tag in ["#.", "#..", "#...", "@.."] {
            let event = GameEvent::ChatSent {
                sender: "Ann".to_string(),
                tag: tag.to_string(),
                text: "hi".to_string(),
            };
            assert!(
                classify(&event, WorldTime::new(1, 0), true).is_none(),
                "tag {tag:?} must not name a stream"
            );
        }
    }

    #[test]
    fn test_traversal_shaped_tag_stays_under_base() {
        let event = GameEvent::ChatSent {
            sender: "Ann".to_string(),
            tag: "#../../escape".to_string(),
            text: "hi".to_string(),
        };

        let (key, _) = classify(&event, WorldTime::new(1, 0), true).unwrap();
        assert_eq!(key, StreamKey::Channel(".._.._escape".to_string()));

        let base = Path::new("/logs");
        assert!(key.log_path(base, 1).starts_with(base.join("Channel")));
    }

    #[test]
    fn test_dm_participant_names_are_confined_too() {
        let key = StreamKey::direct("Ann", "..\\..\\Bob").unwrap();
        let base = Path::new("/logs");
        assert!(key.log_path(base, 1).starts_with(base.join("DM")));
        assert_eq!(key.to_string(), "dm/.._.._Bob-Ann");
    }

    #[test]
    fn test_chat_line_strips_markup_and_formats_time() {
        let event = GameEvent::ChatSent {
            sender: "Ann".to_string(),
            tag: "#town".to_string(),
            text: "<i>hello</i>".to_string(),
        };

        let (_, line) = classify(&event, WorldTime::new(5, 3723), false).unwrap();
        assert_eq!(line, "[01:02:03] Ann: hello");
    }

    #[test]
    fn test_login_events_share_the_login_stream() {
        let event = GameEvent::Player {
            user: "Bob".to_string(),
            kind: PlayerEventKind::LoggedIn,
        };

        let (key, line) = classify(&event, WorldTime::new(2, 60), false).unwrap();
        assert_eq!(key, StreamKey::Login);
        assert_eq!(line, "[00:01:00] Bob logged in.");
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("<b>hi</b> there"), "hi there");
        assert_eq!(strip_markup("hi there"), "hi there");
        assert_eq!(strip_markup("<color=#ff0000>red</color>"), "red");
    }

    #[test]
    fn test_format_time_wraps_past_midnight() {
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(3723), "01:02:03");
        assert_eq!(format_time(86_399), "23:59:59");
        assert_eq!(format_time(86_400), "00:00:00");
        assert_eq!(format_time(86_400 + 61), "00:01:01");
    }

    #[test]
    fn test_log_path_layout() {
        let base = Path::new("/logs");
        assert_eq!(
            StreamKey::channel("town").unwrap().log_path(base, 5),
            Path::new("/logs/Channel/town/Day 5.txt")
        );
        assert_eq!(
            StreamKey::direct("Bob", "Ann").unwrap().log_path(base, 5),
            Path::new("/logs/DM/Ann-Bob/Day 5.txt")
        );
        assert_eq!(
            StreamKey::Login.log_path(base, 5),
            Path::new("/logs/Login/Day 5.txt")
        );
    }
}
