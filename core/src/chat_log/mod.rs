//! Raw chat.log line handling.
//!
//! A log line looks like:
//!
//! `2024-01-15 12:34:56 [System] [] You inflicted 45.6 points of damage.`
//!
//! with a wall-clock prefix, a channel marker, a sender (empty for system
//! messages) and the message body. Lines pasted by players (waypoints)
//! arrive on chat channels with a sender name.

pub mod classifier;
pub mod import;

use chrono::NaiveDateTime;
use memchr::memchr;

pub use classifier::classify;
pub use import::parse_chat_file;

/// Channel marker for system messages; combat, loot and skill lines are
/// only considered when they carry it.
pub const SYSTEM_CHANNEL: &str = "System";

/// Channel marker for global kill announcements.
pub const GLOBALS_CHANNEL: &str = "Globals";

/// An immutable input line with its extracted wall-clock timestamp.
///
/// Consumed exactly once by the classifier; never mutated.
#[derive(Debug, Clone)]
pub struct RawLine {
    pub text: String,
    pub timestamp: NaiveDateTime,
}

impl RawLine {
    /// Wrap a line, taking the timestamp from the leading
    /// `YYYY-MM-DD HH:MM:SS` prefix when present, else `ingested_at`.
    pub fn new(text: impl Into<String>, ingested_at: NaiveDateTime) -> Self {
        let text = text.into();
        let timestamp = parse_timestamp_prefix(&text).unwrap_or(ingested_at);
        Self { text, timestamp }
    }

    /// Channel name, sender and message body, or `None` when the line
    /// carries no channel marker at all.
    pub fn split_channel(&self) -> Option<(&str, &str, &str)> {
        let after_ts = if parse_timestamp_prefix(&self.text).is_some() {
            self.text[19..].trim_start()
        } else {
            self.text.as_str()
        };

        let bytes = after_ts.as_bytes();
        if bytes.first() != Some(&b'[') {
            return None;
        }
        let chan_end = memchr(b']', bytes)?;
        let channel = &after_ts[1..chan_end];

        let rest = after_ts[chan_end + 1..].trim_start();
        let rest_bytes = rest.as_bytes();
        if rest_bytes.first() != Some(&b'[') {
            return None;
        }
        let sender_end = memchr(b']', rest_bytes)?;
        let sender = &rest[1..sender_end];
        let body = rest[sender_end + 1..].trim_start();

        Some((channel, sender, body))
    }
}

/// Parse the `YYYY-MM-DD HH:MM:SS` prefix. Byte-validates the shape
/// before handing the slice to chrono, so arbitrary chat text is
/// rejected cheaply.
pub fn parse_timestamp_prefix(input: &str) -> Option<NaiveDateTime> {
    let b = input.as_bytes();
    if b.len() < 19
        || b[4] != b'-'
        || b[7] != b'-'
        || b[10] != b' '
        || b[13] != b':'
        || b[16] != b':'
    {
        return None;
    }
    NaiveDateTime::parse_from_str(&input[..19], "%Y-%m-%d %H:%M:%S").ok()
}
