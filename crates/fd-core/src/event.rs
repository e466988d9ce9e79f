//! Generated events and their typed payloads.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::interval::Interval;

/// AFK watcher status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AfkStatus {
    /// The user is at the keyboard.
    NotAfk,
    /// The user is away.
    Afk,
}

/// Payload of an AFK status event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfkData {
    pub status: AfkStatus,
}

/// Payload of an active-window event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowData {
    pub app: String,
    pub title: String,
}

/// Payload of a browser-tab event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserData {
    pub title: String,
    pub url: String,
}

/// Event payload, one variant per bucket family.
///
/// Serialized untagged so the wire form is the plain payload object
/// (`{"status": "afk"}`, `{"app": ..., "title": ...}`, `{"title": ..., "url": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventData {
    Afk(AfkData),
    Window(WindowData),
    Browser(BrowserData),
}

impl From<AfkData> for EventData {
    fn from(data: AfkData) -> Self {
        Self::Afk(data)
    }
}

impl From<WindowData> for EventData {
    fn from(data: WindowData) -> Self {
        Self::Window(data)
    }
}

impl From<BrowserData> for EventData {
    fn from(data: BrowserData) -> Self {
        Self::Browser(data)
    }
}

/// A single generated event.
///
/// Each event owns its payload; nothing is shared with the template it was
/// stamped from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// When the event starts.
    pub timestamp: DateTime<Utc>,
    /// How long the event lasts. Serialized as fractional seconds.
    #[serde(serialize_with = "serialize_seconds")]
    pub duration: Duration,
    /// The payload.
    pub data: EventData,
}

impl Event {
    /// When the event ends.
    pub fn end(&self) -> DateTime<Utc> {
        self.timestamp + self.duration
    }

    /// The `[timestamp, end)` span covered by this event.
    pub fn interval(&self) -> Interval {
        Interval::new(self.timestamp, self.end())
    }

    /// Returns true if this is an AFK event with status `not-afk`.
    pub fn is_not_afk(&self) -> bool {
        matches!(
            self.data,
            EventData::Afk(AfkData {
                status: AfkStatus::NotAfk
            })
        )
    }
}

/// Converts fractional seconds into a microsecond-precision duration.
#[expect(
    clippy::cast_possible_truncation,
    reason = "generated durations are at most days long"
)]
pub(crate) fn duration_from_secs(secs: f64) -> Duration {
    Duration::microseconds((secs * 1_000_000.0).round() as i64)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "microsecond counts stay well within f64 precision"
)]
fn serialize_seconds<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let micros = duration.num_microseconds().unwrap_or(i64::MAX);
    serializer.serialize_f64(micros as f64 / 1_000_000.0)
}
