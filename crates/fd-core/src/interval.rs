//! Half-open time spans.

use chrono::{DateTime, Utc};

use crate::error::GenerateError;

/// A half-open `[start, stop)` span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
}

impl Interval {
    pub const fn new(start: DateTime<Utc>, stop: DateTime<Utc>) -> Self {
        Self { start, stop }
    }

    /// True when the span covers no time (including reversed spans).
    pub fn is_empty(&self) -> bool {
        self.start >= self.stop
    }

    /// True if `other` lies entirely within this span.
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.stop <= self.stop
    }
}

/// A validated generation range, `stop` strictly after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, stop: DateTime<Utc>) -> Result<Self, GenerateError> {
        if stop <= start {
            return Err(GenerateError::InvalidRange { start, stop });
        }
        Ok(Self { start, stop })
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn stop(&self) -> DateTime<Utc> {
        self.stop
    }

    /// Seed derived from both boundaries, so equal ranges reproduce equal output.
    pub fn seed(&self) -> u64 {
        let sum = self
            .start
            .timestamp_millis()
            .wrapping_add(self.stop.timestamp_millis());
        u64::from_le_bytes(sum.to_le_bytes())
    }
}
