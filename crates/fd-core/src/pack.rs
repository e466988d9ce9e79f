//! Interval packing: filling a span with back-to-back sampled events.

use chrono::Duration;
use rand::Rng;

use crate::catalog::Catalog;
use crate::event::{Event, duration_from_secs};
use crate::interval::Interval;

/// Upper bound in seconds for events whose template has no duration hint.
pub const DEFAULT_FALLBACK_MAX_SECS: i64 = 2 * 60 * 60;

/// Lower bound for events whose template has no duration hint.
const FALLBACK_MIN_SECS: f64 = 5.0;

/// Shortest duration in seconds a draw may produce, so the cursor always advances.
pub const MIN_EVENT_SECS: i64 = 1;

/// Fills `interval` with events sampled from `catalog`.
///
/// The first event starts at `interval.start` and each following event starts
/// where the previous one ended. Hinted templates last 0.5x to 2x their hint,
/// unhinted ones 5 seconds to `fallback_max`. The last event is cut short at
/// `interval.stop`. An empty interval yields no events.
pub fn random_events<R: Rng + ?Sized>(
    rng: &mut R,
    interval: Interval,
    catalog: &Catalog,
    fallback_max: Duration,
) -> Vec<Event> {
    let mut events = Vec::new();
    let fallback_max_secs = seconds(fallback_max).max(FALLBACK_MIN_SECS);

    let mut cursor = interval.start;
    while cursor < interval.stop {
        let template = catalog.sample(rng);

        let secs = match template.duration_minutes {
            Some(minutes) => rng.gen_range(0.5..=2.0) * minutes * 60.0,
            None => rng.gen_range(FALLBACK_MIN_SECS..=fallback_max_secs),
        };
        let candidate = duration_from_secs(secs).max(Duration::seconds(MIN_EVENT_SECS));

        // Never spill over the end of the interval
        let end = cursor
            .checked_add_signed(candidate)
            .map_or(interval.stop, |end| end.min(interval.stop));

        let event = Event {
            timestamp: cursor,
            duration: end - cursor,
            data: template.data.clone(),
        };
        cursor = end;
        events.push(event);
    }

    events
}

#[expect(
    clippy::cast_precision_loss,
    reason = "fallback bounds are a few hours at most"
)]
fn seconds(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}
