//! Day scheduling and date-range aggregation.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::activity::Activity;
use crate::compose::generate_activity;
use crate::context::GenerationContext;
use crate::error::GenerateError;
use crate::event::duration_from_secs;
use crate::interval::Interval;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Shape of a generated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayProfile {
    /// Hour of day (UTC) when activity starts.
    pub day_offset_hours: u32,
    /// Active hours on Monday to Friday.
    pub workday_min_hours: f64,
    pub workday_max_hours: f64,
    /// Active hours on Saturday and Sunday.
    pub weekend_min_hours: f64,
    pub weekend_max_hours: f64,
    /// Length of the midday break, in minutes.
    pub break_min_minutes: f64,
    pub break_max_minutes: f64,
    /// Split the active span around a break.
    pub lunch_break: bool,
}

impl Default for DayProfile {
    fn default() -> Self {
        Self {
            day_offset_hours: 8,
            workday_min_hours: 5.0,
            workday_max_hours: 10.0,
            weekend_min_hours: 1.0,
            weekend_max_hours: 5.0,
            break_min_minutes: 60.0,
            break_max_minutes: 120.0,
            lunch_break: true,
        }
    }
}

impl DayProfile {
    /// Checks that every range is finite, non-negative and ordered, and that the
    /// longest possible day (break included) ends before the next day starts.
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.day_offset_hours > 23 {
            return Err(GenerateError::InvalidProfile {
                reason: format!("day offset {}h is past the end of the day", self.day_offset_hours),
            });
        }
        for (name, min, max) in [
            ("workday hours", self.workday_min_hours, self.workday_max_hours),
            ("weekend hours", self.weekend_min_hours, self.weekend_max_hours),
            ("break minutes", self.break_min_minutes, self.break_max_minutes),
        ] {
            if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
                return Err(GenerateError::InvalidProfile {
                    reason: format!("{name} range {min}..{max} is invalid"),
                });
            }
        }

        let break_minutes = if self.lunch_break {
            self.break_max_minutes
        } else {
            0.0
        };
        let longest = self
            .workday_max_hours
            .max(self.weekend_max_hours)
            .mul_add(60.0, break_minutes);
        if longest > MINUTES_PER_DAY {
            return Err(GenerateError::InvalidProfile {
                reason: format!(
                    "longest day spans {longest} minutes, more than the {MINUTES_PER_DAY} in a day"
                ),
            });
        }
        Ok(())
    }

    /// Active-hours bounds for the given day.
    pub fn active_hours(&self, day: NaiveDate) -> (f64, f64) {
        if is_workday(day) {
            (self.workday_min_hours, self.workday_max_hours)
        } else {
            (self.weekend_min_hours, self.weekend_max_hours)
        }
    }
}

/// Monday to Friday.
pub fn is_workday(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Generates one day of activity.
///
/// Activity starts at the profile's day offset and lasts a duration drawn from
/// the workday or weekend range. With the lunch break enabled, the span is cut
/// in half and the second half is pushed back by the break length, so the
/// total active time stays the drawn duration.
pub fn generate_day(ctx: &mut GenerationContext<'_>, day: NaiveDate) -> Activity {
    let profile = ctx.profile;
    let start = day.and_time(NaiveTime::MIN).and_utc()
        + Duration::hours(i64::from(profile.day_offset_hours));

    let (min_hours, max_hours) = profile.active_hours(day);
    let hours = (max_hours - min_hours).mul_add(ctx.rng.gen_range(0.0..1.0), min_hours);
    let day_duration = duration_from_secs(hours * 3600.0);
    let stop = start + day_duration;

    if !profile.lunch_break {
        return generate_activity(ctx, Interval::new(start, stop));
    }

    let break_start = start + day_duration / 2;
    let break_minutes = ctx
        .rng
        .gen_range(profile.break_min_minutes..=profile.break_max_minutes);
    let break_duration = duration_from_secs(break_minutes * 60.0);
    let break_stop = break_start + break_duration;

    let mut activity = generate_activity(ctx, Interval::new(start, break_start));
    activity.merge(generate_activity(
        ctx,
        Interval::new(break_stop, stop + break_duration),
    ));
    activity
}

/// Dates from `start` stepping one day at a time while before `stop`.
///
/// When `inclusive`, the date reached after the last step is yielded too.
pub fn daterange(
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
    inclusive: bool,
) -> impl Iterator<Item = NaiveDate> {
    let mut cursor = start;
    let mut finished = false;
    std::iter::from_fn(move || {
        if finished {
            return None;
        }
        if cursor < stop {
            let day = cursor.date_naive();
            cursor += Duration::days(1);
            return Some(day);
        }
        finished = true;
        inclusive.then(|| cursor.date_naive())
    })
}

/// Generates and merges every day in `[start, stop)`.
///
/// Days are appended in calendar order. If the context's cancellation flag is
/// set, iteration stops before the next day; days already generated are kept
/// and identical to an uncancelled run.
pub fn generate_days(
    ctx: &mut GenerationContext<'_>,
    start: DateTime<Utc>,
    stop: DateTime<Utc>,
) -> Activity {
    let mut buckets = Activity::new();
    for day in daterange(start, stop, false) {
        if ctx.is_cancelled() {
            warn!(
                days_completed = ctx.days_completed(),
                "generation cancelled"
            );
            break;
        }
        let activity = generate_day(ctx, day);
        debug!(%day, events = activity.total_len(), "generated day");
        buckets.merge(activity);
        ctx.finish_day();
    }
    buckets
}
