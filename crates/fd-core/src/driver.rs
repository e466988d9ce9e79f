//! Generation driver and the collaborator seams it hands results to.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use crate::bucket::BucketKind;
use crate::catalog::Catalogs;
use crate::context::{Cancellation, GenerationContext};
use crate::error::GenerateError;
use crate::event::Event;
use crate::interval::TimeRange;
use crate::schedule::{DayProfile, daterange, generate_days};

/// Remote bucket lifecycle.
pub trait BucketStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn list_bucket_ids(&self) -> Result<HashSet<String>, Self::Error>;

    fn create_bucket(&self, bucket_id: &str, event_type: &str) -> Result<(), Self::Error>;

    /// Deletes a bucket. Deleting a bucket that does not exist must not fail.
    fn delete_bucket(&self, bucket_id: &str) -> Result<(), Self::Error>;
}

/// Destination for generated events.
pub trait Submitter {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Submits one bucket's events, in order. May batch internally.
    fn submit(&self, bucket_id: &str, events: &[Event]) -> Result<(), Self::Error>;
}

/// Deletes any existing generator buckets for `hostname` and recreates them empty.
pub fn setup_buckets<S: BucketStore>(store: &S, hostname: &str) -> Result<(), S::Error> {
    let existing = store.list_bucket_ids()?;
    for kind in BucketKind::ALL {
        let bucket_id = kind.bucket_id(hostname);
        if existing.contains(&bucket_id) {
            debug!(%bucket_id, "deleting existing bucket");
            store.delete_bucket(&bucket_id)?;
        }
    }
    for kind in BucketKind::ALL {
        store.create_bucket(&kind.bucket_id(hostname), kind.event_type())?;
    }
    Ok(())
}

/// Events generated for one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketEvents {
    pub bucket_id: String,
    pub events: Vec<Event>,
}

/// Count of events submitted to one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedBucket {
    pub bucket_id: String,
    pub events: usize,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub buckets: Vec<SubmittedBucket>,
}

impl GenerationReport {
    pub fn total_events(&self) -> usize {
        self.buckets.iter().map(|b| b.events).sum()
    }
}

/// Runs seeded generation over a date range.
#[derive(Debug)]
pub struct Generator {
    catalogs: Catalogs,
    profile: DayProfile,
    hostname: String,
    cancel: Option<Arc<dyn Cancellation + Send + Sync>>,
}

impl Generator {
    pub fn new(
        catalogs: Catalogs,
        profile: DayProfile,
        hostname: impl Into<String>,
    ) -> Result<Self, GenerateError> {
        profile.validate()?;
        Ok(Self {
            catalogs,
            profile,
            hostname: hostname.into(),
            cancel: None,
        })
    }

    /// Polls `cancel` before each day; if it stops the run early, the run
    /// ends with [`GenerateError::Cancelled`] and nothing is submitted.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: Arc<dyn Cancellation + Send + Sync>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Generates every bucket for `range`, including the date `range.stop()` falls on.
    ///
    /// The random source is seeded from the range boundaries, so the same range
    /// always yields the same events.
    pub fn buckets(&self, range: &TimeRange) -> Result<Vec<BucketEvents>, GenerateError> {
        let mut ctx = GenerationContext::new(&self.catalogs, &self.profile, range.seed());
        if let Some(cancel) = &self.cancel {
            ctx = ctx.with_cancellation(cancel.as_ref());
        }

        let stop = range.stop() + Duration::days(1);
        let days = daterange(range.start(), stop, false).count();
        let activity = generate_days(&mut ctx, range.start(), stop);
        // Only a run that stopped short of the last day counts as cancelled
        if ctx.days_completed() < days {
            return Err(GenerateError::Cancelled {
                days_completed: ctx.days_completed(),
            });
        }
        info!(
            days = ctx.days_completed(),
            events = activity.total_len(),
            "generated activity"
        );

        Ok(activity
            .into_iter()
            .map(|(kind, events)| BucketEvents {
                bucket_id: kind.bucket_id(&self.hostname),
                events,
            })
            .collect())
    }

    /// Generates `range` and submits every non-empty bucket.
    ///
    /// Submission is not transactional: when a bucket fails, the buckets
    /// submitted before it stay submitted and the error reports how many.
    pub fn generate<S: Submitter>(
        &self,
        submitter: &S,
        range: &TimeRange,
    ) -> Result<GenerationReport, GenerateError> {
        let mut report = GenerationReport::default();
        for bucket in self.buckets(range)? {
            if bucket.events.is_empty() {
                debug!(bucket_id = %bucket.bucket_id, "skipping empty bucket");
                continue;
            }
            submitter
                .submit(&bucket.bucket_id, &bucket.events)
                .map_err(|err| GenerateError::SubmissionFailure {
                    bucket_id: bucket.bucket_id.clone(),
                    submitted: report.buckets.len(),
                    source: Box::new(err),
                })?;
            info!(bucket_id = %bucket.bucket_id, events = bucket.events.len(), "submitted events");
            report.buckets.push(SubmittedBucket {
                bucket_id: bucket.bucket_id,
                events: bucket.events.len(),
            });
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("server unavailable")]
    struct FakeError;

    #[derive(Default)]
    struct FakeServer {
        existing: HashSet<String>,
        fail_on: Option<String>,
        calls: RefCell<Vec<String>>,
        submitted: RefCell<Vec<(String, Vec<Event>)>>,
    }

    impl BucketStore for FakeServer {
        type Error = FakeError;

        fn list_bucket_ids(&self) -> Result<HashSet<String>, FakeError> {
            Ok(self.existing.clone())
        }

        fn create_bucket(&self, bucket_id: &str, event_type: &str) -> Result<(), FakeError> {
            self.calls
                .borrow_mut()
                .push(format!("create {bucket_id} {event_type}"));
            Ok(())
        }

        fn delete_bucket(&self, bucket_id: &str) -> Result<(), FakeError> {
            self.calls.borrow_mut().push(format!("delete {bucket_id}"));
            Ok(())
        }
    }

    impl Submitter for FakeServer {
        type Error = FakeError;

        fn submit(&self, bucket_id: &str, events: &[Event]) -> Result<(), FakeError> {
            if self.fail_on.as_deref() == Some(bucket_id) {
                return Err(FakeError);
            }
            self.submitted
                .borrow_mut()
                .push((bucket_id.to_string(), events.to_vec()));
            Ok(())
        }
    }

    /// Reports cancellation from the `after`-th poll on.
    #[derive(Debug)]
    struct CancelAfter {
        polls: AtomicUsize,
        after: usize,
    }

    impl CancelAfter {
        fn new(after: usize) -> Arc<Self> {
            Arc::new(Self {
                polls: AtomicUsize::new(0),
                after,
            })
        }
    }

    impl Cancellation for CancelAfter {
        fn is_cancelled(&self) -> bool {
            self.polls.fetch_add(1, Ordering::Relaxed) >= self.after
        }
    }

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn generator() -> Generator {
        Generator::new(
            Catalogs::builtin().unwrap(),
            DayProfile::default(),
            "fakedata",
        )
        .unwrap()
    }

    #[test]
    fn reversed_range_is_rejected_before_generation() {
        let err = TimeRange::new(ts(2, 0), ts(1, 0)).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidRange { .. }));
    }

    #[test]
    fn invalid_profile_is_rejected() {
        let profile = DayProfile {
            break_min_minutes: 90.0,
            break_max_minutes: 30.0,
            ..DayProfile::default()
        };
        let err = Generator::new(Catalogs::builtin().unwrap(), profile, "fakedata").unwrap_err();
        assert!(matches!(err, GenerateError::InvalidProfile { .. }));
    }

    #[test]
    fn generate_submits_non_empty_buckets_in_order() {
        let server = FakeServer::default();
        let range = TimeRange::new(ts(1, 0), ts(3, 0)).unwrap();

        let report = generator().generate(&server, &range).unwrap();

        let submitted = server.submitted.borrow();
        let ids: Vec<&str> = submitted.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids[0], "aw-watcher-window_fakedata");
        assert_eq!(ids[1], "aw-watcher-afk_fakedata");
        assert!(submitted.iter().all(|(_, events)| !events.is_empty()));
        assert_eq!(report.buckets.len(), submitted.len());
        assert_eq!(
            report.total_events(),
            submitted.iter().map(|(_, e)| e.len()).sum::<usize>()
        );
    }

    #[test]
    fn stop_date_is_included() {
        let range = TimeRange::new(ts(1, 0), ts(3, 0)).unwrap();
        let buckets = generator().buckets(&range).unwrap();
        let afk = buckets
            .iter()
            .find(|b| b.bucket_id == "aw-watcher-afk_fakedata")
            .unwrap();

        let mut days: Vec<_> = afk.events.iter().map(|e| e.timestamp.date_naive()).collect();
        days.dedup();
        assert_eq!(days.len(), 3);
    }

    #[test]
    fn identical_ranges_produce_identical_output() {
        let range = TimeRange::new(ts(1, 0), ts(8, 0)).unwrap();
        let first = generator().buckets(&range).unwrap();
        let second = generator().buckets(&range).unwrap();

        let encode = |buckets: &[BucketEvents]| -> String {
            buckets
                .iter()
                .map(|b| serde_json::to_string(&b.events).unwrap())
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_eq!(encode(&first), encode(&second));

        let shifted = TimeRange::new(ts(1, 0), ts(8, 1)).unwrap();
        assert_ne!(encode(&first), encode(&generator().buckets(&shifted).unwrap()));
    }

    #[test]
    fn submission_failure_reports_prior_successes() {
        let server = FakeServer {
            fail_on: Some("aw-watcher-afk_fakedata".to_string()),
            ..FakeServer::default()
        };
        let range = TimeRange::new(ts(1, 0), ts(2, 0)).unwrap();

        let err = generator().generate(&server, &range).unwrap_err();

        match err {
            GenerateError::SubmissionFailure {
                bucket_id,
                submitted,
                ..
            } => {
                assert_eq!(bucket_id, "aw-watcher-afk_fakedata");
                assert_eq!(submitted, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        // The window bucket went through and is not rolled back
        assert_eq!(server.submitted.borrow().len(), 1);
    }

    #[test]
    fn cancelled_run_submits_nothing() {
        let server = FakeServer::default();
        let flag = Arc::new(AtomicBool::new(true));
        let range = TimeRange::new(ts(1, 0), ts(5, 0)).unwrap();

        let err = generator()
            .with_cancellation(flag)
            .generate(&server, &range)
            .unwrap_err();

        assert!(matches!(err, GenerateError::Cancelled { days_completed: 0 }));
        assert!(server.submitted.borrow().is_empty());
    }

    #[test]
    fn cancelling_mid_run_reports_completed_days() {
        let server = FakeServer::default();
        // Days 1 through 5
        let range = TimeRange::new(ts(1, 0), ts(5, 0)).unwrap();

        let err = generator()
            .with_cancellation(CancelAfter::new(2))
            .generate(&server, &range)
            .unwrap_err();

        assert!(matches!(err, GenerateError::Cancelled { days_completed: 2 }));
        assert!(server.submitted.borrow().is_empty());
    }

    #[test]
    fn cancel_request_after_last_day_keeps_the_run() {
        let range = TimeRange::new(ts(1, 0), ts(5, 0)).unwrap();
        let cancel = CancelAfter::new(5);

        let cancelled = generator()
            .with_cancellation(cancel.clone())
            .buckets(&range)
            .unwrap();
        // The signal is raised by now, but every day was generated
        assert!(cancel.is_cancelled());

        assert_eq!(cancelled, generator().buckets(&range).unwrap());
    }

    #[test]
    fn setup_deletes_existing_then_creates_all() {
        let server = FakeServer {
            existing: HashSet::from([
                "aw-watcher-afk_fakedata".to_string(),
                "aw-watcher-afk_otherhost".to_string(),
            ]),
            ..FakeServer::default()
        };

        setup_buckets(&server, "fakedata").unwrap();

        assert_eq!(
            *server.calls.borrow(),
            [
                "delete aw-watcher-afk_fakedata",
                "create aw-watcher-afk_fakedata afkstatus",
                "create aw-watcher-window_fakedata currentwindow",
                "create aw-watcher-web-chrome_fakedata web.tab.current",
                "create aw-watcher-web-firefox_fakedata web.tab.current",
            ]
        );
    }
}
