//! Synthetic activity generation.
//!
//! Produces seeded, time-ordered AFK, window and browser-tab events that obey
//! the nesting real watchers produce:
//! - Window events only occur inside `not-afk` AFK events
//! - Browser-tab events only occur inside window events of that browser
//! - Events in one stream never overlap and never spill past their interval

mod activity;
mod bucket;
mod catalog;
mod compose;
mod context;
mod driver;
mod error;
mod event;
mod interval;
mod pack;
mod schedule;

pub use activity::{Activity, OrderedMultimap};
pub use bucket::{Browser, BucketKind};
pub use catalog::{
    Catalog, CatalogFile, Catalogs, EventTemplate, MAX_DURATION_MINUTES, TemplateEntry,
};
pub use compose::generate_activity;
pub use context::{Cancellation, GenerationContext};
pub use driver::{
    BucketEvents, BucketStore, GenerationReport, Generator, SubmittedBucket, Submitter,
    setup_buckets,
};
pub use error::{CollaboratorError, GenerateError};
pub use event::{AfkData, AfkStatus, BrowserData, Event, EventData, WindowData};
pub use interval::{Interval, TimeRange};
pub use pack::{DEFAULT_FALLBACK_MAX_SECS, MIN_EVENT_SECS, random_events};
pub use schedule::{DayProfile, daterange, generate_day, generate_days, is_workday};
