//! Composition of the dependent AFK, window and browser streams.

use chrono::Duration;
use tracing::trace;

use crate::activity::Activity;
use crate::bucket::{Browser, BucketKind};
use crate::context::GenerationContext;
use crate::event::{Event, EventData};
use crate::interval::Interval;
use crate::pack::{DEFAULT_FALLBACK_MAX_SECS, random_events};

/// Generates all four streams for one interval.
///
/// The AFK stream covers the whole interval. Every `not-afk` AFK event gets a
/// window stream packed into its own span, and every Chrome or Firefox window
/// event gets a tab stream packed into its span. `afk` events stay empty.
///
/// Consecutive AFK events are not forced to alternate status; two `not-afk`
/// events in a row simply produce two adjacent window streams.
pub fn generate_activity(ctx: &mut GenerationContext<'_>, interval: Interval) -> Activity {
    let catalogs = ctx.catalogs;
    let fallback = Duration::seconds(DEFAULT_FALLBACK_MAX_SECS);

    let afk_events = random_events(&mut ctx.rng, interval, &catalogs.afk, fallback);

    let mut window_events: Vec<Event> = Vec::new();
    for event in afk_events.iter().filter(|e| e.is_not_afk()) {
        window_events.extend(random_events(
            &mut ctx.rng,
            event.interval(),
            &catalogs.window,
            fallback,
        ));
    }

    let mut chrome_events = Vec::new();
    let mut firefox_events = Vec::new();
    for event in &window_events {
        let EventData::Window(window) = &event.data else {
            continue;
        };
        let Some(browser) = Browser::from_app(&window.app) else {
            continue;
        };
        let tabs = random_events(&mut ctx.rng, event.interval(), &catalogs.browser, fallback);
        match browser {
            Browser::Chrome => chrome_events.extend(tabs),
            Browser::Firefox => firefox_events.extend(tabs),
        }
    }

    trace!(
        start = %interval.start,
        stop = %interval.stop,
        afk = afk_events.len(),
        window = window_events.len(),
        chrome = chrome_events.len(),
        firefox = firefox_events.len(),
        "generated activity"
    );

    let mut activity = Activity::new();
    activity.entry(BucketKind::Window).extend(window_events);
    activity.entry(BucketKind::Afk).extend(afk_events);
    activity
        .entry(Browser::Chrome.bucket())
        .extend(chrome_events);
    activity
        .entry(Browser::Firefox.bucket())
        .extend(firefox_events);
    activity
}
