//! Per-run generation state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::catalog::Catalogs;
use crate::schedule::DayProfile;

/// Polled before each day; once it reports true, no further days are generated.
pub trait Cancellation: fmt::Debug {
    fn is_cancelled(&self) -> bool;
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Everything one generation run reads from or advances.
///
/// Each context owns its random source, so independent runs never interleave
/// draws. ChaCha8 output is stable across platforms, which keeps seeded runs
/// byte-identical.
#[derive(Debug)]
pub struct GenerationContext<'a> {
    pub(crate) rng: ChaCha8Rng,
    pub(crate) catalogs: &'a Catalogs,
    pub(crate) profile: &'a DayProfile,
    cancel: Option<&'a dyn Cancellation>,
    days_completed: usize,
}

impl<'a> GenerationContext<'a> {
    pub fn new(catalogs: &'a Catalogs, profile: &'a DayProfile, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            catalogs,
            profile,
            cancel: None,
            days_completed: 0,
        }
    }

    /// Stops day iteration once `cancel` reports true.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: &'a dyn Cancellation) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|cancel| cancel.is_cancelled())
    }

    /// Number of days generated so far in this run.
    pub const fn days_completed(&self) -> usize {
        self.days_completed
    }

    pub(crate) fn finish_day(&mut self) {
        self.days_completed += 1;
    }
}
