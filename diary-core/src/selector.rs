use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use time::Date;

use crate::error::{DiaryError, Result};
use crate::store::EntryStore;

/// Chooses which day gets shown after a session.
pub struct DaySelector<'a, R> {
    store: &'a EntryStore,
    rng: R,
}

impl<'a, R: Rng> DaySelector<'a, R> {
    /// Use a seeded rng to make the choice reproducible.
    pub fn with_rng(store: &'a EntryStore, rng: R) -> Self {
        Self { store, rng }
    }

    /// Distinct dates with at least one entry, ascending.
    pub fn days(&self) -> Result<BTreeSet<Date>> {
        Ok(self.store.list_all()?.iter().map(|e| e.date()).collect())
    }

    /// A uniformly random stored day other than `excluding`.
    pub fn pick_random(&mut self, excluding: Option<Date>) -> Result<Date> {
        let days = self.days()?;
        choose_day(&days, excluding, &mut self.rng).ok_or(DiaryError::NoCandidateDays)
    }

    /// The requested date, whether or not anything was written on it.
    pub fn pick_explicit(&self, date: Date) -> Date {
        date
    }
}

fn choose_day<R: Rng + ?Sized>(
    days: &BTreeSet<Date>,
    excluding: Option<Date>,
    rng: &mut R,
) -> Option<Date> {
    let candidates: Vec<Date> = days
        .iter()
        .copied()
        .filter(|d| Some(*d) != excluding)
        .collect();
    candidates.choose(rng).copied()
}
