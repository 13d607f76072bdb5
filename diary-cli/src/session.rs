//! One run of the program: write an entry, then review a day.
//!
//! ```text
//! Start -> Writing -> Stripped -> EmptyDeleted -> End
//!                              \-> NonEmpty -> Review -> End
//! ```
//!
//! `show` starts directly at `Review`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use diary_core::{
    is_blank, strip_footer, DayAggregator, DaySelector, DiaryError, Entry, EntryComposer,
    EntryStore, TaskSource,
};
use rand::Rng;
use time::{Date, PrimitiveDateTime};
use tracing::{debug, info, warn};

use crate::launcher::Launcher;

/// What the session was asked to do, resolved from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Write { at: PrimitiveDateTime },
    Show(DayChoice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayChoice {
    Random,
    Date(Date),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The entry came back blank and was removed.
    Discarded,
    /// The entry was kept; `reviewed` is the day shown afterwards, if any.
    Saved {
        path: PathBuf,
        reviewed: Option<Date>,
    },
    /// Review-only run; `None` when there was no day to pick.
    Shown(Option<Date>),
}

enum State {
    Start(PrimitiveDateTime),
    Writing(Entry),
    Stripped { entry: Entry, body: String },
    EmptyDeleted,
    NonEmpty(Entry),
    Review {
        choice: DayChoice,
        exclude: Option<Date>,
        written: Option<Entry>,
    },
    End(Outcome),
}

pub struct Session<'a, T, L, R> {
    store: &'a EntryStore,
    tasks: T,
    launcher: L,
    rng: R,
    today: Date,
}

impl<'a, T: TaskSource, L: Launcher, R: Rng> Session<'a, T, L, R> {
    /// `today` is the local date, excluded from `show random`.
    pub fn new(store: &'a EntryStore, tasks: T, launcher: L, rng: R, today: Date) -> Self {
        Self {
            store,
            tasks,
            launcher,
            rng,
            today,
        }
    }

    pub fn run(&mut self, mode: Mode) -> Result<Outcome> {
        let mut state = match mode {
            Mode::Write { at } => State::Start(at),
            Mode::Show(choice) => State::Review {
                choice,
                exclude: Some(self.today),
                written: None,
            },
        };

        loop {
            state = match state {
                State::Start(at) => self.start(at)?,
                State::Writing(entry) => self.write(entry)?,
                State::Stripped { entry, body } => self.settle(entry, &body)?,
                State::EmptyDeleted => State::End(Outcome::Discarded),
                State::NonEmpty(entry) => State::Review {
                    choice: DayChoice::Random,
                    exclude: Some(entry.date()),
                    written: Some(entry),
                },
                State::Review {
                    choice,
                    exclude,
                    written,
                } => {
                    let reviewed = self.review(choice, exclude)?;
                    State::End(match written {
                        Some(entry) => Outcome::Saved {
                            path: entry.path().to_path_buf(),
                            reviewed,
                        },
                        None => Outcome::Shown(reviewed),
                    })
                }
                State::End(outcome) => return Ok(outcome),
            };
        }
    }

    fn start(&mut self, at: PrimitiveDateTime) -> Result<State> {
        let template = EntryComposer::new(&self.tasks).build_template(at.date());
        let entry = self
            .store
            .create(at, &template)
            .with_context(|| format!("Failed to create entry in {}", self.store.dir().display()))?;
        info!(file = %entry.file_name(), "writing entry");
        Ok(State::Writing(entry))
    }

    fn write(&mut self, entry: Entry) -> Result<State> {
        if let Err(e) = self.launcher.edit(entry.path()) {
            // The editor never ran, so the template is all the file holds.
            match self.store.delete(&entry) {
                Ok(()) | Err(DiaryError::NotFound(_)) => {}
                Err(del) => warn!(file = %entry.file_name(), "could not remove template: {}", del),
            }
            return Err(e);
        }

        let edited = match self.store.read(&entry) {
            Ok(text) => text,
            // Removed from inside the editor: nothing left to keep.
            Err(DiaryError::NotFound(_)) => return Ok(State::EmptyDeleted),
            Err(e) => return Err(e.into()),
        };
        let body = strip_footer(&edited);
        self.store.write(&entry, &body)?;
        Ok(State::Stripped { entry, body })
    }

    fn settle(&mut self, entry: Entry, body: &str) -> Result<State> {
        if !is_blank(body) {
            return Ok(State::NonEmpty(entry));
        }
        match self.store.delete(&entry) {
            Ok(()) | Err(DiaryError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        info!(file = %entry.file_name(), "empty entry deleted");
        Ok(State::EmptyDeleted)
    }

    /// Picks the day, renders it and pages it. `None` if there was nothing
    /// to pick.
    fn review(&mut self, choice: DayChoice, exclude: Option<Date>) -> Result<Option<Date>> {
        let mut selector = DaySelector::with_rng(self.store, &mut self.rng);
        let date = match choice {
            DayChoice::Date(date) => selector.pick_explicit(date),
            DayChoice::Random => match selector.pick_random(exclude) {
                Ok(date) => date,
                Err(DiaryError::NoCandidateDays) => {
                    debug!("no day to review");
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            },
        };

        let document = DayAggregator::new(self.store, &self.tasks).aggregate(date)?;
        self.page(&document)?;
        Ok(Some(date))
    }

    /// The scratch file is removed when it drops, whatever the pager did.
    fn page(&mut self, document: &str) -> Result<()> {
        let mut scratch = tempfile::Builder::new()
            .prefix("diary-")
            .suffix(".md")
            .tempfile()
            .context("Failed to create scratch file for the pager")?;
        scratch.write_all(document.as_bytes())?;
        scratch.flush()?;

        self.launcher.page(scratch.path())
    }
}
