//! Rebuilds a calendar day from the store for review.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};
use tracing::{debug, warn};

use crate::composer::{render_task_list, FOOTER_HEADING};
use crate::entry::Entry;
use crate::error::Result;
use crate::store::EntryStore;
use crate::tasks::{CompletedTask, TaskSource};

const TITLE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[weekday], [year]-[month]-[day] W[week_number repr:iso]");

const ENTRY_TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

/// An entry together with the body read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEntry {
    pub timestamp: PrimitiveDateTime,
    pub body: String,
}

/// Everything written and done on one date. Entries are in ascending time
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Day {
    pub date: Date,
    pub entries: Vec<DayEntry>,
    pub tasks: Vec<CompletedTask>,
}

impl Day {
    /// `Saturday, 2024-03-02 W09`
    pub fn title(&self) -> Result<String> {
        Ok(self.date.format(TITLE_FORMAT)?)
    }

    /// Renders the review document. Output depends only on `self`.
    pub fn render(&self) -> Result<String> {
        let title = self.title()?;
        let mut doc = format!("{title}\n{}\n\n", underline(&title, '='));

        for entry in &self.entries {
            let time = entry.timestamp.format(ENTRY_TIME_FORMAT)?;
            doc.push_str(&format!("{time}\n{}\n", underline(&time, '-')));
            let body = entry.body.trim_end();
            if !body.is_empty() {
                doc.push_str(body);
                doc.push('\n');
            }
            doc.push('\n');
        }

        doc.push_str(FOOTER_HEADING);
        doc.push('\n');
        doc.push_str(&render_task_list(&self.tasks));
        Ok(doc)
    }
}

fn underline(text: &str, ch: char) -> String {
    std::iter::repeat(ch).take(text.chars().count()).collect()
}

pub struct DayAggregator<'a, T> {
    store: &'a EntryStore,
    tasks: T,
}

impl<'a, T: TaskSource> DayAggregator<'a, T> {
    pub fn new(store: &'a EntryStore, tasks: T) -> Self {
        Self { store, tasks }
    }

    /// Collects the entries stamped on `date` plus that date's completed
    /// tasks. Entries that vanish or cannot be read are skipped.
    pub fn collect(&self, date: Date) -> Result<Day> {
        let mut matching: Vec<Entry> = self
            .store
            .list_all()?
            .into_iter()
            .filter(|e| e.date() == date)
            .collect();
        matching.sort_by_key(Entry::timestamp);

        let mut entries = Vec::with_capacity(matching.len());
        for entry in matching {
            match self.store.read(&entry) {
                Ok(body) => entries.push(DayEntry {
                    timestamp: entry.timestamp(),
                    body,
                }),
                Err(e) => warn!(file = %entry.file_name(), "skipping entry: {}", e),
            }
        }
        debug!(%date, entries = entries.len(), "collected day");

        Ok(Day {
            date,
            entries,
            tasks: self.tasks.completed_on(date),
        })
    }

    pub fn aggregate(&self, date: Date) -> Result<String> {
        self.collect(date)?.render()
    }
}
