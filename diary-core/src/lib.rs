//! Core of the diary: entry files keyed by timestamp, completed-task lookups,
//! the editable template and the per-day review document.

pub mod aggregate;
pub mod composer;
pub mod entry;
pub mod error;
pub mod selector;
pub mod store;
pub mod tasks;

pub use aggregate::{Day, DayAggregator};
pub use composer::{is_blank, strip_footer, EntryComposer, FOOTER_HEADING};
pub use entry::{parse_timestamp, Entry};
pub use error::{DiaryError, Result};
pub use selector::DaySelector;
pub use store::{EntryRef, EntryStore};
pub use tasks::{CompletedTask, TaskSource};
