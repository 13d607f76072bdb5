//! Completed-task lookups against an external task tracker.
//!
//! Backends implement [`TaskSource::fetch_completed`]; callers go through
//! [`TaskSource::completed_on`], which never fails. The task list only
//! decorates entries, so a broken tracker must not take a session down.

mod taskwarrior;
mod todo_txt;

use std::process::Command;

use time::Date;
use tracing::{debug, warn};

pub use taskwarrior::TaskwarriorSource;
pub use todo_txt::TodoTxtSource;

/// One task the tracker reports as done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTask {
    pub completed: Date,
    pub description: String,
}

impl CompletedTask {
    pub fn new(completed: Date, description: impl Into<String>) -> Self {
        Self {
            completed,
            description: description.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TaskSourceError {
    #[error("task command failed: {0}")]
    Command(String),
    #[error("task command output is malformed: {0}")]
    Malformed(String),
}

pub trait TaskSource {
    /// Tasks completed on `date`, in the order the tracker returned them.
    fn fetch_completed(&self, date: Date) -> Result<Vec<CompletedTask>, TaskSourceError>;

    /// Like [`fetch_completed`](Self::fetch_completed), but a failing tracker
    /// yields an empty list.
    fn completed_on(&self, date: Date) -> Vec<CompletedTask> {
        match self.fetch_completed(date) {
            Ok(tasks) => {
                debug!(%date, count = tasks.len(), "fetched completed tasks");
                tasks
            }
            Err(e) => {
                warn!(%date, "ignoring task tracker: {}", e);
                Vec::new()
            }
        }
    }
}

impl<T: TaskSource + ?Sized> TaskSource for &T {
    fn fetch_completed(&self, date: Date) -> Result<Vec<CompletedTask>, TaskSourceError> {
        (**self).fetch_completed(date)
    }
}

impl<T: TaskSource + ?Sized> TaskSource for Box<T> {
    fn fetch_completed(&self, date: Date) -> Result<Vec<CompletedTask>, TaskSourceError> {
        (**self).fetch_completed(date)
    }
}

/// Backend used when no tracker is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTasks;

impl TaskSource for NoTasks {
    fn fetch_completed(&self, _date: Date) -> Result<Vec<CompletedTask>, TaskSourceError> {
        Ok(Vec::new())
    }
}

/// In-memory backend over a fixed task list.
#[derive(Debug, Clone, Default)]
pub struct FixedTasks {
    tasks: Vec<CompletedTask>,
}

impl FixedTasks {
    pub fn new(tasks: Vec<CompletedTask>) -> Self {
        Self { tasks }
    }
}

impl TaskSource for FixedTasks {
    fn fetch_completed(&self, date: Date) -> Result<Vec<CompletedTask>, TaskSourceError> {
        Ok(self
            .tasks
            .iter()
            .filter(|t| t.completed == date)
            .cloned()
            .collect())
    }
}

/// Runs `program` with `args` and returns its stdout.
fn run_tracker(program: &str, args: &[String]) -> Result<Vec<u8>, TaskSourceError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| TaskSourceError::Command(format!("{program}: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(TaskSourceError::Command(format!(
            "{program} exited with {}: {stderr}",
            output.status
        )));
    }
    Ok(output.stdout)
}
