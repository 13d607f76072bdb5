use serde::Deserialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, UtcOffset};

use super::{run_tracker, CompletedTask, TaskSource, TaskSourceError};

const END_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year][month][day]T[hour][minute][second]Z");

/// Taskwarrior backend, reading `task export` JSON.
#[derive(Debug, Clone)]
pub struct TaskwarriorSource {
    command: String,
    filter: Vec<String>,
    offset: UtcOffset,
}

/// The subset of an exported task record that matters here.
#[derive(Debug, Deserialize)]
struct ExportedTask {
    status: Option<String>,
    end: Option<String>,
    description: Option<String>,
}

impl TaskwarriorSource {
    /// `offset` converts Taskwarrior's UTC end stamps into local dates.
    pub fn new(command: impl Into<String>, offset: UtcOffset) -> Self {
        Self {
            command: command.into(),
            filter: Vec::new(),
            offset,
        }
    }

    /// Extra filter tokens, e.g. `project:home`.
    pub fn with_filter(mut self, filter: &str) -> Self {
        self.filter = filter.split_whitespace().map(str::to_string).collect();
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["rc.verbose=nothing".to_string(), "rc.json.array=on".to_string()];
        args.extend(self.filter.iter().cloned());
        args.extend(["status:completed".to_string(), "export".to_string()]);
        args
    }
}

impl TaskSource for TaskwarriorSource {
    fn fetch_completed(&self, date: Date) -> Result<Vec<CompletedTask>, TaskSourceError> {
        let stdout = run_tracker(&self.command, &self.args())?;
        parse_export(&stdout, date, self.offset)
    }
}

/// Keeps completed records whose local end date is `date`.
fn parse_export(
    output: &[u8],
    date: Date,
    offset: UtcOffset,
) -> Result<Vec<CompletedTask>, TaskSourceError> {
    let records: Vec<ExportedTask> = serde_json::from_slice(output)
        .map_err(|e| TaskSourceError::Malformed(format!("task export is not a JSON array: {e}")))?;

    Ok(records
        .into_iter()
        .filter(|r| r.status.as_deref() == Some("completed"))
        .filter_map(|r| {
            let end = PrimitiveDateTime::parse(r.end.as_deref()?, END_FORMAT).ok()?;
            let completed = end.assume_utc().to_offset(offset).date();
            if completed != date {
                return None;
            }
            Some(CompletedTask::new(completed, r.description?))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, offset};

    const EXPORT: &str = r#"[
        {"id":0,"status":"completed","end":"20240302T081500Z","description":"Buy milk","urgency":0.8},
        {"id":0,"status":"completed","end":"20240302T193000Z","description":"Call Bob"},
        {"id":3,"status":"pending","description":"Water plants"},
        {"id":0,"status":"deleted","end":"20240302T090000Z","description":"Dropped"},
        {"id":0,"status":"completed","end":"20240301T120000Z","description":"Older"},
        {"id":0,"status":"completed","description":"No end stamp"}
    ]"#;

    #[test]
    fn keeps_only_completed_tasks_on_date_in_order() {
        let tasks = parse_export(EXPORT.as_bytes(), date!(2024 - 03 - 02), UtcOffset::UTC).unwrap();
        assert_eq!(
            tasks,
            vec![
                CompletedTask::new(date!(2024 - 03 - 02), "Buy milk"),
                CompletedTask::new(date!(2024 - 03 - 02), "Call Bob"),
            ]
        );
    }

    #[test]
    fn end_stamps_are_shifted_to_local_offset() {
        // 19:30Z is already the next day at UTC+5.
        let tasks = parse_export(EXPORT.as_bytes(), date!(2024 - 03 - 03), offset!(+5)).unwrap();
        assert_eq!(tasks, vec![CompletedTask::new(date!(2024 - 03 - 03), "Call Bob")]);
    }

    #[test]
    fn rejects_non_json_output() {
        let err = parse_export(b"No matches.", date!(2024 - 03 - 02), UtcOffset::UTC).unwrap_err();
        assert!(matches!(err, TaskSourceError::Malformed(_)));
    }

    #[test]
    fn filter_tokens_precede_status_and_export() {
        let source = TaskwarriorSource::new("task", UtcOffset::UTC).with_filter("project:home  +diary");
        assert_eq!(
            source.args(),
            vec![
                "rc.verbose=nothing",
                "rc.json.array=on",
                "project:home",
                "+diary",
                "status:completed",
                "export"
            ]
        );
    }
}
