use time::Date;

use super::{run_tracker, CompletedTask, TaskSource, TaskSourceError};
use crate::entry::parse_date;

/// Legacy backend for todo.txt style trackers whose listing prints
/// `<n> x <done> <created> [(P)] <text>` for finished items.
#[derive(Debug, Clone)]
pub struct TodoTxtSource {
    command: String,
    filter: Vec<String>,
}

impl TodoTxtSource {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            filter: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: &str) -> Self {
        self.filter = filter.split_whitespace().map(str::to_string).collect();
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = self.filter.clone();
        args.push("listall".to_string());
        args
    }
}

impl TaskSource for TodoTxtSource {
    fn fetch_completed(&self, date: Date) -> Result<Vec<CompletedTask>, TaskSourceError> {
        let stdout = run_tracker(&self.command, &self.args())?;
        let text = String::from_utf8(stdout)
            .map_err(|e| TaskSourceError::Malformed(format!("listing is not valid UTF-8: {e}")))?;
        Ok(text
            .lines()
            .filter_map(parse_done_line)
            .filter(|t| t.completed == date)
            .collect())
    }
}

/// Parses one finished-item line. Anything else (open items, summary
/// footers, separators) yields `None`.
fn parse_done_line(line: &str) -> Option<CompletedTask> {
    let mut rest = line.trim_start();

    let index_len = rest.find(|c: char| !c.is_ascii_digit())?;
    if index_len == 0 {
        return None;
    }
    rest = rest[index_len..].trim_start();

    rest = rest.strip_prefix("x ")?.trim_start();

    let (done, tail) = rest.split_once(' ')?;
    let completed = parse_date(done)?;
    rest = tail.trim_start();

    // Creation date is optional in todo.txt; only skip it if it parses.
    if let Some((created, tail)) = rest.split_once(' ') {
        if parse_date(created).is_some() {
            rest = tail.trim_start();
        }
    }

    if let Some(tail) = strip_priority(rest) {
        rest = tail;
    }

    let description = rest.trim();
    if description.is_empty() {
        return None;
    }
    Some(CompletedTask::new(completed, description))
}

/// Strips a leading `(A)` style priority tag.
fn strip_priority(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'(' && bytes[1].is_ascii_uppercase() && bytes[2] == b')' {
        Some(s[3..].trim_start())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_done_line_with_priority() {
        assert_eq!(
            parse_done_line("12 x 2024-03-02 2024-02-28 (A) Buy milk +home"),
            Some(CompletedTask::new(date!(2024 - 03 - 02), "Buy milk +home"))
        );
    }

    #[test]
    fn parses_padded_index_without_priority() {
        assert_eq!(
            parse_done_line(" 03 x 2024-03-02 2024-03-01 Call Bob"),
            Some(CompletedTask::new(date!(2024 - 03 - 02), "Call Bob"))
        );
    }

    #[test]
    fn creation_date_is_optional() {
        assert_eq!(
            parse_done_line("4 x 2024-03-02 Call Bob"),
            Some(CompletedTask::new(date!(2024 - 03 - 02), "Call Bob"))
        );
    }

    #[test]
    fn ignores_open_items_and_summaries() {
        assert_eq!(parse_done_line("5 (B) 2024-03-01 Water plants"), None);
        assert_eq!(parse_done_line("--"), None);
        assert_eq!(parse_done_line("TODO: 5 of 12 tasks shown"), None);
        assert_eq!(parse_done_line("7 x not-a-date Something"), None);
    }

    #[test]
    fn listall_is_the_last_argument() {
        let source = TodoTxtSource::new("todo.sh").with_filter("-p -d /tmp/todo.cfg");
        assert_eq!(source.args(), vec!["-p", "-d", "/tmp/todo.cfg", "listall"]);
    }
}
