use time::Date;

use crate::tasks::{CompletedTask, TaskSource};

/// Heading that opens the task footer, both in the editable template and in
/// the review document.
pub const FOOTER_HEADING: &str = "### Done tasks";

/// Builds the text a new entry starts from.
pub struct EntryComposer<T> {
    tasks: T,
}

impl<T: TaskSource> EntryComposer<T> {
    pub fn new(tasks: T) -> Self {
        Self { tasks }
    }

    /// Two blank lines to write into, then the tasks completed on `date`.
    pub fn build_template(&self, date: Date) -> String {
        render_template(&self.tasks.completed_on(date))
    }
}

pub fn render_template(tasks: &[CompletedTask]) -> String {
    let mut template = format!("\n\n{FOOTER_HEADING}\n");
    template.push_str(&render_task_list(tasks));
    template
}

/// One `* description` line per task.
pub fn render_task_list(tasks: &[CompletedTask]) -> String {
    tasks
        .iter()
        .map(|t| format!("* {}\n", t.description))
        .collect()
}

/// Drops the footer and everything after it.
///
/// Trailing blank lines are collapsed so the result always ends in exactly one
/// newline. Text without a footer only gets that normalisation, which makes
/// the operation idempotent. Text saved with `\r\n` line endings keeps them.
pub fn strip_footer(text: &str) -> String {
    let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let mut lines: Vec<&str> = text
        .lines()
        .take_while(|line| *line != FOOTER_HEADING)
        .collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    let mut stripped = lines.join(newline);
    stripped.push_str(newline);
    stripped
}

/// True when nothing but whitespace is left.
pub fn is_blank(text: &str) -> bool {
    text.lines().all(|line| line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{FixedTasks, NoTasks};
    use time::macros::date;

    #[test]
    fn template_lists_tasks_in_source_order() {
        let composer = EntryComposer::new(FixedTasks::new(vec![
            CompletedTask::new(date!(2024 - 03 - 02), "Buy milk"),
            CompletedTask::new(date!(2024 - 03 - 02), "Call Bob"),
        ]));
        assert_eq!(
            composer.build_template(date!(2024 - 03 - 02)),
            "\n\n### Done tasks\n* Buy milk\n* Call Bob\n"
        );
    }

    #[test]
    fn template_without_tasks_is_just_the_heading() {
        let composer = EntryComposer::new(NoTasks);
        assert_eq!(composer.build_template(date!(2024 - 03 - 02)), "\n\n### Done tasks\n");
    }

    #[test]
    fn untouched_template_is_blank_after_stripping() {
        let template = render_template(&[CompletedTask::new(date!(2024 - 03 - 02), "Buy milk")]);
        assert!(!is_blank(&template));
        assert!(is_blank(&strip_footer(&template)));
        assert!(is_blank(&strip_footer(&render_template(&[]))));
    }

    #[test]
    fn strip_keeps_body_above_footer() {
        let edited = "hello\n\n### Done tasks\n* Buy milk\n";
        assert_eq!(strip_footer(edited), "hello\n");
    }

    #[test]
    fn strip_collapses_trailing_blank_lines() {
        assert_eq!(strip_footer("a\n\nb\n \n\t\n\n"), "a\n\nb\n");
        assert_eq!(strip_footer("no newline"), "no newline\n");
    }

    #[test]
    fn strip_keeps_crlf_line_endings() {
        assert_eq!(
            strip_footer("hello\r\nworld\r\n\r\n### Done tasks\r\n* y\r\n"),
            "hello\r\nworld\r\n"
        );
        assert_eq!(strip_footer("\r\n\r\n### Done tasks\r\n"), "\r\n");
    }

    #[test]
    fn strip_only_matches_exact_heading() {
        let text = "notes\n#### Done tasks\n### Done tasks!\n";
        assert_eq!(strip_footer(text), text);
    }

    #[test]
    fn strip_is_idempotent() {
        for text in [
            "",
            "\n\n### Done tasks\n",
            "hello\n\n### Done tasks\n* x\n",
            "a\n\n\n",
            "### Done tasks\nafter",
            "  \nbody\n  \n### Done tasks\n",
            "crlf\r\n\r\n### Done tasks\r\n* y\r\n",
        ] {
            let once = strip_footer(text);
            assert_eq!(strip_footer(&once), once, "input: {text:?}");
        }
    }

    #[test]
    fn blank_means_whitespace_only() {
        assert!(is_blank(""));
        assert!(is_blank(" \n\t\n"));
        assert!(!is_blank("\n x\n"));
    }
}
