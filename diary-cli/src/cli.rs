use clap::{Parser, Subcommand};
use diary_core::entry::{parse_date, parse_timestamp};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration, PrimitiveDateTime, Time};

use crate::session::{DayChoice, Mode};

const TIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[hour]:[minute]:[second]"),
    format_description!("[hour]:[minute]"),
];

#[derive(Debug, Parser)]
#[command(name = "diary")]
#[command(about = "Write a diary entry, then look back at a random earlier day")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// When the entry was written: "yesterday", a date, a time, or "YYYY-MM-DD HH:MM"
    pub when: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a day without writing anything
    Show {
        /// A YYYY-MM-DD date, "today", "yesterday" or "random"
        day: String,
    },
    /// Print config path and create default file if missing
    ConfigPath,
}

impl Cli {
    /// Resolves the arguments against the current local time.
    pub fn into_mode(self, now: PrimitiveDateTime) -> Result<Mode, String> {
        match self.command {
            Some(Commands::Show { day }) => parse_day(&day, now.date()).map(Mode::Show),
            Some(Commands::ConfigPath) => Err("config-path does not start a session".to_string()),
            None => match self.when {
                None => Ok(Mode::Write { at: now }),
                Some(when) => parse_when(&when, now).map(|at| Mode::Write { at }),
            },
        }
    }
}

/// Parses the nominal time of a new entry.
pub fn parse_when(input: &str, now: PrimitiveDateTime) -> Result<PrimitiveDateTime, String> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("yesterday") {
        return Ok(PrimitiveDateTime::new(
            now.date() - Duration::days(1),
            time::macros::time!(23:00),
        ));
    }
    if input.eq_ignore_ascii_case("now") {
        return Ok(now);
    }
    if let Some(at) = parse_timestamp(&input.replace("__", " ")) {
        return Ok(at);
    }
    TIME_FORMATS
        .iter()
        .find_map(|format| Time::parse(input, format).ok())
        .map(|t| PrimitiveDateTime::new(now.date(), t))
        .ok_or_else(|| format!("cannot read `{input}` as a date or time"))
}

/// Parses the argument of `show`.
pub fn parse_day(input: &str, today: Date) -> Result<DayChoice, String> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("random") {
        return Ok(DayChoice::Random);
    }
    if input.eq_ignore_ascii_case("today") {
        return Ok(DayChoice::Date(today));
    }
    if input.eq_ignore_ascii_case("yesterday") {
        return Ok(DayChoice::Date(today - Duration::days(1)));
    }
    parse_date(input)
        .map(DayChoice::Date)
        .ok_or_else(|| format!("cannot read `{input}` as a date (expected YYYY-MM-DD or \"random\")"))
}
