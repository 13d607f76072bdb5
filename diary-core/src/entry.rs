use std::path::{Path, PathBuf};

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

use crate::error::{DiaryError, Result};

/// Extension of every entry file.
pub const EXTENSION: &str = "md";

const DATETIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

/// `YYYY-MM-DD__HH:MM:SS`, the stem every new entry file gets.
const FILE_STEM_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]__[hour]:[minute]:[second]");

const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// One diary file, identified by the second-precision timestamp encoded in
/// its name.
///
/// The name is decoded once when the entry is discovered; everything
/// downstream works off the cached timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    path: PathBuf,
    file_name: String,
    timestamp: PrimitiveDateTime,
}

impl Entry {
    /// The entry that `timestamp` maps to inside `dir`. Sub-second precision
    /// is dropped.
    pub fn new(dir: &Path, timestamp: PrimitiveDateTime) -> Result<Self> {
        let timestamp = timestamp.replace_nanosecond(0).unwrap_or(timestamp);
        let file_name = file_name_for(timestamp)?;
        Ok(Self {
            path: dir.join(&file_name),
            file_name,
            timestamp,
        })
    }

    /// Decodes an existing file path into an entry.
    pub fn from_path(path: PathBuf) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let timestamp = decode_file_name(&file_name)?;
        Ok(Self {
            path,
            file_name,
            timestamp,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The name the file has on disk, which for older entries may use a
    /// separator other than `__`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn timestamp(&self) -> PrimitiveDateTime {
        self.timestamp
    }

    pub fn date(&self) -> Date {
        self.timestamp.date()
    }
}

/// Encodes a timestamp as `YYYY-MM-DD__HH:MM:SS.md`.
pub fn file_name_for(timestamp: PrimitiveDateTime) -> Result<String> {
    let stem = timestamp.format(FILE_STEM_FORMAT)?;
    Ok(format!("{stem}.{EXTENSION}"))
}

/// Decodes an entry file name back into its timestamp.
///
/// The canonical `__` form is tried first. Anything else has its `__`
/// separator turned into a space and goes through [`parse_timestamp`], so
/// older files written with any separator that parser accepts still load.
pub fn decode_file_name(name: &str) -> Result<PrimitiveDateTime> {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    PrimitiveDateTime::parse(&stem, FILE_STEM_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(&stem.replace("__", " ")))
        .ok_or_else(|| DiaryError::CorruptName(name.to_string()))
}

/// Lenient local date/time parser.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]` with either a space or `T` between date and
/// time, or a bare `YYYY-MM-DD` which is read as midnight.
pub fn parse_timestamp(input: &str) -> Option<PrimitiveDateTime> {
    let input = input.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(input, format).ok())
        .or_else(|| parse_date(input).map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT)))
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Option<Date> {
    Date::parse(input.trim(), DATE_FORMAT).ok()
}
