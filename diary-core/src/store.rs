use std::path::{Path, PathBuf};

use time::PrimitiveDateTime;
use tracing::{debug, warn};

use crate::entry::{Entry, EXTENSION};
use crate::error::{DiaryError, Result};

/// Addresses an entry either by its timestamp or by its file name.
#[derive(Debug, Clone, Copy)]
pub enum EntryRef<'a> {
    Timestamp(PrimitiveDateTime),
    FileName(&'a str),
}

impl From<PrimitiveDateTime> for EntryRef<'_> {
    fn from(ts: PrimitiveDateTime) -> Self {
        EntryRef::Timestamp(ts)
    }
}

impl<'a> From<&'a str> for EntryRef<'a> {
    fn from(name: &'a str) -> Self {
        EntryRef::FileName(name)
    }
}

impl<'a> From<&'a Entry> for EntryRef<'a> {
    fn from(entry: &'a Entry) -> Self {
        EntryRef::FileName(entry.file_name())
    }
}

/// Flat directory of entry files. The store is the only writer of that
/// directory.
#[derive(Debug, Clone)]
pub struct EntryStore {
    dir: PathBuf,
}

impl EntryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes a new entry. An existing entry with the same timestamp is
    /// overwritten.
    pub fn create(&self, timestamp: PrimitiveDateTime, body: &str) -> Result<Entry> {
        std::fs::create_dir_all(&self.dir)?;
        let entry = Entry::new(&self.dir, timestamp)?;
        std::fs::write(entry.path(), body)?;
        debug!(path = %entry.path().display(), "created entry");
        Ok(entry)
    }

    /// Replaces the body of an existing entry.
    pub fn write(&self, entry: &Entry, body: &str) -> Result<()> {
        if !entry.path().is_file() {
            return Err(DiaryError::NotFound(entry.path().to_path_buf()));
        }
        std::fs::write(entry.path(), body)?;
        Ok(())
    }

    pub fn read<'a>(&self, key: impl Into<EntryRef<'a>>) -> Result<String> {
        let path = self.path_of(key.into())?;
        std::fs::read_to_string(&path).map_err(|e| DiaryError::from_io(e, path))
    }

    pub fn delete(&self, entry: &Entry) -> Result<()> {
        std::fs::remove_file(entry.path()).map_err(|e| DiaryError::from_io(e, entry.path()))?;
        debug!(path = %entry.path().display(), "deleted entry");
        Ok(())
    }

    /// Every entry in the directory, in discovery order.
    ///
    /// Only `.md` files are considered. Names that do not decode to a
    /// timestamp are skipped with a warning; a missing directory is an empty
    /// store.
    pub fn list_all(&self) -> Result<Vec<Entry>> {
        let read_dir = match std::fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "diary directory does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let path = dir_entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match Entry::from_path(path) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("skipping diary file: {}", e),
            }
        }
        Ok(entries)
    }

    fn path_of(&self, key: EntryRef<'_>) -> Result<PathBuf> {
        Ok(match key {
            EntryRef::Timestamp(ts) => Entry::new(&self.dir, ts)?.path().to_path_buf(),
            EntryRef::FileName(name) => self.dir.join(name),
        })
    }
}
