//! Line history
//!
//! A bounded, newest-last ring of accepted lines. Adjacent duplicates
//! and empty lines are never stored; the oldest entry is evicted on
//! overflow. The ring can be persisted to a newline-separated file and
//! reloaded.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;

/// Default ring capacity.
pub const DEFAULT_MAX_LEN: usize = 100;

pub struct History {
    entries: VecDeque<String>,
    max_len: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LEN)
    }

    /// Create a ring with the given capacity; capacities below one are
    /// raised to one.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_len: max_len.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|s| s.as_str())
    }

    /// Iterate entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.as_str())
    }

    /// Append a completed line. Empty lines and lines equal to the
    /// newest entry are rejected.
    pub fn add(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }

        if self.entries.back().is_some_and(|last| last == line) {
            return false;
        }

        if self.entries.len() == self.max_len {
            self.entries.pop_front();
        }

        self.entries.push_back(line.to_string());
        true
    }

    /// Change the ring capacity, discarding the oldest entries when
    /// shrinking. A capacity of zero is rejected.
    pub fn set_max_len(&mut self, max_len: usize) -> bool {
        if max_len == 0 {
            return false;
        }

        while self.entries.len() > max_len {
            self.entries.pop_front();
        }

        self.max_len = max_len;
        true
    }

    /// Write all entries to `path`, oldest first, one per line. The
    /// file is replaced atomically via a rename from a sibling
    /// temporary file. Returns the number of entries written.
    pub fn save(&self, path: impl AsRef<Path>) -> io::Result<usize> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "history path has no file name"))?;
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let tmp = dir
            .unwrap_or_else(|| Path::new("."))
            .join(format!(".{}.tmp", name.to_string_lossy()));

        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            for entry in &self.entries {
                writer.write_all(entry.as_bytes())?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp, path)?;
        debug!("saved {} history entries to {}", self.entries.len(), path.display());
        Ok(self.entries.len())
    }

    /// Replace the ring with the contents of `path`, skipping empty
    /// lines and honoring the capacity. Returns the number of entries
    /// loaded.
    pub fn load(&mut self, path: impl AsRef<Path>) -> io::Result<usize> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);

        self.entries.clear();

        let mut loaded = 0;
        for line in reader.lines() {
            let line = line?;
            if self.add(line.trim_end_matches('\r')) {
                loaded += 1;
            }
        }

        debug!("loaded {loaded} history entries from {}", path.display());
        Ok(loaded)
    }

    /// Overwrite the entry at `index`. Used by session navigation to
    /// preserve in-progress edits while browsing.
    pub(crate) fn replace(&mut self, index: usize, line: String) {
        if let Some(entry) = self.entries.get_mut(index) {
            *entry = line;
        }
    }

    /// Append the scratch slot holding the in-progress line. Bypasses
    /// the duplicate and capacity rules; it is removed again by
    /// [`History::pop_scratch`] on every session exit path.
    pub(crate) fn push_scratch(&mut self) {
        self.entries.push_back(String::new());
    }

    pub(crate) fn pop_scratch(&mut self) {
        self.entries.pop_back();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
