//! Integer key/value persistence for per-display state.
//!
//! Displays only remember which page was active, keyed by display id. The
//! store is a single text blob of `name$value` entries joined by `|`:
//!
//! ```text
//! mfd-left$2|mfd-right$0
//! ```
//!
//! Every read parses the whole blob and every write re-serializes it.
//! Malformed entries are logged and dropped while parsing, so a damaged blob
//! loses only the damaged entries.
//!
//! | Store | Backing |
//! |-------|---------|
//! | [`BlobStore::new`] | memory only |
//! | [`BlobStore::open`] | text file, rewritten via temp file + rename |

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::log_warn;

const ENTRY_SEPARATOR: char = '|';
const VALUE_SEPARATOR: char = '$';

/// Integer persistence collaborator.
pub trait PersistentStore {
    fn get_int(
        &self,
        key: &str,
    ) -> Option<i64>;

    fn set_int(
        &mut self,
        key: &str,
        value: i64,
    ) -> Result<(), StoreError>;
}

/// `name$value|...` blob store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlobStore {
    blob: String,
    path: Option<PathBuf>,
}

impl BlobStore {
    /// Empty in-memory store.
    pub fn new() -> Self { Self::default() }

    /// In-memory store seeded with an existing blob.
    pub fn from_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: blob.into(),
            path: None,
        }
    }

    /// File-backed store. A missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let blob = match fs::read_to_string(&path) {
            Ok(text) => text.trim_end().to_owned(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { blob, path: Some(path) })
    }

    /// Current serialized contents.
    pub fn blob(&self) -> &str { &self.blob }

    pub fn path(&self) -> Option<&Path> { self.path.as_deref() }
}

impl PersistentStore for BlobStore {
    fn get_int(
        &self,
        key: &str,
    ) -> Option<i64> {
        parse_blob(&self.blob).into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn set_int(
        &mut self,
        key: &str,
        value: i64,
    ) -> Result<(), StoreError> {
        if !is_valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        let mut entries = parse_blob(&self.blob);
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key.to_owned(), value)),
        }
        let blob = serialize(&entries);
        if let Some(path) = &self.path {
            write_atomic(path, &blob)?;
        }
        self.blob = blob;
        Ok(())
    }
}

/// Keys are non-empty and free of the blob separators.
pub fn is_valid_key(key: &str) -> bool { !key.is_empty() && !key.contains([ENTRY_SEPARATOR, VALUE_SEPARATOR]) }

fn parse_blob(blob: &str) -> Vec<(String, i64)> {
    let mut entries: Vec<(String, i64)> = Vec::new();
    for entry in blob.split(ENTRY_SEPARATOR).filter(|e| !e.is_empty()) {
        let parsed = entry
            .split_once(VALUE_SEPARATOR)
            .filter(|(k, v)| !k.is_empty() && !v.contains(VALUE_SEPARATOR))
            .and_then(|(k, v)| v.trim().parse::<i64>().ok().map(|v| (k, v)));
        match parsed {
            Some((key, value)) => match entries.iter_mut().find(|(k, _)| k == key) {
                // Last duplicate wins.
                Some(existing) => existing.1 = value,
                None => entries.push((key.to_owned(), value)),
            },
            None => log_warn!("Dropping bad store entry {}", entry),
        }
    }
    entries
}

fn serialize(entries: &[(String, i64)]) -> String {
    entries
        .iter()
        .map(|(k, v)| format!("{k}{VALUE_SEPARATOR}{v}"))
        .collect::<Vec<_>>()
        .join("|")
}

fn write_atomic(
    path: &Path,
    contents: &str,
) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

// =============================================================================
// Unit Tests
// =============================================================================
