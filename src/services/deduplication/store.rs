//! On-disk seen-repo store.
//!
//! The store is a single pretty-printed JSON object mapping repository
//! identities to the `YYYY-MM-DD` day they were last surfaced:
//!
//! ```json
//! {
//!   "owner/repo1": "2024-01-01",
//!   "owner/repo2": "2024-01-02"
//! }
//! ```
//!
//! Entries keep their first-insertion order, so re-recording an identity
//! updates its date in place. Non-ASCII characters are written as `\uXXXX`
//! escapes, so the file stays pure ASCII.

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{Formatter, PrettyFormatter};
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// In-memory copy of the seen-repo store: identity → `YYYY-MM-DD`.
///
/// Values are kept as raw strings; malformed dates are tolerated on load and
/// dropped by the next sweep.
pub type CacheStore = IndexMap<String, String>;

/// Handle to the JSON file backing a [`CacheStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    /// Creates a handle for the store at `path`. Nothing is touched on disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the store path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the staging path used during [`save`](Self::save).
    #[must_use]
    pub fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    /// Reads the store.
    ///
    /// A missing, unreadable or malformed file yields an empty store; the
    /// failure is logged and never returned. Entries whose value is not a
    /// string are dropped individually.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> CacheStore {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Seen-repo cache does not exist yet");
                return CacheStore::new();
            },
            Err(e) => {
                warn!(error = %e, "Failed to read seen-repo cache, treating as empty");
                return CacheStore::new();
            },
        };

        let raw = match serde_json::from_str::<IndexMap<String, Value>>(&contents) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Seen-repo cache is malformed, treating as empty");
                return CacheStore::new();
            },
        };

        let total = raw.len();
        let store: CacheStore = raw
            .into_iter()
            .filter_map(|(id, value)| match value {
                Value::String(date) => Some((id, date)),
                _ => None,
            })
            .collect();

        let dropped = total - store.len();
        if dropped > 0 {
            warn!(dropped, kept = store.len(), "Dropped non-string seen-repo cache entries");
        }
        debug!(entries = store.len(), "Loaded seen-repo cache");
        store
    }

    /// Writes the whole store atomically.
    ///
    /// The JSON is written and synced to `<name>.tmp` next to the store, then
    /// renamed over the real path. An interruption before the rename leaves
    /// the previously committed file untouched. The parent directory is
    /// created if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, staging file or rename fails.
    #[instrument(skip(self, store), fields(path = %self.path.display(), entries = store.len()))]
    pub fn save(&self, store: &CacheStore) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::operation("create_cache_dir", format!("{}: {e}", parent.display()))
            })?;
        }

        let data = to_ascii_pretty(store).map_err(|e| Error::operation("serialize_cache", e))?;

        let temp_path = self.temp_path();
        write_synced(&temp_path, &data).map_err(|e| {
            Error::operation("write_cache_tmp", format!("{}: {e}", temp_path.display()))
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            Error::operation("commit_cache", format!("{}: {e}", self.path.display()))
        })?;

        debug!("Saved seen-repo cache");
        Ok(())
    }
}

/// Serializes with a two-space indent, escaping every non-ASCII character.
fn to_ascii_pretty<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter::new());
    value.serialize(&mut serializer)?;
    Ok(out)
}

/// Pretty formatter that writes non-ASCII characters as `\uXXXX` escapes
/// (UTF-16 surrogate pairs above the BMP).
struct AsciiFormatter<'a> {
    pretty: PrettyFormatter<'a>,
}

impl AsciiFormatter<'_> {
    fn new() -> Self {
        Self {
            pretty: PrettyFormatter::with_indent(b"  "),
        }
    }
}

impl Formatter for AsciiFormatter<'_> {
    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..index])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = index + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }

    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object_value(writer)
    }
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_of(entries: &[(&str, &str)]) -> CacheStore {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let file = CacheFile::new(dir.path().join("seen_repos.json"));
        assert!(file.load().is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let file = CacheFile::new(dir.path().join("seen_repos.json"));
        let store = store_of(&[("owner/repo1", "2024-01-01"), ("owner/repo2", "2024-01-02")]);

        file.save(&store).unwrap();

        assert_eq!(file.load(), store);
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let file = CacheFile::new(dir.path().join("nested").join("cache").join("seen.json"));

        file.save(&store_of(&[("a/b", "2024-03-01")])).unwrap();

        assert!(file.path().exists());
        assert!(!file.temp_path().exists());
    }

    #[test]
    fn test_file_format_is_pretty_json() {
        let dir = TempDir::new().unwrap();
        let file = CacheFile::new(dir.path().join("seen_repos.json"));
        file.save(&store_of(&[("owner/repo1", "2024-01-01"), ("owner/repo2", "2024-01-02")]))
            .unwrap();

        let contents = fs::read_to_string(file.path()).unwrap();
        assert_eq!(
            contents,
            "{\n  \"owner/repo1\": \"2024-01-01\",\n  \"owner/repo2\": \"2024-01-02\"\n}"
        );
    }

    #[test]
    fn test_empty_store_format() {
        let dir = TempDir::new().unwrap();
        let file = CacheFile::new(dir.path().join("seen_repos.json"));
        file.save(&CacheStore::new()).unwrap();

        assert_eq!(fs::read_to_string(file.path()).unwrap(), "{}");
    }

    #[test]
    fn test_load_invalid_json_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seen_repos.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(CacheFile::new(path).load().is_empty());
    }

    #[test]
    fn test_load_wrong_shape_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seen_repos.json");

        fs::write(&path, r#"["owner/repo"]"#).unwrap();
        assert!(CacheFile::new(&path).load().is_empty());

        fs::write(&path, r#""owner/repo""#).unwrap();
        assert!(CacheFile::new(&path).load().is_empty());
    }

    #[test]
    fn test_load_drops_only_non_string_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seen_repos.json");
        fs::write(
            &path,
            r#"{"a/b": "2024-01-04", "c/d": null, "e/f": 20240101, "g/h": ["x"], "i/j": "2024-01-05"}"#,
        )
        .unwrap();

        let store = CacheFile::new(&path).load();

        assert_eq!(store, store_of(&[("a/b", "2024-01-04"), ("i/j", "2024-01-05")]));
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        let dir = TempDir::new().unwrap();
        let file = CacheFile::new(dir.path().join("seen_repos.json"));
        let store = store_of(&[("münchen/x", "2024-01-01"), ("emoji/\u{1f600}", "2024-01-02")]);

        file.save(&store).unwrap();

        assert_eq!(
            fs::read_to_string(file.path()).unwrap(),
            "{\n  \"m\\u00fcnchen/x\": \"2024-01-01\",\n  \"emoji/\\ud83d\\ude00\": \"2024-01-02\"\n}"
        );
        assert_eq!(file.load(), store);
    }

    #[test]
    fn test_interrupted_save_keeps_committed_file() {
        let dir = TempDir::new().unwrap();
        let file = CacheFile::new(dir.path().join("seen_repos.json"));
        let committed = store_of(&[("owner/repo1", "2024-01-01")]);
        file.save(&committed).unwrap();

        // A crash after staging but before the rename leaves a torn temp file.
        fs::write(file.temp_path(), "{\n  \"owner/rep").unwrap();

        assert_eq!(file.load(), committed);
    }

    #[test]
    fn test_save_replaces_existing_and_stale_temp() {
        let dir = TempDir::new().unwrap();
        let file = CacheFile::new(dir.path().join("seen_repos.json"));
        file.save(&store_of(&[("old/repo", "2024-01-01")])).unwrap();
        fs::write(file.temp_path(), "garbage").unwrap();

        let replacement = store_of(&[("new/repo", "2024-02-01")]);
        file.save(&replacement).unwrap();

        assert_eq!(file.load(), replacement);
        assert!(!file.temp_path().exists());
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let file = CacheFile::new("cache/seen_repos.json");
        assert_eq!(file.temp_path(), PathBuf::from("cache/seen_repos.tmp"));
    }
}
