//! Time-windowed seen-repo cache.

use super::store::{CacheFile, CacheStore};
use super::types::{Identified, SweepResult};
use crate::observability::usize_to_f64;
use crate::{DATE_FORMAT, Result};
use chrono::{Days, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Returns the oldest day still inside a window of `window_days` ending `today`.
///
/// An entry dated on or after the cutoff counts as seen, so an entry exactly
/// `window_days` old is still suppressed.
#[must_use]
pub fn cutoff_date(today: NaiveDate, window_days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Parses a stored date, returning `None` for malformed values.
fn parse_entry_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Persistent record of which repositories were surfaced and when.
///
/// Every operation performs a full load (and, for writes, a full atomic
/// save), so a later call in the same run always observes earlier writes.
///
/// # Example
///
/// ```rust
/// use repodigest::models::Repository;
/// use repodigest::services::SeenRepoCache;
///
/// let dir = tempfile::tempdir().unwrap();
/// let cache = SeenRepoCache::new(dir.path().join("seen_repos.json"));
///
/// let repos = vec![Repository::new("owner/repo")];
/// cache.record(&repos, None).unwrap();
///
/// let (kept, filtered) = cache.filter_seen(repos, 7);
/// assert!(kept.is_empty());
/// assert_eq!(filtered, 1);
/// ```
#[derive(Debug, Clone)]
pub struct SeenRepoCache {
    file: CacheFile,
}

impl SeenRepoCache {
    /// Creates a cache backed by the JSON file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: CacheFile::new(path),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads the current store. Never fails; see [`CacheFile::load`].
    pub fn load(&self) -> CacheStore {
        self.file.load()
    }

    /// Atomically replaces the store on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save(&self, store: &CacheStore) -> Result<()> {
        self.file.save(store)
    }

    /// Splits `items` into those not seen within `window_days` of today and a
    /// count of the suppressed ones.
    ///
    /// See [`filter_seen_on`](Self::filter_seen_on).
    pub fn filter_seen<T: Identified>(&self, items: Vec<T>, window_days: u32) -> (Vec<T>, usize) {
        self.filter_seen_on(items, window_days, crate::today())
    }

    /// Splits `items` into those not seen within `window_days` of `today` and
    /// a count of the suppressed ones.
    ///
    /// Kept items preserve their input order. An item is suppressed when its
    /// cache entry is dated on or after `today - window_days`. Items without
    /// an identity are dropped and not counted. Entries with unparseable
    /// dates never suppress.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub fn filter_seen_on<T: Identified>(
        &self,
        items: Vec<T>,
        window_days: u32,
        today: NaiveDate,
    ) -> (Vec<T>, usize) {
        if items.is_empty() {
            return (items, 0);
        }

        let store = self.file.load();
        let cutoff = cutoff_date(today, window_days);

        let mut kept = Vec::with_capacity(items.len());
        let mut filtered = 0usize;
        let mut unidentified = 0usize;

        for item in items {
            let Some(id) = item.identity() else {
                unidentified += 1;
                continue;
            };

            let seen_recently = store
                .get(id.as_str())
                .and_then(|date| parse_entry_date(date))
                .is_some_and(|seen| seen >= cutoff);

            if seen_recently {
                debug!(repo = %id, "Suppressing recently seen repository");
                filtered += 1;
            } else {
                kept.push(item);
            }
        }

        debug!(
            kept = kept.len(),
            filtered,
            unidentified,
            %cutoff,
            "Filtered seen repositories"
        );
        metrics::counter!("digest_repos_filtered_total").increment(filtered as u64);

        (kept, filtered)
    }

    /// Records every identified item as seen on `date` (today if `None`).
    ///
    /// Existing entries are overwritten in place. Returns the number of
    /// items recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated store cannot be saved.
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub fn record<T: Identified>(&self, items: &[T], date: Option<NaiveDate>) -> Result<usize> {
        let date = date.unwrap_or_else(crate::today).format(DATE_FORMAT).to_string();

        let mut store = self.file.load();
        let mut recorded = 0usize;
        for id in items.iter().filter_map(|item| item.identity()) {
            store.insert(id.as_str().to_string(), date.clone());
            recorded += 1;
        }

        self.file.save(&store)?;

        debug!(recorded, entries = store.len(), %date, "Recorded seen repositories");
        metrics::gauge!("digest_cache_entries").set(usize_to_f64(store.len()));

        Ok(recorded)
    }

    /// Removes entries older than `window_days` from today.
    ///
    /// See [`sweep_on`](Self::sweep_on).
    ///
    /// # Errors
    ///
    /// Returns an error if the shrunken store cannot be saved.
    pub fn sweep(&self, window_days: u32) -> Result<SweepResult> {
        self.sweep_on(window_days, crate::today())
    }

    /// Removes entries dated before `today - window_days` and entries whose
    /// date does not parse.
    ///
    /// The store is only written back when something was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the shrunken store cannot be saved.
    #[instrument(skip(self))]
    pub fn sweep_on(&self, window_days: u32, today: NaiveDate) -> Result<SweepResult> {
        let mut store = self.file.load();
        let before = store.len();
        let cutoff = cutoff_date(today, window_days);

        store.retain(|_, date| parse_entry_date(date).is_some_and(|seen| seen >= cutoff));

        let removed = before - store.len();
        let persisted = removed > 0;
        if persisted {
            self.file.save(&store)?;
            info!(removed, retained = store.len(), %cutoff, "Swept expired cache entries");
        } else {
            debug!(entries = before, "Nothing to sweep");
        }

        metrics::counter!("digest_cache_swept_total").increment(removed as u64);
        metrics::gauge!("digest_cache_entries").set(usize_to_f64(store.len()));

        Ok(SweepResult {
            removed,
            retained: store.len(),
            persisted,
        })
    }

    /// Removes every entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the empty store cannot be saved.
    pub fn clear(&self) -> Result<usize> {
        let removed = self.file.load().len();
        self.file.save(&CacheStore::new())?;
        info!(removed, "Cleared seen-repo cache");
        Ok(removed)
    }
}
