//! Seen-repository deduplication.
//!
//! Tracks which repositories were already surfaced and on which calendar day,
//! so a repository is not reported again until its entry ages out of the
//! retention window.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       SeenRepoCache                        │
//! │  filter_seen ── record ── sweep   (load → modify → save)   │
//! │                          │                                 │
//! │  ┌───────────────────────▼──────────────────────────────┐  │
//! │  │ CacheFile: JSON { "owner/name": "YYYY-MM-DD" }       │  │
//! │  │ write <name>.tmp, then rename over the real file     │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no lock file. Two processes sharing a cache path race with
//! last-writer-wins semantics; the rename only guarantees the file is never
//! torn.
//!
//! # Example
//!
//! ```rust,ignore
//! use repodigest::services::deduplication::SeenRepoCache;
//!
//! let cache = SeenRepoCache::new("cache/seen_repos.json");
//! let (fresh, filtered) = cache.filter_seen(repos, 7);
//! cache.record(&fresh, None)?;
//! cache.sweep(7)?;
//! ```

mod cache;
mod store;
mod types;

pub use cache::{SeenRepoCache, cutoff_date};
pub use store::{CacheFile, CacheStore};
pub use types::{Identified, SweepResult};
