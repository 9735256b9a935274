//! Business logic services.
//!
//! Scoring ranks freshly fetched repositories, deduplication suppresses the
//! ones surfaced recently, and the digest pipeline ties both to a source and
//! a report writer.

pub mod deduplication;
mod digest;
pub mod scoring;

pub use deduplication::{CacheStore, Identified, SeenRepoCache, SweepResult};
pub use digest::{DigestOutcome, DigestPipeline, DigestRequest};
pub use scoring::{ScoreBreakdown, Scorer, rank_repos, score_repo};
