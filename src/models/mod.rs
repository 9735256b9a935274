//! Data models for repodigest.
//!
//! This module contains the typed records that flow through the pipeline.

mod preferences;
mod repository;

pub use preferences::{DEFAULT_BOOST_MULTIPLIER, Preferences};
pub use repository::{
    DEFAULT_DESCRIPTION, DEFAULT_LANGUAGE, RankedRepository, RepoId, Repository,
};
