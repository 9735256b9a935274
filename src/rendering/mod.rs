//! Report rendering.
//!
//! Turns a ranked list of repositories into a dated Markdown file.

mod markdown;

pub use markdown::ReportWriter;
