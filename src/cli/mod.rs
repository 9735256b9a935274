//! CLI command implementations.
//!
//! Each command returns the text to print; the binary owns stdout.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `run` | Fetch, deduplicate, rank and write today's digest |
//! | `cache show` | Print the seen-repo cache |
//! | `cache sweep` | Drop entries outside the window |
//! | `cache clear` | Drop every entry |
//! | `config show` | Print the effective configuration |
//!
//! # Example Usage
//!
//! ```bash
//! repodigest run --topic llm --limit 5
//! repodigest cache sweep
//! repodigest --config ./digest.toml config show
//! ```

mod cache;
mod config;
mod run;

pub use cache::CacheCommand;
pub use config::ConfigCommand;
pub use run::{DEFAULT_LIMIT, DEFAULT_TOPIC, RunCommand};
