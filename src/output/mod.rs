//! Output formatters for match results.
//!
//! - Text: numbered found/missing listings for the terminal
//! - JSON: one document for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use fds::cache::HashCache;
//! use fds::matching::MatchFinder;
//! use fds::output::TextOutput;
//! use std::path::{Path, PathBuf};
//!
//! let cache = HashCache::load(Path::new("hashes.json"), false).unwrap();
//! let result = MatchFinder::with_defaults()
//!     .find_matches(&[PathBuf::from("src")], &[PathBuf::from("dst")], &cache)
//!     .unwrap();
//!
//! TextOutput::new(&result, true)
//!     .write_to(&mut std::io::stdout())
//!     .unwrap();
//! ```

pub mod json;
pub mod text;

// Re-export main types
pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;
