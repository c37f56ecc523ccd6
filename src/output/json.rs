//! JSON output formatter for match results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2024-05-01T10:00:00Z",
//!   "found": ["/card/a.jpg"],
//!   "missing": ["/card/b.jpg"],
//!   "summary": {
//!     "source_files": 2,
//!     "target_files": 40,
//!     "targets_hashed": 12,
//!     "targets_pruned": 28,
//!     "cache_hits": 0,
//!     "cache_misses": 14,
//!     "bytes_hashed": 73400320,
//!     "duration_ms": 412
//!   }
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::matching::{MatchResult, MatchSummary};

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files produced by expanding the source arguments
    pub source_files: usize,
    /// Files produced by expanding the target arguments
    pub target_files: usize,
    /// Distinct target files whose digest was obtained
    pub targets_hashed: usize,
    /// Target entries skipped by type
    pub targets_pruned: usize,
    /// Digests served from the cache
    pub cache_hits: usize,
    /// Digests computed from file contents
    pub cache_misses: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Duration of the run in milliseconds
    pub duration_ms: u64,
}

impl From<&MatchSummary> for JsonSummary {
    fn from(summary: &MatchSummary) -> Self {
        Self {
            source_files: summary.source_files,
            target_files: summary.target_files,
            targets_hashed: summary.targets_hashed,
            targets_pruned: summary.targets_pruned,
            cache_hits: summary.cache_hits,
            cache_misses: summary.cache_misses,
            bytes_hashed: summary.bytes_hashed,
            duration_ms: summary.duration.as_millis() as u64,
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Source files present among the targets
    pub found: Vec<String>,
    /// Source files absent from the targets
    pub missing: Vec<String>,
    /// Run counters
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the document for a finished run.
    ///
    /// ```
    /// use fds::matching::MatchResult;
    /// use fds::output::JsonOutput;
    /// use std::path::PathBuf;
    ///
    /// let result = MatchResult {
    ///     missing: vec![PathBuf::from("/card/b.jpg")],
    ///     ..Default::default()
    /// };
    /// let output = JsonOutput::new(&result);
    /// assert_eq!(output.missing, vec!["/card/b.jpg".to_string()]);
    /// ```
    #[must_use]
    pub fn new(result: &MatchResult) -> Self {
        Self {
            generated_at: Utc::now(),
            found: result
                .found
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            missing: result
                .missing
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            summary: JsonSummary::from(&result.summary),
        }
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the pretty-printed document followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        let json = self.to_json_pretty()?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
