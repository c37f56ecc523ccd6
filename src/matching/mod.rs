//! Found/missing classification of source files against target trees.
//!
//! Type tokens prune the target side before any hashing happens; the final
//! decision is always a digest comparison.

pub mod finder;

pub use finder::{
    FinderConfig, FinderError, MatchFinder, MatchResult, MatchSummary, PHASE_COMPARE,
    PHASE_HASH_SOURCES, PHASE_HASH_TARGETS,
};
