//! Hash caching module for fds.
//!
//! This module provides persistent storage for file digests so that repeated
//! runs over the same trees can skip re-hashing.
//!
//! # Format
//!
//! The cache is a UTF-8 JSON object mapping path strings to hex digests:
//!
//! ```json
//! { "/photos/a.jpg": "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824" }
//! ```
//!
//! # Cache Invalidation
//!
//! There is none. An entry is trusted for as long as it sits in the file;
//! deleting the file is the way to force a full re-hash.
//!
//! # Modes
//!
//! See [`CacheMode`]. When caching is enabled and the file already exists,
//! the file is read but never rewritten.

pub mod store;

pub use store::{CacheError, CacheLookup, CacheMode, CacheResult, HashCache, DEFAULT_CACHE_FILE};
