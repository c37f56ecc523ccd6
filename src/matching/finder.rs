//! Source-in-target matching.
//!
//! # Overview
//!
//! [`MatchFinder`] runs the whole pipeline:
//! 1. **Expand** sources and targets into flat file lists
//! 2. **Prune** targets whose type token no source shares
//! 3. **Hash targets** (cache-aware, each path once)
//! 4. **Hash sources** (cache-aware, each path once)
//! 5. **Compare** every source digest against the set of target digests
//!
//! # Example
//!
//! ```no_run
//! use fds::cache::HashCache;
//! use fds::matching::{FinderConfig, MatchFinder};
//! use std::path::{Path, PathBuf};
//!
//! let cache = HashCache::load(Path::new("hashes.json"), true).unwrap();
//! let finder = MatchFinder::new(FinderConfig::default().with_io_threads(4));
//! let result = finder
//!     .find_matches(&[PathBuf::from("camera")], &[PathBuf::from("/backup")], &cache)
//!     .unwrap();
//!
//! for path in &result.missing {
//!     println!("not backed up: {}", path.display());
//! }
//! cache.save(&result.digests).unwrap();
//! ```

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::cache::{CacheLookup, HashCache};
use crate::progress::ProgressCallback;
use crate::scanner::walker::expand_paths_with_shutdown;
use crate::scanner::{file_type, Digest, HashError, Hasher, ScanError, WalkerConfig};

/// Phase names reported to the progress callback.
pub const PHASE_HASH_TARGETS: &str = "Hashing target";
/// See [`PHASE_HASH_TARGETS`].
pub const PHASE_HASH_SOURCES: &str = "Hashing source";
/// See [`PHASE_HASH_TARGETS`].
pub const PHASE_COMPARE: &str = "Comparing";

/// Configuration for the match finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of threads hashing files within a phase. 1 hashes sequentially.
    pub io_threads: usize,
    /// Walker configuration for path expansion.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing threads (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Counters describing one run.
#[derive(Debug, Clone, Default)]
pub struct MatchSummary {
    /// Files produced by expanding the source arguments
    pub source_files: usize,
    /// Files produced by expanding the target arguments
    pub target_files: usize,
    /// Distinct source paths classified
    pub unique_sources: usize,
    /// Distinct target paths whose digest was obtained
    pub targets_hashed: usize,
    /// Target entries skipped because no source shares their type
    pub targets_pruned: usize,
    /// Digests served from the cache
    pub cache_hits: usize,
    /// Digests computed from file contents
    pub cache_misses: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Wall time of the whole run
    pub duration: Duration,
}

impl MatchSummary {
    /// Bytes hashed as a human-readable string.
    #[must_use]
    pub fn bytes_hashed_display(&self) -> String {
        bytesize::ByteSize::b(self.bytes_hashed).to_string()
    }

    fn record(&mut self, lookup: &CacheLookup) {
        if lookup.is_hit() {
            self.cache_hits += 1;
        } else {
            self.cache_misses += 1;
        }
    }
}

/// Outcome of [`MatchFinder::find_matches`].
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// Sources whose digest exists among the targets, in traversal order
    pub found: Vec<PathBuf>,
    /// Sources with no matching target digest, in traversal order
    pub missing: Vec<PathBuf>,
    /// Every digest obtained this run (sources and targets), for the cache
    pub digests: HashMap<PathBuf, Digest>,
    /// Run counters
    pub summary: MatchSummary,
}

/// Errors that can occur while matching.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The run was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Run interrupted by user")]
    Interrupted,

    /// A source or target path could not be expanded.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A file could not be hashed.
    #[error(transparent)]
    Hash(HashError),
}

impl From<HashError> for FinderError {
    fn from(err: HashError) -> Self {
        match err {
            HashError::Interrupted => Self::Interrupted,
            other => Self::Hash(other),
        }
    }
}

/// Orchestrates expansion, pruning, hashing and classification.
pub struct MatchFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl MatchFinder {
    /// Create a new finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(Arc::clone(flag));
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Classify every source file as found or missing among the targets.
    ///
    /// The cache is only read here; persist [`MatchResult::digests`] with
    /// [`HashCache::save`] once the run has succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Scan`] if any input path is missing or
    /// unreadable, [`FinderError::Hash`] if a file cannot be hashed and
    /// [`FinderError::Interrupted`] if shutdown was requested.
    pub fn find_matches(
        &self,
        sources: &[PathBuf],
        targets: &[PathBuf],
        cache: &HashCache,
    ) -> Result<MatchResult, FinderError> {
        let start_time = Instant::now();
        let bytes_before = self.hasher.bytes_hashed();
        let mut summary = MatchSummary::default();

        let source_files = self.expand(sources)?;
        let target_files = self.expand(targets)?;
        summary.source_files = source_files.len();
        summary.target_files = target_files.len();
        log::info!(
            "Expanded {} source file(s) and {} target file(s)",
            source_files.len(),
            target_files.len()
        );

        let source_types: HashSet<String> = source_files.iter().map(|p| file_type(p)).collect();
        log::debug!("Source types: {:?}", source_types);

        let target_jobs: Vec<PathBuf> = unique_paths(
            target_files
                .iter()
                .filter(|p| source_types.contains(&file_type(p))),
        );
        summary.targets_pruned = target_files
            .iter()
            .filter(|p| !source_types.contains(&file_type(p)))
            .count();
        log::debug!(
            "{} target(s) to hash, {} pruned by type",
            target_jobs.len(),
            summary.targets_pruned
        );

        let target_lookups = self.hash_phase(PHASE_HASH_TARGETS, &target_jobs, cache)?;
        let source_jobs = unique_paths(source_files.iter());
        let source_lookups = self.hash_phase(PHASE_HASH_SOURCES, &source_jobs, cache)?;

        let mut digests: HashMap<PathBuf, Digest> = HashMap::new();
        let mut target_digests: HashSet<Digest> = HashSet::with_capacity(target_lookups.len());
        for (path, lookup) in target_lookups {
            summary.record(&lookup);
            let digest = lookup.into_digest();
            target_digests.insert(digest.clone());
            digests.insert(path, digest);
        }
        summary.targets_hashed = target_jobs.len();

        let mut sources_in_order = Vec::with_capacity(source_lookups.len());
        for (path, lookup) in source_lookups {
            summary.record(&lookup);
            let digest = lookup.into_digest();
            digests.insert(path.clone(), digest.clone());
            sources_in_order.push((path, digest));
        }
        summary.unique_sources = sources_in_order.len();

        let (found, missing) = self.classify(sources_in_order, &target_digests)?;

        summary.bytes_hashed = self.hasher.bytes_hashed() - bytes_before;
        summary.duration = start_time.elapsed();
        log::info!(
            "{} found, {} missing ({} hashed, {} cache hit(s)) in {:.2?}",
            found.len(),
            missing.len(),
            summary.bytes_hashed_display(),
            summary.cache_hits,
            summary.duration
        );

        Ok(MatchResult {
            found,
            missing,
            digests,
            summary,
        })
    }

    fn expand(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>, FinderError> {
        let files = expand_paths_with_shutdown(
            paths,
            &self.config.walker_config,
            self.config.shutdown_flag.as_ref(),
        )?;
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        Ok(files)
    }

    /// Obtain a digest for every job, preserving job order.
    fn hash_phase(
        &self,
        phase: &str,
        jobs: &[PathBuf],
        cache: &HashCache,
    ) -> Result<Vec<(PathBuf, CacheLookup)>, FinderError> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(phase, jobs.len());
        }
        log::debug!("{}: {} file(s)", phase, jobs.len());

        let done = AtomicUsize::new(0);
        let hash_one = |path: &PathBuf| -> Result<(PathBuf, CacheLookup), HashError> {
            if self.config.is_shutdown_requested() {
                return Err(HashError::Interrupted);
            }
            let lookup = cache.get_or_compute(path, &self.hasher)?;
            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_progress(current, path.to_string_lossy().as_ref());
            }
            Ok((path.clone(), lookup))
        };

        let results = if self.config.io_threads <= 1 || jobs.len() <= 1 {
            jobs.iter().map(&hash_one).collect::<Result<Vec<_>, _>>()
        } else {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.io_threads)
                .build()
            {
                Ok(pool) => pool.install(|| {
                    jobs.par_iter()
                        .map(&hash_one)
                        .collect::<Result<Vec<_>, _>>()
                }),
                Err(e) => {
                    log::warn!("Failed to create hashing thread pool, hashing sequentially: {}", e);
                    jobs.iter().map(&hash_one).collect::<Result<Vec<_>, _>>()
                }
            }
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(phase);
        }

        results.map_err(FinderError::from)
    }

    /// Split sources by digest membership in the target set.
    fn classify(
        &self,
        sources: Vec<(PathBuf, Digest)>,
        target_digests: &HashSet<Digest>,
    ) -> Result<(Vec<PathBuf>, Vec<PathBuf>), FinderError> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_COMPARE, sources.len());
        }

        let mut found = Vec::new();
        let mut missing = Vec::new();
        for (idx, (path, digest)) in sources.into_iter().enumerate() {
            if self.config.is_shutdown_requested() {
                return Err(FinderError::Interrupted);
            }
            if let Some(ref callback) = self.config.progress_callback {
                callback.on_progress(idx + 1, path.to_string_lossy().as_ref());
            }
            if target_digests.contains(&digest) {
                log::trace!("Found: {}", path.display());
                found.push(path);
            } else {
                log::trace!("Missing: {}", path.display());
                missing.push(path);
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_COMPARE);
        }
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        Ok((found, missing))
    }
}

/// First occurrence of each path, in order.
fn unique_paths<'a>(paths: impl Iterator<Item = &'a PathBuf>) -> Vec<PathBuf> {
    let mut seen: HashSet<&'a PathBuf> = HashSet::new();
    paths
        .filter(|p| seen.insert(*p))
        .cloned()
        .collect()
}
