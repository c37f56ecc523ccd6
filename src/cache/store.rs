//! JSON-backed hash cache.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::scanner::{Digest, HashError, Hasher};

/// File name used when no cache path is configured.
pub const DEFAULT_CACHE_FILE: &str = "hashes.json";

/// Errors raised while reading or writing the cache file.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// The cache file exists but does not hold a JSON object of strings.
    #[error("Malformed hash cache {path}: {reason}")]
    Malformed {
        /// Cache file path
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// The cache file could not be read or written.
    #[error("Hash cache I/O error for {path}: {source}")]
    Io {
        /// Cache file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// How the cache behaves for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Caching not requested: start empty, always write at the end.
    Disabled,
    /// Caching requested but no file yet: start empty, write at the end.
    EnabledFresh,
    /// Caching requested and the file was loaded: never rewritten.
    EnabledExisting,
}

impl CacheMode {
    /// Whether [`HashCache::save`] writes the file in this mode.
    #[must_use]
    pub fn writes_on_save(self) -> bool {
        !matches!(self, Self::EnabledExisting)
    }
}

/// Outcome of a cache-aware digest lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Digest came from the loaded cache.
    Hit(Digest),
    /// Digest was computed from the file contents.
    Computed(Digest),
}

impl CacheLookup {
    /// Whether the digest came from the cache.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// The digest regardless of origin.
    #[must_use]
    pub fn into_digest(self) -> Digest {
        match self {
            Self::Hit(d) | Self::Computed(d) => d,
        }
    }
}

/// Persistent path → digest cache.
///
/// Lookups never modify the cache; everything computed during a run is
/// handed to [`HashCache::save`] once at the end.
#[derive(Debug, Clone)]
pub struct HashCache {
    path: PathBuf,
    mode: CacheMode,
    entries: HashMap<PathBuf, Digest>,
}

impl HashCache {
    /// Load the cache for this run.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Malformed`] when an existing file cannot be
    /// parsed and [`CacheError::Io`] when it cannot be read.
    pub fn load(path: &Path, enabled: bool) -> CacheResult<Self> {
        if !enabled {
            log::debug!("Hash cache disabled; {} will be rewritten", path.display());
            return Ok(Self::empty(path, CacheMode::Disabled));
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No hash cache at {}, starting fresh", path.display());
                return Ok(Self::empty(path, CacheMode::EnabledFresh));
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(CacheError::Malformed {
                    path: path.to_path_buf(),
                    reason: "file is not valid UTF-8".to_string(),
                });
            }
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let raw: HashMap<String, String> =
            serde_json::from_str(&content).map_err(|e| CacheError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let entries: HashMap<PathBuf, Digest> = raw
            .into_iter()
            .map(|(p, d)| (PathBuf::from(p), Digest::from_hex(d)))
            .collect();

        log::info!(
            "Loaded {} cached hash(es) from {}",
            entries.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            mode: CacheMode::EnabledExisting,
            entries,
        })
    }

    fn empty(path: &Path, mode: CacheMode) -> Self {
        Self {
            path: path.to_path_buf(),
            mode,
            entries: HashMap::new(),
        }
    }

    /// Mode chosen at load time.
    #[must_use]
    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Location of the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of loaded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached digest for a path, if any.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&Digest> {
        self.entries.get(path)
    }

    /// Return the cached digest, or hash the file when there is none.
    ///
    /// # Errors
    ///
    /// Propagates [`HashError`] from the hasher on a cache miss.
    pub fn get_or_compute(&self, path: &Path, hasher: &Hasher) -> Result<CacheLookup, HashError> {
        match self.get(path) {
            Some(digest) => Ok(CacheLookup::Hit(digest.clone())),
            None => hasher.hash_file(path).map(CacheLookup::Computed),
        }
    }

    /// Loaded entries overlaid with this run's digests. This run wins.
    #[must_use]
    pub fn merged(&self, computed: &HashMap<PathBuf, Digest>) -> BTreeMap<String, Digest> {
        let mut merged = BTreeMap::new();
        for (path, digest) in self.entries.iter().chain(computed.iter()) {
            match path.to_str() {
                Some(key) => {
                    merged.insert(key.to_string(), digest.clone());
                }
                None => log::warn!(
                    "Not caching non UTF-8 path: {}",
                    path.to_string_lossy()
                ),
            }
        }
        merged
    }

    /// Persist this run's digests according to the cache mode.
    ///
    /// Returns `true` when the file was written. The write goes to a
    /// temporary file in the same directory which is then renamed over the
    /// cache path, so an interrupted run never leaves a truncated cache.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the file cannot be written.
    pub fn save(&self, computed: &HashMap<PathBuf, Digest>) -> CacheResult<bool> {
        if !self.mode.writes_on_save() {
            // TODO: rewrite here too once existing caches are allowed to grow
            log::debug!(
                "Hash cache {} already existed; leaving it untouched",
                self.path.display()
            );
            return Ok(false);
        }

        let merged = self.merged(computed);
        let json = serde_json::to_string(&merged).map_err(|e| CacheError::Io {
            path: self.path.clone(),
            source: std::io::Error::other(e),
        })?;

        self.write_atomic(json.as_bytes())
            .map_err(|source| CacheError::Io {
                path: self.path.clone(),
                source,
            })?;

        log::info!(
            "Saved {} hash(es) to {}",
            merged.len(),
            self.path.display()
        );
        Ok(true)
    }

    fn write_atomic(&self, bytes: &[u8]) -> std::io::Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
