//! SHA-256 file hasher with streaming support.
//!
//! # Overview
//! This module provides the [`Hasher`] struct for computing SHA-256 digests
//! of file contents. Files are read in [`CHUNK_SIZE`] pieces so memory use
//! stays flat regardless of file size.

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use super::HashError;

/// Read size used while streaming a file through the hash.
pub const CHUNK_SIZE: usize = 4096;

/// Lowercase hexadecimal content digest of a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Wrap an already computed hex digest (e.g. from the cache file).
    #[must_use]
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Hex representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Streaming content hasher.
///
/// The hasher itself holds no per-file state, so one instance can be shared
/// across rayon workers.
#[derive(Debug, Default)]
pub struct Hasher {
    shutdown_flag: Option<Arc<AtomicBool>>,
    bytes_hashed: AtomicU64,
    files_hashed: AtomicU64,
}

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shutdown flag checked between chunks.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Total bytes read by this hasher so far.
    #[must_use]
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes_hashed.load(Ordering::Relaxed)
    }

    /// Number of files fully hashed by this hasher so far.
    #[must_use]
    pub fn files_hashed(&self) -> u64 {
        self.files_hashed.load(Ordering::Relaxed)
    }

    /// Hash the full content of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails
    /// part way, or [`HashError::Interrupted`] if shutdown was requested.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fds::scanner::Hasher;
    /// use std::path::Path;
    ///
    /// let digest = Hasher::new().hash_file(Path::new("notes.txt")).unwrap();
    /// assert_eq!(digest.as_str().len(), 64);
    /// ```
    pub fn hash_file(&self, path: &Path) -> Result<Digest, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        let digest = self.hash_reader(file, path)?;
        self.files_hashed.fetch_add(1, Ordering::Relaxed);
        log::trace!("Hashed {}: {}", path.display(), digest);
        Ok(digest)
    }

    /// Hash any reader in [`CHUNK_SIZE`] pieces. `path` is used for errors.
    fn hash_reader<R: Read>(&self, mut reader: R, path: &Path) -> Result<Digest, HashError> {
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; CHUNK_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(HashError::Interrupted);
            }

            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path.to_path_buf(), e)),
            };

            hasher.update(&buffer[..read]);
            self.bytes_hashed.fetch_add(read as u64, Ordering::Relaxed);
        }

        Ok(Digest(format!("{:x}", hasher.finalize())))
    }
}
