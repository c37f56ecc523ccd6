//! Path expansion using walkdir.
//!
//! # Overview
//!
//! This module turns the user's file and directory arguments into a flat,
//! ordered list of regular files. Directories are walked depth-first in
//! filesystem-native order; files whose names start with `.` are skipped.
//!
//! # Example
//!
//! ```no_run
//! use fds::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Pictures"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{ScanError, WalkerConfig};

/// Depth-first walker over a single input path.
#[derive(Debug)]
pub struct Walker {
    /// Input path (file or directory)
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
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

    /// Walk the input path, yielding regular file paths.
    ///
    /// A root that is a file is yielded as-is, hidden or not. A root that
    /// does not exist yields a single [`ScanError::NotFound`].
    pub fn walk(&self) -> Box<dyn Iterator<Item = Result<PathBuf, ScanError>> + '_> {
        let metadata = match std::fs::metadata(&self.root) {
            Ok(m) => m,
            Err(e) => {
                log::debug!("Cannot stat input {}: {}", self.root.display(), e);
                return Box::new(std::iter::once(Err(ScanError::from_io(
                    self.root.clone(),
                    e,
                ))));
            }
        };

        if !metadata.is_dir() {
            return Box::new(std::iter::once(Ok(self.root.clone())));
        }

        let walk_dir = WalkDir::new(&self.root).follow_links(self.config.follow_symlinks);

        Box::new(walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }

            match entry_result {
                Ok(entry) => self.process_entry(entry),
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                    Some(Err(ScanError::from_io(path, source)))
                }
            }
        }))
    }

    /// Decide whether a walked entry is a file we keep.
    fn process_entry(&self, entry: DirEntry) -> Option<Result<PathBuf, ScanError>> {
        let file_type = entry.file_type();

        if file_type.is_dir() {
            return None;
        }

        if is_hidden(&entry) {
            log::trace!("Skipping hidden file: {}", entry.path().display());
            return None;
        }

        if file_type.is_symlink() {
            // Only reached when links are not followed.
            return match std::fs::metadata(entry.path()) {
                Ok(m) if m.is_file() => Some(Ok(entry.into_path())),
                Ok(_) => {
                    log::trace!("Skipping symlink: {}", entry.path().display());
                    None
                }
                Err(e) => {
                    log::debug!("Skipping dangling symlink {}: {}", entry.path().display(), e);
                    None
                }
            };
        }

        if !file_type.is_file() {
            log::trace!("Skipping special file: {}", entry.path().display());
            return None;
        }

        Some(Ok(entry.into_path()))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().as_encoded_bytes().starts_with(b".")
}

/// Expand a list of input paths into an ordered list of regular files.
///
/// Inputs are processed in order; the first error aborts the expansion.
///
/// # Errors
///
/// Returns [`ScanError::NotFound`] when an input does not exist, or another
/// [`ScanError`] when a directory cannot be read.
pub fn expand_paths(paths: &[PathBuf], config: &WalkerConfig) -> Result<Vec<PathBuf>, ScanError> {
    expand_paths_with_shutdown(paths, config, None)
}

pub(crate) fn expand_paths_with_shutdown(
    paths: &[PathBuf],
    config: &WalkerConfig,
    shutdown_flag: Option<&Arc<AtomicBool>>,
) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    for path in paths {
        let mut walker = Walker::new(path, config.clone());
        if let Some(flag) = shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }
        for entry in walker.walk() {
            files.push(entry?);
        }
    }
    log::debug!("Expanded {} input path(s) into {} file(s)", paths.len(), files.len());
    Ok(files)
}
