//! Copy missing files into a staging directory.
//!
//! Files keep their layout relative to the longest common path of the whole
//! batch, so copying `/a/x/1.jpg` and `/a/y/2.jpg` produces
//! `<staging>/x/1.jpg` and `<staging>/y/2.jpg`. A single file lands directly
//! in the staging root.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::progress::ProgressCallback;

/// Phase name reported to the progress callback.
pub const PHASE_COPY: &str = "Copying";

/// Errors raised while copying into the staging directory.
#[derive(thiserror::Error, Debug)]
pub enum StagingError {
    /// Neither `--staging-dir` nor a home directory is available.
    #[error("Cannot determine home directory for the staging folder")]
    NoHomeDir,

    /// Creating a directory or copying a file failed.
    #[error("Failed to copy {from} to {to}: {source}")]
    Io {
        /// Source file
        from: PathBuf,
        /// Destination path
        to: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Two missing files would be copied to the same destination.
    #[error("{first} and {second} would both be copied to {to}")]
    DestinationConflict {
        /// File that claimed the destination first
        first: PathBuf,
        /// File that would overwrite it
        second: PathBuf,
        /// Shared destination path
        to: PathBuf,
    },

    /// Copying stopped because shutdown was requested.
    #[error("Copy interrupted by user")]
    Interrupted,
}

/// `~/Desktop/Missing Files`.
///
/// # Errors
///
/// Returns [`StagingError::NoHomeDir`] when the home directory is unknown.
pub fn default_staging_dir() -> Result<PathBuf, StagingError> {
    let dirs = directories::UserDirs::new().ok_or(StagingError::NoHomeDir)?;
    Ok(dirs.home_dir().join("Desktop").join("Missing Files"))
}

/// Absolute form of `path` with `.` and `..` folded lexically.
///
/// # Errors
///
/// Returns an error if the current directory is needed and unavailable.
pub fn normalize_path(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Longest common leading path of all `files`, compared component-wise.
///
/// Returns `None` for an empty slice. For a single file the file itself is
/// the common path.
#[must_use]
pub fn common_path(files: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = files.split_first()?;
    let mut common: Vec<Component<'_>> = first.components().collect();

    for file in rest {
        let shared = common
            .iter()
            .zip(file.components())
            .take_while(|(a, b)| **a == *b)
            .count();
        common.truncate(shared);
    }

    Some(common.iter().collect())
}

/// Destination of `file` under `staging_dir` given the batch's common path.
#[must_use]
pub fn staged_path(file: &Path, common: &Path, staging_dir: &Path) -> PathBuf {
    let skip = common.components().count();
    let relative: PathBuf = file
        .components()
        .skip(skip)
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();

    if relative.as_os_str().is_empty() {
        match file.file_name() {
            Some(name) => staging_dir.join(name),
            None => staging_dir.to_path_buf(),
        }
    } else {
        staging_dir.join(relative)
    }
}

/// What a copy run produced.
#[derive(Debug, Clone, Default)]
pub struct CopyReport {
    /// Destination paths, in input order
    pub copied: Vec<PathBuf>,
    /// Total bytes copied
    pub bytes: u64,
}

/// Copies missing files into the staging directory.
pub struct StagingCopier {
    staging_dir: PathBuf,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl StagingCopier {
    /// Copier writing below `staging_dir`.
    #[must_use]
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag checked between files.
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

    /// Pair every file with its destination, rejecting shared destinations.
    fn plan(&self, files: &[PathBuf]) -> Result<Vec<(PathBuf, PathBuf)>, StagingError> {
        let normalized = files
            .iter()
            .map(|file| {
                normalize_path(file).map_err(|source| StagingError::Io {
                    from: file.clone(),
                    to: self.staging_dir.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let Some(common) = common_path(&normalized) else {
            return Ok(Vec::new());
        };

        let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::with_capacity(normalized.len());
        let mut plan = Vec::with_capacity(normalized.len());
        for file in &normalized {
            let dest = staged_path(file, &common, &self.staging_dir);
            if let Some(first) = claimed.insert(dest.clone(), file) {
                if first != file {
                    return Err(StagingError::DestinationConflict {
                        first: first.clone(),
                        second: file.clone(),
                        to: dest,
                    });
                }
                continue;
            }
            plan.push((file.clone(), dest));
        }
        Ok(plan)
    }

    /// Copy every file, creating intermediate directories as needed.
    ///
    /// Paths are made absolute before the common path is computed. Existing
    /// destination files are overwritten, but two files of the batch never
    /// share a destination: that is rejected before anything is copied. The
    /// first copy failure stops the batch; files already copied stay in place.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::DestinationConflict`] when two files map to one
    /// destination, [`StagingError::Io`] on the first failed directory
    /// creation or copy, and [`StagingError::Interrupted`] if shutdown was
    /// requested.
    pub fn copy_missing(&self, files: &[PathBuf]) -> Result<CopyReport, StagingError> {
        let mut report = CopyReport::default();
        let plan = self.plan(files)?;
        if plan.is_empty() {
            log::debug!("Nothing to copy");
            return Ok(report);
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_COPY, plan.len());
        }

        for (idx, (file, dest)) in plan.into_iter().enumerate() {
            if self
                .shutdown_flag
                .as_ref()
                .is_some_and(|f| f.load(Ordering::SeqCst))
            {
                return Err(StagingError::Interrupted);
            }

            let io_err = |source| StagingError::Io {
                from: file.clone(),
                to: dest.clone(),
                source,
            };

            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
            let bytes = fs::copy(&file, &dest).map_err(io_err)?;
            log::debug!("Copied {} -> {}", file.display(), dest.display());

            report.bytes += bytes;
            report.copied.push(dest);

            if let Some(ref callback) = self.progress_callback {
                callback.on_progress(idx + 1, file.to_string_lossy().as_ref());
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_COPY);
        }

        log::info!(
            "Copied {} file(s) ({}) to {}",
            report.copied.len(),
            bytesize::ByteSize::b(report.bytes),
            self.staging_dir.display()
        );
        Ok(report)
    }
}
