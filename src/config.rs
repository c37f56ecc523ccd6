//! Layered application configuration.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. TOML config file (`--config`, or the platform config dir's `fds/config.toml`)
//! 3. Environment variables prefixed with `FDS_` (e.g. `FDS_IO_THREADS=8`)
//! 4. CLI flags, applied with [`Config::merge_cli`]
//!
//! ```toml
//! cache_path = "/home/me/.fds-hashes.json"
//! staging_dir = "/mnt/usb/to-import"
//! io_threads = 8
//! progress_step = 25
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CACHE_FILE;
use crate::cli::Cli;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hash cache file.
    pub cache_path: PathBuf,
    /// Where `--copy` puts missing files. `None` means `~/Desktop/Missing Files`.
    pub staging_dir: Option<PathBuf>,
    /// Threads hashing files within a phase.
    pub io_threads: usize,
    /// Follow symbolic links to directories while expanding inputs.
    pub follow_symlinks: bool,
    /// Plain progress prints a line every this many files.
    pub progress_step: usize,
    /// Use plain text progress lines instead of bars.
    pub plain_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(DEFAULT_CACHE_FILE),
            staging_dir: None,
            io_threads: 4,
            follow_symlinks: false,
            progress_step: 10,
            plain_progress: false,
        }
    }
}

impl Config {
    /// Load from `path`, or the default config file when `None`.
    ///
    /// A missing file is fine. A file that fails to parse is reported and
    /// the remaining layers (defaults and environment) are used.
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => Self::load_from_path(&path),
            None => Self::figment(None).extract().unwrap_or_else(|e| {
                log::warn!("Invalid configuration, using defaults: {}", e);
                Self::default()
            }),
        }
    }

    /// Load from a specific TOML file layered over defaults and under `FDS_*`.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        match Self::figment(Some(path)).extract() {
            Ok(config) => {
                log::debug!("Configuration loaded (file: {})", path.display());
                config
            }
            Err(e) => {
                log::warn!(
                    "Failed to load config from {}, using defaults: {}",
                    path.display(),
                    e
                );
                Self::figment(None).extract().unwrap_or_default()
            }
        }
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("FDS_"))
    }

    /// Platform config file location, e.g. `~/.config/fds/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "fds").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply CLI flags on top of the loaded configuration.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(ref cache) = cli.cache {
            self.cache_path = cache.clone();
        }
        if let Some(ref dir) = cli.staging_dir {
            self.staging_dir = Some(dir.clone());
        }
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads;
        }
        if cli.follow_symlinks {
            self.follow_symlinks = true;
        }
        if cli.plain {
            self.plain_progress = true;
        }
    }
}
