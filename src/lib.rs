//! fds - Find files by content across directory trees
//!
//! A cross-platform Rust CLI that tells which source files already exist,
//! byte for byte, somewhere under a set of target locations. Files are
//! compared by SHA-256 digest, and only targets sharing a source file's
//! type are hashed. Missing files can be copied to a staging folder.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod matching;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;
pub mod staging;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use crate::cache::HashCache;
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::ExitCode;
use crate::matching::{FinderConfig, FinderError, MatchFinder};
use crate::output::{JsonOutput, TextOutput};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::WalkerConfig;
use crate::staging::{default_staging_dir, StagingCopier};

/// Run one search with the parsed command line.
///
/// # Errors
///
/// Returns an error if an input cannot be read, the cache file is
/// malformed or cannot be written, or copying fails. An interrupted run
/// surfaces as [`matching::FinderError::Interrupted`] or
/// [`staging::StagingError::Interrupted`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let mut config = Config::load(cli.config.as_deref());
    config.merge_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    let shutdown = signal::install_handler()?;

    let progress: Arc<dyn ProgressCallback> = if config.plain_progress {
        Arc::new(Progress::plain(cli.quiet, config.progress_step))
    } else {
        Arc::new(Progress::new(cli.quiet))
    };

    let cache = HashCache::load(&config.cache_path, cli.memory)?;
    log::debug!(
        "Hash cache {} ({:?}, {} entries)",
        cache.path().display(),
        cache.mode(),
        cache.len()
    );

    let finder_config = FinderConfig::default()
        .with_io_threads(config.io_threads)
        .with_walker_config(WalkerConfig::new(config.follow_symlinks))
        .with_shutdown_flag(shutdown.get_flag())
        .with_progress_callback(Arc::clone(&progress));
    let finder = MatchFinder::new(finder_config);

    let result = finder.find_matches(&cli.sources, &cli.targets, &cache)?;

    // Nothing is persisted or printed once Ctrl+C was pressed.
    if shutdown.is_shutdown_requested() {
        return Err(FinderError::Interrupted.into());
    }

    if cache.save(&result.digests)? {
        log::info!("Hashes written to {}", cache.path().display());
    }

    let summary = &result.summary;
    log::info!(
        "{} of {} source files missing ({} targets hashed, {} pruned, {} read in {:.2?})",
        result.missing.len(),
        summary.source_files,
        summary.targets_hashed,
        summary.targets_pruned,
        summary.bytes_hashed_display(),
        summary.duration
    );

    if shutdown.is_shutdown_requested() {
        return Err(FinderError::Interrupted.into());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => TextOutput::new(&result, cli.verbose_found)
            .write_to(&mut out)
            .context("Failed to write listings")?,
        OutputFormat::Json => JsonOutput::new(&result)
            .write_to(&mut out)
            .context("Failed to write JSON output")?,
    }
    out.flush().context("Failed to flush output")?;
    drop(out);

    if cli.copy && !result.missing.is_empty() {
        let staging_dir = match config.staging_dir {
            Some(dir) => dir,
            None => default_staging_dir()?,
        };
        StagingCopier::new(staging_dir)
            .with_shutdown_flag(shutdown.get_flag())
            .with_progress_callback(progress)
            .copy_missing(&result.missing)?;
    }

    Ok(ExitCode::Success)
}
