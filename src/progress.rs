//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements [`ProgressCallback`]
//! to display progress for each phase of a matching run.
//!
//! # Plain Mode
//!
//! When plain mode is enabled, progress is reported as a single rewritten
//! text line per phase instead of an animated bar:
//!
//! ```text
//! Hashing target    40.0%        4/10 files
//! ```
//!
//! The line is refreshed every `step` items and once more on completion.

use std::io::Write;
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress callback for matching phases.
///
/// Implement this trait to receive progress updates during a run.
/// Reporting is purely observational and never affects control flow.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "Hashing target")
    /// * `total` - Total number of items to process
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// State of the phase currently being displayed.
struct ActivePhase {
    name: String,
    total: usize,
    bar: Option<ProgressBar>,
}

/// Progress reporter using indicatif, with a plain-text fallback.
pub struct Progress {
    active: Mutex<Option<ActivePhase>>,
    quiet: bool,
    plain: bool,
    step: usize,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use fds::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            active: Mutex::new(None),
            quiet,
            plain: false,
            step: 10,
        }
    }

    /// Create a reporter that prints plain text lines every `step` items.
    ///
    /// ```
    /// use fds::progress::{Progress, ProgressCallback};
    ///
    /// let progress = Progress::plain(false, 10);
    /// progress.on_phase_start("Comparing", 0);
    /// progress.on_phase_end("Comparing");
    /// ```
    #[must_use]
    pub fn plain(quiet: bool, step: usize) -> Self {
        Self {
            active: Mutex::new(None),
            quiet,
            plain: true,
            step: step.max(1),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{msg:<16} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let bar = if self.plain {
            None
        } else {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(Self::bar_style());
            pb.set_message(phase.to_string());
            Some(pb)
        };

        if let Ok(mut active) = self.active.lock() {
            *active = Some(ActivePhase {
                name: phase.to_string(),
                total,
                bar,
            });
        }
    }

    fn on_progress(&self, current: usize, _path: &str) {
        if self.quiet {
            return;
        }

        let Ok(active) = self.active.lock() else {
            return;
        };
        let Some(phase) = active.as_ref() else {
            return;
        };

        if let Some(ref pb) = phase.bar {
            pb.set_position(current as u64);
        } else if let Some(line) = plain_line(&phase.name, current, phase.total, self.step) {
            let mut err = std::io::stderr().lock();
            let _ = write!(err, "\r{line}");
            if current == phase.total {
                let _ = writeln!(err);
            }
            let _ = err.flush();
        }
    }

    fn on_phase_end(&self, _phase: &str) {
        if self.quiet {
            return;
        }

        if let Some(phase) = self.active.lock().ok().and_then(|mut a| a.take()) {
            if let Some(pb) = phase.bar {
                pb.finish();
            }
        }
    }
}

/// Render the plain progress line for `current`, or `None` between steps.
///
/// ```
/// use fds::progress::plain_line;
///
/// assert_eq!(
///     plain_line("Comparing", 5, 5, 10).unwrap(),
///     "Comparing         100.0%         5/5 files"
/// );
/// assert!(plain_line("Comparing", 3, 5, 10).is_none());
/// ```
#[must_use]
pub fn plain_line(phase: &str, current: usize, total: usize, step: usize) -> Option<String> {
    if total == 0 || (current % step.max(1) != 0 && current != total) {
        return None;
    }
    let percentage = format!("{}%", two_decimals(current as f64 / total as f64 * 100.0));
    Some(format!("{phase:<16}  {percentage:<6}  {current:>8}/{total} files"))
}

/// `value` rounded to two decimals, trailing zeros dropped but one kept
/// (`40.0`, `12.5`, `33.33`).
fn two_decimals(value: f64) -> String {
    let mut text = format!("{value:.2}");
    if text.ends_with('0') {
        text.pop();
    }
    text
}
