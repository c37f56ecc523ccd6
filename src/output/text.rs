//! Numbered text listings.
//!
//! ```text
//!
//! ✅ 2 files found:
//!
//! 0     /card/a.jpg
//! 1     /card/b.jpg
//!
//! ❌ 1 missing file:
//!
//! 0     /card/c.jpg
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use yansi::Paint;

use crate::matching::MatchResult;

/// Text renderer for a finished run.
pub struct TextOutput<'a> {
    result: &'a MatchResult,
    show_found: bool,
}

impl<'a> TextOutput<'a> {
    /// Render `result`; the found listing is only printed when `show_found`.
    #[must_use]
    pub fn new(result: &'a MatchResult, show_found: bool) -> Self {
        Self { result, show_found }
    }

    /// Write the listings. Empty listings print nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.show_found && !self.result.found.is_empty() {
            let n = self.result.found.len();
            let header = format!("✅ {} file{} found:", n, plural(n));
            writeln!(writer, "\n{}\n", header.green().bold())?;
            write_numbered(writer, &self.result.found)?;
        }

        if !self.result.missing.is_empty() {
            let n = self.result.missing.len();
            let header = format!("❌ {} missing file{}:", n, plural(n));
            writeln!(writer, "\n{}\n", header.red().bold())?;
            write_numbered(writer, &self.result.missing)?;
        }

        Ok(())
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn write_numbered<W: Write>(writer: &mut W, paths: &[PathBuf]) -> io::Result<()> {
    for (index, path) in paths.iter().enumerate() {
        writeln!(writer, "{:<5} {}", index, path.display())?;
    }
    Ok(())
}
