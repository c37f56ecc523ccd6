//! Type tokens derived from file extensions.
//!
//! A type token is only used to skip hashing targets that cannot possibly
//! match any source. It never decides a match on its own.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

/// Extension synonyms folded onto one canonical token.
const SYNONYMS: &[(&str, &str)] = &[
    ("jpeg", "jpg"),
    ("tiff", "tif"),
    ("html", "htm"),
    ("mpeg", "mpg"),
    ("eps", "ps"),
    ("yaml", "yml"),
    ("xhtml", "xht"),
    ("document", "doc"),
    ("presentation", "ppt"),
    ("spreadsheet", "xls"),
    ("gzip", "gz"),
    ("svgz", "svg"),
];

static SYNONYM_TABLE: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| SYNONYMS.iter().copied().collect());

/// Map a raw extension onto its canonical token.
///
/// Unknown tokens are returned unchanged. Matching is case-sensitive.
#[must_use]
pub fn normalize_type(token: &str) -> &str {
    SYNONYM_TABLE.get(token).copied().unwrap_or(token)
}

/// Compute the normalized type token of a path.
///
/// The token is whatever follows the last `.` of the final path segment.
/// A name without a dot is its own token.
///
/// # Example
///
/// ```
/// use fds::scanner::file_type;
/// use std::path::Path;
///
/// assert_eq!(file_type(Path::new("a/b/photo.jpeg")), "jpg");
/// assert_eq!(file_type(Path::new("Makefile")), "Makefile");
/// ```
#[must_use]
pub fn file_type(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy());

    let raw = match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => &name[..],
    };

    normalize_type(raw).to_string()
}
