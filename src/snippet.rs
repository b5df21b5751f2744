//! Literal text extraction for a line span

use std::fs;
use std::path::Path;
use tracing::warn;

/// Return lines `start_line..=end_line` (1-indexed) of a file, terminators kept.
///
/// `None` when no end line is given or the file can't be read. The span is
/// clamped to the file, so a range running past EOF yields the lines that
/// exist (possibly an empty string).
pub fn extract(path: &Path, start_line: usize, end_line: Option<usize>) -> Option<String> {
    let end_line = end_line?;

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file for snippet");
            return None;
        }
    };

    Some(slice_lines(&content, start_line, end_line))
}

/// Inclusive, clamped line slice of already-loaded text
pub fn slice_lines(content: &str, start_line: usize, end_line: usize) -> String {
    let start_idx = start_line.max(1) - 1;
    content
        .split_inclusive('\n')
        .skip(start_idx)
        .take(end_line.saturating_sub(start_idx))
        .collect()
}
