//! Source-to-mirror path mapping
//!
//! A watched file is mirrored under a directory named after a sanitized
//! encoding of its source directory. The encoding is a pure function of
//! the input, so change detection and copying always agree on where the
//! mirror lives.

use std::path::{Path, PathBuf};

/// Characters that are not allowed in file or directory names on at
/// least one supported filesystem. Separators are handled separately.
pub const DISALLOWED_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Maximum length of a sanitized segment, in characters.
///
/// Bounds the destination path length across filesystems.
const MAX_SEGMENT_LEN: usize = 200;

/// Sanitize a source directory path into a filesystem-safe segment.
///
/// Drive-letter separators (`:\`), backslashes and forward slashes
/// become `_`, as does every character in [`DISALLOWED_CHARS`]. Both
/// separator styles are replaced on every platform, so a mixed-style
/// Windows path never leaks a separator into the segment. The result is
/// lower-cased and truncated to 200 characters. Deterministic,
/// side-effect free, and idempotent on already-sanitized input.
pub fn sanitize_segment(path: &str) -> String {
    sanitize_segment_with(path, DISALLOWED_CHARS)
}

/// Like [`sanitize_segment`], with an explicit disallowed-character set.
///
/// The set is a parameter so the same logic stays portable across host
/// filesystems with different restrictions.
pub fn sanitize_segment_with(path: &str, disallowed: &[char]) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut sanitized = path.replace(":\\", "_").replace('\\', "_");
    sanitized = sanitized.replace('/', "_");

    for &ch in disallowed {
        sanitized = sanitized.replace(ch, "_");
    }

    sanitized = sanitized.to_lowercase();

    if sanitized.chars().count() > MAX_SEGMENT_LEN {
        sanitized = sanitized.chars().take(MAX_SEGMENT_LEN).collect();
    }

    sanitized
}

/// Compute the mirror directory for a watched file.
///
/// The source file's parent directory is sanitized into a segment under
/// `destination_root`. A segment that is empty or trivially short (two
/// characters or fewer, e.g. a bare drive letter) collapses to the root
/// itself. Change detection and the copy path both derive the
/// destination through here, so the mapping is identical in both places.
pub fn destination_dir(source_file: &Path, destination_root: &Path) -> PathBuf {
    let source_dir = source_file
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    let segment = sanitize_segment(&source_dir);
    if segment.chars().count() <= 2 {
        destination_root.to_path_buf()
    } else {
        destination_root.join(segment)
    }
}

/// Compute the full mirror path for a watched file.
///
/// The mirror keeps the source's base name inside [`destination_dir`].
pub fn destination_file(source_file: &Path, destination_root: &Path) -> PathBuf {
    let file_name = source_file.file_name().unwrap_or_default();
    destination_dir(source_file, destination_root).join(file_name)
}
