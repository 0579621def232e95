//! Tab-separated manifest text format
//!
//! One line per entry: `path \t size \t checksum`, each line ending in `\n`.

use crate::types::{Manifest, ManifestEntry, MansyncError};
use std::fmt::Write as _;

const FIELD_SEPARATOR: char = '\t';
const FIELD_COUNT: usize = 3;

/// Parse manifest text into entries, preserving line order
///
/// Accepts `\n` or `\r\n` line endings and an optional trailing newline.
///
/// # Errors
/// * `MalformedManifestLine` for a wrong field count or a bad size
/// * `InvalidPath` for absolute or parent-traversing paths
pub fn parse_manifest(text: &str) -> Result<Manifest, MansyncError> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| parse_line(idx + 1, line))
        .collect()
}

fn parse_line(line_number: usize, line: &str) -> Result<ManifestEntry, MansyncError> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() != FIELD_COUNT {
        return Err(MansyncError::MalformedManifestLine {
            line: line_number,
            reason: format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        });
    }

    let size = fields[1]
        .parse::<u64>()
        .map_err(|e| MansyncError::MalformedManifestLine {
            line: line_number,
            reason: format!("invalid size '{}': {}", fields[1], e),
        })?;

    ManifestEntry::new(fields[0], size, fields[2])
}

/// Serialize entries to manifest text; checksums are written lowercase
pub fn serialize_manifest(manifest: &Manifest) -> String {
    let mut out = String::new();
    for entry in manifest {
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "{}{sep}{}{sep}{}",
            entry.path(),
            entry.size(),
            entry.checksum_key(),
            sep = FIELD_SEPARATOR
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, size: u64, checksum: &str) -> ManifestEntry {
        ManifestEntry::new(path, size, checksum).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let manifest = Manifest::from(vec![
            entry("z/last.txt", 3, "cc"),
            entry("a.txt", 0, "aa"),
            entry("dir/sub/b.bin", 123456789, "bb"),
        ]);

        let parsed = parse_manifest(&serialize_manifest(&manifest)).unwrap();
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn test_serialize_format() {
        let manifest = Manifest::from(vec![entry("a.txt", 10, "ABCDEF"), entry("b/c.txt", 2, "01")]);
        assert_eq!(
            serialize_manifest(&manifest),
            "a.txt\t10\tabcdef\nb/c.txt\t2\t01\n"
        );
    }

    #[test]
    fn test_parse_without_trailing_newline_and_crlf() {
        let parsed = parse_manifest("a.txt\t1\taa\r\nb.txt\t2\tbb").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get("b.txt").map(|e| e.size()), Some(2));
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(parse_manifest("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let err = parse_manifest("a.txt\t1\taa\nb.txt\t2\n").unwrap_err();
        assert!(matches!(
            err,
            MansyncError::MalformedManifestLine { line: 2, .. }
        ));

        let err = parse_manifest("a.txt\t1\taa\textra\n").unwrap_err();
        assert!(matches!(err, MansyncError::MalformedManifestLine { line: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_blank_line() {
        let err = parse_manifest("a.txt\t1\taa\n\nb.txt\t2\tbb\n").unwrap_err();
        assert!(matches!(err, MansyncError::MalformedManifestLine { line: 2, .. }));
    }

    #[test]
    fn test_parse_rejects_bad_size() {
        for text in ["a.txt\t-1\taa", "a.txt\tten\taa", "a.txt\t\taa"] {
            let err = parse_manifest(text).unwrap_err();
            assert!(matches!(err, MansyncError::MalformedManifestLine { .. }), "{text}");
        }
    }

    #[test]
    fn test_parse_rejects_unsafe_paths() {
        let err = parse_manifest("../etc/passwd\t1\taa\n").unwrap_err();
        assert!(matches!(err, MansyncError::InvalidPath { .. }));

        let err = parse_manifest("/etc/passwd\t1\taa\n").unwrap_err();
        assert!(matches!(err, MansyncError::InvalidPath { .. }));
    }

    #[test]
    fn test_parse_normalizes_backslashes() {
        let parsed = parse_manifest("dir\\file.txt\t5\tAA\n").unwrap();
        let entry = parsed.get("dir/file.txt").expect("normalized path");
        assert!(entry.checksum_matches("aa"));
    }
}
