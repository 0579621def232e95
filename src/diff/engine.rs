//! Manifest comparison
//!
//! Each new entry is classified against a working set of old entries, and
//! each old entry can satisfy at most one new entry:
//!
//! 1. **Exact**: same path, size and checksum → `Unchanged`
//! 2. **Checksum**: same content at a different path → `Moved`. The first
//!    match in old-manifest order is the move source. An old entry already
//!    sitting at the destination path is consumed as `displaced`. If any
//!    checksum match sits at the new path, this tier is skipped.
//! 3. **Path**: same path, different content → `Changed`
//! 4. Otherwise → `Added`
//!
//! Old entries left over afterwards are `Removed`. Copies are not detected.

use super::index::OldEntryIndex;
use crate::types::{Manifest, ManifestDiff, ManifestEntry};

/// Compare `new_manifest` against `old_manifest`
///
/// Records for new entries come first, in new-manifest order, followed by
/// `Removed` records in old-manifest order. An empty old manifest makes
/// every entry `Added`.
///
/// # Example
/// ```
/// use mansync::diff::diff_manifests;
/// use mansync::types::{Manifest, ManifestEntry, ManifestState};
///
/// let old = Manifest::from(vec![ManifestEntry::new("a.txt", 10, "h1")?]);
/// let new = Manifest::from(vec![ManifestEntry::new("b.txt", 10, "h1")?]);
///
/// let diffs = diff_manifests(&new, &old);
/// assert_eq!(diffs.len(), 1);
/// assert_eq!(diffs[0].state, ManifestState::Moved);
/// # Ok::<(), mansync::types::MansyncError>(())
/// ```
pub fn diff_manifests(new_manifest: &Manifest, old_manifest: &Manifest) -> Vec<ManifestDiff> {
    let mut index = OldEntryIndex::new(old_manifest.entries());
    let mut diffs = Vec::with_capacity(new_manifest.len());

    for current in new_manifest {
        let diff = classify(&mut index, current);
        tracing::trace!(path = diff.path(), state = %diff.state, "classified");
        diffs.push(diff);
    }

    diffs.extend(index.into_remaining().map(ManifestDiff::removed));
    diffs
}

fn classify(index: &mut OldEntryIndex<'_>, current: &ManifestEntry) -> ManifestDiff {
    if let Some(id) = index.find_exact(current) {
        return ManifestDiff::unchanged(index.take(id), current.clone());
    }

    // An empty checksum means "not hashed" and never identifies content.
    let key = current.checksum_key();
    if !key.is_empty() && !index.path_has_checksum(current.path(), &key) {
        if let Some(source) = index.first_by_checksum(&key) {
            let last = index.take(source);
            let displaced = index.first_by_path(current.path()).map(|id| index.take(id));
            return ManifestDiff::moved(last, current.clone(), displaced);
        }
    }

    if let Some(id) = index.first_by_path(current.path()) {
        return ManifestDiff::changed(index.take(id), current.clone());
    }

    ManifestDiff::added(current.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ManifestState;

    fn entry(path: &str, size: u64, checksum: &str) -> ManifestEntry {
        ManifestEntry::new(path, size, checksum).unwrap()
    }

    fn manifest(entries: &[(&str, u64, &str)]) -> Manifest {
        entries
            .iter()
            .map(|(path, size, checksum)| entry(path, *size, checksum))
            .collect()
    }

    fn states(diffs: &[ManifestDiff]) -> Vec<ManifestState> {
        diffs.iter().map(|d| d.state).collect()
    }

    #[test]
    fn test_empty_old_manifest_adds_everything() {
        let new = manifest(&[("a", 1, "h1"), ("b", 2, "h2")]);
        let diffs = diff_manifests(&new, &Manifest::new());

        assert_eq!(states(&diffs), vec![ManifestState::Added, ManifestState::Added]);
        assert!(diffs.iter().all(|d| d.last.is_none()));
    }

    #[test]
    fn test_empty_new_manifest_removes_everything() {
        let old = manifest(&[("a", 1, "h1"), ("b", 2, "h2")]);
        let diffs = diff_manifests(&Manifest::new(), &old);

        assert_eq!(
            states(&diffs),
            vec![ManifestState::Removed, ManifestState::Removed]
        );
    }

    #[test]
    fn test_unchanged_ignores_checksum_case() {
        let new = manifest(&[("a", 1, "ABC")]);
        let old = manifest(&[("a", 1, "abc")]);

        let diffs = diff_manifests(&new, &old);
        assert_eq!(states(&diffs), vec![ManifestState::Unchanged]);
        assert_eq!(diffs[0].last, diffs[0].current);
    }

    #[test]
    fn test_move_detection() {
        let diffs = diff_manifests(&manifest(&[("b.txt", 10, "H1")]), &manifest(&[("a.txt", 10, "H1")]));

        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].state, ManifestState::Moved);
        assert_eq!(diffs[0].last.as_ref().unwrap().path(), "a.txt");
        assert_eq!(diffs[0].current.as_ref().unwrap().path(), "b.txt");
        assert!(diffs[0].displaced.is_none());
    }

    #[test]
    fn test_change_detection() {
        let diffs = diff_manifests(&manifest(&[("a.txt", 12, "H2")]), &manifest(&[("a.txt", 10, "H1")]));

        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].state, ManifestState::Changed);
        assert_eq!(diffs[0].path(), "a.txt");
    }

    #[test]
    fn test_move_onto_existing_path_consumes_displaced_entry() {
        // b.txt's old content is replaced by a.txt's content
        let old = manifest(&[("a.txt", 10, "H1"), ("b.txt", 5, "H2")]);
        let new = manifest(&[("b.txt", 10, "H1")]);

        let diffs = diff_manifests(&new, &old);

        assert_eq!(diffs.len(), 1, "displaced entry is not reported as removed");
        assert_eq!(diffs[0].state, ManifestState::Moved);
        assert_eq!(diffs[0].last.as_ref().unwrap().path(), "a.txt");
        assert_eq!(diffs[0].displaced.as_ref().unwrap().path(), "b.txt");
    }

    #[test]
    fn test_first_checksum_match_is_move_source() {
        let old = manifest(&[("one", 3, "dup"), ("two", 3, "dup")]);
        let new = manifest(&[("three", 3, "dup")]);

        let diffs = diff_manifests(&new, &old);

        assert_eq!(diffs[0].state, ManifestState::Moved);
        assert_eq!(diffs[0].last.as_ref().unwrap().path(), "one");
        assert_eq!(diffs[1].state, ManifestState::Removed);
        assert_eq!(diffs[1].path(), "two");
    }

    #[test]
    fn test_duplicate_content_keeps_path_pairing() {
        // Identical content at both paths: exact matches win, no spurious moves
        let old = manifest(&[("a", 3, "same"), ("b", 3, "same")]);
        let new = manifest(&[("b", 3, "same"), ("a", 3, "same")]);

        let diffs = diff_manifests(&new, &old);
        assert_eq!(
            states(&diffs),
            vec![ManifestState::Unchanged, ManifestState::Unchanged]
        );
    }

    #[test]
    fn test_checksum_match_at_same_path_falls_through_to_changed() {
        // Same path and checksum but different size: not a move
        let old = manifest(&[("x", 5, "h"), ("a", 4, "h")]);
        let new = manifest(&[("a", 9, "h")]);

        let diffs = diff_manifests(&new, &old);

        assert_eq!(diffs[0].state, ManifestState::Changed);
        assert_eq!(diffs[0].last.as_ref().unwrap().path(), "a");
        assert_eq!(diffs[1].state, ManifestState::Removed);
        assert_eq!(diffs[1].path(), "x");
    }

    #[test]
    fn test_copies_are_not_detected() {
        let old = manifest(&[("orig", 3, "h")]);
        let new = manifest(&[("copy1", 3, "h"), ("copy2", 3, "h")]);

        let diffs = diff_manifests(&new, &old);
        assert_eq!(states(&diffs), vec![ManifestState::Moved, ManifestState::Added]);
    }

    #[test]
    fn test_empty_checksums_never_match_by_content() {
        let old = manifest(&[("a", 3, "")]);
        let new = manifest(&[("b", 3, "")]);

        let diffs = diff_manifests(&new, &old);
        assert_eq!(states(&diffs), vec![ManifestState::Added, ManifestState::Removed]);
    }

    #[test]
    fn test_swap_resolves_as_move_and_add() {
        let old = manifest(&[("a", 1, "h1"), ("b", 2, "h2")]);
        let new = manifest(&[("a", 2, "h2"), ("b", 1, "h1")]);

        let diffs = diff_manifests(&new, &old);

        assert_eq!(states(&diffs), vec![ManifestState::Moved, ManifestState::Added]);
        assert_eq!(diffs[0].last.as_ref().unwrap().path(), "b");
        assert_eq!(diffs[0].displaced.as_ref().unwrap().path(), "a");
    }

    #[test]
    fn test_self_diff_is_all_unchanged() {
        let m = manifest(&[("a", 1, "h1"), ("d/b", 2, "h2"), ("d/e/c", 0, "h3")]);
        let diffs = diff_manifests(&m, &m);

        assert_eq!(diffs.len(), 3);
        assert!(diffs.iter().all(ManifestDiff::is_unchanged));
    }

    #[test]
    fn test_every_entry_accounted_for_once() {
        let old = manifest(&[
            ("keep", 1, "k"),
            ("move_me", 2, "m"),
            ("edit", 3, "e1"),
            ("gone", 4, "g"),
            ("target", 5, "t"),
            ("src", 6, "s"),
        ]);
        let new = manifest(&[
            ("keep", 1, "k"),
            ("moved", 2, "m"),
            ("edit", 30, "e2"),
            ("fresh", 7, "f"),
            ("target", 6, "s"),
        ]);

        let diffs = diff_manifests(&new, &old);

        for current in &new {
            let hits = diffs
                .iter()
                .filter(|d| d.current.as_ref() == Some(current))
                .count();
            assert_eq!(hits, 1, "{} should appear once as current", current.path());
        }

        for last in &old {
            let hits = diffs
                .iter()
                .filter(|d| d.last.as_ref() == Some(last) || d.displaced.as_ref() == Some(last))
                .count();
            assert_eq!(hits, 1, "{} should be consumed exactly once", last.path());
        }
    }
}
