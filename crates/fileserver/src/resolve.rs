//! Download path resolution.
//!
//! Stored paths and requested paths drift (bare filenames, mismatched
//! separators), so a requested path is resolved in stages: direct hit,
//! well-known category probe, then a recursive search of the whole root.

use std::path::{Path, PathBuf};

/// Category directories probed when a request carries a bare filename.
pub const KNOWN_CATEGORIES: &[&str] = &["audio", "model", "origin_audio", "temp", "default"];

/// Normalize a requested path: unify separators and drop empty, `.`,
/// and `..` components. The result can never climb above the root it is
/// later joined to.
pub fn normalize(raw: &str) -> String {
    raw.replace('\\', "/")
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve a requested path against the storage root.
///
/// Order:
/// 1. the normalized path joined to the root;
/// 2. bare filenames probed inside each [`KNOWN_CATEGORIES`] directory;
/// 3. a recursive depth-first search of the whole root for the exact
///    filename — first match wins. Known limitation: when two categories
///    hold same-named files the winner is directory-iteration order,
///    which is not deterministic across platforms.
pub fn resolve(root: &Path, raw: &str) -> Option<PathBuf> {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return None;
    }

    let direct = root.join(&normalized);
    if direct.is_file() {
        return Some(direct);
    }

    if !normalized.contains('/') {
        for category in KNOWN_CATEGORIES {
            let probe = root.join(category).join(&normalized);
            if probe.is_file() {
                return Some(probe);
            }
        }
    }

    let basename = normalized.rsplit('/').next()?;
    find_by_name(root, basename)
}

/// Depth-first search for a file with the exact name, first match wins.
fn find_by_name(dir: &Path, name: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Some(found) = find_by_name(&path, name) {
                return Some(found);
            }
        } else if entry.file_name().to_string_lossy() == name {
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("audio")).unwrap();
        std::fs::create_dir_all(dir.path().join("deep/nested")).unwrap();
        std::fs::write(dir.path().join("audio/ref.wav"), b"wav").unwrap();
        std::fs::write(dir.path().join("deep/nested/buried.mp4"), b"mp4").unwrap();
        dir
    }

    #[test]
    fn normalize_strips_traversal_segments() {
        assert_eq!(normalize("../../etc/passwd"), "etc/passwd");
        assert_eq!(normalize("a/../b"), "a/b");
        assert_eq!(normalize(r"model\face.mp4"), "model/face.mp4");
        assert_eq!(normalize("./audio/ref.wav"), "audio/ref.wav");
    }

    #[test]
    fn direct_path_resolves() {
        let dir = setup();
        let found = resolve(dir.path(), "audio/ref.wav").unwrap();
        assert_eq!(found, dir.path().join("audio/ref.wav"));
    }

    #[test]
    fn bare_filename_probes_known_categories() {
        let dir = setup();
        let found = resolve(dir.path(), "ref.wav").unwrap();
        assert_eq!(found, dir.path().join("audio/ref.wav"));
    }

    #[test]
    fn bare_filename_falls_back_to_recursive_search() {
        let dir = setup();
        let found = resolve(dir.path(), "buried.mp4").unwrap();
        assert_eq!(found, dir.path().join("deep/nested/buried.mp4"));
    }

    #[test]
    fn traversal_cannot_escape_the_root() {
        let dir = setup();
        // The stripped path no longer exists under the root.
        assert!(resolve(dir.path(), "../../audio/ref.wav")
            .map(|p| p.starts_with(dir.path()))
            .unwrap_or(true));
    }

    #[test]
    fn missing_file_is_none() {
        let dir = setup();
        assert!(resolve(dir.path(), "nope.bin").is_none());
        assert!(resolve(dir.path(), "").is_none());
    }
}
