//! Rename Resolver - collision-free destination for a renamed image.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Numbered variants (`base-1.ext` … `base-1000.ext`) tried before giving up.
pub const MAX_RENAME_PROBES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Desired name equals the current one (ignoring case); nothing to do.
    Unchanged,
    /// Free destination path.
    Target(PathBuf),
    /// Every probe collided.
    GiveUp,
}

/// One probe of the collision search: `base_name` plus an optional `-N` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RenameCandidate<'a> {
    base_name: &'a str,
    suffix_counter: usize,
}

impl RenameCandidate<'_> {
    fn file_name(&self, extension: &str) -> String {
        if self.suffix_counter == 0 {
            format!("{}{}", self.base_name, extension)
        } else {
            format!("{}-{}{}", self.base_name, self.suffix_counter, extension)
        }
    }
}

/// Finds where `original` should be renamed to so it is called `base_name` + `extension`
/// (extension includes its dot, e.g. `".png"`).
pub fn resolve(directory: &Path, base_name: &str, extension: &str, original: &Path) -> io::Result<Resolution> {
    let desired = format!("{}{}", base_name, extension);
    let original_name = original
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if desired.to_lowercase() == original_name {
        return Ok(Resolution::Unchanged);
    }

    for suffix_counter in 0..=MAX_RENAME_PROBES {
        let candidate = RenameCandidate {
            base_name,
            suffix_counter,
        };
        let file_name = candidate.file_name(extension);
        let path = directory.join(&file_name);

        if is_available(&path, &file_name, directory, original)? {
            debug!(target_name = %file_name, probes = suffix_counter + 1, "Rename target resolved");
            return Ok(Resolution::Target(path));
        }
    }

    Ok(Resolution::GiveUp)
}

fn is_available(path: &Path, file_name: &str, directory: &Path, original: &Path) -> io::Result<bool> {
    if path.exists() {
        return Ok(same_file(path, original));
    }
    // case-insensitive filesystems report a miss for a differently-cased twin
    let existing = lowercase_file_names(directory)?;
    Ok(!existing.contains(&file_name.to_lowercase()))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Fresh listing on every call; files can appear while a batch runs.
fn lowercase_file_names(directory: &Path) -> io::Result<HashSet<String>> {
    let mut names = HashSet::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.insert(entry.file_name().to_string_lossy().to_lowercase());
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, name.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_free_name_is_used_directly() {
        let dir = TempDir::new().unwrap();
        let original = touch(&dir, "Screenshot 2025-11-16 at 18.23.47.png");

        let resolution = resolve(dir.path(), "chrome-settings", ".png", &original).unwrap();
        assert_eq!(resolution, Resolution::Target(dir.path().join("chrome-settings.png")));
    }

    #[test]
    fn test_same_name_ignoring_case_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let original = touch(&dir, "Photo.PNG");

        assert_eq!(resolve(dir.path(), "photo", ".png", &original).unwrap(), Resolution::Unchanged);
        assert_eq!(resolve(dir.path(), "Photo", ".PNG", &original).unwrap(), Resolution::Unchanged);
    }

    #[test]
    fn test_numbered_suffix_skips_taken_names() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "photo.jpg");
        touch(&dir, "photo-1.jpg");
        let original = touch(&dir, "Screenshot 2025-11-16 at 18.23.47.jpg");

        let resolution = resolve(dir.path(), "photo", ".jpg", &original).unwrap();
        assert_eq!(resolution, Resolution::Target(dir.path().join("photo-2.jpg")));
    }

    #[test]
    fn test_case_insensitive_twin_counts_as_taken() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "PHOTO.jpg");
        let original = touch(&dir, "Screenshot 2025-11-16 at 18.23.47.jpg");

        let resolution = resolve(dir.path(), "photo", ".jpg", &original).unwrap();
        assert_eq!(resolution, Resolution::Target(dir.path().join("photo-1.jpg")));
    }

    #[test]
    fn test_gives_up_after_probe_limit() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "busy.png");
        for i in 1..=MAX_RENAME_PROBES {
            touch(&dir, &format!("busy-{}.png", i));
        }
        let original = touch(&dir, "Screenshot 2025-11-16 at 18.23.47.png");

        assert_eq!(resolve(dir.path(), "busy", ".png", &original).unwrap(), Resolution::GiveUp);
    }

    #[test]
    fn test_last_numbered_variant_is_still_probed() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "busy.png");
        for i in 1..MAX_RENAME_PROBES {
            touch(&dir, &format!("busy-{}.png", i));
        }
        let original = touch(&dir, "Screenshot 2025-11-16 at 18.23.47.png");

        assert_eq!(
            resolve(dir.path(), "busy", ".png", &original).unwrap(),
            Resolution::Target(dir.path().join(format!("busy-{}.png", MAX_RENAME_PROBES)))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_path_to_same_file_is_accepted() {
        let dir = TempDir::new().unwrap();
        let original = touch(&dir, "Screenshot 2025-11-16 at 18.23.47.png");
        std::os::unix::fs::symlink(&original, dir.path().join("alias.png")).unwrap();

        let resolution = resolve(dir.path(), "alias", ".png", &original).unwrap();
        assert_eq!(resolution, Resolution::Target(dir.path().join("alias.png")));
    }
}
