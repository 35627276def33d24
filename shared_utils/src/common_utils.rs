//! Common Utilities Module
//!
//! Small path helpers shared by the batch tools.

use std::path::Path;

// ═══════════════════════════════════════════════════════════════
// File name helpers
// ═══════════════════════════════════════════════════════════════

/// Lowercase extension without the dot, or an empty string.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use shared_utils::common_utils::get_extension_lowercase;
///
/// assert_eq!(get_extension_lowercase(Path::new("test.JPG")), "jpg");
/// assert_eq!(get_extension_lowercase(Path::new("noext")), "");
/// ```
pub fn get_extension_lowercase(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Case-insensitive extension check; `extensions` are given without dots.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use shared_utils::common_utils::has_extension;
///
/// let extensions = &["jpg", "png", "gif"];
/// assert!(has_extension(Path::new("photo.JPG"), extensions));
/// assert!(!has_extension(Path::new("video.mp4"), extensions));
/// ```
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let ext = get_extension_lowercase(path);
    extensions.contains(&ext.as_str())
}

/// File name as a displayable string (`""` when the path has none).
pub fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extension including its leading dot (`".png"`), preserving case; empty if none.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_extension_lowercase() {
        assert_eq!(get_extension_lowercase(Path::new("a/b/Shot.PNG")), "png");
        assert_eq!(get_extension_lowercase(Path::new(".hidden")), "");
    }

    #[test]
    fn test_file_name_helpers() {
        let path = Path::new("/tmp/Screenshot 2025-11-16 at 18.23.47.PNG");
        assert_eq!(file_name_lossy(path), "Screenshot 2025-11-16 at 18.23.47.PNG");
        assert_eq!(dotted_extension(path), ".PNG");
        assert_eq!(dotted_extension(Path::new("README")), "");
    }
}
