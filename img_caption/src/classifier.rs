//! Screenshot filename classifier.
//!
//! Only files named the way macOS names screenshots are touched:
//! `Screenshot YYYY-MM-DD at HH.MM.SS…` with an image extension.

use regex::Regex;
use shared_utils::IMAGE_EXTENSIONS;
use std::path::Path;
use std::sync::LazyLock;

static SCREENSHOT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:screenshot) [0-9]{4}-[0-9]{2}-[0-9]{2} at [0-9]{2}\.[0-9]{2}\.[0-9]{2}")
        .expect("screenshot pattern is a valid regex")
});

/// True if `stem` looks like a macOS screenshot name. Trailing content is allowed.
pub fn is_screenshot_name(stem: &str) -> bool {
    SCREENSHOT_PATTERN.is_match(stem)
}

/// True if `extension` (with or without the leading dot) is a supported image type.
pub fn is_image_extension(extension: &str) -> bool {
    let ext = extension.trim_start_matches('.').to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// Eligibility for processing, from a file stem and its extension.
pub fn is_eligible(stem: &str, extension: &str) -> bool {
    is_image_extension(extension) && is_screenshot_name(stem)
}

pub fn is_eligible_path(path: &Path) -> bool {
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => is_eligible(&stem.to_string_lossy(), &ext.to_string_lossy()),
        _ => false,
    }
}
