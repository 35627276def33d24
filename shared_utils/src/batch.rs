//! Batch Processing Module
//!
//! Directory listing and the per-run tally of what happened to each file.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "tif"];

/// Regular files directly inside `dir` whose extension is in `extensions`,
/// sorted by path. Subdirectories are not entered.
pub fn collect_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| crate::common_utils::has_extension(e.path(), extensions))
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}

/// Tally of one run over a fixed list of files.
///
/// Skipped, failed and aborted files each leave an error log entry, kept in
/// `errors` in the order they happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Files found at the start of the run
    pub total: usize,
    /// Caption written or file renamed
    pub succeeded: usize,
    /// Generated name matched the current one
    pub unchanged: usize,
    /// Operator (or policy) skipped the file after failed attempts
    pub skipped: usize,
    /// Caption or rename could not be applied
    pub failed: usize,
    /// File the run stopped on
    pub aborted: Option<PathBuf>,
    pub errors: Vec<(PathBuf, String)>,
}

impl BatchResult {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn succeed(&mut self) {
        self.succeeded += 1;
    }

    pub fn keep_unchanged(&mut self) {
        self.unchanged += 1;
    }

    pub fn skip(&mut self, path: PathBuf, reason: String) {
        self.skipped += 1;
        self.errors.push((path, reason));
    }

    pub fn fail(&mut self, path: PathBuf, error: String) {
        self.failed += 1;
        self.errors.push((path, error));
    }

    /// Stops the tally on `path`; files after it count as not attempted.
    pub fn abort(&mut self, path: PathBuf, reason: String) {
        self.errors.push((path.clone(), reason));
        self.aborted = Some(path);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded + self.unchanged + self.skipped + self.failed + usize::from(self.is_aborted())
    }

    pub fn not_attempted(&self) -> usize {
        self.total.saturating_sub(self.attempted())
    }

    /// Files that left an error log entry.
    pub fn logged(&self) -> usize {
        self.errors.len()
    }

    /// Share of attempted files that ended without an error log entry.
    pub fn success_rate(&self) -> f64 {
        let attempted = self.attempted();
        if attempted == 0 {
            100.0
        } else {
            ((self.succeeded + self.unchanged) as f64 / attempted as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_stays_in_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.PNG"), b"x").unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested.png")).unwrap();
        fs::write(dir.path().join("nested.png").join("c.png"), b"x").unwrap();

        let names: Vec<_> = collect_files(dir.path(), IMAGE_EXTENSIONS)
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG"]);
    }

    #[test]
    fn test_completed_run_counts_every_file() {
        let mut result = BatchResult::new(4);
        result.succeed();
        result.keep_unchanged();
        result.skip(PathBuf::from("a.png"), "Skipped by user after 3 failed attempts".to_string());
        result.fail(PathBuf::from("b.png"), "Generated filename is empty after sanitization".to_string());

        assert!(!result.is_aborted());
        assert_eq!(result.attempted(), 4);
        assert_eq!(result.not_attempted(), 0);
        assert_eq!(result.logged(), 2);
        assert!((result.success_rate() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_abort_leaves_rest_unattempted() {
        let mut result = BatchResult::new(5);
        result.succeed();
        result.abort(PathBuf::from("c.png"), "Inference service request failed".to_string());

        assert_eq!(result.aborted.as_deref(), Some(Path::new("c.png")));
        assert_eq!(result.attempted(), 2);
        assert_eq!(result.not_attempted(), 3);
        assert_eq!(result.logged(), 1);
        assert_eq!(result.skipped + result.failed, 0);
        assert!((result.success_rate() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_empty_run() {
        let result = BatchResult::new(0);
        assert_eq!(result.not_attempted(), 0);
        assert!((result.success_rate() - 100.0).abs() < 0.01);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn extension() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["png", "JPG", "jpeg", "webp", "txt", "pdf", "heic", ""])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn collected_files_are_sorted_images(
            files in prop::collection::btree_map("[a-z0-9]{1,8}", extension(), 0..16)
        ) {
            let dir = TempDir::new().unwrap();
            fs::create_dir(dir.path().join("sub_dir")).unwrap();
            fs::write(dir.path().join("sub_dir").join("inner.png"), b"x").unwrap();
            for (stem, ext) in &files {
                let name = if ext.is_empty() { stem.clone() } else { format!("{}.{}", stem, ext) };
                fs::write(dir.path().join(name), b"x").unwrap();
            }

            let collected = collect_files(dir.path(), IMAGE_EXTENSIONS);

            prop_assert!(collected.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(collected.iter().all(|p| p.parent() == Some(dir.path())));
            prop_assert!(collected
                .iter()
                .all(|p| crate::common_utils::has_extension(p, IMAGE_EXTENSIONS)));

            let expected = files
                .values()
                .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .count();
            prop_assert_eq!(collected.len(), expected);
        }
    }
}
