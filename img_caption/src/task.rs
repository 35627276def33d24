use std::fmt;
use std::path::{Path, PathBuf};

/// What the batch produces for each image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Sidecar `.txt` caption next to the image.
    Caption,
    /// Rename the image to a descriptive name.
    Name,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Caption => "caption",
            Mode::Name => "name",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Mode::Caption => "captioning",
            Mode::Name => "renaming",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One eligible file in a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTask {
    pub path: PathBuf,
    /// 1-based position in the batch
    pub index: usize,
    pub mode: Mode,
}

impl ImageTask {
    pub fn new(path: impl Into<PathBuf>, index: usize, mode: Mode) -> Self {
        Self {
            path: path.into(),
            index,
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used in console output and error log entries.
    pub fn file_name(&self) -> String {
        shared_utils::common_utils::file_name_lossy(&self.path)
    }
}
