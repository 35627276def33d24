//! Safety Module
//!
//! Decides whether a target directory may be scanned for screenshots, and
//! whether renaming inside it deserves a warning first.

use std::fmt;
use std::path::Path;

const PROTECTED_DIRS: &[&str] = &[
    "/",
    "/System",
    "/usr",
    "/bin",
    "/sbin",
    "/etc",
    "/var",
    "/private",
    "/Library",
    "/Applications",
    "/Users",
    "/home",
    "/root",
    "/boot",
    "/dev",
    "/proc",
    "/sys",
    "/tmp",
    "/opt",
];

/// Folders under the home directory where screenshots land next to files
/// people care about.
const BUSY_USER_FOLDERS: &[&str] = &["Desktop", "Downloads"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryRisk {
    /// A system directory; never processed.
    Protected(&'static str),
    /// The home directory itself; never processed.
    HomeRoot,
    /// `~/Desktop`, `~/Downloads` or below; renames get a warning.
    BusyUserFolder(&'static str),
    Safe,
}

impl DirectoryRisk {
    pub fn is_blocked(self) -> bool {
        matches!(self, DirectoryRisk::Protected(_) | DirectoryRisk::HomeRoot)
    }
}

impl fmt::Display for DirectoryRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryRisk::Protected(dir) => write!(
                f,
                "🚨 Refusing to scan '{}': it is a protected system directory.\n\
                 💡 Point img-caption at the folder holding your screenshots instead.",
                dir
            ),
            DirectoryRisk::HomeRoot => write!(
                f,
                "🚨 Refusing to scan your home directory root.\n\
                 💡 Specify a subdirectory such as ~/Pictures/screenshots."
            ),
            DirectoryRisk::BusyUserFolder(folder) => write!(
                f,
                "⚠️  Screenshots in ~/{} will be renamed in place. \
                 Other files in that folder are left alone.",
                folder
            ),
            DirectoryRisk::Safe => Ok(()),
        }
    }
}

/// Classifies `path` (expected absolute). `home` is the user's home directory,
/// when known.
pub fn assess_directory(path: &Path, home: Option<&Path>) -> DirectoryRisk {
    if let Some(dir) = PROTECTED_DIRS.iter().find(|d| Path::new(d) == path) {
        return DirectoryRisk::Protected(*dir);
    }

    let Some(home) = home else {
        return DirectoryRisk::Safe;
    };
    if path == home {
        return DirectoryRisk::HomeRoot;
    }

    match path.strip_prefix(home) {
        Ok(rest) => rest
            .components()
            .next()
            .and_then(|first| {
                BUSY_USER_FOLDERS
                    .iter()
                    .find(|folder| first.as_os_str() == **folder)
            })
            .map_or(DirectoryRisk::Safe, |folder| DirectoryRisk::BusyUserFolder(*folder)),
        Err(_) => DirectoryRisk::Safe,
    }
}
