//! Batch Driver - runs every eligible screenshot in one directory through the
//! retry controller, then writes the caption or performs the rename.

use crate::classifier::is_eligible_path;
use crate::controller::{ControllerResult, DecisionProvider, RetryController, RetryPolicy};
use crate::error_log::ErrorLog;
use crate::errors::{CaptionError, Result as CaptionResult};
use crate::gateway::{GatewayConfig, InferenceGateway, OllamaGateway};
use crate::prompt::FailurePolicy;
use crate::rename::{resolve, Resolution, MAX_RENAME_PROBES};
use crate::sanitizer::sanitize;
use crate::task::{ImageTask, Mode};
use anyhow::{bail, Context, Result};
use shared_utils::common_utils::{dotted_extension, file_name_lossy};
use shared_utils::logging::log_operation_end;
use shared_utils::{collect_files, BatchResult, IMAGE_EXTENSIONS};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, info_span};

/// Everything one run needs, as resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub directory: PathBuf,
    pub mode: Mode,
    pub gateway: GatewayConfig,
    pub retry: RetryPolicy,
    pub on_failure: FailurePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every eligible file reached a result.
    Completed,
    /// The operator stopped the batch; later files were never attempted.
    Aborted,
}

#[derive(Debug)]
pub struct RunSummary {
    pub batch: BatchResult,
    pub outcome: RunOutcome,
    pub error_log: PathBuf,
    /// Error log entries written during this run
    pub logged: usize,
    pub duration: Duration,
}

/// What happened to a file whose inference call resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finalized {
    CaptionWritten(PathBuf),
    Renamed { to: PathBuf, conflict_resolved: bool },
    /// Generated name equals the current one.
    Unchanged,
}

/// Runs a batch against the Ollama service with the configured escalation policy.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let gateway = OllamaGateway::new(config.gateway.clone());
    let mut decisions = config.on_failure.decision_provider();
    run_batch(
        &config.directory,
        config.mode,
        &gateway,
        decisions.as_mut(),
        config.retry.clone(),
    )
}

/// Processes eligible files in `directory` in path order, one at a time.
///
/// Per-file failures are logged and counted; only a missing directory, an
/// unusable error log or an operator abort end the run early.
pub fn run_batch<G, D>(
    directory: &Path,
    mode: Mode,
    gateway: &G,
    decisions: &mut D,
    retry: RetryPolicy,
) -> Result<RunSummary>
where
    G: InferenceGateway + ?Sized,
    D: DecisionProvider + ?Sized,
{
    if !directory.is_dir() {
        bail!("Directory '{}' does not exist.", directory.display());
    }

    let start = Instant::now();
    let mut error_log = ErrorLog::create(directory)
        .with_context(|| format!("Cannot prepare error log in {}", directory.display()))?;

    let files: Vec<PathBuf> = collect_files(directory, IMAGE_EXTENSIONS)
        .into_iter()
        .filter(|p| is_eligible_path(p))
        .collect();

    let mut batch = BatchResult::new(files.len());
    let mut outcome = RunOutcome::Completed;

    if files.is_empty() {
        println!(
            "No image files matching macOS screenshot filename format found in '{}'.",
            directory.display()
        );
        return Ok(RunSummary {
            batch,
            outcome,
            error_log: error_log.path().to_path_buf(),
            logged: 0,
            duration: start.elapsed(),
        });
    }

    let total = files.len();
    println!("Found {} image(s) to process.", total);
    println!("Mode: {} ({})", mode, mode.description());
    info!(directory = %directory.display(), files = total, %mode, "Batch started");

    let mut controller = RetryController::new(gateway, decisions, retry);

    for (i, path) in files.into_iter().enumerate() {
        let task = ImageTask::new(path, i + 1, mode);
        let file_name = task.file_name();
        let span = info_span!("image", index = task.index, file = %file_name);
        let _enter = span.enter();

        println!("\n[{}/{}] Processing: {}", task.index, total, file_name);

        match controller.run(&task, &mut error_log) {
            ControllerResult::Resolved(text) => match finalize(&task, &text) {
                Ok(Finalized::Unchanged) => batch.keep_unchanged(),
                Ok(_) => batch.succeed(),
                Err(e) => {
                    let message = e.to_string();
                    println!("  ✗ {}", message);
                    error!(error = %message, "Finalizing failed");
                    error_log.record_or_warn(&file_name, &message);
                    batch.fail(task.path, message);
                }
            },
            ControllerResult::Skipped(message) => batch.skip(task.path, message),
            ControllerResult::Aborted(message) => {
                batch.abort(task.path, message);
                outcome = RunOutcome::Aborted;
                info!(not_attempted = batch.not_attempted(), "Batch aborted by operator");
                break;
            }
        }
    }

    println!("\nProcessing complete!");
    if !error_log.is_empty() {
        println!("Errors logged to: {}", error_log.path().display());
    }

    let duration = start.elapsed();
    log_operation_end("caption batch", duration, outcome == RunOutcome::Completed);

    Ok(RunSummary {
        batch,
        outcome,
        error_log: error_log.path().to_path_buf(),
        logged: error_log.entry_count(),
        duration,
    })
}

/// Applies a resolved inference result to the file system.
pub fn finalize(task: &ImageTask, text: &str) -> CaptionResult<Finalized> {
    match task.mode {
        Mode::Caption => write_caption(task.path(), text),
        Mode::Name => rename_image(task.path(), text),
    }
}

fn write_caption(image: &Path, caption: &str) -> CaptionResult<Finalized> {
    let path = image.with_extension("txt");
    fs::write(&path, caption).map_err(|source| CaptionError::CaptionWrite {
        path: path.clone(),
        source,
    })?;
    println!("  ✓ Caption saved to: {}", file_name_lossy(&path));
    Ok(Finalized::CaptionWritten(path))
}

fn rename_image(image: &Path, generated: &str) -> CaptionResult<Finalized> {
    let base_name = sanitize(generated);
    if base_name.is_empty() {
        return Err(CaptionError::SanitizationEmpty);
    }

    let directory = image
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let extension = dotted_extension(image);

    match resolve(directory, &base_name, &extension, image).map_err(CaptionError::RenameIo)? {
        Resolution::Unchanged => {
            println!("  ⊘ Filename unchanged, skipping: {}", file_name_lossy(image));
            Ok(Finalized::Unchanged)
        }
        Resolution::GiveUp => Err(CaptionError::RenameCollisionExhausted {
            attempts: MAX_RENAME_PROBES,
        }),
        Resolution::Target(target) => {
            fs::rename(image, &target).map_err(CaptionError::RenameIo)?;

            let new_name = file_name_lossy(&target);
            let conflict_resolved = new_name != format!("{}{}", base_name, extension);
            if conflict_resolved {
                println!("  ✓ Renamed to: {} (conflict resolved with counter)", new_name);
            } else {
                println!("  ✓ Renamed to: {}", new_name);
            }
            info!(from = %file_name_lossy(image), to = %new_name, conflict_resolved, "Image renamed");

            Ok(Finalized::Renamed {
                to: target,
                conflict_resolved,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn image(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"img").unwrap();
        path
    }

    #[test]
    fn test_caption_written_next_to_image() {
        let dir = TempDir::new().unwrap();
        let path = image(&dir, "Screenshot 2025-11-16 at 18.23.47.png");
        let task = ImageTask::new(&path, 1, Mode::Caption);

        let result = finalize(&task, "A settings page.").unwrap();

        let txt = dir.path().join("Screenshot 2025-11-16 at 18.23.47.txt");
        assert_eq!(result, Finalized::CaptionWritten(txt.clone()));
        assert_eq!(fs::read_to_string(txt).unwrap(), "A settings page.");
        assert!(path.exists());
    }

    #[test]
    fn test_rename_keeps_original_extension_case() {
        let dir = TempDir::new().unwrap();
        let path = image(&dir, "Screenshot 2025-11-16 at 18.23.47.PNG");
        let task = ImageTask::new(&path, 1, Mode::Name);

        let result = finalize(&task, "chrome-settings").unwrap();

        let target = dir.path().join("chrome-settings.PNG");
        assert_eq!(
            result,
            Finalized::Renamed {
                to: target.clone(),
                conflict_resolved: false
            }
        );
        assert!(target.exists());
        assert!(!path.exists());
    }

    #[test]
    fn test_rename_collision_is_flagged() {
        let dir = TempDir::new().unwrap();
        image(&dir, "photo.jpg");
        let path = image(&dir, "Screenshot 2025-11-16 at 18.23.47.jpg");
        let task = ImageTask::new(&path, 1, Mode::Name);

        let result = finalize(&task, "photo").unwrap();
        assert_eq!(
            result,
            Finalized::Renamed {
                to: dir.path().join("photo-1.jpg"),
                conflict_resolved: true
            }
        );
    }

    #[test]
    fn test_unsanitizable_name_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = image(&dir, "Screenshot 2025-11-16 at 18.23.47.png");
        let task = ImageTask::new(&path, 1, Mode::Name);

        let err = finalize(&task, "...").unwrap_err();
        assert!(matches!(err, CaptionError::SanitizationEmpty));
        assert!(path.exists());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        struct Unreachable;
        impl InferenceGateway for Unreachable {
            fn invoke(&self, _: &Path, _: Mode) -> std::result::Result<String, crate::errors::GatewayError> {
                panic!("no file should be attempted");
            }
        }

        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let mut decisions = crate::prompt::FixedPolicy::new(crate::controller::Decision::Skip);

        let err = run_batch(&missing, Mode::Caption, &Unreachable, &mut decisions, RetryPolicy::default())
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
