use anyhow::Result;
use clap::{Parser, ValueEnum};
use img_caption::gateway::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use img_caption::prompt::install_interrupt_handler;
use img_caption::{run, FailurePolicy, GatewayConfig, Mode, RetryPolicy, RunConfig, RunOutcome};
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::{assess_directory, print_abort_summary, print_summary_report, DirectoryRisk};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "img-caption")]
#[command(
    version,
    about = "Caption or rename macOS screenshots with a local Ollama vision model",
    long_about = "Process images with an Ollama vision model to generate captions or rename files. \
                  Only files matching the macOS screenshot filename format \
                  (e.g. 'Screenshot 2025-11-16 at 18.23.47.png') are processed."
)]
struct Cli {
    /// Directory containing images (relative, absolute or ~/...)
    #[arg(value_name = "DIR", default_value = "images")]
    directory: PathBuf,

    /// 'caption' writes a .txt caption next to each image, 'name' renames the image
    #[arg(short, long, value_enum, default_value = "caption")]
    mode: ModeArg,

    /// Ollama server URL, e.g. http://192.168.1.100:11434
    #[arg(short = 'H', long = "host", visible_alias = "ollama-host", value_name = "URL")]
    host: Option<String>,

    /// Vision model to use
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// What to do when a file keeps failing: ask, or skip/abort without asking
    #[arg(long, value_enum, default_value = "prompt")]
    on_failure: OnFailureArg,

    /// Per-request transport timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    timeout: u64,

    /// Debug-level diagnostics, mirrored to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Caption,
    Name,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Caption => Mode::Caption,
            ModeArg::Name => Mode::Name,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OnFailureArg {
    Prompt,
    Skip,
    Abort,
}

impl From<OnFailureArg> for FailurePolicy {
    fn from(arg: OnFailureArg) -> Self {
        match arg {
            OnFailureArg::Prompt => FailurePolicy::Prompt,
            OnFailureArg::Skip => FailurePolicy::Skip,
            OnFailureArg::Abort => FailurePolicy::Abort,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::default()
        .with_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_stderr(cli.verbose);
    if let Err(e) = init_logging("img_caption", log_config) {
        eprintln!("⚠️  Diagnostic log unavailable: {:#}", e);
    }

    if let Err(e) = install_interrupt_handler() {
        warn!(error = %e, "Could not install Ctrl+C handler");
    }

    let mode = Mode::from(cli.mode);
    let endpoint = match &cli.host {
        Some(host) => {
            println!("Using Ollama host: {}", host);
            host.clone()
        }
        None => {
            println!("Using Ollama host: {} (default)", DEFAULT_ENDPOINT);
            DEFAULT_ENDPOINT.to_string()
        }
    };

    let directory = resolve_directory(&cli.directory);
    if !directory.is_dir() {
        eprintln!("Error: Directory '{}' does not exist.", directory.display());
        std::process::exit(1);
    }

    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|h| h.canonicalize().unwrap_or(h));
    let risk = assess_directory(&directory, home.as_deref());
    if risk.is_blocked() {
        eprintln!("{}", risk);
        std::process::exit(1);
    }
    if mode == Mode::Name && matches!(risk, DirectoryRisk::BusyUserFolder(_)) {
        eprintln!("{}", risk);
    }

    println!("Using model: {}", cli.model);

    let config = RunConfig {
        directory,
        mode,
        gateway: GatewayConfig {
            endpoint,
            model: cli.model,
            timeout: Duration::from_secs(cli.timeout),
        },
        retry: RetryPolicy::default(),
        on_failure: cli.on_failure.into(),
    };
    info!(
        directory = %config.directory.display(),
        %mode,
        endpoint = %config.gateway.endpoint,
        model = %config.gateway.model,
        on_failure = ?config.on_failure,
        "Starting run"
    );

    let summary = run(&config)?;

    match summary.outcome {
        RunOutcome::Aborted => {
            print_abort_summary(&summary.batch);
            info!(logged = summary.logged, "Run stopped by operator");
        }
        RunOutcome::Completed if summary.batch.total > 0 => {
            print_summary_report(&summary.batch, summary.duration, "Screenshot Caption");
        }
        RunOutcome::Completed => {}
    }

    Ok(())
}

/// Expands a leading `~` and makes the path absolute.
fn resolve_directory(path: &Path) -> PathBuf {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };

    expanded.canonicalize().unwrap_or_else(|_| {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    })
}
