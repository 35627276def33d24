//! Report Module
//!
//! Summary reporting for batch operations.

use crate::batch::BatchResult;
use std::time::Duration;

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

pub fn print_summary_report(result: &BatchResult, duration: Duration, operation_name: &str) {
    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║  📊 {:<48} ║", format!("{} Summary Report", operation_name));
    println!("╠══════════════════════════════════════════════════════╣");
    println!("║  📁 Files Found:        {:>10}                   ║", result.total);
    println!("║  ✅ Succeeded:          {:>10}                   ║", result.succeeded);
    if result.unchanged > 0 {
        println!("║  ⊘  Unchanged:          {:>10}                   ║", result.unchanged);
    }
    println!("║  ⏭️  Skipped:            {:>10}                   ║", result.skipped);
    println!("║  ❌ Failed:             {:>10}                   ║", result.failed);
    if result.is_aborted() {
        println!("║  🛑 Not Attempted:      {:>10}                   ║", result.not_attempted());
    }
    println!("║  📈 Success Rate:       {:>9.1}%                   ║", result.success_rate());
    println!("║  ⏱️  Total Time:         {:>10}                   ║", format_duration(duration));
    println!("╚══════════════════════════════════════════════════════╝");

    if !result.errors.is_empty() {
        println!();
        println!("❌ Logged to the error log:");
        for (path, error) in &result.errors {
            println!("   {} → {}", path.display(), error);
        }
    }
}

/// One-line summary for a run the operator stopped.
pub fn print_abort_summary(result: &BatchResult) {
    let stopped_on = result
        .aborted
        .as_deref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!(
        "\n🛑 Stopped on {}: {} succeeded, {} skipped, {} failed, {} not attempted (of {})",
        stopped_on,
        result.succeeded + result.unchanged,
        result.skipped,
        result.failed,
        result.not_attempted(),
        result.total
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn test_print_completed_report_no_panic() {
        let mut result = BatchResult::new(3);
        result.succeed();
        result.keep_unchanged();
        result.fail(std::path::PathBuf::from("shot.png"), "Caption could not be written".to_string());

        print_summary_report(&result, Duration::from_secs(10), "Screenshot Caption");
    }

    #[test]
    fn test_print_abort_summary_no_panic() {
        let mut result = BatchResult::new(4);
        result.succeed();
        result.abort(std::path::PathBuf::from("/shots/b.png"), "Inference service request failed".to_string());

        print_abort_summary(&result);
        print_summary_report(&result, Duration::from_secs(1), "Screenshot Caption");
    }
}
