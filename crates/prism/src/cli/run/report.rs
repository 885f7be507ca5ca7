//! Progress display and the end-of-run summary table.

use indicatif::{ProgressBar, ProgressStyle};
use prism_core::BatchSummary;

/// Create a progress bar counting saved variants.
pub fn create_progress_bar(total: u64, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after the batch completes.
pub fn print_summary(summary: &BatchSummary, variants: usize) {
    let secs = summary.elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        summary.saved.len() as f64 / secs
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Inputs:       {:>8}", summary.inputs);
    eprintln!("    Variants:     {:>8}", variants);
    eprintln!("    Saved:        {:>8}", summary.saved.len());
    if !summary.load_failures.is_empty() {
        eprintln!("    Load failed:  {:>8}", summary.load_failures.len());
    }
    if !summary.transform_failures.is_empty() {
        eprintln!("    Transform failed: {:>4}", summary.transform_failures.len());
    }
    if !summary.save_failures.is_empty() {
        eprintln!("    Save failed:  {:>8}", summary.save_failures.len());
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Duration:     {:>7.1}s", secs);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");

    let failures = summary
        .load_failures
        .iter()
        .chain(&summary.transform_failures)
        .chain(&summary.save_failures);
    for failure in failures {
        eprintln!("    {failure}");
    }
}
