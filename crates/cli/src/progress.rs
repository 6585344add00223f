//! Progress reporting and summary output for the CLI

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use kwgroup_core::{AnalysisSummary, GroupingStats};
use kwgroup_formats::ReadProgress;

/// Percentage bar driven by processor progress events
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(100)
        };
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░-");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(200));
        Self { bar }
    }

    /// Cheap to clone; clones drive the same bar
    pub fn handle(&self) -> ProgressBar {
        self.bar.clone()
    }

    pub fn update(bar: &ProgressBar, progress: u8, message: &str) {
        bar.set_position(u64::from(progress));
        bar.set_message(message.to_string());
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Complete!");
    }

    pub fn abandon(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }
}

/// Byte-based bar for loading an input file
pub fn read_bar(hidden: bool, label: &str) -> ProgressBar {
    let bar = if hidden {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░-");
    bar.set_style(style);
    bar.set_message(label.to_string());
    bar
}

pub fn update_read(bar: &ProgressBar, progress: &ReadProgress) {
    // Compressed input has no known size; track bytes read instead
    bar.set_length(progress.total_bytes.unwrap_or(progress.bytes_processed));
    bar.set_position(progress.bytes_processed);
    bar.set_message(format!("{} rows", format_with_commas(progress.rows)));
}

/// Format large numbers compactly
pub fn format_number(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Format number with thousand separators
pub fn format_with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Print a formatted summary report
pub fn print_summary_report(
    input: &Path,
    outputs: &[&Path],
    stats: &GroupingStats,
    summary: &AnalysisSummary,
) {
    println!("\n{}", "═".repeat(60));
    println!("Keyword Grouping Complete");
    println!("{}", "═".repeat(60));
    println!("Input:              {}", input.display());

    if outputs.is_empty() {
        println!("Output:             (none written)");
    }
    for output in outputs {
        println!("Output:             {}", output.display());
    }

    println!("Keywords:           {}", format_with_commas(stats.total_keywords));
    println!(
        "Groups:             {} ({} with variations)",
        format_with_commas(stats.total_groups),
        format_with_commas(stats.groups_with_variations)
    );
    println!(
        "Avg variations:     {:.1} per group ({:.1}% consolidated)",
        stats.average_variations_per_group,
        stats.consolidation_rate()
    );
    println!(
        "By type:            {} generic | {} our brand | {} competitor",
        format_number(summary.by_type.generic),
        format_number(summary.by_type.our_brand),
        format_number(summary.by_type.competitor_brand)
    );
    println!("Average score:      {:.1}/10", summary.average_score);
    println!("Processing time:    {:.2}s", summary.processing_time);

    println!("{}", "═".repeat(60));
}
