//! Console output: timestamped progress lines, validation listings, and
//! the end-of-run summary block.

use crate::batch::{RunMode, RunSummary};
use chrono::Local;
use colored::Colorize;
use std::io::IsTerminal;

/// Timestamped console sink for progress lines.
pub struct Console {
    color: bool,
}

impl Console {
    pub fn new() -> Self {
        Self {
            color: should_use_color(),
        }
    }

    /// A console that never emits color codes.
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn line(&self, message: &str) {
        println!("{}", self.stamp(message));
    }

    pub fn warn(&self, message: &str) {
        let stamped = self.stamp(message);
        if self.color {
            println!("{}", stamped.yellow());
        } else {
            println!("{stamped}");
        }
    }

    pub fn error(&self, message: &str) {
        let stamped = self.stamp(message);
        if self.color {
            eprintln!("{}", stamped.red());
        } else {
            eprintln!("{stamped}");
        }
    }

    fn stamp(&self, message: &str) -> String {
        format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// Auto-detect whether color output is appropriate.
fn should_use_color() -> bool {
    // Honor NO_COLOR (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    std::io::stdout().is_terminal()
}

/// Itemize validation issues, capping the listing at `cap` entries with an
/// overflow count.
pub fn format_validation_issues(issues: &[String], cap: usize) -> String {
    let mut output = format!(
        "Pattern validation found {} issue{}:\n",
        issues.len(),
        if issues.len() == 1 { "" } else { "s" }
    );
    for issue in issues.iter().take(cap) {
        output.push_str(&format!("  - {issue}\n"));
    }
    if issues.len() > cap {
        output.push_str(&format!("  ... and {} more\n", issues.len() - cap));
    }
    output
}

/// End-of-run summary block.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    match summary.mode {
        RunMode::DryRun => {
            output.push_str("Dry Run Complete:\n");
            output.push_str(&format!(
                "  - Files processed: {}\n",
                summary.processed_files
            ));
            output.push_str(&format!(
                "  - Files that would be modified: {}\n",
                summary.modified_files
            ));
            output.push_str(&format!(
                "  - Total replacement nodes: {}\n",
                summary.total_replacements
            ));
        }
        RunMode::CopyToOutput | RunMode::InPlace => {
            output.push_str("Replacement Complete:\n");
            output.push_str(&format!(
                "  - Files processed: {}\n",
                summary.processed_files
            ));
            output.push_str(&format!("  - Files modified: {}\n", summary.modified_files));
            output.push_str(&format!(
                "  - Total replacement nodes: {}\n",
                summary.total_replacements
            ));
        }
    }

    if let Some(dir) = &summary.output_dir {
        output.push_str(&format!("  - Output folder: {}\n", dir.display()));
    }

    output
}
