//! Terminal output.
//!
//! Everything the binary prints goes through [`OutputFormatter`] so the
//! library itself stays silent.

use crate::organizer::RunResult;
use crate::profile::{FALLBACK_CATEGORY, ProfileSet};
use crate::scanner::DirectoryStats;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Status messages (success, error, warning, info)
/// - A spinner fed by the organizer's file events
/// - Directory statistics and run summaries
/// - The profile listing
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortdir::output::OutputFormatter;
    /// OutputFormatter::success("Organization complete!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// Goes to stderr.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortdir::output::OutputFormatter;
    /// OutputFormatter::error("Directory not found");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortdir::output::OutputFormatter;
    /// OutputFormatter::warning("Some files could not be organized");
    /// ```
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an informational message in cyan.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortdir::output::OutputFormatter;
    /// OutputFormatter::info("Organizing ~/Downloads with profile 'Standard'");
    /// ```
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a message without styling.
    ///
    /// Used for machine-readable output such as JSON and digests.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortdir::output::OutputFormatter;
    /// OutputFormatter::plain("Statistics for ~/Downloads");
    /// ```
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a bold section header preceded by a blank line.
    ///
    /// # Arguments
    ///
    /// * `header` - The header text
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortdir::output::OutputFormatter;
    /// OutputFormatter::header("SUMMARY");
    /// ```
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a yellow notice prefixed with `[DRY RUN]`.
    ///
    /// # Arguments
    ///
    /// * `message` - The notice to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortdir::output::OutputFormatter;
    /// OutputFormatter::dry_run_notice("No files will be moved.");
    /// ```
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a spinner counting processed files while a run is in progress.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sortdir::output::OutputFormatter;
    /// let spinner = OutputFormatter::create_spinner();
    /// spinner.inc(1);
    /// spinner.finish_and_clear();
    /// ```
    pub fn create_spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {pos} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb
    }

    /// Prints the directory overview shown before and after a run.
    pub fn stats(stats: &DirectoryStats) {
        Self::header("DIRECTORY OVERVIEW");
        println!("  Total files:       {}", stats.total_files.to_string().green());
        println!("  Total size:        {} bytes", stats.total_size);
        println!("  Unique extensions: {}", stats.extensions.len());
        if !stats.extensions.is_empty() {
            let list: Vec<&str> = stats.extensions.iter().map(String::as_str).collect();
            println!("  {}", list.join(" ").dimmed());
        }
    }

    /// Prints a summary table of a finished run, followed by any skipped files.
    ///
    /// Expected skips (permissions, vanished files, exhausted names) are
    /// shown in yellow, anything else in red.
    ///
    /// # Arguments
    ///
    /// * `result` - The result returned by the organizer
    pub fn run_summary(result: &RunResult) {
        Self::header(if result.dry_run {
            "SUMMARY (dry run)"
        } else {
            "SUMMARY"
        });

        let width = result
            .moved
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));
        for (category, count) in &result.moved {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                if *count == 1 { "file" } else { "files" },
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        let total = result.total_moved();
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            if total == 1 { "file" } else { "files" },
            width = width
        );

        println!("\n  Bytes moved: {}", result.total_bytes);
        println!("  Duration:    {:.2}s", result.elapsed.as_secs_f64());
        if result.pruned_dirs > 0 {
            println!("  Removed {} empty folder(s)", result.pruned_dirs);
        }

        if !result.skipped.is_empty() {
            Self::header(&format!("SKIPPED ({})", result.skipped.len()));
            for skipped in &result.skipped {
                let line = format!(
                    "  - {} [{}]: {}",
                    skipped.file_name,
                    skipped.kind.label(),
                    skipped.reason
                );
                if skipped.kind.is_expected() {
                    println!("{}", line.yellow());
                } else {
                    println!("{}", line.red());
                }
            }
        }
    }

    /// Lists every profile and its categories in match order.
    pub fn profiles(profiles: &ProfileSet, default: &str) {
        for profile in profiles.iter() {
            let marker = if profile.name == default { " (default)" } else { "" };
            Self::header(&format!("{}{}", profile.name, marker));
            for category in &profile.categories {
                let rule = &category.rule;
                if category.name == FALLBACK_CATEGORY && rule.is_empty() {
                    println!("  {:<12} {}", category.name, "everything else".dimmed());
                    continue;
                }
                println!("  {}", category.name.bold());
                if !rule.mime_types.is_empty() {
                    println!("      mime:       {}", rule.mime_types.join(", "));
                }
                if !rule.extensions.is_empty() {
                    println!("      extensions: {}", rule.extensions.join(", "));
                }
                if !rule.patterns.is_empty() {
                    println!("      patterns:   {}", rule.patterns.join(", "));
                }
            }
        }
    }
}
