//! Command-line interface for sortdir.
//!
//! Parses commands with `clap`, merges them with the optional configuration
//! file, calls into the library and renders the results.

use crate::config::Config;
use crate::error::{Result, SortError};
use crate::hash::hash_file;
use crate::organizer::{FileEvent, OrganizeOptions, Organizer, RunResult};
use crate::output::OutputFormatter;
use crate::scanner::scan;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "sortdir")]
#[command(about = "Sort the files of a directory into category folders")]
#[command(version)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug). RUST_LOG also applies.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move files into category folders
    Organize(OrganizeArgs),
    /// Show file count, total size and extensions of a directory
    Stats {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List available profiles and their rules
    Profiles {
        /// TOML file with additional profiles
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Print SHA-256 digests of files
    Hash {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct OrganizeArgs {
    /// Directory to organize
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Profile to classify with (default: Standard or the config's default)
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Group files into YYYY-MM folders by modification time
    #[arg(long, overrides_with = "no_date_folders")]
    pub date_folders: bool,

    /// Put files directly in category folders, even if the config enables date folders
    #[arg(long, overrides_with = "date_folders")]
    pub no_date_folders: bool,

    /// Remove folders left empty after moving
    #[arg(long, overrides_with = "no_prune")]
    pub prune: bool,

    /// Keep empty folders, even if the config enables pruning
    #[arg(long, overrides_with = "prune")]
    pub no_prune: bool,

    /// Show what would happen without moving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run result as JSON
    #[arg(long)]
    pub json: bool,

    /// TOML file with additional profiles and defaults
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Runs a parsed command.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use sortdir::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["sortdir", "stats", "/tmp"]);
/// run_cli(cli.command)?;
/// # Ok::<(), sortdir::SortError>(())
/// ```
pub fn run_cli(command: Command) -> Result<()> {
    match command {
        Command::Organize(args) => organize_command(&args).map(|_| ()),
        Command::Stats { dir, json } => stats_command(&dir, json),
        Command::Profiles { config } => profiles_command(config.as_deref()),
        Command::Hash { files } => hash_command(&files),
    }
}

/// Organizes a directory as described by `args` and returns the run result.
pub fn organize_command(args: &OrganizeArgs) -> Result<RunResult> {
    let config = Config::load(args.config.as_deref())?;
    let profiles = config.profile_set();
    let profile_name = args
        .profile
        .clone()
        .unwrap_or_else(|| config.defaults.profile.clone());

    let defaults = config.options();
    let options = OrganizeOptions {
        create_date_subfolders: flag_or_default(
            args.date_folders,
            args.no_date_folders,
            defaults.create_date_subfolders,
        ),
        prune_empty_dirs: flag_or_default(args.prune, args.no_prune, defaults.prune_empty_dirs),
        dry_run: args.dry_run,
    };
    let organizer = Organizer::from_set(&profiles, &profile_name, options)?;

    if args.json {
        let result = organizer.run(&args.dir)?;
        print_json(&result.to_json());
        return Ok(result);
    }

    if !args.dir.is_dir() {
        return Err(SortError::NotADirectory(args.dir.clone()));
    }
    OutputFormatter::info(&format!(
        "Organizing {} with profile '{}'",
        args.dir.display(),
        profile_name
    ));
    if options.dry_run {
        OutputFormatter::dry_run_notice("No files will be moved.");
    }
    OutputFormatter::stats(&scan(&args.dir));

    let spinner = OutputFormatter::create_spinner();
    let result = organizer.run_with(&args.dir, &mut |event: FileEvent<'_>| {
        spinner.inc(1);
        match event {
            FileEvent::Moved { source, category, .. } => {
                let name = source.file_name().unwrap_or_default().to_string_lossy();
                spinner.set_message(format!("{} → {}/", name, category));
            }
            FileEvent::Skipped(skipped) => {
                spinner.set_message(format!("skipped {}", skipped.file_name));
            }
        }
    })?;
    spinner.finish_and_clear();

    OutputFormatter::run_summary(&result);
    if result.dry_run {
        OutputFormatter::dry_run_notice("Dry run complete. No files were modified.");
    } else if result.skipped.is_empty() {
        OutputFormatter::success("Organization complete!");
    } else {
        OutputFormatter::warning("Some files could not be organized; see the list above.");
    }
    if !result.dry_run {
        OutputFormatter::stats(&scan(&args.dir));
    }

    Ok(result)
}

/// An explicit `--x` or `--no-x` wins over the config's default.
fn flag_or_default(on: bool, off: bool, default: bool) -> bool {
    match (on, off) {
        (true, _) => true,
        (_, true) => false,
        _ => default,
    }
}

fn stats_command(dir: &Path, json: bool) -> Result<()> {
    if !dir.is_dir() {
        return Err(SortError::NotADirectory(dir.to_path_buf()));
    }
    let stats = scan(dir);
    if json {
        print_json(&stats.to_json());
    } else {
        OutputFormatter::plain(&format!("Statistics for {}", dir.display()));
        OutputFormatter::stats(&stats);
    }
    Ok(())
}

fn profiles_command(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    OutputFormatter::profiles(&config.profile_set(), &config.defaults.profile);
    Ok(())
}

/// Hashes every file, reporting failures as it goes; the first failure is
/// returned once all files have been tried.
fn hash_command(files: &[PathBuf]) -> Result<()> {
    let mut first_error = None;
    for path in files {
        match hash_file(path) {
            Ok(digest) => OutputFormatter::plain(&format!("{}  {}", digest, path.display())),
            Err(e) => {
                OutputFormatter::error(&format!("{}: {}", path.display(), e));
                first_error.get_or_insert(SortError::io(path, e));
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => OutputFormatter::plain(&text),
        Err(e) => OutputFormatter::error(&format!("JSON serialization failed: {}", e)),
    }
}
