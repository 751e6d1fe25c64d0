//! sortdir - sort the files of a directory into category folders
//!
//! This library classifies files by MIME type, extension and filename
//! pattern under a named profile, moves them into per-category
//! subdirectories of the target, and reports what was moved and what was
//! skipped. It also provides read-only directory statistics and file
//! hashing.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod hash;
pub mod organizer;
pub mod output;
pub mod profile;
pub mod scanner;

pub use classifier::{Classification, classify};
pub use config::{Config, ConfigError};
pub use error::{Result, SortError};
pub use organizer::{OrganizeOptions, Organizer, RunResult, SkipKind, SkippedFile, organize};
pub use profile::{Category, Profile, ProfileSet, Rule};
pub use scanner::{DirectoryStats, scan};

pub use cli::{Cli, Command, run_cli};
