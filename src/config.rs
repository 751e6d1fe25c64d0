//! Optional TOML configuration.
//!
//! A configuration file can add profiles (or replace a built-in one of the
//! same name) and set default run options. Nothing is read unless a path is
//! given explicitly, and nothing is ever written back.
//!
//! # Configuration File Format
//!
//! ```toml
//! [defaults]
//! profile = "Photos"
//! date_folders = true
//! prune_empty = false
//!
//! [[profiles]]
//! name = "Photos"
//!
//! [[profiles.categories]]
//! name = "Raw"
//! extensions = [".cr2", ".nef", ".arw"]
//!
//! [[profiles.categories]]
//! name = "Screenshots"
//! patterns = ["screenshot"]
//!
//! [[profiles.categories]]
//! name = "Pictures"
//! mime_types = ["image/"]
//! ```
//!
//! Categories are matched in the order they are listed. A profile that does
//! not list "Others" gets it appended.

use crate::organizer::OrganizeOptions;
use crate::profile::{DEFAULT_PROFILE, Profile, ProfileSet};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// A profile definition is unusable.
    #[error("Invalid profile '{profile}': {reason}")]
    InvalidProfile { profile: String, reason: String },
    #[error("IO error reading configuration: {0}")]
    IoError(#[from] std::io::Error),
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// Default values for command-line switches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_profile_name")]
    pub profile: String,
    #[serde(default)]
    pub date_folders: bool,
    #[serde(default)]
    pub prune_empty: bool,
}

fn default_profile_name() -> String {
    DEFAULT_PROFILE.to_string()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            profile: default_profile_name(),
            date_folders: false,
            prune_empty: false,
        }
    }
}

impl Config {
    /// Loads the file at `config_path`, or the built-in defaults when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the given file is missing, unreadable, not valid
    /// TOML, or defines an unusable profile.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        log::debug!("loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut profile_names = HashSet::new();

        for profile in &self.profiles {
            let invalid = |reason: String| ConfigError::InvalidProfile {
                profile: profile.name.clone(),
                reason,
            };

            if profile.name.trim().is_empty() {
                return Err(invalid("profile name is empty".to_string()));
            }
            if !profile_names.insert(profile.name.as_str()) {
                return Err(invalid("defined more than once".to_string()));
            }

            let mut seen = HashSet::new();
            for category in &profile.categories {
                validate_category_name(&category.name).map_err(invalid)?;
                if !seen.insert(category.name.as_str()) {
                    return Err(invalid(format!("duplicate category '{}'", category.name)));
                }
            }
        }

        Ok(())
    }

    /// Built-in profiles overlaid with the configured ones.
    pub fn profile_set(&self) -> ProfileSet {
        let mut set = ProfileSet::builtin();
        for profile in &self.profiles {
            set.insert(profile.clone());
        }
        set
    }

    /// Run options taken from `[defaults]`.
    pub fn options(&self) -> OrganizeOptions {
        OrganizeOptions {
            create_date_subfolders: self.defaults.date_folders,
            prune_empty_dirs: self.defaults.prune_empty,
            dry_run: false,
        }
    }
}

/// Category names become directory names directly under the target, so they
/// must be a single plain path component.
fn validate_category_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("category name is empty".to_string());
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(format!("category name '{}' is not a plain folder name", name));
    }
    Ok(())
}
