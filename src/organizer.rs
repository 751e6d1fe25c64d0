//! The organize run: walk, classify, move, count.
//!
//! A run moves every file under the target directory into
//! `<Category>/[<YYYY-MM>/]<name>` directly below that directory. Files that
//! already sit inside a category folder are left alone, so running twice
//! does nothing the second time. A failure on one file is recorded in the
//! result and the run carries on with the next one; only setup failures
//! (unknown profile, bad target, category folders that cannot be created)
//! abort the run.

use crate::classifier::classify_detailed;
use crate::error::{Result, SortError};
use crate::profile::{Profile, ProfileSet};
use chrono::{DateTime, Local};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use walkdir::WalkDir;

/// Highest numeric suffix tried before a file is skipped.
pub const MAX_NAME_SUFFIX: u32 = 10_000;

/// Switches for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrganizeOptions {
    /// Nest files under `<Category>/<YYYY-MM>/` using their modification time.
    pub create_date_subfolders: bool,
    /// Remove directories left empty once files have been moved.
    pub prune_empty_dirs: bool,
    /// Plan and report without touching the filesystem.
    pub dry_run: bool,
}

/// Why a file was left where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipKind {
    PermissionDenied,
    /// The file disappeared between the walk and the move.
    Vanished,
    /// Every `name_N` candidate up to [`MAX_NAME_SUFFIX`] was taken.
    NameExhausted,
    Unexpected,
}

impl SkipKind {
    fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => SkipKind::Vanished,
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                SkipKind::PermissionDenied
            }
            _ => SkipKind::Unexpected,
        }
    }

    /// Skips that routinely happen on real directories, as opposed to ones
    /// worth a closer look.
    pub fn is_expected(&self) -> bool {
        !matches!(self, SkipKind::Unexpected)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkipKind::PermissionDenied => "permission denied",
            SkipKind::Vanished => "vanished",
            SkipKind::NameExhausted => "name exhausted",
            SkipKind::Unexpected => "unexpected",
        }
    }
}

/// A file the run could not move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub file_name: String,
    pub path: PathBuf,
    pub kind: SkipKind,
    pub reason: String,
}

/// Failure of a single file; never escapes a run.
#[derive(Error, Debug)]
enum FileError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("no free destination name after {0} attempts")]
    NameExhausted(u32),
}

impl FileError {
    fn kind(&self) -> SkipKind {
        match self {
            FileError::Io(e) => SkipKind::from_io(e),
            FileError::NameExhausted(_) => SkipKind::NameExhausted,
        }
    }
}

/// Outcome of one organize run.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    /// Files moved per category. Keys are `Category` or `Category/YYYY-MM`.
    pub moved: BTreeMap<String, usize>,
    pub skipped: Vec<SkippedFile>,
    pub total_bytes: u64,
    pub elapsed: Duration,
    /// Directories removed by the prune pass.
    pub pruned_dirs: usize,
    pub dry_run: bool,
}

impl RunResult {
    pub fn total_moved(&self) -> usize {
        self.moved.values().sum()
    }

    /// Moved count for a key; zero when nothing landed there.
    pub fn count(&self, category: &str) -> usize {
        self.moved.get(category).copied().unwrap_or(0)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "dry_run": self.dry_run,
            "moved": self.moved,
            "skipped": self.skipped.iter().map(|s| {
                json!({
                    "file_name": s.file_name,
                    "path": s.path.to_string_lossy().to_string(),
                    "kind": s.kind.label(),
                    "reason": s.reason,
                })
            }).collect::<Vec<_>>(),
            "total_bytes": self.total_bytes,
            "pruned_dirs": self.pruned_dirs,
            "elapsed_secs": self.elapsed.as_secs_f64(),
        })
    }
}

/// Per-file notifications emitted while a run is in progress.
#[derive(Debug, Clone, Copy)]
pub enum FileEvent<'a> {
    Moved {
        source: &'a Path,
        destination: &'a Path,
        category: &'a str,
    },
    Skipped(&'a SkippedFile),
}

/// Looks up `profile_name` and organizes `directory` with it.
///
/// # Examples
///
/// ```no_run
/// use sortdir::organizer::{organize, OrganizeOptions};
/// use sortdir::profile::ProfileSet;
/// use std::path::Path;
///
/// let result = organize(
///     Path::new("/home/me/Downloads"),
///     &ProfileSet::builtin(),
///     "Standard",
///     OrganizeOptions::default(),
/// )?;
/// println!("moved {} files", result.total_moved());
/// # Ok::<(), sortdir::SortError>(())
/// ```
pub fn organize(
    directory: &Path,
    profiles: &ProfileSet,
    profile_name: &str,
    options: OrganizeOptions,
) -> Result<RunResult> {
    Organizer::from_set(profiles, profile_name, options)?.run(directory)
}

/// Runs organize passes with one profile and one set of options.
#[derive(Debug, Clone, Copy)]
pub struct Organizer<'p> {
    profile: &'p Profile,
    options: OrganizeOptions,
}

impl<'p> Organizer<'p> {
    pub fn new(profile: &'p Profile, options: OrganizeOptions) -> Self {
        Self { profile, options }
    }

    /// Fails with [`SortError::UnknownProfile`] when the name is not in the set.
    pub fn from_set(
        profiles: &'p ProfileSet,
        profile_name: &str,
        options: OrganizeOptions,
    ) -> Result<Self> {
        let profile = profiles
            .get(profile_name)
            .ok_or_else(|| SortError::UnknownProfile {
                name: profile_name.to_string(),
                available: profiles.names().join(", "),
            })?;
        Ok(Self::new(profile, options))
    }

    pub fn profile(&self) -> &Profile {
        self.profile
    }

    pub fn run(&self, directory: &Path) -> Result<RunResult> {
        self.run_with(directory, &mut |_| {})
    }

    /// Organizes `directory`, reporting each moved or skipped file to `observer`.
    pub fn run_with(
        &self,
        directory: &Path,
        observer: &mut dyn FnMut(FileEvent<'_>),
    ) -> Result<RunResult> {
        let start = Instant::now();
        let dry_run = self.options.dry_run;

        match fs::metadata(directory) {
            Ok(meta) if meta.is_dir() => {}
            _ => return Err(SortError::NotADirectory(directory.to_path_buf())),
        }

        log::info!(
            "organizing {} with profile '{}'{}",
            directory.display(),
            self.profile.name,
            if dry_run { " (dry run)" } else { "" }
        );

        if !dry_run {
            for name in self.profile.category_names() {
                let path = directory.join(name);
                fs::create_dir_all(&path).map_err(|e| SortError::io(&path, e))?;
            }
        }

        let mut result = RunResult {
            dry_run,
            ..RunResult::default()
        };
        let candidates = self.collect_candidates(directory, &mut result, observer);
        let mut planned: HashSet<PathBuf> = HashSet::new();

        for path in candidates {
            match self.organize_file(directory, &path, &mut planned) {
                Ok(moved) => {
                    *result.moved.entry(moved.category.clone()).or_insert(0) += 1;
                    result.total_bytes += moved.size;
                    observer(FileEvent::Moved {
                        source: &path,
                        destination: &moved.destination,
                        category: &moved.category,
                    });
                }
                Err(e) => {
                    let skipped = skip_entry(&path, e.kind(), e.to_string());
                    observer(FileEvent::Skipped(&skipped));
                    result.skipped.push(skipped);
                }
            }
        }

        if self.options.prune_empty_dirs && !dry_run {
            result.pruned_dirs = prune_empty_dirs(directory);
        }

        result.elapsed = start.elapsed();
        log::info!(
            "moved {} file(s), skipped {}, in {:.2?}",
            result.total_moved(),
            result.skipped.len(),
            result.elapsed
        );
        Ok(result)
    }

    /// Lists the files to process, skipping everything inside a category
    /// folder of the current profile.
    fn collect_candidates(
        &self,
        root: &Path,
        result: &mut RunResult,
        observer: &mut dyn FnMut(FileEvent<'_>),
    ) -> Vec<PathBuf> {
        let categories: HashSet<&OsStr> = self.profile.category_names().map(OsStr::new).collect();
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !(e.depth() == 1 && categories.contains(e.file_name())));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let ft = entry.file_type();
                    if ft.is_file() {
                        files.push(entry.into_path());
                    } else if ft.is_symlink() {
                        // Links to files are moved; links to directories stay put.
                        // Broken links fall through and get skipped by organize_file.
                        match fs::metadata(entry.path()) {
                            Ok(target) if !target.is_file() => {
                                log::debug!("leaving link {} in place", entry.path().display());
                            }
                            _ => files.push(entry.into_path()),
                        }
                    }
                }
                Err(e) => {
                    let Some(path) = e.path().map(Path::to_path_buf) else {
                        log::warn!("walk error: {}", e);
                        continue;
                    };
                    let kind = e.io_error().map_or(SkipKind::Unexpected, SkipKind::from_io);
                    let skipped = skip_entry(&path, kind, e.to_string());
                    observer(FileEvent::Skipped(&skipped));
                    result.skipped.push(skipped);
                }
            }
        }

        files
    }

    fn organize_file(
        &self,
        root: &Path,
        path: &Path,
        planned: &mut HashSet<PathBuf>,
    ) -> std::result::Result<MovedFile, FileError> {
        // Size and mtime of the link target; the link itself is what moves.
        let metadata = fs::metadata(path)?;
        let classification = classify_detailed(path, self.profile);
        log::debug!(
            "{} -> {} (mime {}, ext '{}')",
            path.display(),
            classification.category,
            classification.mime,
            classification.extension
        );

        let mut category = classification.category;
        let mut dest_dir = root.join(&category);

        if self.options.create_date_subfolders {
            let modified: DateTime<Local> = metadata.modified()?.into();
            let month = modified.format("%Y-%m").to_string();
            dest_dir.push(&month);
            category = format!("{}/{}", category, month);
            if !self.options.dry_run {
                fs::create_dir_all(&dest_dir)?;
            }
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "file has no name"))?;

        let destination = unique_destination(&dest_dir, file_name, |candidate| {
            planned.contains(candidate) || fs::symlink_metadata(candidate).is_ok()
        })?;

        if self.options.dry_run {
            planned.insert(destination.clone());
        } else {
            move_file(path, &destination)?;
        }

        Ok(MovedFile {
            destination,
            category,
            size: metadata.len(),
        })
    }
}

struct MovedFile {
    destination: PathBuf,
    category: String,
    size: u64,
}

fn skip_entry(path: &Path, kind: SkipKind, reason: String) -> SkippedFile {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if kind.is_expected() {
        log::warn!("skipped {} ({}): {}", path.display(), kind.label(), reason);
    } else {
        log::error!("skipped {} ({}): {}", path.display(), kind.label(), reason);
    }

    SkippedFile {
        file_name,
        path: path.to_path_buf(),
        kind,
        reason,
    }
}

/// Builds `name_N.ext` for the `n`th collision.
fn suffixed_name(file_name: &OsStr, n: u32) -> OsString {
    let as_path = Path::new(file_name);
    let stem = as_path.file_stem().unwrap_or(file_name);

    let mut name = stem.to_os_string();
    name.push(format!("_{}", n));
    if let Some(ext) = as_path.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}

/// Finds a path in `dir` for `file_name` that `is_taken` rejects, trying
/// `name.ext`, then `name_1.ext`, `name_2.ext`, and so on.
fn unique_destination(
    dir: &Path,
    file_name: &OsStr,
    is_taken: impl Fn(&Path) -> bool,
) -> std::result::Result<PathBuf, FileError> {
    let first = dir.join(file_name);
    if !is_taken(&first) {
        return Ok(first);
    }

    for n in 1..=MAX_NAME_SUFFIX {
        let candidate = dir.join(suffixed_name(file_name, n));
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
    }

    Err(FileError::NameExhausted(MAX_NAME_SUFFIX))
}

/// Renames `source` to `destination`, copying across filesystems when a
/// plain rename is not possible.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => copy_then_remove(source, destination),
        Err(e) => Err(e),
    }
}

/// Copies `source` to `destination`, then deletes `source`. If either step
/// fails, whatever was written to `destination` is removed again so exactly
/// one copy remains.
fn copy_then_remove(source: &Path, destination: &Path) -> io::Result<()> {
    let outcome = fs::copy(source, destination).and_then(|_| fs::remove_file(source));
    if outcome.is_err() {
        let _ = fs::remove_file(destination);
    }
    outcome
}

/// Removes empty directories below `root`, deepest first. Returns how many
/// were removed. Failures are ignored.
pub fn prune_empty_dirs(root: &Path) -> usize {
    let mut removed = 0;

    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        match fs::remove_dir(entry.path()) {
            Ok(()) => {
                log::debug!("removed empty directory {}", entry.path().display());
                removed += 1;
            }
            Err(e) => log::trace!("kept {}: {}", entry.path().display(), e),
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Rule;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_suffixed_name() {
        assert_eq!(suffixed_name(OsStr::new("a.txt"), 1), OsString::from("a_1.txt"));
        assert_eq!(
            suffixed_name(OsStr::new("archive.tar.gz"), 3),
            OsString::from("archive.tar_3.gz")
        );
        assert_eq!(suffixed_name(OsStr::new("notes"), 2), OsString::from("notes_2"));
        assert_eq!(suffixed_name(OsStr::new(".bashrc"), 1), OsString::from(".bashrc_1"));
    }

    #[test]
    fn test_unique_destination_skips_taken_names() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let dir = temp.path();
        fs::write(dir.join("a.txt"), b"1").expect("write");
        fs::write(dir.join("a_1.txt"), b"2").expect("write");

        let dest = unique_destination(dir, OsStr::new("a.txt"), |p| p.exists())
            .expect("free name");
        assert_eq!(dest, dir.join("a_2.txt"));
    }

    #[test]
    fn test_unique_destination_gives_up_at_cap() {
        let result = unique_destination(Path::new("/x"), OsStr::new("a.txt"), |_| true);
        assert!(matches!(result, Err(FileError::NameExhausted(MAX_NAME_SUFFIX))));
    }

    #[test]
    fn test_skip_kind_from_io() {
        let vanished = io::Error::new(io::ErrorKind::NotFound, "gone");
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "no");
        let other = io::Error::other("boom");
        assert_eq!(SkipKind::from_io(&vanished), SkipKind::Vanished);
        assert_eq!(SkipKind::from_io(&denied), SkipKind::PermissionDenied);
        assert_eq!(SkipKind::from_io(&other), SkipKind::Unexpected);
        assert!(SkipKind::Vanished.is_expected());
        assert!(!SkipKind::Unexpected.is_expected());
    }

    #[test]
    fn test_vanished_file_is_skipped_not_fatal() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let profile = Profile::standard();
        let organizer = Organizer::new(&profile, OrganizeOptions::default());
        let mut planned = HashSet::new();

        let err = organizer
            .organize_file(temp.path(), &temp.path().join("ghost.txt"), &mut planned)
            .err()
            .expect("missing file must fail");
        assert_eq!(err.kind(), SkipKind::Vanished);
    }

    #[test]
    fn test_move_file_preserves_content() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let src = temp.path().join("src.bin");
        let dst = temp.path().join("dst.bin");
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        fs::write(&src, &data).expect("write");

        move_file(&src, &dst).expect("move");
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).expect("read"), data);
    }

    #[test]
    fn test_copy_then_remove_moves_content() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let src = temp.path().join("src.bin");
        let dst = temp.path().join("dst.bin");
        fs::write(&src, b"payload").expect("write");

        copy_then_remove(&src, &dst).expect("copy");
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).expect("read"), b"payload");
    }

    #[test]
    fn test_failed_copy_leaves_nothing_at_destination() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let src = temp.path().join("subdir");
        let dst = temp.path().join("dst.bin");
        fs::create_dir(&src).expect("mkdir");

        assert!(copy_then_remove(&src, &dst).is_err());
        assert!(fs::symlink_metadata(&dst).is_err());
        assert!(src.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_symlink_is_left_in_place() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let outside = TempDir::new().expect("Failed to create temp directory");
        fs::write(outside.path().join("inner.txt"), b"x").expect("write");
        let root = temp.path();
        std::os::unix::fs::symlink(outside.path(), root.join("shared")).expect("symlink");

        let profile = Profile::standard();
        let result = Organizer::new(&profile, OrganizeOptions::default())
            .run(root)
            .expect("run");

        assert_eq!(result.total_moved(), 0);
        assert!(result.skipped.is_empty());
        assert!(fs::symlink_metadata(root.join("shared")).is_ok());
        assert!(fs::symlink_metadata(root.join("Others/shared")).is_err());
        assert!(outside.path().join("inner.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_symlink_counts_target_size() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let outside = TempDir::new().expect("Failed to create temp directory");
        let target = outside.path().join("big.bin");
        fs::write(&target, vec![0u8; 5000]).expect("write");
        let root = temp.path();
        std::os::unix::fs::symlink(&target, root.join("alias.bin")).expect("symlink");

        let profile = Profile::standard();
        let result = Organizer::new(&profile, OrganizeOptions::default())
            .run(root)
            .expect("run");

        assert_eq!(result.count("Others"), 1);
        assert_eq!(result.total_bytes, 5000);
        let moved = root.join("Others/alias.bin");
        assert!(fs::symlink_metadata(&moved).expect("moved link").file_type().is_symlink());
        assert!(target.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_is_skipped() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path();
        std::os::unix::fs::symlink(root.join("nowhere"), root.join("dangling.txt")).expect("symlink");

        let profile = Profile::standard();
        let result = Organizer::new(&profile, OrganizeOptions::default())
            .run(root)
            .expect("run");

        assert_eq!(result.total_moved(), 0);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].file_name, "dangling.txt");
        assert!(fs::symlink_metadata(root.join("dangling.txt")).is_ok());
    }

    #[test]
    fn test_prune_removes_nested_empty_dirs() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path();
        fs::create_dir_all(root.join("a/b/c")).expect("mkdir");
        fs::create_dir_all(root.join("keep")).expect("mkdir");
        fs::write(root.join("keep/file.txt"), b"x").expect("write");

        let removed = prune_empty_dirs(root);
        assert_eq!(removed, 3);
        assert!(!root.join("a").exists());
        assert!(root.join("keep/file.txt").exists());
    }

    #[test]
    fn test_unknown_profile_is_fatal() {
        let set = ProfileSet::builtin();
        let err = Organizer::from_set(&set, "Nope", OrganizeOptions::default())
            .err()
            .expect("unknown profile");
        assert!(matches!(err, SortError::UnknownProfile { .. }));
        assert!(err.to_string().contains("Standard"));
    }

    #[test]
    fn test_not_a_directory_is_fatal() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let file = temp.path().join("plain.txt");
        fs::write(&file, b"x").expect("write");

        let profile = Profile::standard();
        let err = Organizer::new(&profile, OrganizeOptions::default())
            .run(&file)
            .err()
            .expect("file target");
        assert!(matches!(err, SortError::NotADirectory(_)));
    }

    #[test]
    fn test_dry_run_plans_conflicts_without_touching_disk() {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path();
        fs::create_dir(root.join("x")).expect("mkdir");
        fs::write(root.join("a.txt"), b"1").expect("write");
        fs::write(root.join("x/a.txt"), b"2").expect("write");

        let profile = Profile::new("P")
            .category("Text", Rule::new().extensions([".txt"]))
            .finish();
        let options = OrganizeOptions {
            dry_run: true,
            ..OrganizeOptions::default()
        };
        let mut destinations = Vec::new();
        let result = Organizer::new(&profile, options)
            .run_with(root, &mut |event: FileEvent<'_>| {
                if let FileEvent::Moved { destination, .. } = event {
                    destinations.push(destination.to_path_buf());
                }
            })
            .expect("dry run");

        assert!(result.dry_run);
        assert_eq!(result.count("Text"), 2);
        assert_eq!(
            destinations,
            vec![root.join("Text/a.txt"), root.join("Text/a_1.txt")]
        );
        assert!(!root.join("Text").exists());
        assert!(root.join("a.txt").exists());
    }

    #[test]
    fn test_run_result_json() {
        let mut result = RunResult::default();
        result.moved.insert("Images".to_string(), 2);
        result.total_bytes = 42;
        result.skipped.push(SkippedFile {
            file_name: "x.bin".to_string(),
            path: PathBuf::from("/t/x.bin"),
            kind: SkipKind::Vanished,
            reason: "gone".to_string(),
        });

        let value = result.to_json();
        assert_eq!(value["moved"]["Images"], 2);
        assert_eq!(value["total_bytes"], 42);
        assert_eq!(value["skipped"][0]["kind"], "vanished");
        assert_eq!(result.total_moved(), 2);
        assert_eq!(result.count("Audio"), 0);
    }
}
