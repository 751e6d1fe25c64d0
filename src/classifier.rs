//! File type detection and category assignment.
//!
//! MIME detection degrades in three steps: magic-byte sniffing with
//! `infer`, an extension lookup with `mime_guess`, and finally
//! `application/octet-stream`. A file that cannot be read is still
//! classified; it just loses the first step.

use crate::profile::Profile;
use std::path::Path;

/// MIME type used when neither content nor extension says anything.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// The attributes a file was classified on, plus the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub mime: String,
    /// Lowercase, dot-prefixed; empty when the name has no extension.
    pub extension: String,
    pub category: String,
}

/// Returns the lowercase, dot-prefixed extension of a path.
///
/// Dotfiles such as `.bashrc` and names ending in a bare dot have none.
///
/// # Examples
///
/// ```
/// use sortdir::classifier::extension_of;
/// use std::path::Path;
///
/// assert_eq!(extension_of(Path::new("Report.PDF")), ".pdf");
/// assert_eq!(extension_of(Path::new("archive.tar.gz")), ".gz");
/// assert_eq!(extension_of(Path::new("notes")), "");
/// assert_eq!(extension_of(Path::new(".bashrc")), "");
/// ```
pub fn extension_of(path: &Path) -> String {
    match path.extension() {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_string_lossy().to_lowercase()),
        _ => String::new(),
    }
}

/// Detects the MIME type of a file.
pub fn detect_mime(path: &Path) -> String {
    match infer::get_from_path(path) {
        Ok(Some(kind)) => return kind.mime_type().to_string(),
        Ok(None) => {}
        Err(e) => log::debug!("content sniffing failed for {}: {}", path.display(), e),
    }

    mime_guess::from_path(path)
        .first_raw()
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_MIME.to_string())
}

/// Classifies a file under the given profile.
///
/// # Examples
///
/// ```no_run
/// use sortdir::classifier::classify;
/// use sortdir::profile::Profile;
/// use std::path::Path;
///
/// let category = classify(Path::new("/tmp/photo.jpg"), &Profile::standard());
/// assert_eq!(category, "Images");
/// ```
pub fn classify(path: &Path, profile: &Profile) -> String {
    classify_detailed(path, profile).category
}

/// Like [`classify`], but also returns the MIME type and extension used.
pub fn classify_detailed(path: &Path, profile: &Profile) -> Classification {
    let mime = detect_mime(path).to_lowercase();
    let extension = extension_of(path);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let category = profile
        .category_for(&mime, &extension, &file_name)
        .to_string();

    Classification {
        mime,
        extension,
        category,
    }
}
