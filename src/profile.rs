//! Organization profiles: named, ordered lists of categories and their rules.
//!
//! A profile is plain data. The classifier walks its categories in
//! definition order and the first matching rule wins, so new profiles can be
//! added (built in or from a configuration file) without touching the
//! organizer.
//!
//! # Examples
//!
//! ```
//! use sortdir::profile::Profile;
//!
//! let standard = Profile::standard();
//! assert_eq!(standard.category_for("image/png", ".png", "photo.png"), "Images");
//! assert_eq!(standard.category_for("application/pdf", ".pdf", "report.pdf"), "Documents");
//! assert_eq!(standard.category_for("text/x-unknown", "", "notes"), "Others");
//! ```

use serde::Deserialize;

/// Name of the catch-all category present in every profile.
pub const FALLBACK_CATEGORY: &str = "Others";

/// Name of the profile used when none is requested.
pub const DEFAULT_PROFILE: &str = "Standard";

/// Criteria deciding membership in a category.
///
/// A file matches when any single criterion matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Rule {
    /// Exact MIME types, or prefixes when the entry ends with `/` (e.g. `image/`).
    #[serde(default)]
    pub mime_types: Vec<String>,
    /// Lowercase, dot-prefixed extensions (e.g. `.pdf`).
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Substrings looked up in the lowercased filename.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mime_types<I, S>(mut self, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mime_types.extend(mime_types.into_iter().map(Into::into));
        self
    }

    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions.extend(extensions.into_iter().map(Into::into));
        self
    }

    pub fn patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Lowercases every entry and gives extensions a leading dot.
    fn normalize(&mut self) {
        for mime in &mut self.mime_types {
            *mime = mime.trim().to_lowercase();
        }
        for ext in &mut self.extensions {
            let lower = ext.trim().to_lowercase();
            *ext = if lower.starts_with('.') {
                lower
            } else {
                format!(".{}", lower)
            };
        }
        for pattern in &mut self.patterns {
            *pattern = pattern.to_lowercase();
        }
        self.mime_types.retain(|m| !m.is_empty());
        self.extensions.retain(|e| e.len() > 1);
        self.patterns.retain(|p| !p.is_empty());
    }

    /// Checks whether a file with these attributes falls under this rule.
    ///
    /// `mime` and `extension` are expected lowercase; `file_name` is
    /// lowercased here.
    pub fn matches(&self, mime: &str, extension: &str, file_name: &str) -> bool {
        let mime_hit = self.mime_types.iter().any(|entry| {
            if entry.ends_with('/') {
                mime.starts_with(entry.as_str())
            } else {
                mime == entry
            }
        });
        if mime_hit {
            return true;
        }

        if !extension.is_empty() && self.extensions.iter().any(|e| e == extension) {
            return true;
        }

        let lower_name = file_name.to_lowercase();
        self.patterns.iter().any(|p| lower_name.contains(p.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.mime_types.is_empty() && self.extensions.is_empty() && self.patterns.is_empty()
    }
}

/// A destination bucket; maps 1:1 to a subdirectory of the target root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(flatten)]
    pub rule: Rule,
}

/// A named, ordered set of categories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Profile {
    /// Creates an empty profile. Call [`Profile::finish`] (or add it to a
    /// [`ProfileSet`]) to get the fallback category appended.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: Vec::new(),
        }
    }

    /// Appends a category. Definition order is match order.
    pub fn category(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.categories.push(Category {
            name: name.into(),
            rule,
        });
        self
    }

    /// Normalizes every rule and makes sure the fallback category exists.
    ///
    /// If "Others" was defined with rules of its own it keeps its position;
    /// otherwise it is appended last.
    pub fn finish(mut self) -> Self {
        for category in &mut self.categories {
            category.rule.normalize();
        }
        if !self.has_category(FALLBACK_CATEGORY) {
            self.categories.push(Category {
                name: FALLBACK_CATEGORY.to_string(),
                rule: Rule::default(),
            });
        }
        self
    }

    /// The built-in "Standard" profile.
    pub fn standard() -> Self {
        Profile::new(DEFAULT_PROFILE)
            .category(
                "Documents",
                Rule::new()
                    .mime_types(["application/pdf", "text/plain", "application/msword"])
                    .extensions([".pdf", ".doc", ".docx", ".txt", ".rtf", ".odt"]),
            )
            .category(
                "Images",
                Rule::new()
                    .mime_types(["image/"])
                    .extensions([".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff"]),
            )
            .category(
                "Videos",
                Rule::new()
                    .mime_types(["video/"])
                    .extensions([".mp4", ".avi", ".mov", ".wmv", ".flv", ".mkv"]),
            )
            .category(
                "Audio",
                Rule::new()
                    .mime_types(["audio/"])
                    .extensions([".mp3", ".wav", ".aac", ".flac", ".m4a"]),
            )
            .category(
                "Archives",
                Rule::new()
                    .mime_types(["application/zip", "application/x-rar"])
                    .extensions([".zip", ".rar", ".7z", ".tar", ".gz"]),
            )
            .finish()
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    /// Category names in definition order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Picks the first category whose rule matches, or "Others".
    pub fn category_for(&self, mime: &str, extension: &str, file_name: &str) -> &str {
        self.categories
            .iter()
            .find(|c| c.rule.matches(mime, extension, file_name))
            .map(|c| c.name.as_str())
            .unwrap_or(FALLBACK_CATEGORY)
    }
}

/// The profiles available to a run, keyed by name in insertion order.
#[derive(Debug, Clone)]
pub struct ProfileSet {
    profiles: Vec<Profile>,
}

impl ProfileSet {
    /// A set holding only the built-in profiles.
    pub fn builtin() -> Self {
        Self {
            profiles: vec![Profile::standard()],
        }
    }

    /// Adds a profile, replacing any existing one with the same name.
    pub fn insert(&mut self, profile: Profile) {
        let profile = profile.finish();
        match self.profiles.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self::builtin()
    }
}
