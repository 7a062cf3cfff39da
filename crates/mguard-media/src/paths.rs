//! Upload path resolution.
//!
//! Upload paths arrive relative to one of several storage roots, often with
//! Windows or JSON-escaped separators. Resolution tries every root in order
//! and falls back to a base root when the file cannot be found anywhere.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default storage root when `STORAGE_ROOTS` is not set.
pub const DEFAULT_STORAGE_ROOT: &str = "/var/www/storage";

/// Normalize an upload path to a clean relative path.
///
/// Backslashes become `/`, repeated separators collapse, surrounding
/// whitespace and leading separators are removed.
pub fn clean_upload_path(raw: &str) -> String {
    let unified = raw.replace('\\', "/");

    let mut cleaned = String::with_capacity(unified.len());
    let mut prev_slash = false;
    for ch in unified.trim().chars() {
        if ch == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        cleaned.push(ch);
    }

    cleaned.trim_start_matches('/').to_string()
}

/// Ordered list of storage roots uploads may live under.
#[derive(Debug, Clone)]
pub struct StorageRoots {
    roots: Vec<PathBuf>,
}

impl Default for StorageRoots {
    fn default() -> Self {
        Self::new(vec![PathBuf::from(DEFAULT_STORAGE_ROOT)])
    }
}

impl StorageRoots {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Create from the comma-separated `STORAGE_ROOTS` variable.
    pub fn from_env() -> Self {
        match std::env::var("STORAGE_ROOTS") {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::default(),
        }
    }

    fn parse(value: &str) -> Self {
        let roots: Vec<PathBuf> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();

        if roots.is_empty() {
            Self::default()
        } else {
            Self::new(roots)
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Root used when the file exists under none of the roots.
    ///
    /// The first root present on disk, otherwise the first configured root.
    pub fn fallback_root(&self) -> Option<&Path> {
        self.roots
            .iter()
            .find(|root| root.exists())
            .or_else(|| self.roots.first())
            .map(PathBuf::as_path)
    }

    /// Resolve a raw upload path to a local file path.
    ///
    /// The returned path is not guaranteed to exist; callers check.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        let relative = clean_upload_path(raw);

        for root in &self.roots {
            let candidate = root.join(&relative);
            if candidate.exists() {
                debug!(path = %candidate.display(), "Resolved upload path");
                return candidate;
            }
        }

        match self.fallback_root() {
            Some(base) => {
                let fallback = base.join(&relative);
                warn!(path = %fallback.display(), "Upload not found under any root, using fallback path");
                fallback
            }
            None => PathBuf::from(relative),
        }
    }
}
