//! Conversion between browser paths and app paths.
//!
//! A site deployed under `/app` sees browser paths like `/app/notes/x`; routes
//! are written against the app path `/notes/x`.

use crate::error::ResolveError;
use crate::navigation::location::normalize_path;

/// The configured base directory, stored without a trailing slash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasePath {
    // Empty for a site served from the origin root.
    prefix: String,
}

impl BasePath {
    pub fn new(base_dir: &str) -> Self {
        let normalized = normalize_path(base_dir);
        if normalized == "/" {
            Self::root()
        } else {
            Self { prefix: normalized }
        }
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.prefix.is_empty()
    }

    pub fn as_str(&self) -> &str {
        if self.prefix.is_empty() {
            "/"
        } else {
            &self.prefix
        }
    }

    /// Strip the base directory from a browser path.
    pub fn to_app_path(&self, browser_path: &str) -> Result<String, ResolveError> {
        let path = normalize_path(browser_path);
        if self.prefix.is_empty() {
            return Ok(path);
        }
        if path == self.prefix {
            return Ok("/".to_string());
        }

        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) if rest.starts_with('/') => Ok(rest.to_string()),
            _ => Err(ResolveError::OutsideBase {
                path: browser_path.to_string(),
                base: self.as_str().to_string(),
            }),
        }
    }

    /// Prefix an app path with the base directory.
    pub fn to_browser_path(&self, app_path: &str) -> String {
        let path = normalize_path(app_path);
        if self.prefix.is_empty() {
            path
        } else if path == "/" {
            format!("{}/", self.prefix)
        } else {
            format!("{}{}", self.prefix, path)
        }
    }
}
