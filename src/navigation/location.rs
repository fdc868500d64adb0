//! Location snapshots.

use url::Url;

use crate::error::ResolveError;
use crate::navigation::base_path::BasePath;

/// Normalize a path: leading slash, no empty segments, no trailing slash except root.
///
/// Collapsing repeated slashes also guarantees a normalized path can never be
/// read as a scheme-relative URL (`//host/...`).
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Split `target` into its path and the `?query#hash` suffix.
pub fn split_suffix(target: &str) -> (&str, &str) {
    match target.find(['?', '#']) {
        Some(idx) => target.split_at(idx),
        None => (target, ""),
    }
}

/// Immutable snapshot of the current navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationState {
    path: String,
    search: String,
    hash: String,
    url: Url,
}

impl LocationState {
    /// Build a snapshot from a browser URL, stripping the base directory.
    pub fn from_url(url: &Url, base: &BasePath) -> Result<Self, ResolveError> {
        let path = base.to_app_path(url.path())?;
        let search = url
            .query()
            .filter(|q| !q.is_empty())
            .map(|q| format!("?{q}"))
            .unwrap_or_default();
        let hash = url
            .fragment()
            .filter(|f| !f.is_empty())
            .map(|f| format!("#{f}"))
            .unwrap_or_default();

        Ok(Self {
            path,
            search,
            hash,
            url: url.clone(),
        })
    }

    /// Normalized app path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query string including the leading `?`, or empty.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Fragment including the leading `#`, or empty.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// The full browser URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// App path with query and fragment re-attached.
    pub fn app_href(&self) -> String {
        format!("{}{}{}", self.path, self.search, self.hash)
    }

    /// True when path, search and hash all match `other`.
    pub fn same_location(&self, other: &LocationState) -> bool {
        self.path == other.path && self.search == other.search && self.hash == other.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/notes/"), "/notes");
        assert_eq!(normalize_path("notes/a"), "/notes/a");
        assert_eq!(normalize_path("//evil.example//x"), "/evil.example/x");
    }

    #[test]
    fn test_split_suffix() {
        assert_eq!(split_suffix("/a/b?x=1#top"), ("/a/b", "?x=1#top"));
        assert_eq!(split_suffix("/a#frag?not-query"), ("/a", "#frag?not-query"));
        assert_eq!(split_suffix("/plain"), ("/plain", ""));
    }

    #[test]
    fn test_from_url_with_base() {
        let url = Url::parse("https://example.com/app/notes/x/?q=1#h").unwrap();
        let loc = LocationState::from_url(&url, &BasePath::new("/app")).unwrap();
        assert_eq!(loc.path(), "/notes/x");
        assert_eq!(loc.search(), "?q=1");
        assert_eq!(loc.hash(), "#h");
        assert_eq!(loc.app_href(), "/notes/x?q=1#h");
    }

    #[test]
    fn test_empty_query_and_fragment_are_dropped() {
        let url = Url::parse("https://example.com/a?#").unwrap();
        let loc = LocationState::from_url(&url, &BasePath::root()).unwrap();
        assert_eq!(loc.search(), "");
        assert_eq!(loc.hash(), "");
    }

    #[test]
    fn test_same_location_ignores_origin() {
        let base = BasePath::root();
        let a = LocationState::from_url(&Url::parse("https://a.test/x?y").unwrap(), &base).unwrap();
        let b = LocationState::from_url(&Url::parse("https://b.test/x/?y").unwrap(), &base).unwrap();
        let c = LocationState::from_url(&Url::parse("https://a.test/x?z").unwrap(), &base).unwrap();
        assert!(a.same_location(&b));
        assert!(!a.same_location(&c));
    }
}
