//! Path matching logic.
//!
//! # Responsibilities
//! - Test an app path against a compiled pattern
//! - Extract named captures into `RouteParams`
//!
//! # Design Decisions
//! - Patterns are anchored at both ends; the trailing slash is optional
//! - Captures are returned as they appear in the path (no percent-decoding)
//! - The catch-all matcher accepts every path with no parameters; the route
//!   table supplies `{path}` when it falls back to it

use regex::Regex;

use crate::routing::params::RouteParams;

/// Trait for matching app paths against a compiled route.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns the captured parameters if `path` matches, `None` otherwise.
    fn match_path(&self, path: &str) -> Option<RouteParams>;
}

/// Matches paths against a regex generated from a route template.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
    param_names: Vec<String>,
}

impl PatternMatcher {
    /// Wrap a compiled regex whose capture groups correspond, in order, to `param_names`.
    pub(crate) fn new(regex: Regex, param_names: Vec<String>) -> Self {
        Self { regex, param_names }
    }

    /// Parameter names in template order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// The generated pattern source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Matcher for PatternMatcher {
    fn match_path(&self, path: &str) -> Option<RouteParams> {
        let caps = self.regex.captures(path)?;
        Some(
            self.param_names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| caps.get(i + 1).map(|m| (name.as_str(), m.as_str())))
                .collect(),
        )
    }
}

/// Matches every path.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatchAllMatcher;

impl Matcher for CatchAllMatcher {
    fn match_path(&self, _path: &str) -> Option<RouteParams> {
        Some(RouteParams::new())
    }
}
