//! Route template compilation.
//!
//! # Template Syntax
//! - `*` - catch-all, matches any path with no parameters
//! - `/guides` - literal segments, matched exactly
//! - `/guides/:slug` - named capture of one or more non-slash characters
//! - `/notes/:path*` - splat capture of one or more characters including
//!   slashes; only allowed as the final segment
//!
//! Templates are compiled once when the route table is built. Every error is
//! reported there, never at match time.

use regex::RegexBuilder;

use crate::error::TemplateError;
use crate::routing::matcher::{CatchAllMatcher, Matcher, PatternMatcher};
use crate::routing::params::RouteParams;

/// The catch-all template.
pub const CATCH_ALL: &str = "*";

/// Maximum allowed size for a compiled route regex (in bytes).
const MAX_PATTERN_SIZE: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Splat(String),
}

/// A parsed and compiled route template.
#[derive(Debug)]
pub struct RouteTemplate {
    source: String,
    segments: Vec<Segment>,
    matcher: Box<dyn Matcher>,
    catch_all: bool,
}

impl RouteTemplate {
    /// Parse `template` and compile its matcher.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        if template.is_empty() {
            return Err(TemplateError::Empty);
        }

        if template == CATCH_ALL {
            return Ok(Self {
                source: template.to_string(),
                segments: Vec::new(),
                matcher: Box::new(CatchAllMatcher),
                catch_all: true,
            });
        }

        let segments = parse_segments(template)?;
        let matcher = build_matcher(template, &segments)?;

        Ok(Self {
            source: template.to_string(),
            segments,
            matcher: Box::new(matcher),
            catch_all: false,
        })
    }

    /// The template string as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_catch_all(&self) -> bool {
        self.catch_all
    }

    /// Match an app path against this template.
    pub fn match_path(&self, path: &str) -> Option<RouteParams> {
        self.matcher.match_path(path)
    }

    /// Parameter names in the order they appear.
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) | Segment::Splat(name) => Some(name.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Build a concrete path by substituting `params` into the template.
    ///
    /// Returns `None` for the catch-all or when a parameter is missing or empty.
    pub fn href(&self, params: &RouteParams) -> Option<String> {
        if self.catch_all {
            return None;
        }
        if self.segments.is_empty() {
            return Some("/".to_string());
        }

        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Param(name) | Segment::Splat(name) => {
                    let value = params.get(name).filter(|v| !v.is_empty())?;
                    path.push_str(value);
                }
            }
        }
        Some(path)
    }
}

impl std::fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// A compiled template paired with the handler it dispatches to.
pub struct CompiledRoute<H> {
    template: RouteTemplate,
    handler: H,
}

impl<H> CompiledRoute<H> {
    /// Compile `template` for `handler`.
    pub fn compile(template: &str, handler: H) -> Result<Self, TemplateError> {
        Ok(Self {
            template: RouteTemplate::parse(template)?,
            handler,
        })
    }

    pub fn template(&self) -> &str {
        self.template.as_str()
    }

    pub fn route_template(&self) -> &RouteTemplate {
        &self.template
    }

    pub fn is_catch_all(&self) -> bool {
        self.template.is_catch_all()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn match_path(&self, path: &str) -> Option<RouteParams> {
        self.template.match_path(path)
    }
}

impl<H> std::fmt::Debug for CompiledRoute<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("template", &self.template.as_str())
            .field("catch_all", &self.template.is_catch_all())
            .finish()
    }
}

fn parse_segments(template: &str) -> Result<Vec<Segment>, TemplateError> {
    let body = template
        .strip_prefix('/')
        .ok_or_else(|| TemplateError::NotAbsolute {
            template: template.to_string(),
        })?
        .trim_end_matches('/');

    if body.is_empty() {
        return Ok(Vec::new());
    }

    let raw: Vec<&str> = body.split('/').collect();
    let last = raw.len() - 1;
    let mut segments = Vec::with_capacity(raw.len());
    let mut seen: Vec<&str> = Vec::new();

    for (i, seg) in raw.iter().enumerate() {
        let Some(rest) = seg.strip_prefix(':') else {
            segments.push(Segment::Literal(seg.to_string()));
            continue;
        };

        let (name, splat) = match rest.strip_suffix('*') {
            Some(name) => (name, true),
            None => (rest, false),
        };

        if !is_identifier(name) {
            return Err(TemplateError::InvalidParamName {
                template: template.to_string(),
                name: name.to_string(),
            });
        }
        if seen.contains(&name) {
            return Err(TemplateError::DuplicateParam {
                template: template.to_string(),
                name: name.to_string(),
            });
        }
        seen.push(name);

        if splat {
            if i != last {
                return Err(TemplateError::SplatNotTerminal {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            segments.push(Segment::Splat(name.to_string()));
        } else {
            segments.push(Segment::Param(name.to_string()));
        }
    }

    Ok(segments)
}

fn build_matcher(template: &str, segments: &[Segment]) -> Result<PatternMatcher, TemplateError> {
    let mut pattern = String::from("^");
    let mut names = Vec::new();

    for segment in segments {
        pattern.push('/');
        match segment {
            Segment::Literal(text) => pattern.push_str(&regex::escape(text)),
            Segment::Param(name) => {
                pattern.push_str("([^/]+)");
                names.push(name.clone());
            }
            Segment::Splat(name) => {
                // Lazy so an optional trailing slash is not captured.
                pattern.push_str("(.+?)");
                names.push(name.clone());
            }
        }
    }
    pattern.push_str("/?$");

    let regex = RegexBuilder::new(&pattern)
        .size_limit(MAX_PATTERN_SIZE)
        .build()
        .map_err(|e| TemplateError::Pattern {
            template: template.to_string(),
            message: e.to_string(),
        })?;

    Ok(PatternMatcher::new(regex, names))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> RouteParams {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_root_template() {
        let t = RouteTemplate::parse("/").unwrap();
        assert!(t.match_path("/").is_some());
        assert!(t.match_path("/x").is_none());
        assert_eq!(t.href(&RouteParams::new()).as_deref(), Some("/"));
    }

    #[test]
    fn test_literal_and_optional_trailing_slash() {
        let t = RouteTemplate::parse("/guides").unwrap();
        assert!(t.match_path("/guides").is_some());
        assert!(t.match_path("/guides/").is_some());
        assert!(t.match_path("/guides/x").is_none());
        assert!(t.match_path("/prefix/guides").is_none());
    }

    #[test]
    fn test_literal_characters_are_escaped() {
        let t = RouteTemplate::parse("/api/v1.0/(beta)").unwrap();
        assert!(t.match_path("/api/v1.0/(beta)").is_some());
        assert!(t.match_path("/api/v1X0/(beta)").is_none());
        assert!(t.match_path("/api/v1.0/beta").is_none());
    }

    #[test]
    fn test_named_param() {
        let t = RouteTemplate::parse("/guides/:slug").unwrap();
        let m = t.match_path("/guides/history-api").unwrap();
        assert_eq!(m.get("slug"), Some("history-api"));
        assert!(t.match_path("/guides/").is_none());
        assert!(t.match_path("/guides/a/b").is_none());
    }

    #[test]
    fn test_splat_param_spans_slashes() {
        let t = RouteTemplate::parse("/notes/:path*").unwrap();
        let m = t.match_path("/notes/interviewing/runtime").unwrap();
        assert_eq!(m.get("path"), Some("interviewing/runtime"));

        let m = t.match_path("/notes/a/b/").unwrap();
        assert_eq!(m.get("path"), Some("a/b"));

        assert!(t.match_path("/notes").is_none());
    }

    #[test]
    fn test_substituted_values_round_trip() {
        let cases: &[(&str, &[(&str, &str)])] = &[
            ("/guides/:slug", &[("slug", "history-api")]),
            ("/u/:user/posts/:post", &[("user", "ada"), ("post", "42")]),
            ("/notes/:path*", &[("path", "a/b/c.html")]),
            ("/x/:id/files/:rest*", &[("id", "7"), ("rest", "deep/er")]),
        ];

        for (template, values) in cases {
            let t = RouteTemplate::parse(template).unwrap();
            let expected = params(values);
            let path = t.href(&expected).unwrap();
            assert_eq!(t.match_path(&path), Some(expected), "template {template}");
        }
    }

    #[test]
    fn test_splat_must_be_terminal() {
        for template in ["/:rest*/edit", "/files/:path*/raw", "/a/:b*/:c"] {
            let err = RouteTemplate::parse(template).unwrap_err();
            assert!(
                matches!(err, TemplateError::SplatNotTerminal { .. }),
                "template {template} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_invalid_templates() {
        assert_eq!(RouteTemplate::parse("").unwrap_err(), TemplateError::Empty);
        assert!(matches!(
            RouteTemplate::parse("guides").unwrap_err(),
            TemplateError::NotAbsolute { .. }
        ));
        assert!(matches!(
            RouteTemplate::parse("/a/:").unwrap_err(),
            TemplateError::InvalidParamName { .. }
        ));
        assert!(matches!(
            RouteTemplate::parse("/a/:1st").unwrap_err(),
            TemplateError::InvalidParamName { .. }
        ));
        assert!(matches!(
            RouteTemplate::parse("/a/:id/b/:id").unwrap_err(),
            TemplateError::DuplicateParam { .. }
        ));
    }

    #[test]
    fn test_catch_all_template() {
        let t = RouteTemplate::parse(CATCH_ALL).unwrap();
        assert!(t.is_catch_all());
        assert_eq!(t.match_path("/whatever"), Some(RouteParams::new()));
        assert!(t.href(&RouteParams::new()).is_none());
    }

    #[test]
    fn test_href_missing_param() {
        let t = RouteTemplate::parse("/guides/:slug").unwrap();
        assert!(t.href(&RouteParams::new()).is_none());
        assert_eq!(t.param_names(), vec!["slug"]);
    }
}
