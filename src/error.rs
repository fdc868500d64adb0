//! Error taxonomy for the router.
//!
//! # Categories
//! - `TemplateError`: configuration error, raised while the route table is built
//! - `NavigateError`: usage error from `navigate()`, plus history port failures
//! - `ResolveError`: a browser path outside the configured base directory
//!
//! A route miss is not an error: it is reported as `DispatchOutcome::NoMatch`.

use thiserror::Error;

/// Errors raised while compiling route templates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template string was empty.
    #[error("route template must not be empty")]
    Empty,

    /// The template is neither `*` nor an absolute path.
    #[error("route template `{template}` must start with `/` or be `*`")]
    NotAbsolute { template: String },

    /// A splat parameter appeared before the final segment.
    #[error("splat parameter `:{name}*` in `{template}` is only allowed as the final segment")]
    SplatNotTerminal { template: String, name: String },

    /// A parameter name was empty or not an identifier.
    #[error("invalid parameter name `{name}` in `{template}`")]
    InvalidParamName { template: String, name: String },

    /// The same parameter name was used twice in one template.
    #[error("parameter `{name}` appears more than once in `{template}`")]
    DuplicateParam { template: String, name: String },

    /// More than one `*` route was registered.
    #[error("only one catch-all route may be registered")]
    DuplicateCatchAll,

    /// The generated pattern was rejected by the regex engine.
    #[error("failed to compile matcher for `{template}`: {message}")]
    Pattern { template: String, message: String },
}

/// Errors surfaced by the history port.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The underlying history surface could not be reached.
    #[error("history unavailable: {0}")]
    Unavailable(String),

    /// A URL could not be parsed or joined.
    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Errors returned by `Router::navigate`.
#[derive(Debug, Error)]
pub enum NavigateError {
    /// The destination did not start with `/`.
    #[error("navigation target `{0}` must be an absolute path")]
    NotAbsolute(String),

    /// Reading or updating history failed.
    #[error(transparent)]
    History(#[from] HistoryError),
}

/// A browser path that does not belong to this application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("path `{path}` is outside base directory `{base}`")]
    OutsideBase { path: String, base: String },
}
