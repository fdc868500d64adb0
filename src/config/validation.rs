//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every route template
//! - Detect duplicate routes (including a second catch-all)
//! - Check base directory, nav links and log filter
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::RouterConfig;
use crate::error::TemplateError;
use crate::routing::RouteTemplate;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("base_dir `{0}` must start with `/`")]
    RelativeBaseDir(String),

    #[error("route #{index} `{template}`: {source}")]
    Template {
        index: usize,
        template: String,
        #[source]
        source: TemplateError,
    },

    #[error("route `{0}` is registered more than once")]
    DuplicateTemplate(String),

    #[error("route `{0}` has an empty view name")]
    EmptyView(String),

    #[error("nav link `{0}` must be an absolute path")]
    RelativeNavLink(String),

    #[error("invalid log level `{0}`")]
    LogLevel(String),
}

/// Check `config`, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.base_dir.starts_with('/') {
        errors.push(ValidationError::RelativeBaseDir(config.base_dir.clone()));
    }

    let mut seen = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if let Err(source) = RouteTemplate::parse(&route.template) {
            errors.push(ValidationError::Template {
                index,
                template: route.template.clone(),
                source,
            });
        }
        if !seen.insert(route.template.as_str()) {
            errors.push(ValidationError::DuplicateTemplate(route.template.clone()));
        }
        if route.view.trim().is_empty() {
            errors.push(ValidationError::EmptyView(route.template.clone()));
        }
    }

    for link in &config.nav_links {
        if !link.href.starts_with('/') {
            errors.push(ValidationError::RelativeNavLink(link.href.clone()));
        }
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
