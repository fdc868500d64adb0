//! Configuration schema definitions.
//!
//! This module defines the route-table configuration read by the CLI and by
//! hosts that prefer declaring routes in a file. All types derive Serde traits
//! for deserialization from TOML.

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::routing::RouteTable;

/// Root configuration for a routed site.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Directory the site is served from (e.g., "/app"). "/" for the origin root.
    pub base_dir: String,

    /// Route definitions, matched in order.
    pub routes: Vec<RouteConfig>,

    /// Navigation links reflected after each dispatch.
    pub nav_links: Vec<NavLinkConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_dir: "/".to_string(),
            routes: Vec::new(),
            nav_links: Vec::new(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl RouterConfig {
    /// Compile the configured routes into a table keyed by view name.
    pub fn route_table(&self) -> Result<RouteTable<String>, TemplateError> {
        RouteTable::from_routes(
            self.routes
                .iter()
                .map(|r| (r.template.as_str(), r.view.clone())),
        )
    }
}

/// A single route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route template (e.g., "/guides/:slug" or "*").
    pub template: String,

    /// Name of the view rendered for this route.
    pub view: String,
}

/// A navigation link.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NavLinkConfig {
    /// App path the link points at.
    pub href: String,

    /// Display label, informational only.
    #[serde(default)]
    pub label: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter (trace, debug, info, warn, error, or an `EnvFilter` directive).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
