//! Client-side path router for static sites and single-page apps.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod navigation;
pub mod observability;
pub mod routing;

#[cfg(feature = "browser")]
pub mod browser;

pub use config::RouterConfig;
pub use dispatch::{NavigateOptions, RenderContext, Router, RouterBuilder};
pub use error::{HistoryError, NavigateError, ResolveError, TemplateError};
pub use navigation::{History, LocationState, MemoryHistory};
pub use routing::{RouteParams, RouteTable};
