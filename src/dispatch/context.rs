//! Values exchanged between the router and render functions.

use std::sync::Arc;

use crate::dispatch::router::Router;
use crate::error::NavigateError;
use crate::navigation::LocationState;
use crate::routing::RouteParams;

/// A render function registered for a route.
pub type RenderFn<M> = Arc<dyn Fn(RenderContext<M>) + Send + Sync>;

/// Options for `Router::navigate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

impl NavigateOptions {
    pub fn push() -> Self {
        Self { replace: false }
    }

    pub fn replace() -> Self {
        Self { replace: true }
    }
}

/// What a resolve pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A render function ran.
    Dispatched { generation: u64, template: String },
    /// Path, search and hash were unchanged; nothing ran.
    Unchanged,
    /// No route matched and no catch-all is registered.
    NoMatch,
    /// The URL lies outside the base directory; logged and ignored.
    OutsideBase,
}

impl DispatchOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, DispatchOutcome::Dispatched { .. })
    }

    /// Template of the route that ran, if any.
    pub fn template(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Dispatched { template, .. } => Some(template.as_str()),
            _ => None,
        }
    }
}

/// What the router did with a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Left to the browser.
    Ignored,
    /// Default action must be prevented; the navigation already ran.
    Intercepted(DispatchOutcome),
}

impl ClickOutcome {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, ClickOutcome::Intercepted(_))
    }
}

/// Handle given to render functions for redirects and staleness checks.
pub struct Navigator<M> {
    router: Router<M>,
}

impl<M> Clone for Navigator<M> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
        }
    }
}

impl<M> Navigator<M>
where
    M: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(router: Router<M>) -> Self {
        Self { router }
    }

    /// Navigate to an absolute app path.
    pub fn navigate(
        &self,
        destination: &str,
        options: NavigateOptions,
    ) -> Result<DispatchOutcome, NavigateError> {
        self.router.navigate(destination, options)
    }

    /// True while no later dispatch has started.
    pub fn is_current(&self, generation: u64) -> bool {
        self.router.is_current(generation)
    }

    /// The router's latest location.
    pub fn location(&self) -> Option<Arc<LocationState>> {
        self.router.location()
    }
}

impl<M> std::fmt::Debug for Navigator<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator").finish_non_exhaustive()
    }
}

/// Everything a render function receives for one dispatch.
pub struct RenderContext<M> {
    /// Mount point the render function owns until the next dispatch.
    pub mount: Option<M>,
    /// Parameters captured by the matched route.
    pub params: RouteParams,
    /// Location being rendered.
    pub location: Arc<LocationState>,
    /// Template of the matched route.
    pub template: String,
    /// Dispatch counter value for this render.
    pub generation: u64,
    /// Redirect and staleness handle.
    pub navigator: Navigator<M>,
}

impl<M> RenderContext<M>
where
    M: Clone + Send + Sync + 'static,
{
    /// True while this render is still the latest dispatch.
    ///
    /// Asynchronous renders check this before committing output to the mount.
    pub fn is_current(&self) -> bool {
        self.navigator.is_current(self.generation)
    }

    /// Redirect from inside a render function.
    pub fn navigate(
        &self,
        destination: &str,
        options: NavigateOptions,
    ) -> Result<DispatchOutcome, NavigateError> {
        self.navigator.navigate(destination, options)
    }
}

impl<M: std::fmt::Debug> std::fmt::Debug for RenderContext<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("mount", &self.mount)
            .field("params", &self.params)
            .field("path", &self.location.path())
            .field("template", &self.template)
            .field("generation", &self.generation)
            .finish()
    }
}
