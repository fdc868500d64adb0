//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Look up the first route matching an app path
//! - Fall back to the catch-all route with `{path}` when nothing else matches
//!
//! # Design Decisions
//! - Immutable after construction (shared without locks)
//! - O(n) scan in registration order; first match wins
//! - At most one catch-all; a second one is a configuration error
//! - Explicit `None` rather than a silent default when no catch-all exists

use crate::error::TemplateError;
use crate::routing::params::RouteParams;
use crate::routing::template::CompiledRoute;

/// Parameter name the catch-all route receives.
pub const CATCH_ALL_PARAM: &str = "path";

/// The route selected for a path, with its captured parameters.
#[derive(Debug)]
pub struct Resolved<'a, H> {
    pub route: &'a CompiledRoute<H>,
    pub params: RouteParams,
}

/// Ordered collection of compiled routes.
pub struct RouteTable<H> {
    routes: Vec<CompiledRoute<H>>,
    catch_all: Option<CompiledRoute<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            catch_all: None,
        }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every `(template, handler)` pair, failing on the first bad template.
    pub fn from_routes<I, S>(routes: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (S, H)>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (template, handler) in routes {
            table.insert(template.as_ref(), handler)?;
        }
        Ok(table)
    }

    /// Compile and append a route.
    pub fn insert(&mut self, template: &str, handler: H) -> Result<(), TemplateError> {
        let route = CompiledRoute::compile(template, handler)?;
        if route.is_catch_all() {
            if self.catch_all.is_some() {
                return Err(TemplateError::DuplicateCatchAll);
            }
            self.catch_all = Some(route);
        } else {
            self.routes.push(route);
        }
        Ok(())
    }

    /// Find the route for `app_path`.
    pub fn resolve(&self, app_path: &str) -> Option<Resolved<'_, H>> {
        for route in &self.routes {
            if let Some(params) = route.match_path(app_path) {
                return Some(Resolved { route, params });
            }
        }

        self.catch_all.as_ref().map(|route| {
            let mut params = RouteParams::new();
            params.insert(CATCH_ALL_PARAM, app_path);
            Resolved { route, params }
        })
    }

    /// Routes in match order, catch-all last.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledRoute<H>> {
        self.routes.iter().chain(self.catch_all.iter())
    }

    pub fn len(&self) -> usize {
        self.routes.len() + usize::from(self.catch_all.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_catch_all(&self) -> bool {
        self.catch_all.is_some()
    }
}

impl<H> std::fmt::Debug for RouteTable<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field(
                "routes",
                &self.routes.iter().map(|r| r.template()).collect::<Vec<_>>(),
            )
            .field("has_catch_all", &self.catch_all.is_some())
            .finish()
    }
}
