//! Route dispatch.
//!
//! # Responsibilities
//! - Own the compiled route table
//! - Turn navigation triggers (navigate, popstate, clicks) into render calls
//! - Keep history in step with programmatic navigation
//! - Track the current location and the dispatch generation
//!
//! # Design Decisions
//! - One resolve pass per trigger: read URL → app path → match → render
//! - Runs synchronously inside the triggering call; render functions that do
//!   asynchronous work compare their generation before committing output
//! - No lock is held while a render function runs, so it may redirect
//! - The current location is swapped atomically, never mutated

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use arc_swap::ArcSwapOption;

use crate::dispatch::context::{
    ClickOutcome, DispatchOutcome, NavigateOptions, Navigator, RenderContext, RenderFn,
};
use crate::error::{HistoryError, NavigateError, TemplateError};
use crate::navigation::links::intercepted_url;
use crate::navigation::location::split_suffix;
use crate::navigation::{
    ActiveNavReflector, BasePath, ClickEvent, History, LinkMarker, LocationState,
    NavigationListener,
};
use crate::observability::metrics;
use crate::routing::RouteTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Initial,
    Navigate,
    PopState,
}

struct RouterInner<M> {
    table: RouteTable<RenderFn<M>>,
    base: BasePath,
    mount: Option<M>,
    history: Mutex<Box<dyn History>>,
    current: ArcSwapOption<LocationState>,
    generation: AtomicU64,
    nav: Mutex<ActiveNavReflector>,
}

/// Client-side router.
///
/// Cheap to clone; clones share the same state.
pub struct Router<M = ()> {
    inner: Arc<RouterInner<M>>,
}

impl<M> Clone for Router<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M> std::fmt::Debug for Router<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("base", &self.inner.base.as_str())
            .field("routes", &self.inner.table)
            .field("generation", &self.inner.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl Router<()> {
    /// Start building a router without a mount point.
    pub fn builder(history: impl History + 'static) -> RouterBuilder<()> {
        RouterBuilder::new(history)
    }
}

impl<M> Router<M>
where
    M: Clone + Send + Sync + 'static,
{
    /// Subscribe to history events and render the current URL.
    ///
    /// The initial pass always dispatches, so deep links render on first load.
    pub fn start(&self) -> Result<DispatchOutcome, NavigateError> {
        let on_pop = Arc::downgrade(&self.inner);
        let on_click = on_pop.clone();
        let listener = NavigationListener::new(
            move || {
                if let Some(router) = upgrade(&on_pop) {
                    if let Err(err) = router.handle_popstate() {
                        tracing::warn!(error = %err, "Popstate dispatch failed");
                    }
                }
            },
            move |event| {
                let Some(router) = upgrade(&on_click) else {
                    return false;
                };
                match router.handle_click(event) {
                    Ok(outcome) => outcome.is_intercepted(),
                    Err(err) => {
                        tracing::warn!(error = %err, "Click navigation failed");
                        false
                    }
                }
            },
        );
        self.history().listen(listener)?;

        tracing::info!(
            base = %self.inner.base.as_str(),
            routes = self.inner.table.len(),
            "Router started"
        );
        metrics::record_navigation("initial");
        self.resolve_and_dispatch(Trigger::Initial)
    }

    /// Navigate to an absolute app path, optionally with query and fragment.
    ///
    /// History is only touched when the resulting URL differs from the current
    /// one. Dispatch is skipped when path, search and hash are unchanged.
    pub fn navigate(
        &self,
        destination: &str,
        options: NavigateOptions,
    ) -> Result<DispatchOutcome, NavigateError> {
        if !destination.starts_with('/') {
            return Err(NavigateError::NotAbsolute(destination.to_string()));
        }

        let (path, suffix) = split_suffix(destination);
        let browser_href = format!("{}{}", self.inner.base.to_browser_path(path), suffix);

        {
            let mut history = self.history();
            let current = history.current_url()?;
            let target = current
                .join(&browser_href)
                .map_err(|source| HistoryError::InvalidUrl {
                    url: browser_href.clone(),
                    source,
                })?;

            // Dot segments are resolved by the join and may climb out of the base.
            if let Err(err) = self.inner.base.to_app_path(target.path()) {
                tracing::warn!(error = %err, destination = %destination, "Navigation outside base directory ignored");
                metrics::record_resolution_miss();
                return Ok(DispatchOutcome::OutsideBase);
            }

            if target != current {
                if options.replace {
                    history.replace_state(&target)?;
                } else {
                    history.push_state(&target)?;
                }
            }
        }

        let outcome = self.resolve_and_dispatch(Trigger::Navigate)?;
        if let Some(kind) = navigation_kind(options, &outcome) {
            metrics::record_navigation(kind);
        }
        Ok(outcome)
    }

    /// Handle a back/forward traversal. Always dispatches.
    pub fn handle_popstate(&self) -> Result<DispatchOutcome, NavigateError> {
        metrics::record_navigation("popstate");
        self.resolve_and_dispatch(Trigger::PopState)
    }

    /// Handle a click, navigating if it activates one of our links.
    pub fn handle_click(&self, event: &ClickEvent) -> Result<ClickOutcome, NavigateError> {
        let page = self.history().current_url()?;
        let Some(target) = intercepted_url(event, &page) else {
            return Ok(ClickOutcome::Ignored);
        };

        let mut destination = match self.inner.base.to_app_path(target.path()) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(error = %err, "Link outside base directory left to the browser");
                metrics::record_resolution_miss();
                return Ok(ClickOutcome::Ignored);
            }
        };
        if let Some(query) = target.query() {
            destination.push('?');
            destination.push_str(query);
        }
        if let Some(fragment) = target.fragment() {
            destination.push('#');
            destination.push_str(fragment);
        }

        metrics::record_link_intercept();
        let outcome = self.navigate(&destination, NavigateOptions::push())?;
        Ok(ClickOutcome::Intercepted(outcome))
    }

    /// The location of the latest resolve pass.
    pub fn location(&self) -> Option<Arc<LocationState>> {
        self.inner.current.load_full()
    }

    /// Generation of the latest dispatch (0 before the first).
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// True if `generation` belongs to the latest dispatch.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    pub fn base(&self) -> &BasePath {
        &self.inner.base
    }

    pub fn routes(&self) -> &RouteTable<RenderFn<M>> {
        &self.inner.table
    }

    fn history(&self) -> MutexGuard<'_, Box<dyn History>> {
        self.inner
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve_and_dispatch(&self, trigger: Trigger) -> Result<DispatchOutcome, NavigateError> {
        let url = self.history().current_url()?;
        let location = match LocationState::from_url(&url, &self.inner.base) {
            Ok(location) => Arc::new(location),
            Err(err) => {
                tracing::warn!(error = %err, ?trigger, "Navigation outside base directory ignored");
                metrics::record_resolution_miss();
                return Ok(DispatchOutcome::OutsideBase);
            }
        };

        if trigger == Trigger::Navigate {
            if let Some(current) = self.inner.current.load_full() {
                if current.same_location(&location) {
                    tracing::debug!(path = %location.path(), "Location unchanged, dispatch skipped");
                    return Ok(DispatchOutcome::Unchanged);
                }
            }
        }
        self.inner.current.store(Some(Arc::clone(&location)));

        let Some(resolved) = self.inner.table.resolve(location.path()) else {
            tracing::debug!(path = %location.path(), "No route matched");
            return Ok(DispatchOutcome::NoMatch);
        };

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let template = resolved.route.template().to_string();
        let render = Arc::clone(resolved.route.handler());

        tracing::debug!(
            template = %template,
            path = %location.path(),
            generation,
            ?trigger,
            "Dispatching"
        );
        metrics::record_dispatch(&template);

        render(RenderContext {
            mount: self.inner.mount.clone(),
            params: resolved.params,
            location,
            template: template.clone(),
            generation,
            navigator: Navigator::new(self.clone()),
        });

        self.reflect_active(generation);
        Ok(DispatchOutcome::Dispatched {
            generation,
            template,
        })
    }

    fn reflect_active(&self, generation: u64) {
        // A redirect from inside the render already reflected its own location.
        if !self.is_current(generation) {
            return;
        }
        if let Some(location) = self.location() {
            self.inner
                .nav
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .reflect(&location);
        }
    }
}

/// Counter label for a programmatic navigation, or `None` when nothing changed.
fn navigation_kind(options: NavigateOptions, outcome: &DispatchOutcome) -> Option<&'static str> {
    match outcome {
        DispatchOutcome::Unchanged | DispatchOutcome::OutsideBase => None,
        DispatchOutcome::Dispatched { .. } | DispatchOutcome::NoMatch => {
            Some(if options.replace { "replace" } else { "push" })
        }
    }
}

fn upgrade<M>(weak: &Weak<RouterInner<M>>) -> Option<Router<M>> {
    weak.upgrade().map(|inner| Router { inner })
}

/// Builder for `Router`; templates are compiled in `build`.
pub struct RouterBuilder<M> {
    history: Box<dyn History>,
    base: BasePath,
    mount: Option<M>,
    routes: Vec<(String, RenderFn<M>)>,
    nav: ActiveNavReflector,
}

impl<M> RouterBuilder<M>
where
    M: Clone + Send + Sync + 'static,
{
    pub fn new(history: impl History + 'static) -> Self {
        Self {
            history: Box::new(history),
            base: BasePath::root(),
            mount: None,
            routes: Vec::new(),
            nav: ActiveNavReflector::new(),
        }
    }

    /// Directory the site is served from.
    pub fn base_dir(mut self, base_dir: &str) -> Self {
        self.base = BasePath::new(base_dir);
        self
    }

    /// Mount point passed to every render function.
    pub fn mount(mut self, mount: M) -> Self {
        self.mount = Some(mount);
        self
    }

    /// Register a route. Routes are matched in registration order.
    pub fn route<F>(mut self, template: impl Into<String>, render: F) -> Self
    where
        F: Fn(RenderContext<M>) + Send + Sync + 'static,
    {
        self.routes.push((template.into(), Arc::new(render)));
        self
    }

    /// Register a navigation link to reflect after each dispatch.
    pub fn nav_link(mut self, href: &str, marker: impl LinkMarker + 'static) -> Self {
        self.nav.add(href, Box::new(marker));
        self
    }

    /// Compile all templates and build the router.
    pub fn build(self) -> Result<Router<M>, TemplateError> {
        let table = RouteTable::from_routes(self.routes)?;
        Ok(Router {
            inner: Arc::new(RouterInner {
                table,
                base: self.base,
                mount: self.mount,
                history: Mutex::new(self.history),
                current: ArcSwapOption::empty(),
                generation: AtomicU64::new(0),
                nav: Mutex::new(self.nav),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{AnchorInfo, LinkState, MemoryHistory, MemoryLink, Modifiers};
    use std::sync::Mutex as StdMutex;

    type Log = Arc<StdMutex<Vec<String>>>;

    fn recorder(log: &Log, name: &'static str) -> impl Fn(RenderContext<()>) + Send + Sync {
        let log = log.clone();
        move |ctx| {
            let params: Vec<String> = ctx.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            log.lock()
                .unwrap()
                .push(format!("{name} {} [{}]", ctx.location.app_href(), params.join(",")));
        }
    }

    fn site(start: &str) -> (Router, MemoryHistory, Log) {
        let history = MemoryHistory::parse(start).unwrap();
        let log: Log = Arc::default();
        let router = Router::builder(history.clone())
            .base_dir("/app")
            .route("/", recorder(&log, "home"))
            .route("/guides", recorder(&log, "guides"))
            .route("/guides/:slug", recorder(&log, "guide"))
            .route("*", recorder(&log, "not-found"))
            .build()
            .unwrap();
        (router, history, log)
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn test_start_dispatches_deep_link() {
        let (router, history, log) = site("https://example.com/app/guides/history-api");
        let outcome = router.start().unwrap();

        assert_eq!(outcome.template(), Some("/guides/:slug"));
        assert_eq!(entries(&log), vec!["guide /guides/history-api [slug=history-api]"]);
        assert_eq!(history.len(), 1);
        assert_eq!(router.generation(), 1);
    }

    #[test]
    fn test_navigate_pushes_and_dispatches() {
        let (router, history, log) = site("https://example.com/app/");
        router.start().unwrap();

        router.navigate("/guides", NavigateOptions::push()).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(
            history.current_url().unwrap().as_str(),
            "https://example.com/app/guides"
        );
        assert_eq!(entries(&log).last().unwrap(), "guides /guides []");
    }

    #[test]
    fn test_redundant_navigation_is_suppressed() {
        let (router, history, log) = site("https://example.com/app/");
        router.start().unwrap();

        let first = router.navigate("/guides/a", NavigateOptions::push()).unwrap();
        let second = router.navigate("/guides/a", NavigateOptions::push()).unwrap();
        assert!(first.is_dispatched());
        assert_eq!(second, DispatchOutcome::Unchanged);
        assert_eq!(history.len(), 2);
        assert_eq!(entries(&log).len(), 2);

        let third = router.navigate("/guides/a?tab=2", NavigateOptions::push()).unwrap();
        assert!(third.is_dispatched());
        assert_eq!(history.len(), 3);
        assert_eq!(router.location().unwrap().search(), "?tab=2");
    }

    #[test]
    fn test_replace_does_not_grow_history() {
        let (router, history, _log) = site("https://example.com/app/");
        router.start().unwrap();

        router.navigate("/guides", NavigateOptions::replace()).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_url().unwrap().path(), "/app/guides");
    }

    #[test]
    fn test_relative_destination_is_usage_error() {
        let (router, history, log) = site("https://example.com/app/");
        for bad in ["relative/path", "guides", "", "?q=1", "#top"] {
            assert!(matches!(
                router.navigate(bad, NavigateOptions::push()),
                Err(NavigateError::NotAbsolute(_))
            ));
        }
        assert_eq!(history.len(), 1);
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_catch_all_receives_path() {
        let (router, _history, log) = site("https://example.com/app/");
        router.start().unwrap();

        let outcome = router.navigate("/nonexistent", NavigateOptions::push()).unwrap();
        assert_eq!(outcome.template(), Some("*"));
        assert_eq!(entries(&log).last().unwrap(), "not-found /nonexistent [path=/nonexistent]");
    }

    #[test]
    fn test_no_catch_all_is_noop() {
        let history = MemoryHistory::parse("https://example.com/missing").unwrap();
        let router = Router::builder(history).route("/", |_| {}).build().unwrap();
        assert_eq!(router.start().unwrap(), DispatchOutcome::NoMatch);
        assert_eq!(router.generation(), 0);
    }

    #[test]
    fn test_outside_base_is_ignored() {
        let (router, _history, log) = site("https://example.com/elsewhere");
        assert_eq!(router.start().unwrap(), DispatchOutcome::OutsideBase);
        assert!(entries(&log).is_empty());
        assert!(router.location().is_none());
    }

    #[test]
    fn test_popstate_always_dispatches() {
        let (router, history, log) = site("https://example.com/app/");
        router.start().unwrap();
        router.navigate("/guides", NavigateOptions::push()).unwrap();

        assert!(history.back());
        assert_eq!(entries(&log).last().unwrap(), "home / []");
        assert!(history.forward());
        assert_eq!(entries(&log).last().unwrap(), "guides /guides []");
        assert_eq!(entries(&log).len(), 4);
    }

    #[test]
    fn test_click_interception() {
        let (router, history, log) = site("https://example.com/app/");
        router.start().unwrap();

        let prevented = history.click(&ClickEvent::on_link(AnchorInfo::new("/app/guides/x#intro")));
        assert!(prevented);
        assert_eq!(entries(&log).last().unwrap(), "guide /guides/x#intro [slug=x]");

        let blank = ClickEvent::on_link(AnchorInfo::new("/app/guides").with_target("_blank"));
        assert!(!history.click(&blank));

        let meta = ClickEvent::on_link(AnchorInfo::new("/app/guides"))
            .with_modifiers(Modifiers { meta: true, ..Default::default() });
        assert!(!history.click(&meta));

        assert_eq!(entries(&log).len(), 2);
    }

    #[test]
    fn test_click_outside_base_is_left_to_browser() {
        let (router, _history, _log) = site("https://example.com/app/");
        router.start().unwrap();
        let outcome = router
            .handle_click(&ClickEvent::on_link(AnchorInfo::new("/blog/post")))
            .unwrap();
        assert_eq!(outcome, ClickOutcome::Ignored);
    }

    #[test]
    fn test_redirect_from_render() {
        let history = MemoryHistory::parse("https://example.com/old").unwrap();
        let log: Log = Arc::default();
        let router = Router::builder(history.clone())
            .route("/old", |ctx: RenderContext<()>| {
                ctx.navigate("/new", NavigateOptions::replace()).unwrap();
            })
            .route("/new", recorder(&log, "new"))
            .build()
            .unwrap();

        router.start().unwrap();
        assert_eq!(entries(&log), vec!["new /new []"]);
        assert_eq!(history.len(), 1);
        assert_eq!(router.location().unwrap().path(), "/new");
        assert_eq!(router.generation(), 2);
    }

    #[test]
    fn test_mount_is_passed_to_render() {
        let history = MemoryHistory::parse("https://example.com/").unwrap();
        let seen = Arc::new(StdMutex::new(None));
        let sink = seen.clone();
        let router = RouterBuilder::new(history)
            .mount("#app".to_string())
            .route("/", move |ctx: RenderContext<String>| {
                *sink.lock().unwrap() = ctx.mount.clone();
            })
            .build()
            .unwrap();

        router.start().unwrap();
        assert_eq!(seen.lock().unwrap().as_deref(), Some("#app"));
    }

    #[test]
    fn test_nav_links_reflect_location() {
        let history = MemoryHistory::parse("https://example.com/").unwrap();
        let home = MemoryLink::new();
        let guides = MemoryLink::new();
        let router = Router::builder(history)
            .route("/", |_| {})
            .route("/guides/:slug", |_| {})
            .nav_link("/", home.clone())
            .nav_link("/guides", guides.clone())
            .build()
            .unwrap();

        router.start().unwrap();
        assert_eq!(home.state(), LinkState::Current);
        assert_eq!(guides.state(), LinkState::Inactive);

        router.navigate("/guides/history-api", NavigateOptions::push()).unwrap();
        assert_eq!(home.state(), LinkState::Inactive);
        assert_eq!(guides.state(), LinkState::Ancestor);
    }

    #[test]
    fn test_invalid_template_fails_build() {
        let history = MemoryHistory::parse("https://example.com/").unwrap();
        let err = Router::builder(history)
            .route("/files/:path*/raw", |_| {})
            .build()
            .unwrap_err();
        assert!(matches!(err, TemplateError::SplatNotTerminal { .. }));
    }

    #[test]
    fn test_independent_routers_do_not_share_state() {
        let (a, _, log_a) = site("https://example.com/app/");
        let (b, _, log_b) = site("https://example.com/app/guides");
        a.start().unwrap();
        b.start().unwrap();
        a.navigate("/guides/x", NavigateOptions::push()).unwrap();

        assert_eq!(a.generation(), 2);
        assert_eq!(b.generation(), 1);
        assert_eq!(entries(&log_a).len(), 2);
        assert_eq!(entries(&log_b), vec!["guides /guides []"]);
    }

    #[test]
    fn test_dot_segments_cannot_leave_base() {
        let (router, history, log) = site("https://example.com/app/");
        router.start().unwrap();

        for destination in ["/../outside", "/guides/../../x", "/./../app-other"] {
            let outcome = router.navigate(destination, NavigateOptions::push()).unwrap();
            assert_eq!(outcome, DispatchOutcome::OutsideBase, "{destination}");
        }
        assert_eq!(history.len(), 1);
        assert_eq!(entries(&log).len(), 1);

        let outcome = router.navigate("/guides/../notes", NavigateOptions::push()).unwrap();
        assert_eq!(outcome.template(), Some("*"));
        assert_eq!(history.entries()[1].path(), "/app/notes");
    }

    #[test]
    fn test_navigation_kind_ignores_no_op_calls() {
        let dispatched = DispatchOutcome::Dispatched {
            generation: 1,
            template: "/".into(),
        };
        assert_eq!(navigation_kind(NavigateOptions::push(), &dispatched), Some("push"));
        assert_eq!(navigation_kind(NavigateOptions::replace(), &DispatchOutcome::NoMatch), Some("replace"));
        assert_eq!(navigation_kind(NavigateOptions::push(), &DispatchOutcome::Unchanged), None);
        assert_eq!(navigation_kind(NavigateOptions::replace(), &DispatchOutcome::OutsideBase), None);
    }
}
