//! Shared fixtures for router integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use spa_router::{MemoryHistory, RenderContext, Router};

/// Render log shared between render functions and the test.
pub type Log = Arc<Mutex<Vec<String>>>;

/// The routes used throughout the integration suite, in registration order.
pub const ROUTES: [(&str, &str); 5] = [
    ("/", "home"),
    ("/guides", "guides"),
    ("/guides/:slug", "guide"),
    ("/notes/:path*", "note"),
    ("*", "not-found"),
];

/// A router over an in-memory history, served from `/app`.
pub struct Site {
    pub router: Router,
    pub history: MemoryHistory,
    pub log: Log,
}

impl Site {
    /// Build and start a site whose first page is `start_url`.
    pub fn start(start_url: &str) -> Self {
        let site = Self::build(start_url);
        site.router.start().unwrap();
        site
    }

    /// Build without starting.
    pub fn build(start_url: &str) -> Self {
        let history = MemoryHistory::parse(start_url).unwrap();
        let log: Log = Arc::default();

        let mut builder = Router::builder(history.clone()).base_dir("/app");
        for (template, view) in ROUTES {
            builder = builder.route(template, recorder(&log, view));
        }

        Self {
            router: builder.build().unwrap(),
            history,
            log,
        }
    }

    /// Rendered lines so far, as `view href [name=value,...]`.
    pub fn renders(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Last rendered line.
    pub fn last_render(&self) -> Option<String> {
        self.log.lock().unwrap().last().cloned()
    }

    /// History entries as path plus query.
    pub fn history_paths(&self) -> Vec<String> {
        self.history
            .entries()
            .iter()
            .map(|url| match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            })
            .collect()
    }
}

/// Render function that appends one line per dispatch to `log`.
pub fn recorder(log: &Log, view: &'static str) -> impl Fn(RenderContext<()>) + Send + Sync {
    let log = Arc::clone(log);
    move |ctx| {
        let params: Vec<String> = ctx
            .params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        log.lock().unwrap().push(format!(
            "{view} {} [{}]",
            ctx.location.app_href(),
            params.join(",")
        ));
    }
}
