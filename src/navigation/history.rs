//! The history port.
//!
//! # Responsibilities
//! - Read the current URL
//! - Push or replace history entries
//! - Deliver back/forward and click events to the router
//!
//! # Design Decisions
//! - Pushing or replacing never emits an event; the router re-dispatches itself
//! - `MemoryHistory` is a cloneable handle so tests keep a copy while the
//!   router owns another
//! - Listeners are invoked with no internal lock held, so they may call back
//!   into the history

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use url::Url;

use crate::error::HistoryError;
use crate::navigation::links::ClickEvent;

type PopStateFn = dyn Fn() + Send + Sync;
type ClickFn = dyn Fn(&ClickEvent) -> bool + Send + Sync;

/// Callbacks a history adapter invokes for user-driven navigation.
#[derive(Clone)]
pub struct NavigationListener {
    on_popstate: Arc<PopStateFn>,
    on_click: Arc<ClickFn>,
}

impl NavigationListener {
    pub fn new<P, C>(on_popstate: P, on_click: C) -> Self
    where
        P: Fn() + Send + Sync + 'static,
        C: Fn(&ClickEvent) -> bool + Send + Sync + 'static,
    {
        Self {
            on_popstate: Arc::new(on_popstate),
            on_click: Arc::new(on_click),
        }
    }

    /// Deliver a back/forward traversal.
    pub fn popstate(&self) {
        (self.on_popstate)()
    }

    /// Deliver a click. Returns true if the default action must be prevented.
    pub fn click(&self, event: &ClickEvent) -> bool {
        (self.on_click)(event)
    }
}

impl std::fmt::Debug for NavigationListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationListener").finish_non_exhaustive()
    }
}

/// Browser history and location, as consumed by the router.
pub trait History: Send {
    /// The page's current URL.
    fn current_url(&self) -> Result<Url, HistoryError>;

    /// Add a new entry for `url`.
    fn push_state(&mut self, url: &Url) -> Result<(), HistoryError>;

    /// Overwrite the current entry with `url`.
    fn replace_state(&mut self, url: &Url) -> Result<(), HistoryError>;

    /// Subscribe to back/forward and click events.
    fn listen(&mut self, listener: NavigationListener) -> Result<(), HistoryError>;
}

#[derive(Debug)]
struct MemoryState {
    entries: Vec<Url>,
    index: usize,
    listener: Option<NavigationListener>,
}

/// In-memory history stack.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    inner: Arc<Mutex<MemoryState>>,
}

impl MemoryHistory {
    pub fn new(initial: Url) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryState {
                entries: vec![initial],
                index: 0,
                listener: None,
            })),
        }
    }

    /// Start from a URL string.
    pub fn parse(initial: &str) -> Result<Self, HistoryError> {
        let url = Url::parse(initial).map_err(|source| HistoryError::InvalidUrl {
            url: initial.to_string(),
            source,
        })?;
        Ok(Self::new(url))
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of entries in the stack.
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }

    /// Position of the current entry.
    pub fn index(&self) -> usize {
        self.state().index
    }

    pub fn entries(&self) -> Vec<Url> {
        self.state().entries.clone()
    }

    /// Step back one entry and emit popstate. Returns false at the start of the stack.
    pub fn back(&self) -> bool {
        self.traverse(-1)
    }

    /// Step forward one entry and emit popstate. Returns false at the end of the stack.
    pub fn forward(&self) -> bool {
        self.traverse(1)
    }

    /// Simulate a user click. Returns true if the listener prevented the default action.
    pub fn click(&self, event: &ClickEvent) -> bool {
        let listener = self.state().listener.clone();
        listener.is_some_and(|l| l.click(event))
    }

    fn traverse(&self, delta: isize) -> bool {
        let listener = {
            let mut state = self.state();
            let Some(target) = state.index.checked_add_signed(delta) else {
                return false;
            };
            if target >= state.entries.len() {
                return false;
            }
            state.index = target;
            state.listener.clone()
        };

        if let Some(listener) = listener {
            listener.popstate();
        }
        true
    }
}

impl History for MemoryHistory {
    fn current_url(&self) -> Result<Url, HistoryError> {
        let state = self.state();
        Ok(state.entries[state.index].clone())
    }

    fn push_state(&mut self, url: &Url) -> Result<(), HistoryError> {
        let mut state = self.state();
        let next = state.index + 1;
        state.entries.truncate(next);
        state.entries.push(url.clone());
        state.index = next;
        Ok(())
    }

    fn replace_state(&mut self, url: &Url) -> Result<(), HistoryError> {
        let mut state = self.state();
        let index = state.index;
        state.entries[index] = url.clone();
        Ok(())
    }

    fn listen(&mut self, listener: NavigationListener) -> Result<(), HistoryError> {
        self.state().listener = Some(listener);
        Ok(())
    }
}
