//! Active-navigation reflection.
//!
//! After every dispatch each registered navigation link is marked `Current`
//! when it points at the current path, `Ancestor` when the current path lies
//! beneath it, and `Inactive` otherwise. The root link is only ever `Current`.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::navigation::location::{normalize_path, split_suffix, LocationState};

/// Visual state of a navigation link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    #[default]
    Inactive,
    Ancestor,
    Current,
}

/// Compute the state of a link to `link_path` while `current_path` is shown.
pub fn link_state(link_path: &str, current_path: &str) -> LinkState {
    if link_path == current_path {
        LinkState::Current
    } else if link_path != "/"
        && current_path
            .strip_prefix(link_path)
            .is_some_and(|rest| rest.starts_with('/'))
    {
        LinkState::Ancestor
    } else {
        LinkState::Inactive
    }
}

/// Receives state changes for one navigation link.
pub trait LinkMarker: Send {
    fn mark(&mut self, state: LinkState);
}

struct NavLink {
    path: String,
    marker: Box<dyn LinkMarker>,
}

/// Fixed set of navigation links, collected when the router is built.
#[derive(Default)]
pub struct ActiveNavReflector {
    links: Vec<NavLink>,
}

impl ActiveNavReflector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a link by its app path; any query or fragment is ignored.
    pub fn add(&mut self, href: &str, marker: Box<dyn LinkMarker>) {
        let (path, _) = split_suffix(href);
        self.links.push(NavLink {
            path: normalize_path(path),
            marker,
        });
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Mark every link against `location`.
    pub fn reflect(&mut self, location: &LocationState) {
        for link in &mut self.links {
            link.marker.mark(link_state(&link.path, location.path()));
        }
    }
}

impl std::fmt::Debug for ActiveNavReflector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveNavReflector")
            .field("links", &self.links.iter().map(|l| &l.path).collect::<Vec<_>>())
            .finish()
    }
}

/// A link marker that records its state in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLink {
    state: Arc<Mutex<LinkState>>,
}

impl MemoryLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LinkState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LinkMarker for MemoryLink {
    fn mark(&mut self, state: LinkState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::base_path::BasePath;
    use url::Url;

    fn location(path: &str) -> LocationState {
        let url = Url::parse(&format!("https://example.com{path}")).unwrap();
        LocationState::from_url(&url, &BasePath::root()).unwrap()
    }

    #[test]
    fn test_link_state_rules() {
        assert_eq!(link_state("/guides", "/guides"), LinkState::Current);
        assert_eq!(link_state("/guides", "/guides/history-api"), LinkState::Ancestor);
        assert_eq!(link_state("/guides", "/guidesx"), LinkState::Inactive);
        assert_eq!(link_state("/", "/guides"), LinkState::Inactive);
        assert_eq!(link_state("/", "/"), LinkState::Current);
    }

    #[test]
    fn test_reflect_marks_all_links() {
        let home = MemoryLink::new();
        let guides = MemoryLink::new();
        let notes = MemoryLink::new();

        let mut reflector = ActiveNavReflector::new();
        reflector.add("/", Box::new(home.clone()));
        reflector.add("/guides/", Box::new(guides.clone()));
        reflector.add("/notes?sort=asc", Box::new(notes.clone()));

        reflector.reflect(&location("/guides/history-api"));
        assert_eq!(home.state(), LinkState::Inactive);
        assert_eq!(guides.state(), LinkState::Ancestor);
        assert_eq!(notes.state(), LinkState::Inactive);

        reflector.reflect(&location("/notes"));
        assert_eq!(guides.state(), LinkState::Inactive);
        assert_eq!(notes.state(), LinkState::Current);
    }
}
