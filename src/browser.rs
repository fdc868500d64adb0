//! Browser binding of the history and link ports.
//!
//! # Responsibilities
//! - Read `window.location` and drive `window.history`
//! - Forward `popstate` and document clicks to the router
//! - Mark `[data-nav-link]` anchors with `aria-current` and an `active` class
//!
//! # Design Decisions
//! - Listener closures live for the lifetime of the page (`forget`)
//! - `preventDefault` is called only for clicks the router intercepted
//! - Nav links are addressed by index into the collected list, so markers
//!   hold no JS handles

use url::Url;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlAnchorElement, MouseEvent, Window};

use crate::error::HistoryError;
use crate::navigation::{
    AnchorInfo, BasePath, ClickEvent, History, LinkMarker, LinkState, Modifiers,
    NavigationListener,
};

/// Elements treated as interactive when locating the clicked control.
const INTERACTIVE: &str = "a, button, input, select, textarea, summary, label";

/// Selector for navigation links reflected after each dispatch.
pub const NAV_LINK_SELECTOR: &str = "[data-nav-link]";

/// Class added to current and ancestor nav links.
pub const ACTIVE_CLASS: &str = "active";

fn js_error(context: &str, err: JsValue) -> HistoryError {
    HistoryError::Unavailable(format!("{context}: {err:?}"))
}

fn window() -> Result<Window, HistoryError> {
    web_sys::window().ok_or_else(|| HistoryError::Unavailable("no window".into()))
}

fn document() -> Result<Document, HistoryError> {
    window()?
        .document()
        .ok_or_else(|| HistoryError::Unavailable("no document".into()))
}

/// `History` over the page's real location and history.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserHistory;

impl History for BrowserHistory {
    fn current_url(&self) -> Result<Url, HistoryError> {
        let href = window()?
            .location()
            .href()
            .map_err(|e| js_error("location.href", e))?;
        Url::parse(&href).map_err(|source| HistoryError::InvalidUrl { url: href, source })
    }

    fn push_state(&mut self, url: &Url) -> Result<(), HistoryError> {
        window()?
            .history()
            .map_err(|e| js_error("history", e))?
            .push_state_with_url(&JsValue::NULL, "", Some(url.as_str()))
            .map_err(|e| js_error("pushState", e))
    }

    fn replace_state(&mut self, url: &Url) -> Result<(), HistoryError> {
        window()?
            .history()
            .map_err(|e| js_error("history", e))?
            .replace_state_with_url(&JsValue::NULL, "", Some(url.as_str()))
            .map_err(|e| js_error("replaceState", e))
    }

    fn listen(&mut self, listener: NavigationListener) -> Result<(), HistoryError> {
        let window = window()?;

        let popstate = listener.clone();
        let on_popstate = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            popstate.popstate();
        });
        window
            .add_event_listener_with_callback("popstate", on_popstate.as_ref().unchecked_ref())
            .map_err(|e| js_error("addEventListener(popstate)", e))?;
        on_popstate.forget();

        let on_click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Ok(mouse) = event.dyn_into::<MouseEvent>() else {
                return;
            };
            if listener.click(&click_event(&mouse)) {
                mouse.prevent_default();
            }
        });
        document()?
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .map_err(|e| js_error("addEventListener(click)", e))?;
        on_click.forget();

        Ok(())
    }
}

fn click_event(event: &MouseEvent) -> ClickEvent {
    let anchor = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .and_then(|element| element.closest(INTERACTIVE).ok().flatten())
        .and_then(|element| element.dyn_into::<HtmlAnchorElement>().ok())
        .filter(|anchor| anchor.has_attribute("href"))
        .map(|anchor| anchor_info(&anchor));

    ClickEvent {
        default_prevented: event.default_prevented(),
        button: event.button(),
        modifiers: Modifiers {
            meta: event.meta_key(),
            ctrl: event.ctrl_key(),
            shift: event.shift_key(),
            alt: event.alt_key(),
        },
        anchor,
    }
}

fn anchor_info(anchor: &HtmlAnchorElement) -> AnchorInfo {
    let target = anchor.target();
    let rel_external = anchor.get_attribute("rel").is_some_and(|rel| {
        rel.split_whitespace()
            .any(|r| r.eq_ignore_ascii_case("external"))
    });

    AnchorInfo {
        href: anchor.href(),
        target: (!target.is_empty()).then_some(target),
        download: anchor.has_attribute("download"),
        external: rel_external || anchor.has_attribute("data-external"),
    }
}

/// A `[data-nav-link]` anchor, addressed by its position in the document.
#[derive(Debug, Clone, Copy)]
pub struct BrowserLink {
    index: u32,
}

impl BrowserLink {
    fn element(&self) -> Option<Element> {
        document()
            .ok()?
            .query_selector_all(NAV_LINK_SELECTOR)
            .ok()?
            .item(self.index)?
            .dyn_into::<Element>()
            .ok()
    }
}

impl LinkMarker for BrowserLink {
    fn mark(&mut self, state: LinkState) {
        let Some(element) = self.element() else {
            return;
        };
        let classes = element.class_list();
        let result = match state {
            LinkState::Current => element
                .set_attribute("aria-current", "page")
                .and_then(|_| classes.add_1(ACTIVE_CLASS)),
            LinkState::Ancestor => element
                .remove_attribute("aria-current")
                .and_then(|_| classes.add_1(ACTIVE_CLASS)),
            LinkState::Inactive => element
                .remove_attribute("aria-current")
                .and_then(|_| classes.remove_1(ACTIVE_CLASS)),
        };
        if let Err(err) = result {
            tracing::warn!(error = ?err, index = self.index, "Failed to mark nav link");
        }
    }
}

/// Collect every `[data-nav-link]` anchor with the app path it points at.
///
/// A non-empty `data-nav-link` value is taken as the app path; otherwise the
/// `href` attribute is converted through `base`. Links outside the base are skipped.
pub fn collect_nav_links(base: &BasePath) -> Result<Vec<(String, BrowserLink)>, HistoryError> {
    let nodes = document()?
        .query_selector_all(NAV_LINK_SELECTOR)
        .map_err(|e| js_error("querySelectorAll", e))?;

    let mut links = Vec::new();
    for index in 0..nodes.length() {
        let Some(element) = nodes
            .item(index)
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };

        let declared = element
            .get_attribute("data-nav-link")
            .filter(|v| !v.is_empty());
        let path = match declared {
            Some(path) => Some(path),
            None => element
                .get_attribute("href")
                .and_then(|href| base.to_app_path(&href).ok()),
        };

        if let Some(path) = path {
            links.push((path, BrowserLink { index }));
        }
    }
    Ok(links)
}
