//! Link activation model and the interception predicate.
//!
//! # Responsibilities
//! - Describe a click in terms independent of any DOM binding
//! - Decide whether a click should become a client-side navigation
//!
//! # Design Decisions
//! - Anything doubtful is left to the browser: modified clicks, non-primary
//!   buttons, new browsing contexts, downloads, external links, other origins
//! - The adapter supplies the nearest enclosing interactive element; if that
//!   element is not a hyperlink, `anchor` is `None`

use url::Url;

/// `MouseEvent.button` value of the primary button.
pub const PRIMARY_BUTTON: i16 = 0;

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.meta || self.ctrl || self.shift || self.alt
    }
}

/// The hyperlink a click landed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorInfo {
    /// The `href` attribute, resolved against the page URL when intercepted.
    pub href: String,
    /// The `target` attribute, if present.
    pub target: Option<String>,
    /// Whether the link carries a `download` attribute.
    pub download: bool,
    /// Whether the link is flagged external (`rel="external"` or `data-external`).
    pub external: bool,
}

impl AnchorInfo {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            target: None,
            download: false,
            external: false,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_download(mut self) -> Self {
        self.download = true;
        self
    }

    pub fn with_external(mut self) -> Self {
        self.external = true;
        self
    }

    fn opens_in_place(&self) -> bool {
        match self.target.as_deref() {
            None | Some("") => true,
            Some(t) => t.eq_ignore_ascii_case("_self"),
        }
    }
}

/// A click as seen by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub default_prevented: bool,
    pub button: i16,
    pub modifiers: Modifiers,
    pub anchor: Option<AnchorInfo>,
}

impl ClickEvent {
    /// A plain primary-button click on `anchor`.
    pub fn on_link(anchor: AnchorInfo) -> Self {
        Self {
            default_prevented: false,
            button: PRIMARY_BUTTON,
            modifiers: Modifiers::default(),
            anchor: Some(anchor),
        }
    }

    /// A primary-button click that did not land in a hyperlink.
    pub fn elsewhere() -> Self {
        Self {
            default_prevented: false,
            button: PRIMARY_BUTTON,
            modifiers: Modifiers::default(),
            anchor: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Returns the destination URL if the router should take over this click.
pub fn intercepted_url(event: &ClickEvent, page: &Url) -> Option<Url> {
    if event.default_prevented || event.button != PRIMARY_BUTTON || event.modifiers.any() {
        return None;
    }

    // An anchor without an href is not a hyperlink.
    let anchor = event.anchor.as_ref().filter(|a| !a.href.is_empty())?;
    if !anchor.opens_in_place() || anchor.download || anchor.external {
        return None;
    }

    let url = page.join(&anchor.href).ok()?;
    if url.origin() != page.origin() {
        return None;
    }
    Some(url)
}
