//! Navigation surface subsystem.
//!
//! # Data Flow
//! ```text
//! Browser (or MemoryHistory)
//!     → history.rs (current URL, push/replace, popstate + click events)
//!     → links.rs (decide whether a click is ours)
//!     → base_path.rs (browser path → app path)
//!     → location.rs (immutable LocationState snapshot)
//!
//! After dispatch:
//!     LocationState → active.rs (mark navigation links)
//! ```
//!
//! # Design Decisions
//! - Everything browser-specific sits behind the `History` and `LinkMarker`
//!   ports; the rest of the crate is plain data and pure functions
//! - Snapshots are replaced, never mutated

pub mod active;
pub mod base_path;
pub mod history;
pub mod links;
pub mod location;

pub use active::{ActiveNavReflector, LinkMarker, LinkState, MemoryLink};
pub use base_path::BasePath;
pub use history::{History, MemoryHistory, NavigationListener};
pub use links::{AnchorInfo, ClickEvent, Modifiers};
pub use location::LocationState;
