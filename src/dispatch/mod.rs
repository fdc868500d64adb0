//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Trigger (navigate / popstate / intercepted click / start)
//!     → router.rs: Resolve (browser URL → LocationState)
//!     → router.rs: suppress if unchanged (navigate only)
//!     → routing::RouteTable (first match, else catch-all)
//!     → context.rs: RenderContext handed to the render function
//!     → navigation::active (mark nav links)
//! ```
//!
//! # Design Decisions
//! - Exactly one render call per dispatch
//! - Each dispatch gets a new generation; render functions use it to detect
//!   that a newer navigation superseded them
//! - Cancellation is cooperative: the router never interrupts a render

pub mod context;
pub mod router;

pub use context::{
    ClickOutcome, DispatchOutcome, NavigateOptions, Navigator, RenderContext, RenderFn,
};
pub use router::{Router, RouterBuilder};
