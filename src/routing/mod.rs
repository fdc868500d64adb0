//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     (template, handler)[]
//!     → template.rs (parse segments, build anchored regex)
//!     → table.rs (keep registration order, set aside the catch-all)
//!     → Freeze as immutable RouteTable
//!
//! Lookup (per navigation):
//!     app path
//!     → table.rs (scan in order)
//!     → matcher.rs (evaluate compiled pattern)
//!     → Return: route + params, catch-all + {path}, or no match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Malformed templates fail when the table is built, never at match time
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod matcher;
pub mod params;
pub mod table;
pub mod template;

pub use matcher::Matcher;
pub use params::RouteParams;
pub use table::{Resolved, RouteTable, CATCH_ALL_PARAM};
pub use template::{CompiledRoute, RouteTemplate, CATCH_ALL};
