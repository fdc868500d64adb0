//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router and CLI produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (navigation counters)
//!
//! Consumers:
//!     → stderr (pretty or JSON)
//!     → whatever metrics recorder the host installs
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
