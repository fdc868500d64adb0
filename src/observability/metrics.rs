//! Navigation metrics.
//!
//! # Metrics
//! - `router_dispatch_total` (counter): dispatches by matched template
//! - `router_navigation_total` (counter): navigations by kind
//!   (initial, push, replace, popstate); unchanged and out-of-base calls are not counted
//! - `router_resolution_miss_total` (counter): URLs outside the base directory
//! - `router_link_intercept_total` (counter): clicks taken over by the router
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the host installs a recorder
//! - Without a recorder every call is a no-op

/// Record a dispatch to `template`.
pub fn record_dispatch(template: &str) {
    ::metrics::counter!("router_dispatch_total", "template" => template.to_string()).increment(1);
}

/// Record a navigation of the given kind.
pub fn record_navigation(kind: &'static str) {
    ::metrics::counter!("router_navigation_total", "kind" => kind).increment(1);
}

/// Record a URL that could not be mapped to an app path.
pub fn record_resolution_miss() {
    ::metrics::counter!("router_resolution_miss_total").increment(1);
}

/// Record an intercepted link click.
pub fn record_link_intercept() {
    ::metrics::counter!("router_link_intercept_total").increment(1);
}
