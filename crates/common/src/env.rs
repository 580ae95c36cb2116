//! Environment variable names shared by the wrapper and the service that
//! launches it.

/// Address of the coordinating service (resolver and reporter).
pub const KEY_DESTINATION: &str = "INTERCEPT_REPORT_DESTINATION";
/// Presence enables verbose logging when running as a wrapper.
pub const KEY_VERBOSE: &str = "INTERCEPT_VERBOSE";
/// Upper bound for a resolve round-trip, in milliseconds.
pub const KEY_RESOLVE_TIMEOUT_MS: &str = "INTERCEPT_RESOLVE_TIMEOUT_MS";
/// Upper bound for delivering one lifecycle event, in milliseconds.
pub const KEY_REPORT_TIMEOUT_MS: &str = "INTERCEPT_REPORT_TIMEOUT_MS";
