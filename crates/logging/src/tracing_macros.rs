//! crates/logging/src/tracing_macros.rs
//! Convenience macros for subsystem debug traces.
//!
//! These wrap [`tracing::debug!`] with the matching subsystem target. Events
//! at other levels use the tracing macros directly with the exported target
//! constants.

/// Emit a query framing trace.
///
/// # Example
/// ```ignore
/// trace_query!("parsed {} byte frame", len);
/// ```
#[macro_export]
macro_rules! trace_query {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "security::query", $($arg)*);
    };
}

/// Emit a handshake trace.
///
/// # Example
/// ```ignore
/// trace_handshake!(connection_key = %key, "received {} bytes", len);
/// ```
#[macro_export]
macro_rules! trace_handshake {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "security::handshake", $($arg)*);
    };
}

/// Emit a listener registry trace.
///
/// # Example
/// ```ignore
/// trace_listener!("{} listeners registered", count);
/// ```
#[macro_export]
macro_rules! trace_listener {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "security::listener", $($arg)*);
    };
}

/// Emit a pipeline trace.
///
/// # Example
/// ```ignore
/// trace_pipeline!("queued query");
/// ```
#[macro_export]
macro_rules! trace_pipeline {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "security::pipeline", $($arg)*);
    };
}
