//! Binary framing for security queries exchanged on the control service.
//!
//! A frame is a fixed [`HEADER_LEN`]-byte header followed by exactly
//! `payload_size` payload bytes. All functions here are pure and may be
//! called from any thread.

mod constants;
mod error;
mod header;
mod message;
mod query_id;
mod query_type;

pub use constants::{HEADER_LEN, QUERY_ID_MASK};
pub use error::QueryError;
pub use header::QueryHeader;
pub use message::{SecurityQuery, serialize};
pub use query_id::QueryId;
pub use query_type::QueryType;

#[cfg(test)]
mod tests;
