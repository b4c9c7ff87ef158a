use thiserror::Error;

use super::constants::HEADER_LEN;

/// Failures encountered while parsing or constructing security queries.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum QueryError {
    /// Fewer than [`HEADER_LEN`] bytes were available for the header.
    #[error("security query header truncated: expected {HEADER_LEN} bytes, got {actual}")]
    TruncatedHeader {
        /// Number of bytes that were available when decoding began.
        actual: usize,
    },
    /// The header's payload size disagrees with the bytes that follow it.
    #[error("security query declares {declared} payload bytes but carries {actual}")]
    PayloadSizeMismatch {
        /// Payload size recorded in the header.
        declared: u32,
        /// Number of payload bytes actually present.
        actual: usize,
    },
    /// The payload cannot be described by the 32-bit size field.
    #[error("security query payload of {0} bytes exceeds the 32-bit size field")]
    OversizedPayload(usize),
}
