use ::core::fmt;

use super::constants::QUERY_ID_MASK;

/// Identifier of the operation a security query carries.
///
/// Identifiers occupy the low 24 bits of the first header word. Values this
/// implementation does not recognise decode as [`QueryId::InvalidQueryId`];
/// the handshake coordinator answers those with an internal error.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u32)]
pub enum QueryId {
    /// Opaque TLS handshake bytes travelling between the two engines.
    SendHandshakeData = 0x01,
    /// A JSON `{id, text}` error report.
    SendInternalError = 0x02,
    /// Placeholder for identifiers not understood by this implementation.
    InvalidQueryId = 0x00FF_FFFF,
}

impl QueryId {
    /// Query identifiers that may legitimately appear on the wire.
    pub const VALID: [QueryId; 2] = [QueryId::SendHandshakeData, QueryId::SendInternalError];

    /// Returns the 24-bit identifier expected on the wire.
    #[must_use]
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Decodes an identifier, mapping unknown values to [`QueryId::InvalidQueryId`].
    ///
    /// Only the low 24 bits of `value` are considered.
    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        match value & QUERY_ID_MASK {
            0x01 => Self::SendHandshakeData,
            0x02 => Self::SendInternalError,
            _ => Self::InvalidQueryId,
        }
    }

    /// Reports whether the identifier is one of [`QueryId::VALID`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::InvalidQueryId)
    }

    /// Returns the protocol identifier for this query.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SendHandshakeData => "SEND_HANDSHAKE_DATA",
            Self::SendInternalError => "SEND_INTERNAL_ERROR",
            Self::InvalidQueryId => "INVALID_QUERY_ID",
        }
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<u32> for QueryId {
    fn from(value: u32) -> Self {
        Self::from_u32(value)
    }
}

impl From<QueryId> for u32 {
    fn from(value: QueryId) -> Self {
        value.as_u32()
    }
}
