use ::core::fmt;

/// Direction of a security query.
///
/// The numeric values are the type byte carried in the high octet of the
/// first header word. Unrecognised bytes collapse into
/// [`QueryType::InvalidType`] rather than failing the parse, so that a reply
/// can still echo the sequence number of the offending query.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum QueryType {
    /// A query expecting an answer from the peer.
    Request = 0x00,
    /// An answer to an earlier request.
    Response = 0x10,
    /// A one-way query; used for all queries the manager originates.
    Notification = 0x20,
    /// Placeholder for type bytes not understood by this implementation.
    InvalidType = 0xFF,
}

impl QueryType {
    /// Query types that may legitimately appear on the wire.
    pub const VALID: [QueryType; 3] = [
        QueryType::Request,
        QueryType::Response,
        QueryType::Notification,
    ];

    /// Returns the type byte expected on the wire.
    #[must_use]
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decodes a type byte, mapping unknown values to [`QueryType::InvalidType`].
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0x00 => Self::Request,
            0x10 => Self::Response,
            0x20 => Self::Notification,
            _ => Self::InvalidType,
        }
    }

    /// Reports whether the type is one of [`QueryType::VALID`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::InvalidType)
    }

    /// Returns the protocol identifier for this query type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Request => "REQUEST",
            Self::Response => "RESPONSE",
            Self::Notification => "NOTIFICATION",
            Self::InvalidType => "INVALID_QUERY_TYPE",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<u8> for QueryType {
    fn from(value: u8) -> Self {
        Self::from_u8(value)
    }
}

impl From<QueryType> for u8 {
    fn from(value: QueryType) -> Self {
        value.as_u8()
    }
}
