use ::core::fmt;

use thiserror::Error;

/// Error identifiers carried in the `id` field of internal-error reports.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum InternalErrorCode {
    /// No error.
    Success = 0x00,
    /// A query was too short or declared an unusable payload size.
    InvalidQuerySize = 0x01,
    /// The query identifier is not recognised.
    InvalidQueryId = 0x02,
    /// The operation is unavailable, usually because no crypto engine is bound.
    NotSupported = 0x03,
    /// The connection already carries a TLS context.
    ServiceAlreadyProtected = 0x04,
    /// The crypto engine could not create a TLS context.
    CreateSsl = 0x05,
    /// Handshake data arrived for a connection without a TLS context.
    ServiceNotProtected = 0x06,
    /// Protected data could not be decrypted.
    DecryptionFailed = 0x07,
    /// Outgoing data could not be encrypted.
    EncryptionFailed = 0x08,
    /// The TLS engine rejected the handshake data.
    SslInvalidData = 0x09,
    /// The failure could not be classified.
    UnknownInternalError = 0xFE,
    /// A caller broke the manager's usage contract.
    Internal = 0xFF,
}

/// Error returned when a numeric error identifier is not known.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("unknown internal error code {0:#04x}")]
pub struct UnknownErrorCode(pub u8);

impl InternalErrorCode {
    /// Every known error code ordered by numeric value.
    pub const ALL: [InternalErrorCode; 12] = [
        InternalErrorCode::Success,
        InternalErrorCode::InvalidQuerySize,
        InternalErrorCode::InvalidQueryId,
        InternalErrorCode::NotSupported,
        InternalErrorCode::ServiceAlreadyProtected,
        InternalErrorCode::CreateSsl,
        InternalErrorCode::ServiceNotProtected,
        InternalErrorCode::DecryptionFailed,
        InternalErrorCode::EncryptionFailed,
        InternalErrorCode::SslInvalidData,
        InternalErrorCode::UnknownInternalError,
        InternalErrorCode::Internal,
    ];

    /// Returns the numeric identifier placed in the report.
    #[must_use]
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Looks up a code by its numeric identifier.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Success),
            0x01 => Some(Self::InvalidQuerySize),
            0x02 => Some(Self::InvalidQueryId),
            0x03 => Some(Self::NotSupported),
            0x04 => Some(Self::ServiceAlreadyProtected),
            0x05 => Some(Self::CreateSsl),
            0x06 => Some(Self::ServiceNotProtected),
            0x07 => Some(Self::DecryptionFailed),
            0x08 => Some(Self::EncryptionFailed),
            0x09 => Some(Self::SslInvalidData),
            0xFE => Some(Self::UnknownInternalError),
            0xFF => Some(Self::Internal),
            _ => None,
        }
    }

    /// Returns the protocol identifier of the code.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Success => "ERROR_SUCCESS",
            Self::InvalidQuerySize => "ERROR_INVALID_QUERY_SIZE",
            Self::InvalidQueryId => "ERROR_INVALID_QUERY_ID",
            Self::NotSupported => "ERROR_NOT_SUPPORTED",
            Self::ServiceAlreadyProtected => "ERROR_SERVICE_ALREADY_PROTECTED",
            Self::CreateSsl => "ERROR_CREATE_SSL",
            Self::ServiceNotProtected => "ERROR_SERVICE_NOT_PROTECTED",
            Self::DecryptionFailed => "ERROR_DECRYPTION_FAILED",
            Self::EncryptionFailed => "ERROR_ENCRYPTION_FAILED",
            Self::SslInvalidData => "ERROR_SSL_INVALID_DATA",
            Self::UnknownInternalError => "ERROR_UNKNOWN_INTERNAL_ERROR",
            Self::Internal => "ERROR_INTERNAL",
        }
    }
}

impl fmt::Display for InternalErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for InternalErrorCode {
    type Error = UnknownErrorCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(UnknownErrorCode(value))
    }
}

impl From<InternalErrorCode> for u8 {
    fn from(value: InternalErrorCode) -> Self {
        value.as_u8()
    }
}
