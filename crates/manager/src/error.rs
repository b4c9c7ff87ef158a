//! Failure paths of the handshake coordinator.

use protocol::{InternalErrorCode, QueryError};
use thiserror::Error;

/// Every way a security query or handshake operation can fail.
///
/// The `Display` text is exactly what the peer receives in the `text` field
/// of the internal error report.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// Inbound control payload could not be parsed as a query.
    #[error("Incorrect message received")]
    MalformedQuery(#[source] QueryError),

    /// No session registry has been bound.
    #[error("Invalid (NULL) SessionObserver.")]
    SessionObserverUnbound,

    /// Protection was requested before a crypto engine was bound.
    #[error("Invalid (NULL) CryptoManager.")]
    ProtectionUnsupported,

    /// A query arrived before a crypto engine was bound.
    #[error("Invalid (NULL) CryptoManager.")]
    CryptoManagerUnbound {
        /// Sequence number of the rejected query.
        seq_number: u32,
    },

    #[error("Connection is already protected")]
    AlreadyProtected,

    #[error("CryptoManager could not create SSL context.")]
    CreateSslContext,

    /// The registry refused the new context; `code` is forwarded verbatim.
    #[error("SessionObserver rejected the SSL context (status {code:#04x})")]
    RegistryRejected { code: u8 },

    /// The registry accepted the context but does not return it.
    #[error("SSL context is not available after installation")]
    ContextNotInstalled,

    #[error("StartHandshake failed, connection is not protected")]
    NotProtected,

    #[error("SendHandshakeData: null arguments size.")]
    EmptyHandshakeData { seq_number: u32 },

    #[error("SendHandshakeData: No ssl context.")]
    ServiceNotProtected { seq_number: u32 },

    /// The engine rejected the handshake input; `text` is its last error.
    #[error("{text}")]
    InvalidHandshakeData { seq_number: u32, text: String },

    #[error("Unknown query identifier.")]
    UnknownQueryId { seq_number: u32 },

    /// The peer's own error report was not valid JSON. Never echoed back.
    #[error("malformed internal error report: {0}")]
    MalformedErrorReport(#[source] serde_json::Error),

    /// The peer's own error report was not UTF-8 text. Never echoed back.
    #[error("internal error report is not valid UTF-8")]
    NonUtf8ErrorReport,

    /// The bounded inbound queue had no room for the query.
    #[error("Security query queue is full")]
    QueueFull { seq_number: u32 },
}

impl HandshakeError {
    /// Wire error id reported to the peer.
    #[must_use]
    pub const fn error_code(&self) -> InternalErrorCode {
        match self {
            Self::MalformedQuery(_) | Self::EmptyHandshakeData { .. } => {
                InternalErrorCode::InvalidQuerySize
            }
            Self::SessionObserverUnbound
            | Self::ContextNotInstalled
            | Self::NotProtected
            | Self::QueueFull { .. }
            | Self::RegistryRejected { code: 0 } => InternalErrorCode::Internal,
            Self::ProtectionUnsupported | Self::CryptoManagerUnbound { .. } => {
                InternalErrorCode::NotSupported
            }
            Self::AlreadyProtected => InternalErrorCode::ServiceAlreadyProtected,
            Self::CreateSslContext => InternalErrorCode::CreateSsl,
            Self::ServiceNotProtected { .. } => InternalErrorCode::ServiceNotProtected,
            Self::InvalidHandshakeData { .. } => InternalErrorCode::SslInvalidData,
            Self::UnknownQueryId { .. } => InternalErrorCode::InvalidQueryId,
            Self::RegistryRejected { .. }
            | Self::MalformedErrorReport(_)
            | Self::NonUtf8ErrorReport => InternalErrorCode::UnknownInternalError,
        }
    }

    /// Raw error id as sent on the wire.
    ///
    /// Registry rejections carry the registry's own status code, which need
    /// not be one of the known [`InternalErrorCode`] values. A status of zero
    /// would read as success and is sent as [`InternalErrorCode::Internal`].
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::RegistryRejected { code } if *code != InternalErrorCode::Success.as_u8() => *code,
            other => other.error_code().as_u8(),
        }
    }

    /// Sequence number echoed in the error report.
    #[must_use]
    pub const fn seq_number(&self) -> u32 {
        match self {
            Self::CryptoManagerUnbound { seq_number }
            | Self::EmptyHandshakeData { seq_number }
            | Self::ServiceNotProtected { seq_number }
            | Self::InvalidHandshakeData { seq_number, .. }
            | Self::UnknownQueryId { seq_number }
            | Self::QueueFull { seq_number } => *seq_number,
            _ => 0,
        }
    }

    /// Whether the failure concludes a handshake attempt.
    #[must_use]
    pub const fn notifies_listeners(&self) -> bool {
        !matches!(
            self,
            Self::MalformedQuery(_)
                | Self::CryptoManagerUnbound { .. }
                | Self::UnknownQueryId { .. }
                | Self::MalformedErrorReport(_)
                | Self::NonUtf8ErrorReport
                | Self::QueueFull { .. }
        )
    }

    /// Whether the peer is told about the failure.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        !matches!(
            self,
            Self::MalformedErrorReport(_) | Self::NonUtf8ErrorReport
        )
    }

    /// Whether the failure is expected often enough to log below error level.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::AlreadyProtected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_peer_visible_text() {
        assert_eq!(
            HandshakeError::AlreadyProtected.to_string(),
            "Connection is already protected"
        );
        assert_eq!(
            HandshakeError::UnknownQueryId { seq_number: 7 }.to_string(),
            "Unknown query identifier."
        );
        let engine = HandshakeError::InvalidHandshakeData {
            seq_number: 3,
            text: "bad record mac".to_owned(),
        };
        assert_eq!(engine.to_string(), "bad record mac");
    }

    #[test]
    fn codes_follow_failure_kind() {
        assert_eq!(HandshakeError::CreateSslContext.code(), 5);
        assert_eq!(HandshakeError::NotProtected.code(), 0xFF);
        assert_eq!(HandshakeError::EmptyHandshakeData { seq_number: 1 }.code(), 1);
        assert_eq!(HandshakeError::RegistryRejected { code: 0x42 }.code(), 0x42);
        assert_eq!(
            HandshakeError::CryptoManagerUnbound { seq_number: 9 }.error_code(),
            InternalErrorCode::NotSupported
        );
    }

    #[test]
    fn zero_registry_status_is_not_sent_as_success() {
        let error = HandshakeError::RegistryRejected { code: 0 };
        assert_eq!(error.code(), InternalErrorCode::Internal.as_u8());
        assert_eq!(error.error_code(), InternalErrorCode::Internal);
    }

    #[test]
    fn full_queue_echoes_seq_without_concluding_handshake() {
        let error = HandshakeError::QueueFull { seq_number: 14 };
        assert_eq!(error.seq_number(), 14);
        assert_eq!(error.error_code(), InternalErrorCode::Internal);
        assert!(error.is_reportable());
        assert!(!error.notifies_listeners());
    }

    #[test]
    fn seq_number_echoes_query() {
        assert_eq!(HandshakeError::ServiceNotProtected { seq_number: 11 }.seq_number(), 11);
        assert_eq!(HandshakeError::AlreadyProtected.seq_number(), 0);
    }

    #[test]
    fn only_handshake_outcomes_notify() {
        assert!(HandshakeError::AlreadyProtected.notifies_listeners());
        assert!(HandshakeError::ProtectionUnsupported.notifies_listeners());
        assert!(HandshakeError::EmptyHandshakeData { seq_number: 0 }.notifies_listeners());
        assert!(!HandshakeError::UnknownQueryId { seq_number: 0 }.notifies_listeners());
        assert!(!HandshakeError::CryptoManagerUnbound { seq_number: 0 }.notifies_listeners());
        let malformed = QueryError::TruncatedHeader { actual: 3 };
        assert!(!HandshakeError::MalformedQuery(malformed).notifies_listeners());
    }

    #[test]
    fn malformed_report_stays_local() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = HandshakeError::MalformedErrorReport(json_error);
        assert!(!error.is_reportable());
        assert!(!error.notifies_listeners());
        assert!(!HandshakeError::NonUtf8ErrorReport.is_reportable());
        assert!(!HandshakeError::NonUtf8ErrorReport.notifies_listeners());
    }
}
