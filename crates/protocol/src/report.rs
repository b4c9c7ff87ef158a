use serde::{Deserialize, Serialize};

use crate::error_code::InternalErrorCode;

/// JSON body of a `SendInternalError` query: `{"id": <code>, "text": <message>}`.
///
/// The `id` is kept as a raw byte so that codes forwarded verbatim from a
/// session registry survive even when they are not an [`InternalErrorCode`].
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Numeric error identifier.
    #[serde(default)]
    pub id: u8,
    /// Human readable description.
    #[serde(default)]
    pub text: String,
}

impl ErrorReport {
    /// Creates a report from a raw identifier and description.
    pub fn new(id: u8, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Creates a report for a known error code.
    pub fn from_code(code: InternalErrorCode, text: impl Into<String>) -> Self {
        Self::new(code.as_u8(), text)
    }

    /// Returns the identifier as a known code when it is one.
    #[must_use]
    pub const fn code(&self) -> Option<InternalErrorCode> {
        InternalErrorCode::from_u8(self.id)
    }

    /// Renders the report as compact JSON bytes ready to become a query payload.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parses a report from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
