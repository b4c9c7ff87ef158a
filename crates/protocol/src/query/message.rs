use crate::transport::ConnectionKey;

use super::constants::HEADER_LEN;
use super::error::QueryError;
use super::header::QueryHeader;
use super::query_id::QueryId;
use super::query_type::QueryType;

/// A parsed security query together with the connection it arrived on.
///
/// Instances are produced by [`SecurityQuery::parse`] and handed by value
/// through the inbound pipeline; each stage owns the query outright while it
/// processes it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SecurityQuery {
    header: QueryHeader,
    connection_key: ConnectionKey,
    data: Vec<u8>,
    json_message: Option<String>,
}

impl SecurityQuery {
    /// Builds an outbound query whose header size is derived from `data`.
    pub fn new(
        query_type: QueryType,
        query_id: QueryId,
        seq_number: u32,
        data: Vec<u8>,
    ) -> Result<Self, QueryError> {
        let header = QueryHeader::for_payload(query_type, query_id, seq_number, &data)?;
        Ok(Self::from_parts(header, data))
    }

    /// Parses one complete query frame.
    ///
    /// The frame must hold exactly one header and the number of payload
    /// bytes that header declares. For [`QueryId::SendInternalError`] the
    /// payload is additionally cached as text when it is valid UTF-8, so the
    /// JSON report can be inspected later without decoding it again.
    ///
    /// The returned query carries [`ConnectionKey::default`]; callers attach
    /// the real key with [`SecurityQuery::with_connection_key`].
    pub fn parse(bytes: &[u8]) -> Result<Self, QueryError> {
        let header = QueryHeader::decode(bytes)?;
        let payload = &bytes[HEADER_LEN..];
        if header.payload_size_usize() != payload.len() {
            return Err(QueryError::PayloadSizeMismatch {
                declared: header.payload_size(),
                actual: payload.len(),
            });
        }

        Ok(Self::from_parts(header, payload.to_vec()))
    }

    fn from_parts(header: QueryHeader, data: Vec<u8>) -> Self {
        let json_message = (header.query_id() == QueryId::SendInternalError)
            .then(|| String::from_utf8(data.clone()).ok())
            .flatten();
        Self {
            header,
            connection_key: ConnectionKey::default(),
            data,
            json_message,
        }
    }

    /// Encodes the query into a single wire frame.
    pub fn encode(&self) -> Result<Vec<u8>, QueryError> {
        serialize(self.header, &self.data)
    }

    /// Returns the query with its connection key replaced.
    #[must_use]
    pub fn with_connection_key(mut self, connection_key: ConnectionKey) -> Self {
        self.connection_key = connection_key;
        self
    }

    /// Sets the connection the query belongs to.
    pub fn set_connection_key(&mut self, connection_key: ConnectionKey) {
        self.connection_key = connection_key;
    }

    /// Returns the decoded header.
    #[must_use]
    #[inline]
    pub const fn header(&self) -> QueryHeader {
        self.header
    }

    /// Returns the connection the query belongs to.
    #[must_use]
    #[inline]
    pub const fn connection_key(&self) -> ConnectionKey {
        self.connection_key
    }

    /// Returns the payload bytes.
    #[must_use]
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the payload length in bytes.
    #[must_use]
    #[inline]
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Returns the cached JSON text of an internal-error query.
    ///
    /// `None` for every other query identifier, and for internal-error
    /// payloads that are not valid UTF-8.
    #[must_use]
    pub fn json_message(&self) -> Option<&str> {
        self.json_message.as_deref()
    }

    /// Consumes the query and returns its header and payload.
    #[must_use]
    pub fn into_parts(self) -> (QueryHeader, Vec<u8>) {
        (self.header, self.data)
    }
}

/// Encodes `header` followed by `payload` into a single wire frame.
///
/// The header's payload size must describe `payload` exactly, which keeps
/// every frame produced here acceptable to [`SecurityQuery::parse`].
pub fn serialize(header: QueryHeader, payload: &[u8]) -> Result<Vec<u8>, QueryError> {
    if header.payload_size_usize() != payload.len() {
        return Err(QueryError::PayloadSizeMismatch {
            declared: header.payload_size(),
            actual: payload.len(),
        });
    }

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&header.encode());
    frame.extend_from_slice(payload);
    Ok(frame)
}
