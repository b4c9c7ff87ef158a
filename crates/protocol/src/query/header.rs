use super::constants::{HEADER_LEN, QUERY_ID_MASK, QUERY_TYPE_SHIFT};
use super::error::QueryError;
use super::query_id::QueryId;
use super::query_type::QueryType;

/// A decoded security query header.
///
/// On the wire the header is three big-endian 32-bit words:
///
/// ```text
/// word 0: query_type << 24 | query_id (24 bits)
/// word 1: seq_number
/// word 2: payload_size
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct QueryHeader {
    query_type: QueryType,
    query_id: QueryId,
    seq_number: u32,
    payload_size: u32,
}

impl QueryHeader {
    /// Creates a header from its individual fields.
    #[must_use]
    pub const fn new(
        query_type: QueryType,
        query_id: QueryId,
        seq_number: u32,
        payload_size: u32,
    ) -> Self {
        Self {
            query_type,
            query_id,
            seq_number,
            payload_size,
        }
    }

    /// Creates a header whose payload size matches `payload`.
    pub fn for_payload(
        query_type: QueryType,
        query_id: QueryId,
        seq_number: u32,
        payload: &[u8],
    ) -> Result<Self, QueryError> {
        let payload_size =
            u32::try_from(payload.len()).map_err(|_| QueryError::OversizedPayload(payload.len()))?;
        Ok(Self::new(query_type, query_id, seq_number, payload_size))
    }

    /// Parses a header from the beginning of `bytes`.
    ///
    /// Bytes beyond [`HEADER_LEN`] are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, QueryError> {
        let Some(encoded) = bytes.first_chunk::<HEADER_LEN>() else {
            return Err(QueryError::TruncatedHeader {
                actual: bytes.len(),
            });
        };

        let word = |index: usize| {
            let start = index * 4;
            u32::from_be_bytes([
                encoded[start],
                encoded[start + 1],
                encoded[start + 2],
                encoded[start + 3],
            ])
        };

        let packed = word(0);
        Ok(Self {
            query_type: QueryType::from_u8((packed >> QUERY_TYPE_SHIFT) as u8),
            query_id: QueryId::from_u32(packed & QUERY_ID_MASK),
            seq_number: word(1),
            payload_size: word(2),
        })
    }

    /// Encodes this header into the big-endian format used on the wire.
    #[must_use]
    pub const fn encode(self) -> [u8; HEADER_LEN] {
        let packed = self.packed_word().to_be_bytes();
        let seq = self.seq_number.to_be_bytes();
        let size = self.payload_size.to_be_bytes();
        [
            packed[0], packed[1], packed[2], packed[3], seq[0], seq[1], seq[2], seq[3], size[0],
            size[1], size[2], size[3],
        ]
    }

    /// Returns the first header word combining the type byte and identifier.
    #[must_use]
    #[inline]
    pub const fn packed_word(self) -> u32 {
        ((self.query_type.as_u8() as u32) << QUERY_TYPE_SHIFT)
            | (self.query_id.as_u32() & QUERY_ID_MASK)
    }

    /// Returns the query type.
    #[must_use]
    #[inline]
    pub const fn query_type(self) -> QueryType {
        self.query_type
    }

    /// Returns the query identifier.
    #[must_use]
    #[inline]
    pub const fn query_id(self) -> QueryId {
        self.query_id
    }

    /// Returns the sequence number.
    #[must_use]
    #[inline]
    pub const fn seq_number(self) -> u32 {
        self.seq_number
    }

    /// Returns the payload size recorded in the header.
    #[must_use]
    #[inline]
    pub const fn payload_size(self) -> u32 {
        self.payload_size
    }

    /// Returns the payload size as a native pointer-sized value.
    #[must_use]
    #[inline]
    pub fn payload_size_usize(self) -> usize {
        self.payload_size as usize
    }
}

impl TryFrom<[u8; HEADER_LEN]> for QueryHeader {
    type Error = QueryError;

    #[inline]
    fn try_from(bytes: [u8; HEADER_LEN]) -> Result<Self, Self::Error> {
        Self::decode(&bytes)
    }
}

impl TryFrom<&[u8]> for QueryHeader {
    type Error = QueryError;

    #[inline]
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::decode(bytes)
    }
}
