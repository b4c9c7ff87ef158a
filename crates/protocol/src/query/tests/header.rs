use super::*;

#[test]
fn header_encodes_fields_in_network_byte_order() {
    let header = QueryHeader::new(
        QueryType::Notification,
        QueryId::SendInternalError,
        0x0102_0304,
        0x0000_0A0B,
    );

    assert_eq!(
        header.encode(),
        [
            0x20, 0x00, 0x00, 0x02, 0x01, 0x02, 0x03, 0x04, 0x00, 0x00, 0x0A, 0x0B
        ]
    );
}

#[test]
fn header_round_trips_for_handshake_request() {
    let header = QueryHeader::new(QueryType::Request, QueryId::SendHandshakeData, 17, 200);
    let decoded = QueryHeader::decode(&header.encode()).expect("decode succeeds");
    assert_eq!(decoded, header);
}

#[test]
fn decode_rejects_truncated_header() {
    let err = QueryHeader::decode(&[0u8; HEADER_LEN - 1]).unwrap_err();
    assert_eq!(
        err,
        QueryError::TruncatedHeader {
            actual: HEADER_LEN - 1
        }
    );
}

#[test]
fn decode_maps_unknown_identifier_to_invalid_query_id() {
    let mut bytes = [0u8; HEADER_LEN];
    bytes[..4].copy_from_slice(&(0x2000_0063u32).to_be_bytes());
    bytes[4..8].copy_from_slice(&7u32.to_be_bytes());

    let header = QueryHeader::decode(&bytes).expect("unknown ids still decode");
    assert_eq!(header.query_type(), QueryType::Notification);
    assert_eq!(header.query_id(), QueryId::InvalidQueryId);
    assert_eq!(header.seq_number(), 7);
}

#[test]
fn decode_maps_unknown_type_to_invalid_type() {
    let mut bytes = [0u8; HEADER_LEN];
    bytes[..4].copy_from_slice(&(0x4200_0001u32).to_be_bytes());

    let header = QueryHeader::decode(&bytes).expect("unknown types still decode");
    assert_eq!(header.query_type(), QueryType::InvalidType);
    assert_eq!(header.query_id(), QueryId::SendHandshakeData);
}

#[test]
fn packed_word_keeps_identifier_within_mask() {
    let header = QueryHeader::new(QueryType::InvalidType, QueryId::InvalidQueryId, 0, 0);
    assert_eq!(header.packed_word(), 0xFF00_0000 | QUERY_ID_MASK);
}

#[test]
fn for_payload_derives_size_from_payload() {
    let header =
        QueryHeader::for_payload(QueryType::Response, QueryId::SendHandshakeData, 3, &[0; 40])
            .expect("small payload");
    assert_eq!(header.payload_size(), 40);
    assert_eq!(header.payload_size_usize(), 40);
}

#[test]
fn try_from_slice_matches_decode() {
    let header = QueryHeader::new(QueryType::Request, QueryId::SendInternalError, 9, 1);
    let encoded = header.encode();
    assert_eq!(QueryHeader::try_from(&encoded[..]), Ok(header));
    assert_eq!(QueryHeader::try_from(encoded), Ok(header));
}
