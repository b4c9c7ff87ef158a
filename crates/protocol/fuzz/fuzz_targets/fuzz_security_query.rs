#![no_main]

//! Fuzz target for security query parsing.
//!
//! Control-service frames arrive straight from the peer, so arbitrary
//! bytes must either parse into a query that re-encodes to the same frame
//! or be rejected without panicking.

use libfuzzer_sys::fuzz_target;
use protocol::{ErrorReport, SecurityQuery};

fuzz_target!(|data: &[u8]| {
    if let Ok(query) = SecurityQuery::parse(data) {
        if query.header().query_type().is_valid() && query.header().query_id().is_valid() {
            let encoded = query.encode().expect("parsed queries re-encode");
            assert_eq!(encoded, data);
        }
        if let Some(json) = query.json_message() {
            let _ = ErrorReport::from_json(json);
        }
    }
});
