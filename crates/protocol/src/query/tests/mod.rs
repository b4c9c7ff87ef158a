pub(super) use super::{
    HEADER_LEN, QUERY_ID_MASK, QueryError, QueryHeader, QueryId, QueryType, SecurityQuery,
    serialize,
};

mod header;
