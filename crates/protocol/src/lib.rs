#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]

//! Wire formats for the control-service security protocol.
//!
//! The crate is split into the query codec ([`SecurityQuery`],
//! [`QueryHeader`]), the error vocabulary shared with the peer
//! ([`InternalErrorCode`], [`ErrorReport`]) and the transport types the
//! connection layer hands to the security manager ([`RawMessage`]).
//!
//! # Examples
//!
//! Build a handshake notification and read it back from its wire bytes.
//!
//! ```
//! use protocol::{QueryId, QueryType, SecurityQuery};
//!
//! let query = SecurityQuery::new(
//!     QueryType::Notification,
//!     QueryId::SendHandshakeData,
//!     0,
//!     b"client hello".to_vec(),
//! )?;
//! let frame = query.encode()?;
//!
//! let parsed = SecurityQuery::parse(&frame)?;
//! assert_eq!(parsed.header().query_id(), QueryId::SendHandshakeData);
//! assert_eq!(parsed.data(), b"client hello");
//! # Ok::<(), protocol::QueryError>(())
//! ```

mod error_code;
mod query;
mod report;
mod transport;

pub use error_code::{InternalErrorCode, UnknownErrorCode};
pub use query::{
    HEADER_LEN, QUERY_ID_MASK, QueryError, QueryHeader, QueryId, QueryType, SecurityQuery,
    serialize,
};
pub use report::ErrorReport;
pub use transport::{ConnectionKey, PROTOCOL_VERSION_2, RawMessage, ServiceType};
