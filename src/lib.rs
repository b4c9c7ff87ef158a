#![deny(unsafe_code)]

//! Security session manager for multiplexed connections.
//!
//! This crate re-exports the workspace members behind one path:
//!
//! - [`protocol`] frames security queries and internal error reports,
//! - [`manager`] coordinates TLS handshakes on the control service,
//! - [`logging`] installs `tracing` with per-subsystem verbosity.
//!
//! The most common types are also available at the crate root.

pub use logging;
pub use manager;
pub use protocol;

pub use logging::{LogConfig, init_tracing};
pub use manager::{
    CryptoManager, HandshakeError, HandshakeResult, HandshakeStep, ManagerConfig, ProtocolHandler,
    ProtocolObserver, RegistryRejection, SecurityManager, SecurityManagerListener,
    SessionObserver, SslContext,
};
pub use protocol::{ConnectionKey, ErrorReport, InternalErrorCode, RawMessage, ServiceType};
