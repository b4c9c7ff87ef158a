#![deny(unsafe_code)]

//! Security session manager.
//!
//! Upgrades the control service of a multiplexed connection to TLS. The
//! manager parses security queries received from the peer, drives the TLS
//! engine through the [`SslContext`] contract, answers with handshake data or
//! internal error reports, and tells registered [`SecurityManagerListener`]s
//! how each handshake ended.
//!
//! All collaborators are injected after construction:
//!
//! - [`SessionObserver`] stores the TLS context of each connection,
//! - [`CryptoManager`] creates contexts and reports engine errors,
//! - [`ProtocolHandler`] carries outbound messages to the peer.
//!
//! ```ignore
//! let manager = SecurityManager::new(ManagerConfig::default())?;
//! manager.set_session_observer(sessions);
//! manager.set_crypto_manager(engine);
//! manager.set_protocol_handler(transport);
//!
//! if manager.protect_connection(key) {
//!     manager.start_handshake(key);
//! }
//! ```

mod bindings;
mod config;
mod crypto;
mod error;
mod handshake;
mod listener;
mod manager;
mod pipeline;
mod session;
mod transport;

pub use config::{CONFIG_SECTION, DEFAULT_WORKER_NAME, ManagerConfig, ManagerConfigBuilder};
pub use crypto::{CryptoManager, HandshakeResult, HandshakeStep, SslContext};
pub use error::HandshakeError;
pub use handshake::HandshakeCoordinator;
pub use listener::{ListenerRegistry, SecurityManagerListener};
pub use manager::SecurityManager;
pub use pipeline::{MessagePipeline, PipelineConfig, PostError, QueryHandler};
pub use session::{RegistryRejection, SessionObserver};
pub use transport::{ProtocolHandler, ProtocolObserver};
