//! Entry point used by the transport layer.

use std::io;
use std::sync::Arc;

use logging::{QUERY_TARGET, trace_query};
use protocol::{ConnectionKey, RawMessage, SecurityQuery, ServiceType};

use crate::config::{CONFIG_SECTION, ManagerConfig};
use crate::crypto::CryptoManager;
use crate::error::HandshakeError;
use crate::handshake::HandshakeCoordinator;
use crate::listener::SecurityManagerListener;
use crate::pipeline::{MessagePipeline, PostError};
use crate::session::SessionObserver;
use crate::transport::{ProtocolHandler, ProtocolObserver};

/// Security session manager.
///
/// Inbound control messages are parsed on the caller's thread and processed
/// in order on the pipeline worker. Protection and handshake start run on the
/// caller's thread but are serialized with the worker's handshake steps.
#[derive(Debug)]
pub struct SecurityManager {
    config: ManagerConfig,
    coordinator: Arc<HandshakeCoordinator>,
    pipeline: MessagePipeline,
}

impl SecurityManager {
    /// Creates the manager and starts its pipeline worker.
    ///
    /// # Errors
    ///
    /// Fails when the worker thread cannot be spawned.
    pub fn new(config: ManagerConfig) -> io::Result<Self> {
        let coordinator = Arc::new(HandshakeCoordinator::new(config.protocol_version()));
        let pipeline = MessagePipeline::spawn(&config.pipeline_config(), Arc::clone(&coordinator))?;
        Ok(Self {
            config,
            coordinator,
            pipeline,
        })
    }

    /// Name of the configuration section holding [`ManagerConfig`].
    #[must_use]
    pub const fn config_section() -> &'static str {
        CONFIG_SECTION
    }

    #[must_use]
    pub const fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn set_session_observer(&self, observer: Arc<dyn SessionObserver>) {
        self.coordinator.set_session_observer(observer);
    }

    pub fn set_protocol_handler(&self, handler: Arc<dyn ProtocolHandler>) {
        self.coordinator.set_protocol_handler(handler);
    }

    pub fn set_crypto_manager(&self, crypto: Arc<dyn CryptoManager>) {
        self.coordinator.set_crypto_manager(crypto);
    }

    /// Accepts one message from the peer.
    ///
    /// Only control-service traffic is considered. A frame that does not
    /// parse is answered with an `InvalidQuerySize` error report.
    pub fn on_message_received(&self, message: &RawMessage) {
        if message.service_type() != ServiceType::Control {
            trace_query!(
                connection_key = %message.connection_key(),
                service = ?message.service_type(),
                "ignoring non-control message"
            );
            return;
        }

        let query = match SecurityQuery::parse(message.data()) {
            Ok(query) => query.with_connection_key(message.connection_key()),
            Err(error) => {
                tracing::error!(
                    target: QUERY_TARGET,
                    connection_key = %message.connection_key(),
                    "incorrect security query: {error}"
                );
                self.coordinator
                    .fail(message.connection_key(), &HandshakeError::MalformedQuery(error));
                return;
            }
        };
        let seq_number = query.header().seq_number();
        if self.pipeline.try_post(query) == Err(PostError::Full) {
            self.coordinator
                .fail(message.connection_key(), &HandshakeError::QueueFull { seq_number });
        }
    }

    /// Hook for messages the transport finished sending; nothing to do.
    pub fn on_mobile_message_sent(&self, _message: &RawMessage) {}

    /// See [`HandshakeCoordinator::protect_connection`].
    pub fn protect_connection(&self, connection_key: ConnectionKey) -> bool {
        self.coordinator.protect_connection(connection_key)
    }

    /// See [`HandshakeCoordinator::start_handshake`].
    pub fn start_handshake(&self, connection_key: ConnectionKey) {
        self.coordinator.start_handshake(connection_key);
    }

    pub fn add_listener(&self, listener: Arc<dyn SecurityManagerListener>) {
        self.coordinator.add_listener(listener);
    }

    /// Unregisters every registration of `listener`.
    pub fn remove_listener(&self, listener: &Arc<dyn SecurityManagerListener>) -> bool {
        self.coordinator.remove_listener(listener)
    }

    /// Blocks until every message received so far has been processed.
    pub fn sync(&self) -> bool {
        self.pipeline.sync()
    }

    /// Drains pending messages and stops the worker.
    pub fn shutdown(&self) {
        self.pipeline.shutdown();
    }
}

impl ProtocolObserver for SecurityManager {
    fn on_message_received(&self, message: &RawMessage) {
        Self::on_message_received(self, message);
    }

    fn on_mobile_message_sent(&self, message: &RawMessage) {
        Self::on_mobile_message_sent(self, message);
    }
}
