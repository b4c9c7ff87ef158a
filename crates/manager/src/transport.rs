//! Contracts shared with the transport layer in both directions.

use protocol::RawMessage;

/// Outbound sink for messages the manager sends to the peer.
///
/// Implementations are expected not to block the caller for long; the
/// handshake worker calls this from its only thread.
pub trait ProtocolHandler: Send + Sync {
    /// Queues `message` for delivery to the peer.
    fn send_message_to_mobile_app(&self, message: RawMessage, final_message: bool);
}

/// Inbound hooks the transport layer invokes for every message.
pub trait ProtocolObserver: Send + Sync {
    /// Called for each message received from the peer.
    fn on_message_received(&self, message: &RawMessage);

    /// Called after a message has been handed to the peer.
    fn on_mobile_message_sent(&self, message: &RawMessage);
}
