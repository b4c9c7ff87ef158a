//! Contract of the external TLS engine.
//!
//! The manager never inspects handshake bytes; it only moves them between
//! the peer and an [`SslContext`] and reacts to the [`HandshakeResult`] the
//! engine reports.

use std::sync::Arc;

/// Outcome of one handshake step as reported by the TLS engine.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HandshakeResult {
    /// The step was accepted; the handshake may or may not be complete.
    Success,
    /// The handshake failed in an orderly way, for example with an alert.
    Fail,
    /// The engine could not process the input at all.
    ///
    /// Bytes produced alongside this result are never forwarded to the peer.
    AbnormalFail,
}

/// Result of driving an [`SslContext`] one step forward.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HandshakeStep {
    /// Engine verdict for the step.
    pub result: HandshakeResult,
    /// Handshake bytes to deliver to the peer; empty when there is nothing to send.
    pub data: Vec<u8>,
}

impl HandshakeStep {
    /// A successful step producing `data`.
    #[must_use]
    pub fn success(data: impl Into<Vec<u8>>) -> Self {
        Self {
            result: HandshakeResult::Success,
            data: data.into(),
        }
    }

    /// A failed step producing `data`.
    #[must_use]
    pub fn fail(data: impl Into<Vec<u8>>) -> Self {
        Self {
            result: HandshakeResult::Fail,
            data: data.into(),
        }
    }

    /// An abnormal failure; `data` is kept only so callers can verify it is discarded.
    #[must_use]
    pub fn abnormal_fail(data: impl Into<Vec<u8>>) -> Self {
        Self {
            result: HandshakeResult::AbnormalFail,
            data: data.into(),
        }
    }
}

/// Per-connection TLS state owned by the engine.
///
/// Contexts are shared through `Arc` between the session registry and the
/// handshake in progress, so a registry that drops its reference mid-step
/// never frees the context under the engine. Implementations provide their
/// own interior mutability; the manager serializes every stepping call.
pub trait SslContext: Send + Sync {
    /// Reports whether the handshake has completed successfully.
    fn is_init_completed(&self) -> bool;

    /// Produces the first flight of handshake bytes.
    fn start_handshake(&self) -> HandshakeStep;

    /// Feeds peer handshake bytes into the engine.
    fn do_handshake_step(&self, input: &[u8]) -> HandshakeStep;
}

/// Factory and diagnostics surface of the TLS engine.
pub trait CryptoManager: Send + Sync {
    /// Creates a fresh context, or `None` when the engine cannot.
    fn create_ssl_context(&self) -> Option<Arc<dyn SslContext>>;

    /// Returns a context that was created but never installed.
    fn release_ssl_context(&self, context: Arc<dyn SslContext>);

    /// Describes the most recent engine failure.
    fn last_error(&self) -> String;
}
