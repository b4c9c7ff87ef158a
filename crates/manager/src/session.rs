//! Contract of the external per-connection TLS context registry.

use std::sync::Arc;

use protocol::{ConnectionKey, ServiceType};
use thiserror::Error;

use crate::crypto::SslContext;

/// Status code returned by a registry that refused to install a context.
///
/// The code is forwarded verbatim to the peer as the error id.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("session registry rejected the SSL context with status {0:#04x}")]
pub struct RegistryRejection(pub u8);

impl RegistryRejection {
    /// Returns the registry's status code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self.0
    }
}

/// Store mapping connections to their TLS contexts.
///
/// The registry is the single source of truth for whether a connection is
/// protected: it must hold at most one context per connection, and it owns
/// releasing contexts when connections close.
pub trait SessionObserver: Send + Sync {
    /// Returns the context protecting `service` on `connection_key`.
    fn ssl_context(
        &self,
        connection_key: ConnectionKey,
        service: ServiceType,
    ) -> Option<Arc<dyn SslContext>>;

    /// Installs `context` for `connection_key`.
    fn set_ssl_context(
        &self,
        connection_key: ConnectionKey,
        context: Arc<dyn SslContext>,
    ) -> Result<(), RegistryRejection>;
}
