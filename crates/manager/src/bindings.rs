//! Late-bound collaborator slots.

use std::sync::{Arc, PoisonError, RwLock};

use crate::crypto::CryptoManager;
use crate::session::SessionObserver;
use crate::transport::ProtocolHandler;

/// Adapters injected after construction; each may be re-bound at any time.
#[derive(Default)]
pub(crate) struct Bindings {
    session_observer: RwLock<Option<Arc<dyn SessionObserver>>>,
    protocol_handler: RwLock<Option<Arc<dyn ProtocolHandler>>>,
    crypto_manager: RwLock<Option<Arc<dyn CryptoManager>>>,
}

fn load<T: ?Sized>(slot: &RwLock<Option<Arc<T>>>) -> Option<Arc<T>> {
    slot.read().unwrap_or_else(PoisonError::into_inner).clone()
}

fn store<T: ?Sized>(slot: &RwLock<Option<Arc<T>>>, value: Arc<T>) {
    *slot.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
}

impl Bindings {
    pub(crate) fn session_observer(&self) -> Option<Arc<dyn SessionObserver>> {
        load(&self.session_observer)
    }

    pub(crate) fn protocol_handler(&self) -> Option<Arc<dyn ProtocolHandler>> {
        load(&self.protocol_handler)
    }

    pub(crate) fn crypto_manager(&self) -> Option<Arc<dyn CryptoManager>> {
        load(&self.crypto_manager)
    }

    pub(crate) fn set_session_observer(&self, observer: Arc<dyn SessionObserver>) {
        store(&self.session_observer, observer);
    }

    pub(crate) fn set_protocol_handler(&self, handler: Arc<dyn ProtocolHandler>) {
        store(&self.protocol_handler, handler);
    }

    pub(crate) fn set_crypto_manager(&self, crypto: Arc<dyn CryptoManager>) {
        store(&self.crypto_manager, crypto);
    }
}
