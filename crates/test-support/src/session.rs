use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use manager::{RegistryRejection, SessionObserver, SslContext};
use protocol::{ConnectionKey, ServiceType};

use crate::lock;

/// Map-backed session registry.
#[derive(Default)]
pub struct MemorySessionObserver {
    contexts: Mutex<HashMap<ConnectionKey, Arc<dyn SslContext>>>,
    reject_with: Mutex<Option<u8>>,
    discard_installs: AtomicBool,
    set_calls: AtomicUsize,
}

impl std::fmt::Debug for MemorySessionObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionObserver")
            .field("protected", &lock(&self.contexts).len())
            .field("set_calls", &self.set_calls())
            .finish_non_exhaustive()
    }
}

impl MemorySessionObserver {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes `set_ssl_context` fail with `code`, or succeed again with `None`.
    pub fn reject_with(&self, code: Option<u8>) {
        *lock(&self.reject_with) = code;
    }

    /// Accepts installs without storing them.
    pub fn set_discard_installs(&self, discard: bool) {
        self.discard_installs.store(discard, Ordering::SeqCst);
    }

    #[must_use]
    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_protected(&self, connection_key: ConnectionKey) -> bool {
        lock(&self.contexts).contains_key(&connection_key)
    }

    /// Drops the context of a closed connection.
    pub fn remove(&self, connection_key: ConnectionKey) -> Option<Arc<dyn SslContext>> {
        lock(&self.contexts).remove(&connection_key)
    }
}

impl SessionObserver for MemorySessionObserver {
    fn ssl_context(
        &self,
        connection_key: ConnectionKey,
        _service: ServiceType,
    ) -> Option<Arc<dyn SslContext>> {
        lock(&self.contexts).get(&connection_key).cloned()
    }

    fn set_ssl_context(
        &self,
        connection_key: ConnectionKey,
        context: Arc<dyn SslContext>,
    ) -> Result<(), RegistryRejection> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = *lock(&self.reject_with) {
            return Err(RegistryRejection(code));
        }
        if !self.discard_installs.load(Ordering::SeqCst) {
            lock(&self.contexts).insert(connection_key, context);
        }
        Ok(())
    }
}
