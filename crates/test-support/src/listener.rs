use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use manager::SecurityManagerListener;
use protocol::ConnectionKey;

use crate::lock;

/// Listener that records every notification.
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<(ConnectionKey, bool)>>,
    done: AtomicBool,
}

impl RecordingListener {
    /// Creates a listener whose callback returns `done`.
    #[must_use]
    pub fn new(done: bool) -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            done: AtomicBool::new(done),
        })
    }

    pub fn set_done(&self, done: bool) {
        self.done.store(done, Ordering::SeqCst);
    }

    /// Notifications received, in order.
    #[must_use]
    pub fn events(&self) -> Vec<(ConnectionKey, bool)> {
        lock(&self.events).clone()
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        lock(&self.events).len()
    }
}

impl SecurityManagerListener for RecordingListener {
    fn on_handshake_done(&self, connection_key: ConnectionKey, success: bool) -> bool {
        lock(&self.events).push((connection_key, success));
        self.done.load(Ordering::SeqCst)
    }
}
