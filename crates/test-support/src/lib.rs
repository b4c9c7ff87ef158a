//! Test doubles for the security manager's collaborators.
//!
//! Every fake records how it was called and can be scripted from the test
//! thread while the manager's worker thread uses it.

mod crypto;
mod listener;
mod session;
mod transport;

pub use crypto::{ScriptedCryptoManager, ScriptedSslContext};
pub use listener::RecordingListener;
pub use session::MemorySessionObserver;
pub use transport::RecordingProtocolHandler;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
