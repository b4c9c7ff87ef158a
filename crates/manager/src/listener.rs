//! Observers of handshake completion.
//!
//! Notification passes are serialized: a pass snapshots the registrations,
//! runs the callbacks with the list lock released, and retires every
//! registration whose listener returned `true` before the next pass starts.
//! The pass gate is re-entrant, so callbacks may add or remove listeners or
//! trigger a nested notification on the same thread without deadlocking.
//! A retired registration is skipped by any snapshot that still holds it.

use std::fmt;
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use logging::{LISTENER_TARGET, trace_listener};
use protocol::ConnectionKey;

/// Receives the outcome of every handshake.
pub trait SecurityManagerListener: Send + Sync {
    /// Called once per concluded handshake.
    ///
    /// Returning `true` unregisters the listener; it is never called again.
    /// Returning `false` keeps it for later handshakes.
    fn on_handshake_done(&self, connection_key: ConnectionKey, success: bool) -> bool;
}

struct Registration {
    listener: Arc<dyn SecurityManagerListener>,
    retired: AtomicBool,
}

impl Registration {
    fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }
}

/// Re-entrant gate admitting one notification pass at a time.
#[derive(Default)]
struct PassGate {
    owner: Mutex<Option<(ThreadId, usize)>>,
    released: Condvar,
}

struct PassGuard<'a> {
    gate: &'a PassGate,
}

impl PassGate {
    fn enter(&self) -> PassGuard<'_> {
        let me = thread::current().id();
        let mut owner = lock(&self.owner);
        loop {
            match *owner {
                None => {
                    *owner = Some((me, 1));
                    break;
                }
                Some((holder, ref mut depth)) if holder == me => {
                    *depth += 1;
                    break;
                }
                Some(_) => {}
            }
            owner = self
                .released
                .wait(owner)
                .unwrap_or_else(PoisonError::into_inner);
        }
        PassGuard { gate: self }
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        let mut owner = lock(&self.gate.owner);
        if let Some((_, depth)) = owner.as_mut() {
            *depth -= 1;
            if *depth == 0 {
                *owner = None;
                self.gate.released.notify_all();
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered, duplicate-tolerant collection of listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    registrations: Mutex<Vec<Arc<Registration>>>,
    pass: PassGate,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

fn same_listener(
    left: &Arc<dyn SecurityManagerListener>,
    right: &Arc<dyn SecurityManagerListener>,
) -> bool {
    ptr::addr_eq(Arc::as_ptr(left), Arc::as_ptr(right))
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `listener`; the same listener may be registered more than once.
    pub fn add(&self, listener: Arc<dyn SecurityManagerListener>) {
        let mut registrations = lock(&self.registrations);
        registrations.push(Arc::new(Registration {
            listener,
            retired: AtomicBool::new(false),
        }));
        trace_listener!(registered = registrations.len(), "listener added");
    }

    /// Removes every registration of `listener`.
    ///
    /// A pass already in progress will not call the removed listener either.
    /// Returns `false` when the listener was not registered.
    pub fn remove(&self, listener: &Arc<dyn SecurityManagerListener>) -> bool {
        let removed = self.retire(listener);
        if removed == 0 {
            tracing::debug!(target: LISTENER_TARGET, "remove: listener is not registered");
        }
        removed > 0
    }

    /// Retires and drops every registration of `listener`.
    fn retire(&self, listener: &Arc<dyn SecurityManagerListener>) -> usize {
        let mut registrations = lock(&self.registrations);
        let before = registrations.len();
        registrations.retain(|registration| {
            if same_listener(&registration.listener, listener) {
                registration.retired.store(true, Ordering::Release);
                false
            } else {
                true
            }
        });
        before - registrations.len()
    }

    /// Delivers a handshake outcome to every registered listener.
    pub fn notify_handshake_done(&self, connection_key: ConnectionKey, success: bool) {
        let _pass = self.pass.enter();
        let snapshot: Vec<_> = lock(&self.registrations).clone();
        tracing::info!(
            target: LISTENER_TARGET,
            connection_key = %connection_key,
            success,
            listeners = snapshot.len(),
            "notifying handshake done"
        );

        let mut finished = 0_usize;
        for registration in snapshot {
            if registration.is_retired() {
                continue;
            }
            if registration
                .listener
                .on_handshake_done(connection_key, success)
            {
                finished += self.retire(&registration.listener);
            }
        }
        if finished > 0 {
            trace_listener!(removed = finished, "pruned finished listeners");
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.registrations).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.registrations).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Barrier, Weak};
    use std::time::Duration;

    use super::*;

    struct Counting {
        calls: AtomicUsize,
        done: AtomicBool,
    }

    impl Counting {
        fn new(done: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                done: AtomicBool::new(done),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SecurityManagerListener for Counting {
        fn on_handshake_done(&self, _: ConnectionKey, _: bool) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.done.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn done_listener_is_pruned_and_pending_listener_stays() {
        let registry = ListenerRegistry::new();
        let done = Counting::new(true);
        let pending = Counting::new(false);
        registry.add(done.clone());
        registry.add(pending.clone());

        registry.notify_handshake_done(ConnectionKey(1), true);
        registry.notify_handshake_done(ConnectionKey(2), false);

        assert_eq!(done.calls(), 1);
        assert_eq!(pending.calls(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_drops_every_duplicate() {
        let registry = ListenerRegistry::new();
        let listener: Arc<dyn SecurityManagerListener> = Counting::new(false);
        registry.add(Arc::clone(&listener));
        registry.add(Arc::clone(&listener));
        registry.add(Counting::new(false));

        assert!(registry.remove(&listener));
        assert_eq!(registry.len(), 1);
        assert!(!registry.remove(&listener));
    }

    #[test]
    fn empty_registry_notifies_nobody() {
        let registry = ListenerRegistry::new();
        assert!(registry.is_empty());
        registry.notify_handshake_done(ConnectionKey(3), true);
        assert!(registry.is_empty());
    }

    struct Reentrant {
        registry: Weak<ListenerRegistry>,
        added: Arc<Counting>,
    }

    impl SecurityManagerListener for Reentrant {
        fn on_handshake_done(&self, _: ConnectionKey, _: bool) -> bool {
            if let Some(registry) = self.registry.upgrade() {
                registry.add(self.added.clone());
            }
            true
        }
    }

    #[test]
    fn callbacks_may_register_listeners() {
        let registry = Arc::new(ListenerRegistry::new());
        let added = Counting::new(false);
        registry.add(Arc::new(Reentrant {
            registry: Arc::downgrade(&registry),
            added: added.clone(),
        }));

        registry.notify_handshake_done(ConnectionKey(4), true);
        assert_eq!(registry.len(), 1);
        assert_eq!(added.calls(), 0);

        registry.notify_handshake_done(ConnectionKey(4), true);
        assert_eq!(added.calls(), 1);
    }

    struct Slow {
        calls: AtomicUsize,
    }

    impl SecurityManagerListener for Slow {
        fn on_handshake_done(&self, _: ConnectionKey, _: bool) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(100));
            true
        }
    }

    #[test]
    fn concurrent_passes_call_a_done_listener_once() {
        let registry = Arc::new(ListenerRegistry::new());
        let slow = Arc::new(Slow {
            calls: AtomicUsize::new(0),
        });
        registry.add(slow.clone());
        let barrier = Arc::new(Barrier::new(2));

        let workers: Vec<_> = (0..2_u32)
            .map(|key| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.notify_handshake_done(ConnectionKey(key), false);
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("notifier thread");
        }

        assert_eq!(slow.calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    struct Nested {
        registry: Weak<ListenerRegistry>,
        depth: AtomicUsize,
    }

    impl SecurityManagerListener for Nested {
        fn on_handshake_done(&self, connection_key: ConnectionKey, success: bool) -> bool {
            if self.depth.fetch_add(1, Ordering::SeqCst) == 0 {
                if let Some(registry) = self.registry.upgrade() {
                    registry.notify_handshake_done(connection_key, success);
                }
            }
            false
        }
    }

    #[test]
    fn callbacks_may_notify_on_the_same_thread() {
        let registry = Arc::new(ListenerRegistry::new());
        let nested = Arc::new(Nested {
            registry: Arc::downgrade(&registry),
            depth: AtomicUsize::new(0),
        });
        registry.add(nested.clone());

        registry.notify_handshake_done(ConnectionKey(5), true);

        assert_eq!(nested.depth.load(Ordering::SeqCst), 2);
        assert_eq!(registry.len(), 1);
    }

    struct Remover {
        registry: Weak<ListenerRegistry>,
        victim: Arc<dyn SecurityManagerListener>,
    }

    impl SecurityManagerListener for Remover {
        fn on_handshake_done(&self, _: ConnectionKey, _: bool) -> bool {
            if let Some(registry) = self.registry.upgrade() {
                assert!(registry.remove(&self.victim));
            }
            true
        }
    }

    #[test]
    fn listener_removed_mid_pass_is_skipped() {
        let registry = Arc::new(ListenerRegistry::new());
        let victim = Counting::new(false);
        registry.add(Arc::new(Remover {
            registry: Arc::downgrade(&registry),
            victim: victim.clone(),
        }));
        registry.add(victim.clone());

        registry.notify_handshake_done(ConnectionKey(6), true);

        assert_eq!(victim.calls(), 0);
        assert!(registry.is_empty());
    }
}
