use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use manager::{CryptoManager, HandshakeStep, SslContext};

use crate::lock;

/// TLS context replaying scripted handshake steps.
///
/// Steps are consumed in order; once the script runs out every step
/// succeeds without producing bytes.
#[derive(Debug)]
pub struct ScriptedSslContext {
    completed: AtomicBool,
    start_step: Mutex<HandshakeStep>,
    steps: Mutex<VecDeque<(HandshakeStep, bool)>>,
    inputs: Mutex<Vec<Vec<u8>>>,
    start_calls: AtomicUsize,
    step_calls: AtomicUsize,
}

impl Default for ScriptedSslContext {
    fn default() -> Self {
        Self {
            completed: AtomicBool::new(false),
            start_step: Mutex::new(HandshakeStep::success(b"client-hello".to_vec())),
            steps: Mutex::new(VecDeque::new()),
            inputs: Mutex::new(Vec::new()),
            start_calls: AtomicUsize::new(0),
            step_calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedSslContext {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replaces the step returned by `start_handshake`.
    pub fn set_start_step(&self, step: HandshakeStep) {
        *lock(&self.start_step) = step;
    }

    /// Appends a step that leaves the handshake incomplete.
    pub fn push_step(&self, step: HandshakeStep) {
        lock(&self.steps).push_back((step, false));
    }

    /// Appends a step after which the context reports completion.
    pub fn push_completing_step(&self, step: HandshakeStep) {
        lock(&self.steps).push_back((step, true));
    }

    pub fn set_completed(&self, completed: bool) {
        self.completed.store(completed, Ordering::SeqCst);
    }

    #[must_use]
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn step_calls(&self) -> usize {
        self.step_calls.load(Ordering::SeqCst)
    }

    /// Peer bytes fed to `do_handshake_step`, in call order.
    #[must_use]
    pub fn inputs(&self) -> Vec<Vec<u8>> {
        lock(&self.inputs).clone()
    }
}

impl SslContext for ScriptedSslContext {
    fn is_init_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    fn start_handshake(&self) -> HandshakeStep {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.start_step).clone()
    }

    fn do_handshake_step(&self, input: &[u8]) -> HandshakeStep {
        self.step_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.inputs).push(input.to_vec());
        let Some((step, completes)) = lock(&self.steps).pop_front() else {
            return HandshakeStep::success(Vec::new());
        };
        if completes {
            self.completed.store(true, Ordering::SeqCst);
        }
        step
    }
}

/// Crypto engine handing out [`ScriptedSslContext`]s.
///
/// Contexts queued with [`ScriptedCryptoManager::enqueue_context`] are handed
/// out first; after that each call creates a fresh default context.
#[derive(Debug, Default)]
pub struct ScriptedCryptoManager {
    queued: Mutex<VecDeque<Arc<ScriptedSslContext>>>,
    created: Mutex<Vec<Arc<ScriptedSslContext>>>,
    fail_creation: AtomicBool,
    released: AtomicUsize,
    last_error: Mutex<String>,
}

impl ScriptedCryptoManager {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn enqueue_context(&self, context: Arc<ScriptedSslContext>) {
        lock(&self.queued).push_back(context);
    }

    /// Makes `create_ssl_context` return `None` while set.
    pub fn set_fail_creation(&self, fail: bool) {
        self.fail_creation.store(fail, Ordering::SeqCst);
    }

    pub fn set_last_error(&self, text: impl Into<String>) {
        *lock(&self.last_error) = text.into();
    }

    /// Every context handed out so far.
    #[must_use]
    pub fn created(&self) -> Vec<Arc<ScriptedSslContext>> {
        lock(&self.created).clone()
    }

    #[must_use]
    pub fn last_created(&self) -> Option<Arc<ScriptedSslContext>> {
        lock(&self.created).last().cloned()
    }

    #[must_use]
    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl CryptoManager for ScriptedCryptoManager {
    fn create_ssl_context(&self) -> Option<Arc<dyn SslContext>> {
        if self.fail_creation.load(Ordering::SeqCst) {
            return None;
        }
        let context = lock(&self.queued)
            .pop_front()
            .unwrap_or_else(ScriptedSslContext::new);
        lock(&self.created).push(Arc::clone(&context));
        Some(context as Arc<dyn SslContext>)
    }

    fn release_ssl_context(&self, _context: Arc<dyn SslContext>) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }

    fn last_error(&self) -> String {
        lock(&self.last_error).clone()
    }
}
