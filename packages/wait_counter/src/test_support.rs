//! Shared test doubles used across this crate's unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::{Token, WaitBackend, WaitBackendFactory};

/// One backend invocation, as observed through a shared [`CallLog`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Call {
    Start { label: &'static str, token: Token },
    Stop { label: &'static str, token: Token },
}

pub(crate) type CallLog = Arc<Mutex<Vec<Call>>>;

pub(crate) fn new_call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Issues sequential tokens from a per-backend base and appends every
/// start/stop to the shared log.
#[derive(Debug)]
pub(crate) struct RecordingBackend {
    label: &'static str,
    next_token: AtomicUsize,
    log: CallLog,
}

impl WaitBackend for RecordingBackend {
    fn start(&self, _now: Instant) -> Token {
        let token = Token::new(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.log.lock().unwrap().push(Call::Start {
            label: self.label,
            token,
        });
        token
    }

    fn stop(&self, _now: Instant, token: Token) {
        self.log.lock().unwrap().push(Call::Stop {
            label: self.label,
            token,
        });
    }
}

/// Produces a [`RecordingBackend`] for every key it does not decline and
/// counts how many times `create` was invoked.
#[derive(Debug)]
pub(crate) struct RecordingFactory {
    label: &'static str,
    token_base: usize,
    log: CallLog,
    declined_keys: Vec<&'static str>,
    create_calls: Arc<AtomicUsize>,
}

impl RecordingFactory {
    pub(crate) fn new(label: &'static str, token_base: usize, log: &CallLog) -> Self {
        Self {
            label,
            token_base,
            log: Arc::clone(log),
            declined_keys: Vec::new(),
            create_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Makes this factory decline the given key at `create` time.
    pub(crate) fn declining(mut self, key: &'static str) -> Self {
        self.declined_keys.push(key);
        self
    }

    /// Shared counter of `create` invocations, observable after the factory
    /// has been moved into a registry.
    pub(crate) fn create_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.create_calls)
    }
}

impl WaitBackendFactory for RecordingFactory {
    fn create(&self, key: &str) -> Option<Box<dyn WaitBackend>> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.declined_keys.contains(&key) {
            return None;
        }

        Some(Box::new(RecordingBackend {
            label: self.label,
            next_token: AtomicUsize::new(self.token_base),
            log: Arc::clone(&self.log),
        }))
    }
}
