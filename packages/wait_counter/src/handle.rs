use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::registry::KeyEntry;
use crate::{Tokens, WaitGuard, WaitRegistry};

/// Caller-facing facade for one key.
///
/// A handle references (never owns) the key's cached backend-instance list,
/// so cloning is cheap and resolving the same key twice yields handles backed
/// by the identical underlying entry. The start/stop path takes no
/// crate-internal lock.
///
/// # Example
///
/// ```
/// use wait_counter::WaitHandle;
///
/// let handle = WaitHandle::new("lock_acquire_wait");
///
/// let tokens = handle.start();
/// // ... wait for the thing ...
/// handle.stop(tokens);
/// ```
///
/// Prefer [`measure()`][Self::measure] unless you need to carry the tokens
/// across a non-lexical scope yourself.
#[derive(Clone)]
pub struct WaitHandle {
    entry: Arc<KeyEntry>,
}

impl WaitHandle {
    /// Resolves a handle for `key` via the process-wide registry, creating
    /// the key's entry on first use.
    ///
    /// The key's backend-instance list is fixed by this first resolution;
    /// factories registered afterwards do not apply to it. Amortized constant
    /// time after the first use of the key.
    #[must_use]
    pub fn new(key: &str) -> Self {
        WaitRegistry::global().handle(key)
    }

    pub(crate) fn from_entry(entry: Arc<KeyEntry>) -> Self {
        Self { entry }
    }

    /// The key this handle measures waits against.
    #[must_use]
    pub fn key(&self) -> &str {
        self.entry.key()
    }

    /// How many backend instances are attached to this handle's key.
    #[must_use]
    pub fn backend_count(&self) -> usize {
        self.entry.backends().len()
    }

    /// Starts a wait at the current monotonic time.
    ///
    /// Equivalent to `start_at(Instant::now())`. Each start call must be
    /// matched by exactly one [`stop()`][Self::stop] call carrying the
    /// returned tokens.
    #[must_use = "the returned tokens must be carried to the matching stop call"]
    pub fn start(&self) -> Tokens {
        self.start_at(Instant::now())
    }

    /// Starts a wait at a caller-supplied monotonic time.
    ///
    /// Invokes `start(now)` on every backend instance in factory-registration
    /// order and collects one token per instance, in that same order. The
    /// explicit `now` supports deterministic testing.
    #[must_use = "the returned tokens must be carried to the matching stop call"]
    pub fn start_at(&self, now: Instant) -> Tokens {
        self.entry
            .backends()
            .iter()
            .map(|backend| backend.start(now))
            .collect()
    }

    /// Stops a wait at the current monotonic time.
    ///
    /// Equivalent to `stop_at(Instant::now(), tokens)`.
    pub fn stop(&self, tokens: Tokens) {
        self.stop_at(Instant::now(), tokens);
    }

    /// Stops a wait at a caller-supplied monotonic time.
    ///
    /// Pairs backend instances with tokens in order and invokes
    /// `stop(now, token)` on each pair. `tokens` must be the unmodified list
    /// returned by the matching start call; a list of any other length or
    /// order is a caller contract violation. The violation is handled
    /// defensively - unpaired backends and unpaired tokens are skipped - and
    /// can never corrupt this or any other key's entry.
    pub fn stop_at(&self, now: Instant, tokens: Tokens) {
        for (backend, token) in self.entry.backends().iter().zip(tokens) {
            backend.stop(now, token);
        }
    }

    /// Starts a wait and wraps the tokens in a guard that delivers the stop
    /// when dropped (or earlier, via [`WaitGuard::stop()`]).
    pub fn measure(&self) -> WaitGuard {
        WaitGuard::new(self.clone(), self.start())
    }

    #[cfg(test)]
    pub(crate) fn entry(&self) -> &Arc<KeyEntry> {
        &self.entry
    }
}

impl fmt::Debug for WaitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitHandle")
            .field("key", &self.entry.key())
            .field("backend_count", &self.entry.backends().len())
            .finish()
    }
}
