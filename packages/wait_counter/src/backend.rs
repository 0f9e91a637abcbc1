//! The contract between the wait counter machinery and measurement sinks.

use std::fmt::Debug;
use std::time::Instant;

use smallvec::SmallVec;

/// Opaque correlation value issued by a backend's [`start`][WaitBackend::start]
/// and consumed by its matching [`stop`][WaitBackend::stop].
///
/// The payload is interpreted only by the backend instance that issued it;
/// every other component threads it through unchanged. A backend might store
/// an index into its own bookkeeping, a timestamp, or nothing at all.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Token(usize);

impl Token {
    /// Wraps a backend-defined payload into a token.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// The backend-defined payload this token carries.
    #[must_use]
    pub const fn value(self) -> usize {
        self.0
    }
}

/// The ordered token list produced by one start call, one token per live
/// backend instance of the key, in factory-registration order.
///
/// Keys typically have one or two backends attached, so the list stays inline
/// and the start/stop fast path does not allocate.
pub type Tokens = SmallVec<[Token; 2]>;

/// A measurement sink for one key, receiving start/stop notifications.
///
/// Instances are produced by a [`WaitBackendFactory`], bound to exactly one
/// key, and owned by that key's cache entry for the life of the registry.
///
/// # Contract
///
/// `start` and `stop` are fast-path calls invoked concurrently from many
/// threads. They must never block and never surface a failure - any internal
/// fault is the backend's own responsibility to absorb. A backend keeps
/// whatever statistics it wants (counts, totals, highwater marks); this crate
/// aggregates nothing itself.
pub trait WaitBackend: Debug + Send + Sync {
    /// Records that a wait against this backend's key began at `now`.
    ///
    /// The returned token is handed back verbatim to the matching
    /// [`stop`][Self::stop] call, letting the backend correlate the pair.
    fn start(&self, now: Instant) -> Token;

    /// Records that the wait correlated by `token` ended at `now`.
    fn stop(&self, now: Instant, token: Token);
}

/// Produces backend instances for keys, or declines them.
///
/// A factory registers once via [`register_wait_backend`][1] (or
/// [`WaitRegistry::register`][2]) and is consulted at each key's first
/// resolution, in registration order.
///
/// # Contract
///
/// `create` must be callable from any thread and must have no side effects
/// beyond constructing its own instance. Returning `None` declines the key
/// permanently: the declining factory contributes no instance to that key's
/// entry for the life of the registry.
///
/// `create` is invoked while the registry lock is held, so it must not
/// resolve handles or register factories itself.
///
/// [1]: crate::register_wait_backend
/// [2]: crate::WaitRegistry::register
pub trait WaitBackendFactory: Debug + Send + Sync {
    /// Produces a backend instance for `key`, or `None` to decline it.
    fn create(&self, key: &str) -> Option<Box<dyn WaitBackend>>;
}
