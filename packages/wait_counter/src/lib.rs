//! Wait-time instrumentation that fans out to pluggable measurement backends.
//!
//! Call sites measure how long they spend waiting on a named event or resource
//! (a lock, a queue, a remote call) without depending on any concrete metrics
//! system. Measurement sinks plug in by registering a [`WaitBackendFactory`];
//! every key resolved afterwards fans its start/stop notifications out to the
//! backend instances the registered factories produce for it.
//!
//! The core functionality includes:
//! - [`WaitBackend`] / [`WaitBackendFactory`] - the contract a measurement sink implements
//! - [`WaitRegistry`] - ordered factory list plus the per-key backend-instance cache
//! - [`WaitHandle`] - caller-facing facade for one key
//! - [`WaitGuard`] - scoped start/stop pairing
//! - [`wait_counter!`] / [`scoped_wait!`] - static singleton handles for literal keys
//!
//! # Registering a backend
//!
//! A backend factory registers once, early in process life, before any key it
//! cares about is first resolved:
//!
//! ```
//! use std::time::Instant;
//!
//! use wait_counter::{Token, WaitBackend, WaitBackendFactory, register_wait_backend};
//!
//! #[derive(Debug)]
//! struct NoopBackend;
//!
//! impl WaitBackend for NoopBackend {
//!     fn start(&self, _now: Instant) -> Token {
//!         Token::new(0)
//!     }
//!
//!     fn stop(&self, _now: Instant, _token: Token) {}
//! }
//!
//! #[derive(Debug)]
//! struct NoopFactory;
//!
//! impl WaitBackendFactory for NoopFactory {
//!     fn create(&self, _key: &str) -> Option<Box<dyn WaitBackend>> {
//!         Some(Box::new(NoopBackend))
//!     }
//! }
//!
//! register_wait_backend(NoopFactory);
//! ```
//!
//! # Measuring waits
//!
//! The typical call site uses a guard, which pairs one start with exactly one
//! stop on every exit path:
//!
//! ```
//! use wait_counter::WaitHandle;
//!
//! let handle = WaitHandle::new("queue_pop_wait");
//!
//! {
//!     let _guard = handle.measure();
//!     // ... wait for the thing ...
//! } // stop is delivered here
//! ```
//!
//! For hot paths with a literal key, the [`scoped_wait!`] macro amortizes the
//! handle resolution into a per-callsite static:
//!
//! ```
//! use wait_counter::scoped_wait;
//!
//! fn pop_next_item() {
//!     let _scope = scoped_wait!("queue_pop_wait");
//!     // ... wait for the thing ...
//! }
//! # pop_next_item();
//! ```
//!
//! Note that the static scoped helper does not deliver per-backend stop
//! tokens; see [`StaticWaitScope`] for the exact semantics. Use
//! [`WaitHandle::measure()`] when backends rely on token correlation.
//!
//! # Registration ordering
//!
//! The backend-instance list of a key is fixed at the key's first resolution.
//! A factory registered after that point applies to keys resolved later but
//! never retroactively to keys already resolved. This is a documented
//! limitation, not an error: register factories before resolving handles.
//!
//! # Thread safety
//!
//! All types are thread-safe. Handles may be cloned freely and start/stop may
//! be invoked concurrently from many threads; once a key's entry is built,
//! the start/stop path takes no crate-internal lock. Backend instances must
//! handle concurrent start/stop calls themselves.
//!
//! # Panic policy
//!
//! Backends and factories are infallible by contract; no error type crosses
//! this crate's boundary. The crate itself panics only if a crate-internal
//! lock is poisoned, which can only happen if a user-supplied factory panics
//! during `create`.

mod backend;
mod constants;
mod guard;
mod handle;
mod registry;
mod scoped;

#[cfg(test)]
mod test_support;

pub use backend::*;
pub(crate) use constants::*;
pub use guard::*;
pub use handle::*;
pub use registry::*;
pub use scoped::*;
