use crate::{Tokens, WaitHandle};

/// The scope object produced by [`scoped_wait!`], stopping the singleton
/// handle when dropped.
///
/// # Token semantics
///
/// Unlike [`WaitGuard`][crate::WaitGuard], this convenience path does not
/// carry the token list produced by its own start call: the stop is delivered
/// with an empty token set, which means backends receive the start but no
/// paired stop. Backends that only count outstanding starts or bucket waits
/// by start time are unaffected; backends that need token correlation must be
/// driven through [`WaitHandle::measure()`] instead. This mirrors the
/// long-standing behavior of the system this crate instruments and is
/// intentionally preserved rather than silently changed.
#[derive(Debug)]
#[must_use = "the wait is measured until the scope is dropped"]
pub struct StaticWaitScope {
    handle: &'static WaitHandle,
}

impl StaticWaitScope {
    /// Starts a wait on the singleton handle, discarding the tokens.
    pub fn enter(handle: &'static WaitHandle) -> Self {
        drop(handle.start());
        Self { handle }
    }
}

impl Drop for StaticWaitScope {
    fn drop(&mut self) {
        self.handle.stop(Tokens::new());
    }
}

/// Evaluates to a `&'static` [`WaitHandle`] for a literal key, resolved
/// against the process-wide registry.
///
/// The handle behind each macro invocation is a per-callsite singleton,
/// lazily constructed exactly once no matter how many threads race to first
/// use it. Repeated calls through the same callsite are a static read plus an
/// initialization check.
///
/// ```
/// use wait_counter::wait_counter;
///
/// let handle = wait_counter!("io_read_wait");
/// let tokens = handle.start();
/// // ... wait for the thing ...
/// handle.stop(tokens);
/// ```
#[macro_export]
macro_rules! wait_counter {
    ($key:expr) => {{
        static HANDLE: ::std::sync::LazyLock<$crate::WaitHandle> =
            ::std::sync::LazyLock::new(|| $crate::WaitHandle::new($key));
        ::std::sync::LazyLock::force(&HANDLE)
    }};
}

/// Starts the per-callsite singleton handle for a literal key and yields a
/// [`StaticWaitScope`] that stops it at end of scope.
///
/// See [`StaticWaitScope`] for the token semantics of this convenience path.
///
/// ```
/// use wait_counter::scoped_wait;
///
/// fn wait_for_flush() {
///     let _scope = scoped_wait!("flush_wait");
///     // ... wait for the thing ...
/// }
/// # wait_for_flush();
/// ```
#[macro_export]
macro_rules! scoped_wait {
    ($key:expr) => {
        $crate::StaticWaitScope::enter($crate::wait_counter!($key))
    };
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::WaitRegistry;
    use crate::test_support::{Call, RecordingFactory, new_call_log};

    #[test]
    fn scope_starts_but_does_not_stop_backends() {
        // An isolated registry keeps this test away from the global one; the
        // scope type itself does not care where its handle came from.
        let log = new_call_log();
        let registry = WaitRegistry::new();
        registry.register(RecordingFactory::new("a", 0, &log));

        let handle = Box::leak(Box::new(registry.handle("k")));

        {
            let _scope = StaticWaitScope::enter(handle);
        }

        let calls = log.lock().unwrap();
        assert!(matches!(calls.as_slice(), [Call::Start { .. }]));
    }

    #[test]
    fn macro_singleton_is_stable_across_calls() {
        fn resolve() -> &'static crate::WaitHandle {
            wait_counter!("wait_counter_macro_singleton_test")
        }

        let first = resolve();
        let second = resolve();

        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn scoped_wait_macro_compiles_against_global_registry() {
        let _scope = scoped_wait!("wait_counter_scoped_macro_test");
    }

    assert_impl_all!(StaticWaitScope: Send, Sync);
}
