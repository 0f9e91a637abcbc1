use crate::{Tokens, WaitHandle};

/// Pairs one start call with exactly one eventual stop.
///
/// The guard carries the token list from the start call that produced it and
/// delivers the stop on every exit path - normal return, early return, or
/// unwinding. Stopping is idempotent: after an explicit [`stop()`][Self::stop]
/// the drop delivers nothing. Moving the guard moves the obligation with it;
/// there is no way to deliver the stop twice.
///
/// # Example
///
/// ```
/// use wait_counter::WaitHandle;
///
/// let handle = WaitHandle::new("flush_wait");
///
/// {
///     let _guard = handle.measure();
///     // ... wait for the thing ...
/// } // stop is delivered here
/// ```
#[derive(Debug)]
#[must_use = "the wait is measured until the guard is stopped or dropped"]
pub struct WaitGuard {
    // `None` once stopped, so the drop path delivers nothing.
    handle: Option<WaitHandle>,
    tokens: Tokens,
}

impl WaitGuard {
    pub(crate) fn new(handle: WaitHandle, tokens: Tokens) -> Self {
        Self {
            handle: Some(handle),
            tokens,
        }
    }

    /// Stops the wait now instead of at end of scope.
    ///
    /// Consumes the guard; the subsequent drop delivers nothing.
    pub fn stop(mut self) {
        self.stop_once();
    }

    fn stop_once(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop(std::mem::take(&mut self.tokens));
        }
    }
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        self.stop_once();
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::WaitRegistry;
    use crate::test_support::{Call, RecordingFactory, new_call_log};

    fn counted_registry() -> (crate::test_support::CallLog, WaitRegistry) {
        let log = new_call_log();
        let registry = WaitRegistry::new();
        registry.register(RecordingFactory::new("a", 0, &log));
        (log, registry)
    }

    fn stop_count(log: &crate::test_support::CallLog) -> usize {
        log.lock()
            .unwrap()
            .iter()
            .filter(|call| matches!(call, Call::Stop { .. }))
            .count()
    }

    #[test]
    fn drop_delivers_stop_exactly_once() {
        let (log, registry) = counted_registry();
        let handle = registry.handle("k");

        {
            let _guard = handle.measure();
            assert_eq!(stop_count(&log), 0);
        }

        assert_eq!(stop_count(&log), 1);
    }

    #[test]
    fn explicit_stop_then_drop_delivers_stop_exactly_once() {
        let (log, registry) = counted_registry();
        let handle = registry.handle("k");

        let guard = handle.measure();
        guard.stop();

        // `stop()` consumed the guard and its drop has already run by now;
        // exactly one stop must have been delivered in total.
        assert_eq!(stop_count(&log), 1);
    }

    #[test]
    fn guard_carries_tokens_from_its_own_start() {
        let log = new_call_log();
        let registry = WaitRegistry::new();
        registry.register(RecordingFactory::new("a", 100, &log));
        registry.register(RecordingFactory::new("b", 200, &log));

        let handle = registry.handle("k");
        handle.measure().stop();

        let calls = log.lock().unwrap();
        let started: Vec<_> = calls
            .iter()
            .filter_map(|call| match call {
                Call::Start { token, .. } => Some(*token),
                Call::Stop { .. } => None,
            })
            .collect();
        let stopped: Vec<_> = calls
            .iter()
            .filter_map(|call| match call {
                Call::Stop { token, .. } => Some(*token),
                Call::Start { .. } => None,
            })
            .collect();

        assert_eq!(started, stopped);
    }

    #[test]
    fn moved_guard_still_delivers_one_stop() {
        let (log, registry) = counted_registry();
        let handle = registry.handle("k");

        let guard = handle.measure();
        let moved = guard;
        drop(moved);

        assert_eq!(stop_count(&log), 1);
    }

    #[test]
    fn guard_delivers_stop_during_unwind() {
        let (log, registry) = counted_registry();
        let handle = registry.handle("k");

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = handle.measure();
            panic!("wait aborted");
        }));

        assert!(outcome.is_err());
        assert_eq!(stop_count(&log), 1);
    }

    // Guards may be handed across threads along with the work they measure.
    assert_impl_all!(WaitGuard: Send, Sync);
}
