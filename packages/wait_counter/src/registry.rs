use std::sync::{Arc, LazyLock, Mutex};

use foldhash::{HashMap, HashMapExt};

use crate::{ERR_POISONED_LOCK, WaitBackend, WaitBackendFactory, WaitHandle};

/// The cached state of one key: its ordered backend-instance list, frozen at
/// the key's first resolution.
///
/// Shared via `Arc` by every handle for the key; never mutated after publish,
/// so the start/stop fast path reads it without taking any lock.
#[derive(Debug)]
pub(crate) struct KeyEntry {
    key: String,
    backends: Box<[Box<dyn WaitBackend>]>,
}

impl KeyEntry {
    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn backends(&self) -> &[Box<dyn WaitBackend>] {
        &self.backends
    }
}

/// The factory list and the key map are guarded together so that a factory
/// registration can never race a first resolution into a lost registration
/// or a duplicate entry.
#[derive(Debug)]
struct RegistryState {
    factories: Vec<Box<dyn WaitBackendFactory>>,
    entries: HashMap<String, Arc<KeyEntry>>,
}

/// The ordered factory list plus the per-key backend-instance cache.
///
/// Most callers use the process-wide instance implicitly through
/// [`WaitHandle::new()`] and [`register_wait_backend()`]; tests that need an
/// isolated, resettable registry construct their own and resolve handles via
/// [`handle()`][Self::handle].
///
/// # Ordering
///
/// A key's backend-instance list is built from the factory list as observed
/// at the key's first resolution, in registration order. Factories registered
/// afterwards apply only to keys not yet resolved. Register factories early,
/// before resolving any handle.
///
/// # Example
///
/// ```
/// use wait_counter::WaitRegistry;
///
/// let registry = WaitRegistry::new();
/// let handle = registry.handle("cache_fill_wait");
///
/// let tokens = handle.start();
/// // ... wait for the thing ...
/// handle.stop(tokens);
/// ```
#[derive(Debug)]
pub struct WaitRegistry {
    state: Mutex<RegistryState>,
}

impl WaitRegistry {
    /// Creates an empty registry with no factories and no cached keys.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                factories: Vec::new(),
                entries: HashMap::new(),
            }),
        }
    }

    /// The process-wide registry used by [`WaitHandle::new()`] and
    /// [`register_wait_backend()`].
    ///
    /// Constructed lazily on first use; lives for the process. There is no
    /// teardown - on process exit, outstanding backend instances are dropped
    /// without a final stop.
    #[must_use]
    pub fn global() -> &'static Self {
        static GLOBAL: LazyLock<WaitRegistry> = LazyLock::new(WaitRegistry::new);
        &GLOBAL
    }

    /// Appends a factory to the ordered factory list.
    ///
    /// The factory is consulted at the first resolution of every key that
    /// happens after this call. Keys already resolved keep their existing
    /// backend-instance list.
    pub fn register<F>(&self, factory: F)
    where
        F: WaitBackendFactory + 'static,
    {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);
        state.factories.push(Box::new(factory));
    }

    /// Resolves a handle for `key`, building the key's entry on first use.
    ///
    /// Amortized constant time: the factory fan-out happens only on the first
    /// resolution of each key, every later resolution is a map lookup.
    #[must_use]
    pub fn handle(&self, key: &str) -> WaitHandle {
        WaitHandle::from_entry(self.resolve(key))
    }

    /// Returns the unique entry for `key`, creating it if absent.
    ///
    /// The entry is built and published under the registry lock, so racing
    /// first-resolutions of a brand-new key still produce exactly one entry
    /// and exactly one `create` call per factory.
    pub(crate) fn resolve(&self, key: &str) -> Arc<KeyEntry> {
        let mut state = self.state.lock().expect(ERR_POISONED_LOCK);

        if let Some(entry) = state.entries.get(key) {
            return Arc::clone(entry);
        }

        let backends: Vec<Box<dyn WaitBackend>> = state
            .factories
            .iter()
            .filter_map(|factory| factory.create(key))
            .collect();

        let entry = Arc::new(KeyEntry {
            key: key.to_owned(),
            backends: backends.into_boxed_slice(),
        });

        state.entries.insert(key.to_owned(), Arc::clone(&entry));
        entry
    }
}

impl Default for WaitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registers a backend factory with the process-wide registry.
///
/// Every key first resolved after this call is offered to `factory`; keys
/// already resolved are unaffected. Call this once per backend, early in
/// process life.
pub fn register_wait_backend<F>(factory: F)
where
    F: WaitBackendFactory + 'static,
{
    WaitRegistry::global().register(factory);
}
