// A poisoned lock means a user-supplied factory panicked while the registry
// lock was held; the cached state can no longer be trusted (we panic).
pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned lock - the registry state \
    can no longer be trusted because a backend factory panicked during creation";
