use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Utility methods for acquiring an `Arc<RwLock<T>>` lock without having
/// to unwrap the result.
///
/// A poisoned lock means another thread panicked while holding it, in which
/// case we propagate the panic.
pub trait LockExt<T> {
    fn acquire_read(&self) -> RwLockReadGuard<'_, T>;

    fn acquire_write(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> LockExt<T> for Arc<RwLock<T>> {
    fn acquire_read(&self) -> RwLockReadGuard<'_, T> {
        self.read().expect("poisoned lock")
    }

    fn acquire_write(&self) -> RwLockWriteGuard<'_, T> {
        self.write().expect("poisoned lock")
    }
}
