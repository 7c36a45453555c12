use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

pub(crate) fn read_guard<'a, T>(
    lock: &'a RwLock<T>,
    source: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                source_module = source,
                lock_kind = "rwlock.read",
                outcome = "recovered_from_poison",
                note = "entries may be stale after a panic in another thread",
                "Recovered from poisoned transient lock"
            );
            poisoned.into_inner()
        }
    }
}

pub(crate) fn write_guard<'a, T>(
    lock: &'a RwLock<T>,
    source: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                source_module = source,
                lock_kind = "rwlock.write",
                outcome = "recovered_from_poison",
                note = "entries may be stale after a panic in another thread",
                "Recovered from poisoned transient lock"
            );
            poisoned.into_inner()
        }
    }
}

pub(crate) fn mutex_guard<'a, T>(
    lock: &'a Mutex<T>,
    source: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                source_module = source,
                lock_kind = "mutex.lock",
                outcome = "recovered_from_poison",
                note = "entries may be stale after a panic in another thread",
                "Recovered from poisoned transient lock"
            );
            poisoned.into_inner()
        }
    }
}
