use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use tracing::warn;

static POISON_RECOVERIES: AtomicU64 = AtomicU64::new(0);

/// Locks a mutex, recovering the inner value if a previous holder panicked.
///
/// The capability cache must stay usable even after a poisoned lock; the
/// guarded state is always left in a consistent shape by its writers.
pub fn mutex_lock_or_recover<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        POISON_RECOVERIES.fetch_add(1, Ordering::Relaxed);
        warn!("recovering from poisoned mutex");
        poisoned.into_inner()
    })
}

/// Number of poisoned-lock recoveries since process start.
pub fn poison_recovery_count() -> u64 {
    POISON_RECOVERIES.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_returns_inner_value() {
        let lock = Mutex::new(7);
        assert_eq!(*mutex_lock_or_recover(&lock), 7);
    }

    #[test]
    fn recovers_after_poison() {
        let lock = std::sync::Arc::new(Mutex::new(1));
        let cloned = std::sync::Arc::clone(&lock);
        let _ = std::thread::spawn(move || {
            let _guard = cloned.lock().unwrap();
            panic!("poison it");
        })
        .join();

        let before = poison_recovery_count();
        let guard = mutex_lock_or_recover(&lock);
        assert_eq!(*guard, 1);
        assert!(poison_recovery_count() > before);
    }
}
