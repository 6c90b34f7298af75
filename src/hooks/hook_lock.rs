use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global storage for an optional hook set.
///
/// Poisoning is ignored: a writer only ever swaps or extends the map, so a
/// panic while the write guard is held cannot leave it half-updated.
pub(crate) struct HookLock<T: 'static + Send + Sync> {
    slot: RwLock<Option<T>>,
}

pub(crate) struct HookLockReadGuard<T: 'static + Send + Sync> {
    guard: RwLockReadGuard<'static, Option<T>>,
}

pub(crate) struct HookLockWriteGuard<T: 'static + Send + Sync> {
    guard: RwLockWriteGuard<'static, Option<T>>,
}

impl<T: 'static + Send + Sync> HookLock<T> {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    #[inline]
    pub(crate) fn read(&'static self) -> HookLockReadGuard<T> {
        HookLockReadGuard {
            guard: self.slot.read().unwrap_or_else(PoisonError::into_inner),
        }
    }

    #[inline]
    pub(crate) fn write(&'static self) -> HookLockWriteGuard<T> {
        HookLockWriteGuard {
            guard: self.slot.write().unwrap_or_else(PoisonError::into_inner),
        }
    }
}

impl<T: 'static + Send + Sync> HookLockReadGuard<T> {
    #[inline]
    pub(crate) fn get(&self) -> Option<&T> {
        self.guard.as_ref()
    }
}

impl<T: 'static + Send + Sync> HookLockWriteGuard<T> {
    #[inline]
    pub(crate) fn get(&mut self) -> &mut Option<T> {
        &mut self.guard
    }
}
