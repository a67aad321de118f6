use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use super::{AcquireStatus, ContextId, HardwareLock, LockError};

#[derive(Debug, Default)]
struct LockState {
    /// Context currently inside a locked section.
    holder: Option<ContextId>,
    /// Context whose register state the device currently carries.
    last_owner: Option<ContextId>,
}

/// In-process arbiter built on a mutex and a condition variable.
///
/// Waiters block until the holder releases. The arbiter remembers who owned
/// the device last, which is what lets an uncontended context skip the
/// restore on its next acquisition.
#[derive(Debug)]
pub struct SharedLock {
    state: Mutex<LockState>,
    freed: Condvar,
    next_id: AtomicU32,
}

impl SharedLock {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LockState::default()),
            freed: Condvar::new(),
            next_id: AtomicU32::new(1),
        }
    }

    /// Returns the context currently holding the device, if any.
    pub fn holder(&self) -> Option<ContextId> {
        self.state().holder
    }

    fn state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SharedLock {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareLock for SharedLock {
    fn register(&self) -> ContextId {
        ContextId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn acquire(&self, owner: ContextId) -> Result<AcquireStatus, LockError> {
        let mut state = self.state();
        if state.holder == Some(owner) {
            return Err(LockError::AlreadyHeld(owner));
        }

        while state.holder.is_some() {
            state = self
                .freed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let status = match state.last_owner {
            Some(prev) if prev == owner => AcquireStatus::AlreadyOwned,
            Some(_) => AcquireStatus::ReacquiredAfterOther,
            None => AcquireStatus::ReacquiredClean,
        };
        state.holder = Some(owner);
        state.last_owner = Some(owner);

        log::trace!("context {} acquired the device: {status:?}", owner.0);
        Ok(status)
    }

    fn release(&self, owner: ContextId) {
        let mut state = self.state();
        if state.holder != Some(owner) {
            log::warn!("context {} released a lock it does not hold", owner.0);
            return;
        }
        state.holder = None;
        drop(state);
        self.freed.notify_one();
        log::trace!("context {} released the device", owner.0);
    }

    fn detach(&self, owner: ContextId) {
        let mut state = self.state();
        let was_holding = state.holder == Some(owner);
        if was_holding {
            state.holder = None;
        }
        if state.last_owner == Some(owner) {
            state.last_owner = None;
        }
        drop(state);
        if was_holding {
            self.freed.notify_one();
        }
    }
}
