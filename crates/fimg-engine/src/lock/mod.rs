//! Hardware lock: exclusive, preemptible ownership of the physical device.
//!
//! The lock is a service object shared by every context that talks to the
//! same device. A context holds it only for the duration of a locked
//! section. Losing it between sections means the device registers may have
//! been reprogrammed by someone else.

mod error;
mod shared;

pub use error::LockError;
pub use shared::SharedLock;

/// Identity of a logical context as seen by the arbiter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ContextId(pub u32);

/// Successful acquisition outcomes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AcquireStatus {
    /// Nobody touched the device since this context last released it.
    /// Register contents are still ours.
    AlreadyOwned,
    /// The device had no previous owner. Register contents are unknown.
    ReacquiredClean,
    /// Another context owned the device in between. Register contents are
    /// unknown.
    ReacquiredAfterOther,
}

impl AcquireStatus {
    /// Whether every functional-unit state must be replayed before the
    /// registers can be trusted.
    #[inline]
    pub fn requires_restore(self) -> bool {
        !matches!(self, AcquireStatus::AlreadyOwned)
    }
}

/// Arbitration contract for the physical device.
pub trait HardwareLock: Send + Sync {
    /// Hands out an identity for a new context.
    fn register(&self) -> ContextId;

    /// Blocks until `owner` holds the device.
    fn acquire(&self, owner: ContextId) -> Result<AcquireStatus, LockError>;

    /// Gives the device up so another context may acquire it.
    fn release(&self, owner: ContextId);

    /// Forgets `owner` entirely; called when its context closes.
    fn detach(&self, owner: ContextId);
}
