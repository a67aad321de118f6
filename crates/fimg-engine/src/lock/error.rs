use std::fmt;

use super::ContextId;

/// Acquisition failures. Every one of them is fatal to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The context tried to acquire a lock it already holds.
    AlreadyHeld(ContextId),
    /// The context was closed and can no longer own the device.
    ContextClosed(ContextId),
    /// The arbitration backend failed.
    Backend(String),
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::AlreadyHeld(id) => {
                write!(f, "context {} already holds the hardware lock", id.0)
            }
            LockError::ContextClosed(id) => write!(f, "context {} is closed", id.0),
            LockError::Backend(msg) => write!(f, "hardware lock backend failed: {msg}"),
        }
    }
}

impl std::error::Error for LockError {}
