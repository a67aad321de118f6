//! FIMG-3DSE hardware-context engine.
//!
//! This crate owns everything between the state-setting calls of a 3D
//! driver and the device registers:
//! - exclusive, preemptible ownership of the device through a hardware lock
//! - per-context mirrors of every functional-unit register, replayed whenever
//!   ownership was lost
//! - a write-combining register queue flushed once per draw
//! - a slot cache keeping compiled shader programs resident across draws

pub mod context;
pub mod device;
pub mod lock;
pub mod logging;
pub mod queue;
pub mod regs;
pub mod shader;
pub mod state;

mod word;

pub use context::{ContextInit, DrawRequest, HardwareContext, ShaderBinding};
pub use lock::{HardwareLock, SharedLock};
