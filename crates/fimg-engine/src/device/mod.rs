//! Register window access.
//!
//! This module is responsible for:
//! - mapping the device's special-function registers (or simulating them)
//! - the single read/write-with-barrier path every hardware access goes through
//! - guarding register access on the hardware lock in debug builds

mod init;
mod mmio;
mod sim;
mod status;
mod window;

pub use init::DeviceInit;
pub use mmio::MmioWindow;
pub use sim::{RegWrite, SimWindow};
pub use status::PipelineStatus;
pub use window::{RegisterWindow, Registers};
