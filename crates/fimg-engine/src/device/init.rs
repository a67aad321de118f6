use std::path::PathBuf;

use crate::regs::SFR_SIZE;

/// Parameters for opening the hardware register window.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Device node exposing the register window through `mmap`.
    pub path: PathBuf,

    /// Number of bytes to map.
    ///
    /// Must cover every register offset in [`crate::regs`].
    pub window_size: usize,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/dev/s3c-g3d"),
            window_size: SFR_SIZE,
        }
    }
}
