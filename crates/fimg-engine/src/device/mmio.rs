use std::fs::{File, OpenOptions};

use anyhow::{Context, Result};
use memmap2::{MmapMut, MmapOptions};

use super::{DeviceInit, RegisterWindow};

/// Register window backed by a memory mapping of the device node.
///
/// The mapping lives from device open to drop; the file handle is kept for
/// the same duration.
pub struct MmioWindow {
    map: MmapMut,
    _file: File,
}

impl MmioWindow {
    /// Opens the device node and maps its register window.
    pub fn open(init: &DeviceInit) -> Result<Self> {
        anyhow::ensure!(init.window_size > 0, "register window has zero size");

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&init.path)
            .with_context(|| format!("failed to open {}", init.path.display()))?;

        // SAFETY: the mapping is only accessed through volatile reads and
        // writes of aligned words inside its bounds (see `reg_ptr`).
        let map = unsafe { MmapOptions::new().len(init.window_size).map_mut(&file) }
            .with_context(|| format!("failed to map {} bytes of registers", init.window_size))?;

        log::info!(
            "mapped {:#x} bytes of registers from {}",
            init.window_size,
            init.path.display()
        );

        Ok(Self { map, _file: file })
    }

    fn reg_ptr(&mut self, offset: u32) -> *mut u32 {
        let offset = offset as usize;
        assert!(
            offset % 4 == 0 && offset + 4 <= self.map.len(),
            "register offset {offset:#x} outside the mapped window"
        );
        // SAFETY: bounds and alignment checked above; the mapping base is page aligned.
        unsafe { self.map.as_mut_ptr().add(offset).cast::<u32>() }
    }
}

impl RegisterWindow for MmioWindow {
    #[inline]
    fn read(&mut self, offset: u32) -> u32 {
        let ptr = self.reg_ptr(offset);
        // SAFETY: `reg_ptr` yields an aligned pointer inside the live mapping.
        unsafe { ptr.read_volatile() }
    }

    #[inline]
    fn write(&mut self, offset: u32, value: u32) {
        let ptr = self.reg_ptr(offset);
        // SAFETY: `reg_ptr` yields an aligned pointer inside the live mapping.
        unsafe { ptr.write_volatile(value) }
    }
}
