use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::regs::{FGGB_CACHECTL, FGGB_RST, FGPS_PC_COPY};

use super::RegisterWindow;

/// One register write observed by a [`SimWindow`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RegWrite {
    pub addr: u32,
    pub value: u32,
}

#[derive(Debug, Default)]
struct SimState {
    regs: HashMap<u32, u32>,
    log: Vec<RegWrite>,
    self_clearing: HashSet<u32>,
}

/// In-memory register file standing in for the device.
///
/// Clones share the same register file, so several contexts can be pointed
/// at one simulated device. Every write is appended to a log. Trigger
/// registers (cache control, reset, PC copy) read back as zero once
/// written, like the hardware does when the requested operation finishes.
#[derive(Debug, Clone)]
pub struct SimWindow {
    inner: Arc<Mutex<SimState>>,
}

impl SimWindow {
    pub fn new() -> Self {
        let state = SimState {
            self_clearing: [FGGB_CACHECTL, FGGB_RST, FGPS_PC_COPY].into_iter().collect(),
            ..SimState::default()
        };
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the write log.
    pub fn writes(&self) -> Vec<RegWrite> {
        self.state().log.clone()
    }

    /// Returns and clears the write log.
    pub fn take_writes(&self) -> Vec<RegWrite> {
        std::mem::take(&mut self.state().log)
    }

    /// Returns the current content of a register, if it was ever written.
    pub fn value(&self, addr: u32) -> Option<u32> {
        self.state().regs.get(&addr).copied()
    }

    /// Sets a register without logging a write (e.g. a status word).
    pub fn preset(&self, addr: u32, value: u32) {
        self.state().regs.insert(addr, value);
    }

    /// Makes `addr` keep its written value instead of self-clearing.
    pub fn latch(&self, addr: u32) {
        self.state().self_clearing.remove(&addr);
    }
}

impl Default for SimWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterWindow for SimWindow {
    fn read(&mut self, offset: u32) -> u32 {
        self.state().regs.get(&offset).copied().unwrap_or(0)
    }

    fn write(&mut self, offset: u32, value: u32) {
        let mut state = self.state();
        state.log.push(RegWrite {
            addr: offset,
            value,
        });
        let stored = if state.self_clearing.contains(&offset) {
            0
        } else {
            value
        };
        state.regs.insert(offset, stored);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_register_file() {
        let a = SimWindow::new();
        let mut b = a.clone();
        b.write(0x100, 7);
        assert_eq!(a.value(0x100), Some(7));
        assert_eq!(a.take_writes(), vec![RegWrite { addr: 0x100, value: 7 }]);
        assert!(b.writes().is_empty());
    }

    #[test]
    fn trigger_registers_self_clear() {
        let mut sim = SimWindow::new();
        sim.write(FGGB_CACHECTL, 0x300);
        assert_eq!(sim.read(FGGB_CACHECTL), 0);

        sim.latch(FGGB_CACHECTL);
        sim.write(FGGB_CACHECTL, 0x300);
        assert_eq!(sim.read(FGGB_CACHECTL), 0x300);
    }

    #[test]
    fn preset_is_not_logged() {
        let mut sim = SimWindow::new();
        sim.preset(0x40, 1);
        assert_eq!(sim.read(0x40), 1);
        assert!(sim.writes().is_empty());
    }
}
