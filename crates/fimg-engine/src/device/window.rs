use std::sync::atomic::{Ordering, fence};

/// Raw access to a block of 32-bit device registers.
///
/// Implementations perform the access only; ordering and lock checks are
/// applied by [`Registers`], which is the one path the engine uses.
pub trait RegisterWindow {
    /// Reads the register at byte `offset`.
    fn read(&mut self, offset: u32) -> u32;

    /// Writes `value` to the register at byte `offset`.
    fn write(&mut self, offset: u32, value: u32);
}

/// Register window plus the owning context's view of the hardware lock.
///
/// Every access is bracketed by a full memory barrier: the device is not
/// guaranteed to observe writes in program order otherwise.
///
/// Accessing registers without holding the lock is a contract violation.
/// Debug builds assert on it; release builds perform the access anyway.
#[derive(Debug)]
pub struct Registers<W> {
    window: W,
    locked: bool,
}

impl<W: RegisterWindow> Registers<W> {
    pub fn new(window: W) -> Self {
        Self {
            window,
            locked: false,
        }
    }

    /// Returns whether the owning context believes it holds the device.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[inline]
    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Returns the underlying window.
    pub fn window(&self) -> &W {
        &self.window
    }

    /// Writes a register with a barrier on both sides.
    #[inline]
    pub fn write(&mut self, addr: u32, value: u32) {
        debug_assert!(
            self.locked,
            "register write to {addr:#07x} without holding the hardware lock"
        );
        fence(Ordering::SeqCst);
        self.window.write(addr, value);
        fence(Ordering::SeqCst);
    }

    /// Writes an IEEE-754 single to a float register.
    #[inline]
    pub fn write_f32(&mut self, addr: u32, value: f32) {
        self.write(addr, value.to_bits());
    }

    /// Reads a register with a barrier on both sides.
    #[inline]
    pub fn read(&mut self, addr: u32) -> u32 {
        debug_assert!(
            self.locked,
            "register read from {addr:#07x} without holding the hardware lock"
        );
        fence(Ordering::SeqCst);
        let value = self.window.read(addr);
        fence(Ordering::SeqCst);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::SimWindow;

    #[test]
    fn writes_reach_the_window_in_order() {
        let sim = SimWindow::new();
        let mut regs = Registers::new(sim.clone());
        regs.set_locked(true);

        regs.write(0x10, 1);
        regs.write(0x20, 2);
        regs.write_f32(0x30, 1.0);

        let log: Vec<_> = sim.writes().iter().map(|w| (w.addr, w.value)).collect();
        assert_eq!(log, vec![(0x10, 1), (0x20, 2), (0x30, 0x3f80_0000)]);
        assert_eq!(regs.read(0x20), 2);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "without holding the hardware lock")]
    fn unlocked_write_is_caught_in_debug_builds() {
        let mut regs = Registers::new(SimWindow::new());
        regs.write(0x10, 1);
    }
}
