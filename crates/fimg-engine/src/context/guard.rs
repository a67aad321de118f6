use std::ops::{Deref, DerefMut};

use crate::device::RegisterWindow;

use super::HardwareContext;

/// Locked section of a [`HardwareContext`].
///
/// The device is released when the guard goes out of scope, including on
/// early return and unwinding. A guard taken while the context already held
/// the device leaves it held.
pub struct HardwareGuard<'a, W: RegisterWindow> {
    ctx: &'a mut HardwareContext<W>,
    release_on_drop: bool,
}

impl<'a, W: RegisterWindow> HardwareGuard<'a, W> {
    pub(super) fn new(ctx: &'a mut HardwareContext<W>, release_on_drop: bool) -> Self {
        Self {
            ctx,
            release_on_drop,
        }
    }
}

impl<W: RegisterWindow> Deref for HardwareGuard<'_, W> {
    type Target = HardwareContext<W>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl<W: RegisterWindow> DerefMut for HardwareGuard<'_, W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl<W: RegisterWindow> Drop for HardwareGuard<'_, W> {
    fn drop(&mut self) {
        if self.release_on_drop {
            self.ctx.release();
        }
    }
}
