use crate::device::{PipelineStatus, RegisterWindow, Registers};
use crate::queue::RegisterQueue;
use crate::regs::{FGGB_INTMASK, FGGB_INTPENDING, FGGB_PIPEMASK, FGGB_PIPETGTSTATE};

/// Global block: interrupt routing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalState {
    /// Interrupt enable.
    pub int_enable: bool,
    /// Pipeline blocks whose state is compared against `int_target`.
    pub int_mask: PipelineStatus,
    /// Pipeline state that raises the interrupt once reached.
    pub int_target: PipelineStatus,
}

impl GlobalState {
    pub fn set_interrupt(
        &mut self,
        queue: &mut RegisterQueue,
        enable: bool,
        mask: PipelineStatus,
        target: PipelineStatus,
    ) {
        self.int_enable = enable;
        self.int_mask = mask;
        self.int_target = target;
        queue.write(FGGB_PIPEMASK, mask.to_raw_word());
        queue.write(FGGB_PIPETGTSTATE, target.to_raw_word());
        queue.write(FGGB_INTMASK, enable as u32);
    }

    pub(crate) fn restore<W: RegisterWindow>(&self, regs: &mut Registers<W>) {
        regs.write(FGGB_INTPENDING, 0);
        regs.write(FGGB_PIPEMASK, self.int_mask.to_raw_word());
        regs.write(FGGB_PIPETGTSTATE, self.int_target.to_raw_word());
        regs.write(FGGB_INTMASK, self.int_enable as u32);
    }
}
