use crate::device::RegisterWindow;
use crate::regs::*;

use super::HardwareContext;

/// Stage registers read back by [`HardwareContext::dump_state`].
const DUMP_REGISTERS: &[(&str, u32)] = &[
    ("FGGB_PIPESTATE", FGGB_PIPESTATE),
    ("FGGB_VERSION", FGGB_VERSION),
    ("FGGB_INTMASK", FGGB_INTMASK),
    ("FGGB_PIPEMASK", FGGB_PIPEMASK),
    ("FGGB_PIPETGTSTATE", FGGB_PIPETGTSTATE),
    ("FGHI_CONTROL", FGHI_CONTROL),
    ("FGHI_IDXOFFSET", FGHI_IDXOFFSET),
    ("FGVS_CONFIG", FGVS_CONFIG),
    ("FGVS_STATUS", FGVS_STATUS),
    ("FGVS_PC_RANGE", FGVS_PC_RANGE),
    ("FGPE_VERTEX_CONTEXT", FGPE_VERTEX_CONTEXT),
    ("FGPE_VIEWPORT_OX", FGPE_VIEWPORT_OX),
    ("FGPE_VIEWPORT_OY", FGPE_VIEWPORT_OY),
    ("FGPE_VIEWPORT_HALF_PX", FGPE_VIEWPORT_HALF_PX),
    ("FGPE_VIEWPORT_HALF_PY", FGPE_VIEWPORT_HALF_PY),
    ("FGRA_PIX_SAMP", FGRA_PIX_SAMP),
    ("FGRA_BFCULL", FGRA_BFCULL),
    ("FGRA_XCLIP", FGRA_XCLIP),
    ("FGRA_YCLIP", FGRA_YCLIP),
    ("FGRA_LODCTL", FGRA_LODCTL),
    ("FGPS_EXE_MODE", FGPS_EXE_MODE),
    ("FGPS_PC_START", FGPS_PC_START),
    ("FGPS_PC_END", FGPS_PC_END),
    ("FGPF_SCISSOR_X", FGPF_SCISSOR_X),
    ("FGPF_SCISSOR_Y", FGPF_SCISSOR_Y),
    ("FGPF_ALPHAT", FGPF_ALPHAT),
    ("FGPF_FRONTST", FGPF_FRONTST),
    ("FGPF_BACKST", FGPF_BACKST),
    ("FGPF_DEPTHT", FGPF_DEPTHT),
    ("FGPF_BLEND", FGPF_BLEND),
    ("FGPF_FBCTL", FGPF_FBCTL),
    ("FGPF_CBADDR", FGPF_CBADDR),
    ("FGPF_DBADDR", FGPF_DBADDR),
    ("FGPF_FBW", FGPF_FBW),
];

impl<W: RegisterWindow> HardwareContext<W> {
    /// Reads the main stage registers back from the device and logs them.
    ///
    /// Returns `(name, value)` pairs in stage order.
    pub fn dump_state(&mut self) -> Vec<(&'static str, u32)> {
        log::debug!("context {}: register dump", self.id.0);
        DUMP_REGISTERS
            .iter()
            .map(|&(name, addr)| {
                let value = self.regs.read(addr);
                log::debug!("  {name:<22} {addr:#07x} = {value:#010x}");
                (name, value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::context::ContextInit;
    use crate::device::SimWindow;
    use crate::lock::SharedLock;

    #[test]
    fn dump_reflects_restored_state() {
        let sim = SimWindow::new();
        let mut ctx = HardwareContext::open(sim.clone(), Arc::new(SharedLock::new()), ContextInit::default());
        ctx.set_framebuffer(0x5000_0000, 0x5100_0000, 640, 480, false);
        ctx.flush();

        let dump = ctx.dump_state();
        assert_eq!(dump.len(), DUMP_REGISTERS.len());
        assert!(dump.contains(&("FGPF_FBW", 640)));
        assert!(dump.contains(&("FGPF_CBADDR", 0x5000_0000)));
    }
}
