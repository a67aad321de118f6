use crate::regs::{
    CACHECTL_TEXTURE_SHIFT, CACHECTL_VTX_TEXTURE_SHIFT, FGGB_CACHECTL, FGGB_PIPESTATE,
};
use crate::word::register_word;

use super::{RegisterWindow, Registers};

/// Upper bound on status polls before a wait is abandoned.
const SPIN_LIMIT: u32 = 100_000;

register_word! {
    /// `FGGB_PIPESTATE`: one busy bit per pipeline block.
    pub struct PipelineStatus {
        host_fifo, set_host_fifo: bool @ 0, 1;
        host_interface, set_host_interface: bool @ 1, 1;
        vertex_fifo, set_vertex_fifo: bool @ 2, 1;
        vertex_cache, set_vertex_cache: bool @ 3, 1;
        vertex_shader, set_vertex_shader: bool @ 4, 1;
        primitive_engine, set_primitive_engine: bool @ 8, 1;
        triangle_setup, set_triangle_setup: bool @ 9, 1;
        raster_engine, set_raster_engine: bool @ 10, 1;
        pixel_shader, set_pixel_shader: bool @ 12, 1;
        per_fragment, set_per_fragment: bool @ 16, 1;
        color_cache, set_color_cache: bool @ 18, 1;
    }
}

impl PipelineStatus {
    /// Every block of the pipeline.
    pub const ALL: Self = Self::from_raw(0x0005_171f);

    #[inline]
    pub fn is_idle(self, mask: PipelineStatus) -> bool {
        self.to_raw_word() & mask.to_raw_word() == 0
    }
}

impl<W: RegisterWindow> Registers<W> {
    pub fn pipeline_status(&mut self) -> PipelineStatus {
        PipelineStatus::from_raw(self.read(FGGB_PIPESTATE))
    }

    /// Polls until every block selected by `mask` reports idle.
    ///
    /// Returns `false` if the pipeline was still busy after the spin limit.
    pub fn wait_idle(&mut self, mask: PipelineStatus) -> bool {
        for _ in 0..SPIN_LIMIT {
            if self.pipeline_status().is_idle(mask) {
                return true;
            }
            std::hint::spin_loop();
        }
        log::warn!(
            "pipeline still busy after {SPIN_LIMIT} polls (mask {:#x})",
            mask.to_raw_word()
        );
        false
    }

    /// Flushes the selected texture caches and waits for completion.
    pub fn invalidate_caches(&mut self, vertex_textures: bool, textures: bool) -> bool {
        let mask = ((vertex_textures as u32) << CACHECTL_VTX_TEXTURE_SHIFT)
            | ((textures as u32 * 0x3) << CACHECTL_TEXTURE_SHIFT);
        if mask == 0 {
            return true;
        }

        self.write(FGGB_CACHECTL, mask);
        for _ in 0..SPIN_LIMIT {
            if self.read(FGGB_CACHECTL) & mask == 0 {
                return true;
            }
            std::hint::spin_loop();
        }
        log::warn!("texture cache flush did not complete (mask {mask:#x})");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::SimWindow;

    fn locked(sim: &SimWindow) -> Registers<SimWindow> {
        let mut regs = Registers::new(sim.clone());
        regs.set_locked(true);
        regs
    }

    #[test]
    fn all_mask_covers_every_block() {
        let mut s = PipelineStatus::default();
        s.set_host_fifo(true);
        s.set_host_interface(true);
        s.set_vertex_fifo(true);
        s.set_vertex_cache(true);
        s.set_vertex_shader(true);
        s.set_primitive_engine(true);
        s.set_triangle_setup(true);
        s.set_raster_engine(true);
        s.set_pixel_shader(true);
        s.set_per_fragment(true);
        s.set_color_cache(true);
        assert_eq!(s, PipelineStatus::ALL);
    }

    #[test]
    fn idle_pipeline_returns_immediately() {
        let sim = SimWindow::new();
        assert!(locked(&sim).wait_idle(PipelineStatus::ALL));
    }

    #[test]
    fn busy_block_outside_mask_is_ignored() {
        let sim = SimWindow::new();
        let mut busy = PipelineStatus::default();
        busy.set_per_fragment(true);
        sim.preset(FGGB_PIPESTATE, busy.to_raw_word());

        let mut mask = PipelineStatus::default();
        mask.set_vertex_shader(true);
        let mut regs = locked(&sim);
        assert!(regs.wait_idle(mask));
        assert!(!regs.wait_idle(busy));
    }

    #[test]
    fn cache_invalidation_writes_trigger_bits() {
        let sim = SimWindow::new();
        assert!(locked(&sim).invalidate_caches(false, true));
        let writes = sim.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].addr, FGGB_CACHECTL);
        assert_eq!(writes[0].value, 0x300);
    }

    #[test]
    fn stuck_cache_flush_times_out() {
        let sim = SimWindow::new();
        sim.latch(FGGB_CACHECTL);
        assert!(!locked(&sim).invalidate_caches(true, false));
    }
}
