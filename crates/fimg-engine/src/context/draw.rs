use crate::device::{PipelineStatus, RegisterWindow};
use crate::queue::FlushOutcome;
use crate::regs::{FGHI_FIFO_ENTRY, FGHI_VBADDR, FGHI_VBDATA};
use crate::shader::{BindOutcome, ShaderKey, ShaderProgram, ShaderUnit};
use crate::state::PrimitiveType;

use super::{ContextPhase, HardwareContext};

/// A program together with the logical key it was generated from.
#[derive(Debug, Copy, Clone)]
pub struct ShaderBinding<'a> {
    pub key: ShaderKey,
    pub program: &'a ShaderProgram,
}

/// One primitive batch.
#[derive(Debug, Copy, Clone)]
pub struct DrawRequest<'a> {
    pub primitive: PrimitiveType,
    pub vertex_shader: ShaderBinding<'a>,
    pub pixel_shader: ShaderBinding<'a>,
    /// Interleaved attribute data, streamed to the host interface as is.
    pub vertices: &'a [f32],
    /// Number of vertices in `vertices`. Every vertex occupies the same
    /// number of words, at least one per enabled attribute.
    pub count: u32,
}

/// What a draw did on its way to the device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DrawReport {
    /// Outcome of the flush that preceded shader binding.
    pub state: FlushOutcome,
    pub vertex: BindOutcome,
    pub pixel: BindOutcome,
}

impl<W: RegisterWindow> HardwareContext<W> {
    /// Submits one primitive batch.
    ///
    /// Queued state is flushed first, so a replay caused by queue overflow
    /// happens before the shaders are bound and cannot discard them. The
    /// selection words queued by binding go out with a second flush, and the
    /// vertex count write that starts the pipeline comes last.
    ///
    /// A suspended context takes the device for the duration of the draw.
    pub fn draw(&mut self, request: &DrawRequest<'_>) -> DrawReport {
        debug_assert!(
            request.count > 0
                && request.vertices.len() % request.count as usize == 0
                && request.vertices.len() / request.count as usize >= self.num_attribs,
            "{} words do not hold {} vertices of {} attributes",
            request.vertices.len(),
            request.count,
            self.num_attribs
        );

        let borrowed = self.phase != ContextPhase::Active;
        if borrowed {
            self.acquire();
        }

        self.units
            .primitive
            .set_primitive(&mut self.queue, request.primitive);
        let state = self.flush();

        let vertex = self.bind(ShaderUnit::Vertex, &request.vertex_shader);
        let pixel = self.bind(ShaderUnit::Pixel, &request.pixel_shader);
        self.flush();

        self.submit(request.vertices, request.count);

        if borrowed {
            self.release();
        }
        DrawReport {
            state,
            vertex,
            pixel,
        }
    }

    fn bind(&mut self, unit: ShaderUnit, binding: &ShaderBinding<'_>) -> BindOutcome {
        debug_assert_eq!(binding.program.unit(), unit);

        if !self.shaders.contains(unit, binding.key) {
            // Instruction memory must not change under a running program.
            let mut busy = PipelineStatus::default();
            busy.set_vertex_shader(true);
            busy.set_pixel_shader(true);
            self.regs.wait_idle(busy);
        }

        self.shaders
            .bind(binding.key, binding.program, &mut self.regs, &mut self.queue)
    }

    fn submit(&mut self, vertices: &[f32], count: u32) {
        self.vertex_data.clear();
        self.vertex_data.extend(vertices.iter().map(|v| v.to_bits()));

        self.regs.write(FGHI_VBADDR, 0);
        for &word in &self.vertex_data {
            self.regs.write(FGHI_VBDATA, word);
        }
        self.regs.write(FGHI_FIFO_ENTRY, count);
        log::trace!(
            "context {}: drew {count} vertices ({} words)",
            self.id.0,
            self.vertex_data.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::context::ContextInit;
    use crate::device::SimWindow;
    use crate::lock::SharedLock;
    use crate::regs::{FGPE_VERTEX_CONTEXT, FGPS_PC_COPY, FGVS_INSTMEM};

    fn programs() -> (ShaderProgram, ShaderProgram) {
        (
            ShaderProgram::new(ShaderUnit::Vertex, vec![0xa; 4]).unwrap(),
            ShaderProgram::new(ShaderUnit::Pixel, vec![0xb; 4]).unwrap(),
        )
    }

    fn request<'a>(vs: &'a ShaderProgram, ps: &'a ShaderProgram, vertices: &'a [f32]) -> DrawRequest<'a> {
        DrawRequest {
            primitive: PrimitiveType::Lines,
            vertex_shader: ShaderBinding {
                key: ShaderKey::from_words([3, 0, 0]),
                program: vs,
            },
            pixel_shader: ShaderBinding {
                key: ShaderKey::from_words([4, 0, 0]),
                program: ps,
            },
            vertices,
            count: 2,
        }
    }

    #[test]
    fn draw_orders_state_shaders_then_vertices() {
        let sim = SimWindow::new();
        let mut ctx = HardwareContext::open(sim.clone(), Arc::new(SharedLock::new()), ContextInit::default());
        sim.take_writes();

        let (vs, ps) = programs();
        let vertices = [1.0, 2.0, 3.0, 4.0];
        let report = ctx.draw(&request(&vs, &ps, &vertices));
        assert_eq!(report.state, FlushOutcome::Drained(1));

        let writes = sim.writes();
        let pos = |addr| writes.iter().position(|w| w.addr == addr).unwrap();
        assert!(pos(FGPE_VERTEX_CONTEXT) < pos(FGVS_INSTMEM));
        assert!(pos(FGVS_INSTMEM) < pos(FGPS_PC_COPY));
        assert!(pos(FGPS_PC_COPY) < pos(FGHI_VBADDR));

        let data: Vec<_> = writes
            .iter()
            .filter(|w| w.addr == FGHI_VBDATA)
            .map(|w| f32::from_bits(w.value))
            .collect();
        assert_eq!(data, vertices);

        let last = writes.last().unwrap();
        assert_eq!((last.addr, last.value), (FGHI_FIFO_ENTRY, 2));
    }

    #[test]
    fn suspended_context_borrows_the_device() {
        let sim = SimWindow::new();
        let lock = Arc::new(SharedLock::new());
        let mut ctx = HardwareContext::open(sim.clone(), lock.clone(), ContextInit::default());
        ctx.release();

        let (vs, ps) = programs();
        ctx.draw(&request(&vs, &ps, &[0.0; 4]));

        assert_eq!(ctx.phase(), ContextPhase::Suspended);
        assert_eq!(lock.holder(), None);
    }

    #[test]
    fn repeated_draw_uploads_nothing() {
        let sim = SimWindow::new();
        let mut ctx = HardwareContext::open(sim.clone(), Arc::new(SharedLock::new()), ContextInit::default());
        let (vs, ps) = programs();
        let vertices = [0.0; 4];

        ctx.draw(&request(&vs, &ps, &vertices));
        sim.take_writes();
        let report = ctx.draw(&request(&vs, &ps, &vertices));

        assert_eq!(report.vertex, BindOutcome::Hit(0));
        assert_eq!(report.pixel, BindOutcome::Hit(0));
        assert_eq!(report.state, FlushOutcome::Idle);
        assert!(sim.writes().iter().all(|w| w.addr != FGVS_INSTMEM));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "do not hold")]
    fn vertex_count_must_divide_the_data() {
        let sim = SimWindow::new();
        let mut ctx = HardwareContext::open(sim, Arc::new(SharedLock::new()), ContextInit::default());
        let (vs, ps) = programs();
        let vertices = [0.0; 4];

        ctx.draw(&DrawRequest {
            count: 3,
            ..request(&vs, &ps, &vertices)
        });
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "do not hold")]
    fn vertices_must_cover_every_attribute() {
        let sim = SimWindow::new();
        let mut ctx = HardwareContext::open(sim, Arc::new(SharedLock::new()), ContextInit::default());
        ctx.set_attribute_count(3);
        let (vs, ps) = programs();
        let vertices = [0.0; 4];

        ctx.draw(&request(&vs, &ps, &vertices));
    }
}
