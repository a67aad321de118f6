use crate::device::{RegisterWindow, Registers};
use crate::queue::RegisterQueue;
use crate::regs::{
    FGPE_DEPTHRANGE_HALF_F_ADD_N, FGPE_DEPTHRANGE_HALF_F_SUB_N, FGPE_VERTEX_CONTEXT,
    FGPE_VIEWPORT_HALF_PX, FGPE_VIEWPORT_HALF_PY, FGPE_VIEWPORT_OX, FGPE_VIEWPORT_OY,
};
use crate::word::register_word;

/// Primitive topology. The hardware takes these one-hot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    PointSprites,
    Points,
    LineStrip,
    LineLoop,
    Lines,
    TriangleStrip,
    TriangleFan,
    Triangles,
}

impl PrimitiveType {
    #[inline]
    pub const fn to_bits(self) -> u32 {
        1 << (self as u32)
    }
}

register_word! {
    /// `FGPE_VERTEX_CONTEXT`: topology and varyings passed to the rasterizer.
    pub struct VertexContext {
        flat_shade_select, set_flat_shade_select: u32 @ 0, 9;
        flat_shade_enable, set_flat_shade_enable: bool @ 9, 1;
        /// Number of vertex shader outputs besides position.
        vs_out, set_vs_out: u32 @ 10, 4;
        point_size, set_point_size: bool @ 18, 1;
        primitive, set_primitive: u32 @ 19, 8;
    }
}

/// Primitive engine: topology and viewport transform.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveState {
    pub vctx: VertexContext,
    pub ox: f32,
    pub oy: f32,
    pub half_px: f32,
    pub half_py: f32,
    pub half_distance: f32,
    pub center: f32,
}

impl Default for PrimitiveState {
    fn default() -> Self {
        let mut vctx = VertexContext::default();
        vctx.set_primitive(PrimitiveType::Triangles.to_bits());
        vctx.set_vs_out(1);

        Self {
            vctx,
            ox: 0.0,
            oy: 0.0,
            half_px: 0.0,
            half_py: 0.0,
            half_distance: 0.5,
            center: 0.5,
        }
    }
}

impl PrimitiveState {
    pub fn set_vertex_context(&mut self, queue: &mut RegisterQueue, vctx: VertexContext) {
        self.vctx = vctx;
        queue.write(FGPE_VERTEX_CONTEXT, vctx.to_raw_word());
    }

    pub fn set_primitive(&mut self, queue: &mut RegisterQueue, primitive: PrimitiveType) {
        let mut vctx = self.vctx;
        vctx.set_primitive(primitive.to_bits());
        vctx.set_point_size(primitive == PrimitiveType::Points);
        if vctx != self.vctx {
            self.set_vertex_context(queue, vctx);
        }
    }

    /// Sets the viewport rectangle in framebuffer pixels.
    pub fn set_viewport(&mut self, queue: &mut RegisterQueue, x: f32, y: f32, w: f32, h: f32) {
        self.half_px = w / 2.0;
        self.half_py = h / 2.0;
        self.ox = x + self.half_px;
        self.oy = y + self.half_py;
        queue.write_f32(FGPE_VIEWPORT_OX, self.ox);
        queue.write_f32(FGPE_VIEWPORT_OY, self.oy);
        queue.write_f32(FGPE_VIEWPORT_HALF_PX, self.half_px);
        queue.write_f32(FGPE_VIEWPORT_HALF_PY, self.half_py);
    }

    pub fn set_depth_range(&mut self, queue: &mut RegisterQueue, near: f32, far: f32) {
        self.half_distance = (far - near) / 2.0;
        self.center = (far + near) / 2.0;
        queue.write_f32(FGPE_DEPTHRANGE_HALF_F_SUB_N, self.half_distance);
        queue.write_f32(FGPE_DEPTHRANGE_HALF_F_ADD_N, self.center);
    }

    pub(crate) fn restore<W: RegisterWindow>(&self, regs: &mut Registers<W>) {
        regs.write(FGPE_VERTEX_CONTEXT, self.vctx.to_raw_word());
        regs.write_f32(FGPE_VIEWPORT_OX, self.ox);
        regs.write_f32(FGPE_VIEWPORT_OY, self.oy);
        regs.write_f32(FGPE_VIEWPORT_HALF_PX, self.half_px);
        regs.write_f32(FGPE_VIEWPORT_HALF_PY, self.half_py);
        regs.write_f32(FGPE_DEPTHRANGE_HALF_F_SUB_N, self.half_distance);
        regs.write_f32(FGPE_DEPTHRANGE_HALF_F_ADD_N, self.center);
    }
}
