use crate::device::{RegisterWindow, Registers};
use crate::queue::RegisterQueue;
use crate::regs::{
    FGPF_ALPHAT, FGPF_BACKST, FGPF_BLEND, FGPF_CBADDR, FGPF_CBMSK, FGPF_CCLR, FGPF_DBADDR,
    FGPF_DBMSK, FGPF_DEPTHT, FGPF_FBCTL, FGPF_FBW, FGPF_FRONTST, FGPF_LOGOP, FGPF_SCISSOR_X,
    FGPF_SCISSOR_Y,
};
use crate::word::register_word;

use super::rasterizer::MAX_CLIP_COORD;

/// Comparison function shared by alpha, stencil and depth tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompareFunc {
    Never = 0,
    Always = 1,
    Less = 2,
    LessEqual = 3,
    Equal = 4,
    Greater = 5,
    GreaterEqual = 6,
    NotEqual = 7,
}

register_word! {
    /// `FGPF_SCISSOR_X` / `FGPF_SCISSOR_Y`
    pub struct ScissorTestData {
        min, set_min: u32 @ 0, 12;
        max, set_max: u32 @ 16, 12;
        enable, set_enable: bool @ 31, 1;
    }
}

register_word! {
    /// `FGPF_ALPHAT`
    pub struct AlphaTestData {
        enable, set_enable: bool @ 0, 1;
        mode, set_mode: u32 @ 1, 4;
        value, set_value: u32 @ 5, 8;
    }
}

register_word! {
    /// `FGPF_FRONTST` / `FGPF_BACKST`
    pub struct StencilTestData {
        enable, set_enable: bool @ 0, 1;
        mode, set_mode: u32 @ 1, 3;
        reference, set_reference: u32 @ 4, 8;
        mask, set_mask: u32 @ 12, 8;
        sfail, set_sfail: u32 @ 23, 3;
        dpfail, set_dpfail: u32 @ 26, 3;
        dppass, set_dppass: u32 @ 29, 3;
    }
}

register_word! {
    /// `FGPF_DEPTHT`
    pub struct DepthTestData {
        enable, set_enable: bool @ 0, 1;
        mode, set_mode: u32 @ 1, 3;
    }
}

register_word! {
    /// `FGPF_BLEND`
    pub struct BlendControl {
        enable, set_enable: bool @ 0, 1;
        color_src, set_color_src: u32 @ 1, 4;
        alpha_src, set_alpha_src: u32 @ 5, 4;
        color_dst, set_color_dst: u32 @ 9, 4;
        alpha_dst, set_alpha_dst: u32 @ 13, 4;
        color_equation, set_color_equation: u32 @ 17, 3;
        alpha_equation, set_alpha_equation: u32 @ 20, 3;
    }
}

register_word! {
    /// `FGPF_LOGOP`
    pub struct LogOpControl {
        enable, set_enable: bool @ 0, 1;
        color, set_color: u32 @ 1, 4;
        alpha, set_alpha: u32 @ 5, 4;
    }
}

register_word! {
    /// `FGPF_CBMSK`: a set bit masks the channel off.
    pub struct ColorBufMask {
        a, set_a: bool @ 0, 1;
        b, set_b: bool @ 1, 1;
        g, set_g: bool @ 2, 1;
        r, set_r: bool @ 3, 1;
    }
}

register_word! {
    /// `FGPF_DBMSK`: a set bit masks the write off.
    pub struct DepthBufMask {
        depth, set_depth: bool @ 0, 1;
        front, set_front: u32 @ 16, 8;
        back, set_back: u32 @ 24, 8;
    }
}

register_word! {
    /// `FGPF_FBCTL`
    pub struct FramebufferControl {
        color_mode, set_color_mode: u32 @ 0, 3;
        dither, set_dither: bool @ 3, 1;
        alpha_const, set_alpha_const: u32 @ 4, 8;
        alpha_threshold, set_alpha_threshold: u32 @ 12, 8;
        opaque, set_opaque: bool @ 20, 1;
    }
}

/// Per-fragment unit: tests, blending, buffer setup.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentState {
    pub scissor_y: ScissorTestData,
    pub scissor_x: ScissorTestData,
    pub alpha: AlphaTestData,
    pub stencil_back: StencilTestData,
    pub stencil_front: StencilTestData,
    pub depth: DepthTestData,
    pub blend: BlendControl,
    /// RGBA8888 constant blend colour.
    pub blend_color: u32,
    pub fbctl: FramebufferControl,
    pub logop: LogOpControl,
    pub color_mask: ColorBufMask,
    pub depth_mask: DepthBufMask,
    pub depth_addr: u32,
    pub color_addr: u32,
    pub buf_width: u32,
}

impl Default for FragmentState {
    fn default() -> Self {
        let mut scissor = ScissorTestData::default();
        scissor.set_max(MAX_CLIP_COORD);

        let mut stencil = StencilTestData::default();
        stencil.set_mode(CompareFunc::Always as u32);
        stencil.set_mask(0xff);

        let mut alpha = AlphaTestData::default();
        alpha.set_mode(CompareFunc::Always as u32);

        let mut depth = DepthTestData::default();
        depth.set_mode(CompareFunc::Less as u32);

        let mut blend = BlendControl::default();
        blend.set_color_src(1);
        blend.set_alpha_src(1);

        Self {
            scissor_y: scissor,
            scissor_x: scissor,
            alpha,
            stencil_back: stencil,
            stencil_front: stencil,
            depth,
            blend,
            blend_color: 0,
            fbctl: FramebufferControl::default(),
            logop: LogOpControl::default(),
            color_mask: ColorBufMask::default(),
            depth_mask: DepthBufMask::default(),
            depth_addr: 0,
            color_addr: 0,
            buf_width: 0,
        }
    }
}

impl FragmentState {
    pub fn set_scissor(&mut self, queue: &mut RegisterQueue, x: ScissorTestData, y: ScissorTestData) {
        self.scissor_x = x;
        self.scissor_y = y;
        queue.write(FGPF_SCISSOR_X, x.to_raw_word());
        queue.write(FGPF_SCISSOR_Y, y.to_raw_word());
    }

    pub fn set_alpha_test(&mut self, queue: &mut RegisterQueue, enable: bool, func: CompareFunc, reference: u8) {
        let mut alpha = AlphaTestData::default();
        alpha.set_enable(enable);
        alpha.set_mode(func as u32);
        alpha.set_value(reference as u32);
        self.alpha = alpha;
        queue.write(FGPF_ALPHAT, alpha.to_raw_word());
    }

    pub fn set_stencil(&mut self, queue: &mut RegisterQueue, front: StencilTestData, back: StencilTestData) {
        self.stencil_front = front;
        self.stencil_back = back;
        queue.write(FGPF_FRONTST, front.to_raw_word());
        queue.write(FGPF_BACKST, back.to_raw_word());
    }

    pub fn set_depth_test(&mut self, queue: &mut RegisterQueue, enable: bool, func: CompareFunc) {
        let mut depth = DepthTestData::default();
        depth.set_enable(enable);
        depth.set_mode(func as u32);
        self.depth = depth;
        queue.write(FGPF_DEPTHT, depth.to_raw_word());
    }

    pub fn set_blend(&mut self, queue: &mut RegisterQueue, blend: BlendControl) {
        self.blend = blend;
        queue.write(FGPF_BLEND, blend.to_raw_word());
    }

    pub fn set_blend_color(&mut self, queue: &mut RegisterQueue, rgba: u32) {
        self.blend_color = rgba;
        queue.write(FGPF_CCLR, rgba);
    }

    pub fn set_logic_op(&mut self, queue: &mut RegisterQueue, logop: LogOpControl) {
        self.logop = logop;
        queue.write(FGPF_LOGOP, logop.to_raw_word());
    }

    pub fn set_color_mask(&mut self, queue: &mut RegisterQueue, mask: ColorBufMask) {
        self.color_mask = mask;
        queue.write(FGPF_CBMSK, mask.to_raw_word());
    }

    pub fn set_depth_mask(&mut self, queue: &mut RegisterQueue, mask: DepthBufMask) {
        self.depth_mask = mask;
        queue.write(FGPF_DBMSK, mask.to_raw_word());
    }

    pub fn set_framebuffer_control(&mut self, queue: &mut RegisterQueue, fbctl: FramebufferControl) {
        self.fbctl = fbctl;
        queue.write(FGPF_FBCTL, fbctl.to_raw_word());
    }

    /// Points the unit at new colour and depth buffers.
    pub fn set_buffers(&mut self, queue: &mut RegisterQueue, color_addr: u32, depth_addr: u32, width: u32) {
        self.color_addr = color_addr;
        self.depth_addr = depth_addr;
        self.buf_width = width;
        queue.write(FGPF_CBADDR, color_addr);
        queue.write(FGPF_DBADDR, depth_addr);
        queue.write(FGPF_FBW, width);
    }

    pub(crate) fn restore<W: RegisterWindow>(&self, regs: &mut Registers<W>) {
        regs.write(FGPF_SCISSOR_X, self.scissor_x.to_raw_word());
        regs.write(FGPF_SCISSOR_Y, self.scissor_y.to_raw_word());
        regs.write(FGPF_ALPHAT, self.alpha.to_raw_word());
        regs.write(FGPF_FRONTST, self.stencil_front.to_raw_word());
        regs.write(FGPF_BACKST, self.stencil_back.to_raw_word());
        regs.write(FGPF_DEPTHT, self.depth.to_raw_word());
        regs.write(FGPF_CCLR, self.blend_color);
        regs.write(FGPF_BLEND, self.blend.to_raw_word());
        regs.write(FGPF_LOGOP, self.logop.to_raw_word());
        regs.write(FGPF_CBMSK, self.color_mask.to_raw_word());
        regs.write(FGPF_DBMSK, self.depth_mask.to_raw_word());
        regs.write(FGPF_FBCTL, self.fbctl.to_raw_word());
        regs.write(FGPF_DBADDR, self.depth_addr);
        regs.write(FGPF_CBADDR, self.color_addr);
        regs.write(FGPF_FBW, self.buf_width);
    }
}
