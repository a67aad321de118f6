use crate::device::{RegisterWindow, Registers};
use crate::queue::RegisterQueue;
use crate::regs::{
    FGRA_BFCULL, FGRA_COORDREPLACE, FGRA_D_OFF_EN, FGRA_D_OFF_FACTOR, FGRA_D_OFF_UNITS,
    FGRA_LODCTL, FGRA_LWIDTH, FGRA_PIX_SAMP, FGRA_PSIZE_MAX, FGRA_PSIZE_MIN, FGRA_PWIDTH,
    FGRA_XCLIP, FGRA_YCLIP,
};
use crate::word::register_word;

/// Largest framebuffer coordinate the clipper accepts.
pub const MAX_CLIP_COORD: u32 = 2047;

/// Which faces the culling unit drops.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CullFace {
    Back = 0,
    Front = 1,
    Both = 3,
}

register_word! {
    /// `FGRA_BFCULL`
    pub struct CullingControl {
        face, set_face: u32 @ 0, 2;
        clockwise, set_clockwise: bool @ 2, 1;
        enable, set_enable: bool @ 3, 1;
    }
}

register_word! {
    /// `FGRA_XCLIP` / `FGRA_YCLIP`
    pub struct ClippingControl {
        min, set_min: u32 @ 0, 12;
        max, set_max: u32 @ 16, 12;
    }
}

impl ClippingControl {
    pub fn new(min: u32, max: u32) -> Self {
        let mut c = Self::default();
        c.set_min(min.min(MAX_CLIP_COORD));
        c.set_max(max.min(MAX_CLIP_COORD));
        c
    }
}

/// `FGRA_LODCTL`: per-varying LOD and derivative generation, three bits
/// per varying for eight varyings.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct LodControl(u32);

impl LodControl {
    pub const VARYINGS: usize = 8;

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw_word(self) -> u32 {
        self.0
    }

    /// Returns `(lod, ddx, ddy)` for varying `index`.
    pub fn coef(self, index: usize) -> (bool, bool, bool) {
        let bits = self.0 >> (3 * index);
        (bits & 1 != 0, bits & 2 != 0, bits & 4 != 0)
    }

    pub fn set_coef(&mut self, index: usize, lod: bool, ddx: bool, ddy: bool) {
        debug_assert!(index < Self::VARYINGS);
        let shift = 3 * index as u32;
        let bits = lod as u32 | (ddx as u32) << 1 | (ddy as u32) << 2;
        self.0 = (self.0 & !(0x7 << shift)) | (bits << shift);
    }
}

/// Raster engine: culling, clipping, depth offset, point and line setup.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizerState {
    /// Sample at pixel corner (`false`) or center (`true`).
    pub sample_center: bool,
    pub depth_offset_enable: bool,
    pub depth_offset_factor: f32,
    pub depth_offset_units: f32,
    pub cull: CullingControl,
    pub y_clip: ClippingControl,
    pub point_width: f32,
    pub point_width_min: f32,
    pub point_width_max: f32,
    /// Varying replaced by point sprite coordinates.
    pub sprite_coord_attrib: u32,
    pub line_width: f32,
    pub lod: LodControl,
    pub x_clip: ClippingControl,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            sample_center: true,
            depth_offset_enable: false,
            depth_offset_factor: 0.0,
            depth_offset_units: 0.0,
            cull: CullingControl::default(),
            y_clip: ClippingControl::new(0, MAX_CLIP_COORD),
            point_width: 1.0,
            point_width_min: 1.0,
            point_width_max: 2048.0,
            sprite_coord_attrib: 0,
            line_width: 1.0,
            lod: LodControl::default(),
            x_clip: ClippingControl::new(0, MAX_CLIP_COORD),
        }
    }
}

impl RasterizerState {
    pub fn set_culling(&mut self, queue: &mut RegisterQueue, enable: bool, face: CullFace, clockwise: bool) {
        let mut cull = CullingControl::default();
        cull.set_enable(enable);
        cull.set_face(face as u32);
        cull.set_clockwise(clockwise);
        self.cull = cull;
        queue.write(FGRA_BFCULL, cull.to_raw_word());
    }

    pub fn set_depth_offset(&mut self, queue: &mut RegisterQueue, enable: bool, factor: f32, units: f32) {
        self.depth_offset_enable = enable;
        self.depth_offset_factor = factor;
        self.depth_offset_units = units;
        queue.write(FGRA_D_OFF_EN, enable as u32);
        queue.write_f32(FGRA_D_OFF_FACTOR, factor);
        queue.write_f32(FGRA_D_OFF_UNITS, units);
    }

    pub fn set_clip(&mut self, queue: &mut RegisterQueue, x: ClippingControl, y: ClippingControl) {
        self.x_clip = x;
        self.y_clip = y;
        queue.write(FGRA_XCLIP, x.to_raw_word());
        queue.write(FGRA_YCLIP, y.to_raw_word());
    }

    /// Sets the point size, clamped to the configured range.
    pub fn set_point_width(&mut self, queue: &mut RegisterQueue, width: f32) {
        self.point_width = width.clamp(self.point_width_min, self.point_width_max);
        queue.write_f32(FGRA_PWIDTH, self.point_width);
    }

    pub fn set_point_width_range(&mut self, queue: &mut RegisterQueue, min: f32, max: f32) {
        self.point_width_min = min;
        self.point_width_max = max;
        queue.write_f32(FGRA_PSIZE_MIN, min);
        queue.write_f32(FGRA_PSIZE_MAX, max);
    }

    pub fn set_sprite_coord_attrib(&mut self, queue: &mut RegisterQueue, attrib: u32) {
        self.sprite_coord_attrib = attrib;
        queue.write(FGRA_COORDREPLACE, attrib);
    }

    pub fn set_line_width(&mut self, queue: &mut RegisterQueue, width: f32) {
        self.line_width = width;
        queue.write_f32(FGRA_LWIDTH, width);
    }

    pub fn set_lod(&mut self, queue: &mut RegisterQueue, lod: LodControl) {
        self.lod = lod;
        queue.write(FGRA_LODCTL, lod.to_raw_word());
    }

    pub fn set_sample_center(&mut self, queue: &mut RegisterQueue, center: bool) {
        self.sample_center = center;
        queue.write(FGRA_PIX_SAMP, center as u32);
    }

    pub(crate) fn restore<W: RegisterWindow>(&self, regs: &mut Registers<W>) {
        regs.write(FGRA_PIX_SAMP, self.sample_center as u32);
        regs.write(FGRA_D_OFF_EN, self.depth_offset_enable as u32);
        regs.write_f32(FGRA_D_OFF_FACTOR, self.depth_offset_factor);
        regs.write_f32(FGRA_D_OFF_UNITS, self.depth_offset_units);
        regs.write(FGRA_BFCULL, self.cull.to_raw_word());
        regs.write(FGRA_YCLIP, self.y_clip.to_raw_word());
        regs.write_f32(FGRA_PWIDTH, self.point_width);
        regs.write_f32(FGRA_PSIZE_MIN, self.point_width_min);
        regs.write_f32(FGRA_PSIZE_MAX, self.point_width_max);
        regs.write(FGRA_COORDREPLACE, self.sprite_coord_attrib);
        regs.write_f32(FGRA_LWIDTH, self.line_width);
        regs.write(FGRA_LODCTL, self.lod.to_raw_word());
        regs.write(FGRA_XCLIP, self.x_clip.to_raw_word());
    }
}
