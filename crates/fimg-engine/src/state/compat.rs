use crate::device::{RegisterWindow, Registers};
use crate::queue::RegisterQueue;
use crate::regs::{
    FGPS_CFLOAT, FGVS_CFLOAT, MAX_MIPMAP_LEVEL, NUM_MATRICES, NUM_TEXTURE_UNITS, fgtu_base_addr,
    fgtu_max_level, fgtu_min_level, fgtu_offset, fgtu_psize, fgtu_tex_ctrl, fgtu_usize,
    fgtu_vsize,
};
use crate::word::register_word;

/// Bytes per vec4 shader constant.
const VEC4_BYTES: u32 = 16;

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

register_word! {
    /// `FGTU_TEX_CTRL(unit)`
    pub struct TexControl {
        use_mipmap, set_use_mipmap: u32 @ 0, 2;
        min_filter, set_min_filter: bool @ 2, 1;
        mag_filter, set_mag_filter: bool @ 3, 1;
        tex_coord_sys, set_tex_coord_sys: bool @ 4, 1;
        p_addr_mode, set_p_addr_mode: u32 @ 6, 2;
        v_addr_mode, set_v_addr_mode: u32 @ 8, 2;
        u_addr_mode, set_u_addr_mode: u32 @ 10, 2;
        texture_format, set_texture_format: u32 @ 12, 5;
        palette_format, set_palette_format: u32 @ 17, 2;
        alpha_format, set_alpha_format: bool @ 19, 1;
        tex_exp, set_tex_exp: bool @ 20, 1;
        color_key_enable, set_color_key_enable: bool @ 21, 1;
        color_key_select, set_color_key_select: bool @ 22, 1;
        texture_type, set_texture_type: u32 @ 27, 2;
    }
}

/// Texture unit registers for one bound texture.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TextureUnitState {
    pub control: TexControl,
    pub usize: u32,
    pub vsize: u32,
    pub psize: u32,
    pub offsets: [u32; MAX_MIPMAP_LEVEL],
    pub min_level: u32,
    pub max_level: u32,
    pub base_addr: u32,
}

impl TextureUnitState {
    fn emit(&self, unit: usize, mut write: impl FnMut(u32, u32)) {
        write(fgtu_tex_ctrl(unit), self.control.to_raw_word());
        write(fgtu_usize(unit), self.usize);
        write(fgtu_vsize(unit), self.vsize);
        write(fgtu_psize(unit), self.psize);
        for (level, &offset) in self.offsets.iter().enumerate() {
            write(fgtu_offset(unit, level), offset);
        }
        write(fgtu_min_level(unit), self.min_level);
        write(fgtu_max_level(unit), self.max_level);
        write(fgtu_base_addr(unit), self.base_addr);
    }
}

/// Texture environment constants consumed by the generated pixel shader.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureEnv {
    pub color: [f32; 4],
    pub scale: [f32; 4],
    pub dirty: bool,
}

impl Default for TextureEnv {
    fn default() -> Self {
        Self {
            color: [0.0; 4],
            scale: [1.0; 4],
            dirty: true,
        }
    }
}

/// Fixed-function compatibility stage: texture units, texture environment
/// and the transformation matrices fed to the generated shaders.
#[derive(Debug, Clone, PartialEq)]
pub struct CompatState {
    pub textures: [TextureUnitState; NUM_TEXTURE_UNITS],
    pub env: [TextureEnv; NUM_TEXTURE_UNITS],
    pub matrices: [[f32; 16]; NUM_MATRICES],
    pub matrix_dirty: [bool; NUM_MATRICES],
}

impl Default for CompatState {
    fn default() -> Self {
        Self {
            textures: [TextureUnitState::default(); NUM_TEXTURE_UNITS],
            env: [TextureEnv::default(); NUM_TEXTURE_UNITS],
            matrices: [IDENTITY; NUM_MATRICES],
            matrix_dirty: [true; NUM_MATRICES],
        }
    }
}

impl CompatState {
    pub fn set_texture(&mut self, queue: &mut RegisterQueue, unit: usize, texture: TextureUnitState) {
        self.textures[unit] = texture;
        texture.emit(unit, |addr, value| queue.write(addr, value));
    }

    pub fn set_texture_env(&mut self, unit: usize, color: [f32; 4], scale: [f32; 4]) {
        self.env[unit] = TextureEnv {
            color,
            scale,
            dirty: true,
        };
    }

    /// Replaces a matrix (column-major) and schedules its upload.
    pub fn set_matrix(&mut self, index: usize, matrix: [f32; 16]) {
        self.matrices[index] = matrix;
        self.matrix_dirty[index] = true;
    }

    /// Schedules a matrix for re-upload without changing it.
    pub fn mark_matrix_dirty(&mut self, index: usize) {
        self.matrix_dirty[index] = true;
    }

    /// Uploads dirty matrices and texture environment constants.
    ///
    /// Returns the number of register writes issued.
    pub(crate) fn flush_constants<W: RegisterWindow>(&mut self, regs: &mut Registers<W>) -> usize {
        let mut writes = 0;

        for (index, dirty) in self.matrix_dirty.iter_mut().enumerate() {
            if !*dirty {
                continue;
            }
            let base = FGVS_CFLOAT + index as u32 * 4 * VEC4_BYTES;
            for (i, &v) in self.matrices[index].iter().enumerate() {
                regs.write_f32(base + 4 * i as u32, v);
            }
            writes += 16;
            *dirty = false;
        }

        for (unit, env) in self.env.iter_mut().enumerate() {
            if !env.dirty {
                continue;
            }
            let base = FGPS_CFLOAT + unit as u32 * 2 * VEC4_BYTES;
            for (i, &v) in env.color.iter().chain(env.scale.iter()).enumerate() {
                regs.write_f32(base + 4 * i as u32, v);
            }
            writes += 8;
            env.dirty = false;
        }

        writes
    }

    /// Replays texture units; constants are re-uploaded by the next flush.
    pub(crate) fn restore<W: RegisterWindow>(&mut self, regs: &mut Registers<W>) {
        for (unit, texture) in self.textures.iter().enumerate() {
            texture.emit(unit, |addr, value| regs.write(addr, value));
        }
        self.matrix_dirty = [true; NUM_MATRICES];
        for env in &mut self.env {
            env.dirty = true;
        }
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
    fn constants_upload_once_until_marked_dirty() {
        let sim = SimWindow::new();
        let mut regs = locked(&sim);
        let mut compat = CompatState::default();

        let first = compat.flush_constants(&mut regs);
        assert_eq!(first, 16 * NUM_MATRICES + 8 * NUM_TEXTURE_UNITS);
        assert_eq!(compat.flush_constants(&mut regs), 0);

        compat.mark_matrix_dirty(1);
        assert_eq!(compat.flush_constants(&mut regs), 16);
        assert_eq!(sim.value(FGVS_CFLOAT + 64), Some(1.0f32.to_bits()));
    }

    #[test]
    fn restore_marks_every_constant_dirty() {
        let sim = SimWindow::new();
        let mut regs = locked(&sim);
        let mut compat = CompatState::default();
        compat.flush_constants(&mut regs);

        compat.restore(&mut regs);
        assert!(compat.matrix_dirty.iter().all(|&d| d));
        assert!(compat.env.iter().all(|e| e.dirty));
    }

    #[test]
    fn texture_binding_queues_every_unit_register() {
        let mut compat = CompatState::default();
        let mut q = RegisterQueue::new();
        let tex = TextureUnitState {
            base_addr: 0x5200_0000,
            ..TextureUnitState::default()
        };
        compat.set_texture(&mut q, 1, tex);
        assert_eq!(q.len(), 7 + MAX_MIPMAP_LEVEL);
        assert_eq!(q.entries().last().map(|e| e.addr), Some(fgtu_base_addr(1)));
    }
}
