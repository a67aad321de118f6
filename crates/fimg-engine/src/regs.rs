//! FIMG-3DSE register map.
//!
//! Offsets are byte offsets into the special-function-register window.
//! Indexed registers are exposed as `const fn`s.

/// Size in bytes of the register window.
pub const SFR_SIZE: usize = 0x8_0000;

/// Number of vertex attributes fed by the host interface.
pub const ATTRIB_NUM: usize = 10;
/// Number of texture units.
pub const NUM_TEXTURE_UNITS: usize = 2;
/// Number of mipmap levels addressable per texture.
pub const MAX_MIPMAP_LEVEL: usize = 11;
/// Transformation matrices managed by the compatibility stage.
pub const NUM_MATRICES: usize = 2 + NUM_TEXTURE_UNITS;

// --- Global block (0x00000) ---

/// Pipeline status (read-only).
pub const FGGB_PIPESTATE: u32 = 0x0_0000;
/// Cache control; trigger bits self-clear when the flush completes.
pub const FGGB_CACHECTL: u32 = 0x0_0004;
pub const FGGB_RST: u32 = 0x0_0008;
/// Hardware version (read-only).
pub const FGGB_VERSION: u32 = 0x0_0010;
pub const FGGB_INTPENDING: u32 = 0x0_0040;
pub const FGGB_INTMASK: u32 = 0x0_0044;
pub const FGGB_PIPEMASK: u32 = 0x0_0048;
pub const FGGB_PIPETGTSTATE: u32 = 0x0_004c;

/// Texture cache flush bits in `FGGB_CACHECTL`.
pub const CACHECTL_TEXTURE_SHIFT: u32 = 8;
/// Vertex texture cache flush bit in `FGGB_CACHECTL`.
pub const CACHECTL_VTX_TEXTURE_SHIFT: u32 = 12;

// --- Host interface (0x08000) ---

pub const FGHI_CONTROL: u32 = 0x0_8008;
pub const FGHI_IDXOFFSET: u32 = 0x0_800c;
/// Vertex buffer write pointer.
pub const FGHI_VBADDR: u32 = 0x0_8010;

#[inline]
pub const fn fghi_attrib(i: usize) -> u32 {
    0x0_8040 + 4 * i as u32
}

#[inline]
pub const fn fghi_vbctrl(i: usize) -> u32 {
    0x0_8080 + 4 * i as u32
}

#[inline]
pub const fn fghi_vbbase(i: usize) -> u32 {
    0x0_80c0 + 4 * i as u32
}

/// Host FIFO entry; writing the vertex count kicks the draw.
pub const FGHI_FIFO_ENTRY: u32 = 0x0_c000;
/// Vertex buffer data port (auto-incrementing).
pub const FGHI_VBDATA: u32 = 0x0_e000;

// --- Vertex shader (0x10000) ---

pub const FGVS_INSTMEM: u32 = 0x1_0000;
pub const FGVS_CFLOAT: u32 = 0x1_8000;
pub const FGVS_CONFIG: u32 = 0x2_0000;
pub const FGVS_STATUS: u32 = 0x2_0004;
pub const FGVS_PC_RANGE: u32 = 0x2_0008;

// --- Primitive engine (0x30000) ---

pub const FGPE_VERTEX_CONTEXT: u32 = 0x3_0000;
pub const FGPE_VIEWPORT_OX: u32 = 0x3_0004;
pub const FGPE_VIEWPORT_OY: u32 = 0x3_0008;
pub const FGPE_VIEWPORT_HALF_PX: u32 = 0x3_000c;
pub const FGPE_VIEWPORT_HALF_PY: u32 = 0x3_0010;
pub const FGPE_DEPTHRANGE_HALF_F_SUB_N: u32 = 0x3_0014;
pub const FGPE_DEPTHRANGE_HALF_F_ADD_N: u32 = 0x3_0018;

// --- Raster engine (0x38000) ---

pub const FGRA_PIX_SAMP: u32 = 0x3_8000;
pub const FGRA_D_OFF_EN: u32 = 0x3_8004;
pub const FGRA_D_OFF_FACTOR: u32 = 0x3_8008;
pub const FGRA_D_OFF_UNITS: u32 = 0x3_800c;
pub const FGRA_BFCULL: u32 = 0x3_8014;
pub const FGRA_YCLIP: u32 = 0x3_8018;
pub const FGRA_PWIDTH: u32 = 0x3_801c;
pub const FGRA_PSIZE_MIN: u32 = 0x3_8020;
pub const FGRA_PSIZE_MAX: u32 = 0x3_8024;
pub const FGRA_COORDREPLACE: u32 = 0x3_8028;
pub const FGRA_LWIDTH: u32 = 0x3_802c;
pub const FGRA_LODCTL: u32 = 0x3_c000;
pub const FGRA_XCLIP: u32 = 0x3_c004;

// --- Pixel shader (0x40000) ---

pub const FGPS_INSTMEM: u32 = 0x4_0000;
pub const FGPS_CFLOAT: u32 = 0x4_4000;
pub const FGPS_EXE_MODE: u32 = 0x4_c800;
pub const FGPS_PC_START: u32 = 0x4_c804;
pub const FGPS_PC_END: u32 = 0x4_c808;
/// Latches the PC range; self-clearing.
pub const FGPS_PC_COPY: u32 = 0x4_c80c;

// --- Texture units (0x60000, 0x50 bytes per unit) ---

const FGTU_STRIDE: u32 = 0x50;

#[inline]
pub const fn fgtu_tex_ctrl(unit: usize) -> u32 {
    0x6_0000 + FGTU_STRIDE * unit as u32
}

#[inline]
pub const fn fgtu_usize(unit: usize) -> u32 {
    fgtu_tex_ctrl(unit) + 0x04
}

#[inline]
pub const fn fgtu_vsize(unit: usize) -> u32 {
    fgtu_tex_ctrl(unit) + 0x08
}

#[inline]
pub const fn fgtu_psize(unit: usize) -> u32 {
    fgtu_tex_ctrl(unit) + 0x0c
}

#[inline]
pub const fn fgtu_offset(unit: usize, level: usize) -> u32 {
    fgtu_tex_ctrl(unit) + 0x10 + 4 * level as u32
}

#[inline]
pub const fn fgtu_min_level(unit: usize) -> u32 {
    fgtu_tex_ctrl(unit) + 0x3c
}

#[inline]
pub const fn fgtu_max_level(unit: usize) -> u32 {
    fgtu_tex_ctrl(unit) + 0x40
}

#[inline]
pub const fn fgtu_base_addr(unit: usize) -> u32 {
    fgtu_tex_ctrl(unit) + 0x44
}

// --- Per-fragment unit (0x70000) ---

pub const FGPF_SCISSOR_X: u32 = 0x7_0000;
pub const FGPF_SCISSOR_Y: u32 = 0x7_0004;
pub const FGPF_ALPHAT: u32 = 0x7_0008;
pub const FGPF_FRONTST: u32 = 0x7_000c;
pub const FGPF_BACKST: u32 = 0x7_0010;
pub const FGPF_DEPTHT: u32 = 0x7_0014;
pub const FGPF_CCLR: u32 = 0x7_0018;
pub const FGPF_BLEND: u32 = 0x7_001c;
pub const FGPF_LOGOP: u32 = 0x7_0020;
pub const FGPF_CBMSK: u32 = 0x7_0024;
pub const FGPF_DBMSK: u32 = 0x7_0028;
pub const FGPF_FBCTL: u32 = 0x7_002c;
pub const FGPF_DBADDR: u32 = 0x7_0030;
pub const FGPF_CBADDR: u32 = 0x7_0034;
pub const FGPF_FBW: u32 = 0x7_0038;
