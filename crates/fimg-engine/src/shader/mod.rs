//! Shader programs and the per-unit slot cache.
//!
//! This module is responsible for:
//! - content keys identifying a logical shader independently of its origin
//! - loading compiled program binaries
//! - keeping recently used programs resident in instruction memory so that
//!   switching back to one costs a few selection words instead of an upload

mod cache;
mod error;
mod key;
mod program;

pub use cache::{BindOutcome, CacheStats, PS_CACHE_SIZE, ShaderSlot, ShaderSlotCache, VS_CACHE_SIZE};
pub use error::ShaderError;
pub use key::{KEY_WORDS, PixelShaderState, ShaderKey, TexCombiner, VertexShaderState};
pub use program::{SHADER_VERSION, ShaderHeader, ShaderProgram};

use crate::regs::{FGPS_INSTMEM, FGVS_INSTMEM};

/// 32-bit words per shader instruction.
pub const INSTRUCTION_WORDS: usize = 4;
/// Instructions held by one unit's instruction memory.
pub const INSTRUCTION_SLOTS: usize = 512;

/// Programmable shader unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderUnit {
    Vertex,
    Pixel,
}

impl ShaderUnit {
    /// Number of resident programs the unit caches.
    pub const fn slot_count(self) -> usize {
        match self {
            ShaderUnit::Vertex => VS_CACHE_SIZE,
            ShaderUnit::Pixel => PS_CACHE_SIZE,
        }
    }

    /// Instructions reserved for each slot.
    pub const fn slot_span(self) -> usize {
        INSTRUCTION_SLOTS / self.slot_count()
    }

    pub(crate) const fn instmem_base(self) -> u32 {
        match self {
            ShaderUnit::Vertex => FGVS_INSTMEM,
            ShaderUnit::Pixel => FGPS_INSTMEM,
        }
    }

    /// First instruction index of `slot`.
    pub const fn slot_start(self, slot: usize) -> usize {
        slot * self.slot_span()
    }
}
