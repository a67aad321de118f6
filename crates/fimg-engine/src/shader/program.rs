use bytemuck::{Pod, Zeroable};

use super::{INSTRUCTION_WORDS, ShaderError, ShaderUnit};

/// Version tag written by the shader compiler this engine understands.
pub const SHADER_VERSION: u32 = 0xffff_0008;

const VS_MAGIC: u32 = u32::from_le_bytes(*b"VS  ");
const PS_MAGIC: u32 = u32::from_le_bytes(*b"PS  ");

/// Fixed header at the start of a compiled shader binary.
///
/// `header_size` is in bytes; every table size is in 32-bit words. Tables
/// follow the header in declaration order starting with instructions.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct ShaderHeader {
    pub magic: u32,
    pub version: u32,
    pub header_size: u32,
    pub in_table_size: u32,
    pub out_table_size: u32,
    pub sampler_table_size: u32,
    pub instruct_size: u32,
    pub const_float_size: u32,
    pub const_int_size: u32,
    pub const_bool_size: u32,
    pub reserved: [u32; 8],
}

impl ShaderHeader {
    pub const SIZE: usize = size_of::<ShaderHeader>();

    pub fn unit(&self) -> Result<ShaderUnit, ShaderError> {
        match self.magic {
            VS_MAGIC => Ok(ShaderUnit::Vertex),
            PS_MAGIC => Ok(ShaderUnit::Pixel),
            other => Err(ShaderError::BadMagic(other)),
        }
    }
}

/// A compiled program ready to be bound through the slot cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    unit: ShaderUnit,
    words: Vec<u32>,
}

impl ShaderProgram {
    /// Wraps a raw instruction stream.
    pub fn new(unit: ShaderUnit, words: Vec<u32>) -> Result<Self, ShaderError> {
        if words.is_empty() {
            return Err(ShaderError::Empty);
        }
        if words.len() % INSTRUCTION_WORDS != 0 {
            return Err(ShaderError::Misaligned(words.len()));
        }
        let instructions = words.len() / INSTRUCTION_WORDS;
        if instructions > unit.slot_span() {
            return Err(ShaderError::TooLong {
                unit,
                instructions,
                max: unit.slot_span(),
            });
        }
        Ok(Self { unit, words })
    }

    /// Parses a compiler-produced binary (little-endian).
    pub fn from_binary(bytes: &[u8]) -> Result<Self, ShaderError> {
        let header_bytes = bytes.get(..ShaderHeader::SIZE).ok_or(ShaderError::Truncated {
            needed: ShaderHeader::SIZE,
            available: bytes.len(),
        })?;
        let header: ShaderHeader = bytemuck::pod_read_unaligned(header_bytes);

        let unit = header.unit()?;
        if header.version != SHADER_VERSION {
            return Err(ShaderError::UnsupportedVersion(header.version));
        }
        if (header.header_size as usize) < ShaderHeader::SIZE {
            return Err(ShaderError::BadHeaderSize(header.header_size));
        }

        let start = header.header_size as usize + 4 * header.in_table_size as usize
            + 4 * header.out_table_size as usize
            + 4 * header.sampler_table_size as usize;
        let end = start + 4 * header.instruct_size as usize;
        let body = bytes.get(start..end).ok_or(ShaderError::Truncated {
            needed: end,
            available: bytes.len(),
        })?;

        let words = body
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        log::debug!(
            "loaded {unit:?} shader: {} instructions",
            header.instruct_size as usize / INSTRUCTION_WORDS
        );
        Self::new(unit, words)
    }

    #[inline]
    pub fn unit(&self) -> ShaderUnit {
        self.unit
    }

    /// Instruction stream as 32-bit words.
    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    #[inline]
    pub fn instruction_count(&self) -> usize {
        self.words.len() / INSTRUCTION_WORDS
    }
}
