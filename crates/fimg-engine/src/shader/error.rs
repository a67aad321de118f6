use std::fmt;

use super::ShaderUnit;

/// Rejected shader binary or program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// The binary ends before a section it declares.
    Truncated { needed: usize, available: usize },
    /// Neither the vertex nor the pixel shader magic.
    BadMagic(u32),
    UnsupportedVersion(u32),
    /// Header size smaller than the fixed header.
    BadHeaderSize(u32),
    /// Instruction stream is not a whole number of instructions.
    Misaligned(usize),
    Empty,
    /// Program does not fit in one hardware slot.
    TooLong {
        unit: ShaderUnit,
        instructions: usize,
        max: usize,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Truncated { needed, available } => {
                write!(f, "shader binary truncated: need {needed} bytes, have {available}")
            }
            ShaderError::BadMagic(magic) => write!(f, "bad shader magic {magic:#010x}"),
            ShaderError::UnsupportedVersion(v) => write!(f, "unsupported shader version {v:#010x}"),
            ShaderError::BadHeaderSize(size) => write!(f, "bad shader header size {size}"),
            ShaderError::Misaligned(words) => {
                write!(f, "instruction stream of {words} words is not instruction aligned")
            }
            ShaderError::Empty => write!(f, "shader program has no instructions"),
            ShaderError::TooLong {
                unit,
                instructions,
                max,
            } => write!(
                f,
                "{unit:?} shader has {instructions} instructions, slot holds {max}"
            ),
        }
    }
}

impl std::error::Error for ShaderError {}
