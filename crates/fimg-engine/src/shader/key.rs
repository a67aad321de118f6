use crate::regs::NUM_TEXTURE_UNITS;
use crate::word::{extract, insert, register_word};

/// Words in a [`ShaderKey`]: one per texture unit plus one unit-wide word.
pub const KEY_WORDS: usize = NUM_TEXTURE_UNITS + 1;

/// Content fingerprint of a logical shader.
///
/// Two shaders generated from the same effective configuration have the
/// same key and share a hardware slot, regardless of which objects they
/// came from.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShaderKey([u32; KEY_WORDS]);

impl ShaderKey {
    pub const fn from_words(words: [u32; KEY_WORDS]) -> Self {
        Self(words)
    }

    pub const fn words(&self) -> &[u32; KEY_WORDS] {
        &self.0
    }
}

/// Logical vertex shader configuration: which texture units produce
/// coordinates.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexShaderState(u32);

impl VertexShaderState {
    pub fn tex_enabled(self, unit: usize) -> bool {
        extract(self.0, unit as u32, 1) != 0
    }

    pub fn set_tex_enabled(&mut self, unit: usize, enabled: bool) {
        debug_assert!(unit < NUM_TEXTURE_UNITS);
        self.0 = insert(self.0, unit as u32, 1, enabled as u32);
    }

    pub fn key(self) -> ShaderKey {
        let mut words = [0; KEY_WORDS];
        words[0] = self.0;
        ShaderKey(words)
    }
}

register_word! {
    /// Per-unit texture combiner word.
    ///
    /// Source and modifier selectors for the three combiner arguments are
    /// indexed accessors below.
    pub struct TexCombiner {
        /// Texture function; zero means the unit is disabled.
        mode, set_mode: u32 @ 0, 3;
        /// RGBA component swizzle for BGR-ordered formats.
        swap, set_swap: bool @ 3, 1;
        color_func, set_color_func: u32 @ 16, 3;
        alpha_func, set_alpha_func: u32 @ 28, 3;
    }
}

impl TexCombiner {
    pub const ARGS: usize = 3;

    pub fn is_enabled(self) -> bool {
        self.mode() != 0
    }

    pub fn color_src(self, arg: usize) -> u32 {
        extract(self.to_raw_word(), 4 + 4 * arg as u32, 2)
    }

    pub fn set_color_src(&mut self, arg: usize, src: u32) {
        debug_assert!(arg < Self::ARGS);
        *self = Self::from_raw(insert(self.to_raw_word(), 4 + 4 * arg as u32, 2, src));
    }

    pub fn color_mod(self, arg: usize) -> u32 {
        extract(self.to_raw_word(), 6 + 4 * arg as u32, 2)
    }

    pub fn set_color_mod(&mut self, arg: usize, modifier: u32) {
        debug_assert!(arg < Self::ARGS);
        *self = Self::from_raw(insert(self.to_raw_word(), 6 + 4 * arg as u32, 2, modifier));
    }

    pub fn alpha_src(self, arg: usize) -> u32 {
        extract(self.to_raw_word(), 19 + 3 * arg as u32, 2)
    }

    pub fn set_alpha_src(&mut self, arg: usize, src: u32) {
        debug_assert!(arg < Self::ARGS);
        *self = Self::from_raw(insert(self.to_raw_word(), 19 + 3 * arg as u32, 2, src));
    }

    pub fn alpha_mod(self, arg: usize) -> bool {
        extract(self.to_raw_word(), 21 + 3 * arg as u32, 1) != 0
    }

    pub fn set_alpha_mod(&mut self, arg: usize, invert: bool) {
        debug_assert!(arg < Self::ARGS);
        *self = Self::from_raw(insert(self.to_raw_word(), 21 + 3 * arg as u32, 1, invert as u32));
    }
}

/// Logical pixel shader configuration: one combiner per texture unit plus
/// the output swizzle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelShaderState {
    pub tex: [TexCombiner; NUM_TEXTURE_UNITS],
    /// Swap red and blue on output.
    pub swap: bool,
}

impl PixelShaderState {
    pub fn key(&self) -> ShaderKey {
        let mut words = [0; KEY_WORDS];
        for (word, tex) in words.iter_mut().zip(&self.tex) {
            *word = tex.to_raw_word();
        }
        words[NUM_TEXTURE_UNITS] = self.swap as u32;
        ShaderKey(words)
    }
}
