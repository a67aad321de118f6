//! Bit-packed 32-bit register words.
//!
//! Every hardware control word is an explicit value type declared with
//! [`register_word!`]: one getter/setter pair per field plus `from_raw` and
//! `to_raw_word`. Field placement is spelled out as `shift, width`, so the
//! encoding never depends on compiler bitfield layout.

/// A value that can live inside a register field.
pub trait FieldValue: Copy {
    fn from_bits(bits: u32) -> Self;
    fn into_bits(self) -> u32;
}

impl FieldValue for u32 {
    #[inline]
    fn from_bits(bits: u32) -> Self {
        bits
    }

    #[inline]
    fn into_bits(self) -> u32 {
        self
    }
}

impl FieldValue for bool {
    #[inline]
    fn from_bits(bits: u32) -> Self {
        bits != 0
    }

    #[inline]
    fn into_bits(self) -> u32 {
        self as u32
    }
}

#[inline]
pub const fn field_mask(width: u32) -> u32 {
    if width >= 32 { u32::MAX } else { (1 << width) - 1 }
}

#[inline]
pub const fn extract(raw: u32, shift: u32, width: u32) -> u32 {
    (raw >> shift) & field_mask(width)
}

/// Replaces `width` bits at `shift`. Excess bits of `value` are discarded.
#[inline]
pub fn insert(raw: u32, shift: u32, width: u32, value: u32) -> u32 {
    let mask = field_mask(width);
    debug_assert!(value <= mask, "value {value:#x} does not fit in {width} bits");
    (raw & !(mask << shift)) | ((value & mask) << shift)
}

/// Declares a register word type.
///
/// ```ignore
/// register_word! {
///     pub struct Culling {
///         face, set_face: u32 @ 0, 2;
///         enable, set_enable: bool @ 3, 1;
///     }
/// }
/// ```
macro_rules! register_word {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $get:ident, $set:ident: $ty:ident @ $shift:literal, $width:literal;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
        $vis struct $name(u32);

        #[allow(dead_code)]
        impl $name {
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn to_raw_word(self) -> u32 {
                self.0
            }

            $(
                $(#[$fmeta])*
                #[inline]
                pub fn $get(self) -> $ty {
                    <$ty as $crate::word::FieldValue>::from_bits(
                        $crate::word::extract(self.0, $shift, $width),
                    )
                }

                #[inline]
                pub fn $set(&mut self, value: $ty) {
                    self.0 = $crate::word::insert(
                        self.0,
                        $shift,
                        $width,
                        <$ty as $crate::word::FieldValue>::into_bits(value),
                    );
                }
            )*
        }
    };
}

pub(crate) use register_word;

#[cfg(test)]
mod tests {
    use super::*;

    register_word! {
        struct Sample {
            low, set_low: u32 @ 0, 4;
            flag, set_flag: bool @ 4, 1;
            high, set_high: u32 @ 24, 8;
        }
    }

    #[test]
    fn fields_encode_at_their_offsets() {
        let mut w = Sample::default();
        w.set_low(0xa);
        w.set_flag(true);
        w.set_high(0x81);
        assert_eq!(w.to_raw_word(), 0x8100_001a);
        assert_eq!(w.low(), 0xa);
        assert!(w.flag());
        assert_eq!(w.high(), 0x81);
    }

    #[test]
    fn setting_a_field_leaves_neighbours_alone() {
        let mut w = Sample::from_raw(u32::MAX);
        w.set_flag(false);
        assert_eq!(w.to_raw_word(), !0x10);
        w.set_low(0);
        assert_eq!(w.low(), 0);
        assert_eq!(w.high(), 0xff);
    }

    #[test]
    fn full_width_mask() {
        assert_eq!(field_mask(32), u32::MAX);
        assert_eq!(extract(0xdead_beef, 0, 32), 0xdead_beef);
    }
}
