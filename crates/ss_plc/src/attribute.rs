//! Known bit-fields of the PLC codes
//!
//! | Code | Bits          | Attribute                                   |
//! |------|---------------|---------------------------------------------|
//! | 0    | `0x0000_003F` | `code0_bits0`                               |
//! | 0    | `0x0000_3FC0` | `code0_bits6`                               |
//! | 0    | `0x0000_4000` | `pass_object` .. `0x0100_0000` `pass_whip`  |
//! | 0    | `0x3000_0000` | `code0_bits28`                              |
//! | 1    | `0x01F0_0000` | `ground_type`                               |
//! | 2    | one byte each | `code2_byte0` .. `code2_byte3`              |
//! | 3    | `0x0000_001F` | `code3_bits0`, `0xC` marks vines            |
//! | 4    | whole code    | `code4`                                     |

use std::fmt;

use crate::error::{Error, Result};
use crate::field::BitField;
use crate::table::CODE_COUNT;

/// Whether an attribute is a single flag or a small integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Flag,
    Range,
}

/// A named field of the PLC codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: AttributeKind,
    pub code: usize,
    pub shift: u32,
    pub mask: u32,
}

const fn flag(name: &'static str, description: &'static str, code: usize, shift: u32) -> Attribute {
    Attribute {
        name,
        description,
        kind: AttributeKind::Flag,
        code,
        shift,
        mask: 0x1,
    }
}

const fn range(
    name: &'static str,
    description: &'static str,
    code: usize,
    shift: u32,
    mask: u32,
) -> Attribute {
    Attribute {
        name,
        description,
        kind: AttributeKind::Range,
        code,
        shift,
        mask,
    }
}

/// Every known attribute, in code and bit order
pub const ATTRIBUTES: [Attribute; 31] = [
    range("code0_bits0", "", 0, 0, 0x3F),
    range("code0_bits6", "", 0, 6, 0xFF),
    flag("pass_object", "objects pass through", 0, 14),
    flag("pass_camera", "the camera passes through", 0, 15),
    flag("pass_link", "Link passes through", 0, 16),
    flag("pass_arrow", "arrows pass through", 0, 17),
    flag("pass_slingshot", "slingshot seeds pass through", 0, 18),
    flag("pass_beetle", "the beetle passes through", 0, 19),
    flag("pass_clawshot", "clawshots pass through", 0, 20),
    flag("pass_target", "Z-targeting passes through", 0, 21),
    flag("pass_shadow", "shadows pass through", 0, 22),
    flag("pass_bomb", "bombs pass through", 0, 23),
    flag("pass_whip", "the whip passes through", 0, 24),
    range("code0_bits28", "", 0, 28, 0x3),
    flag("code0_bit30", "", 0, 30),
    flag("code0_bit31", "", 0, 31),
    range("code1_bits0", "", 1, 0, 0xFF),
    range("code1_bits8", "", 1, 8, 0xF),
    range("code1_bits17", "", 1, 17, 0x7),
    range("ground_type", "ground material", 1, 20, 0x1F),
    flag("code1_bit25", "", 1, 25),
    flag("code1_bit26", "", 1, 26),
    flag("code1_bit27", "", 1, 27),
    range("code1_bits28", "", 1, 28, 0xF),
    range("code2_byte0", "", 2, 0, 0xFF),
    range("code2_byte1", "", 2, 8, 0xFF),
    range("code2_byte2", "", 2, 16, 0xFF),
    range("code2_byte3", "", 2, 24, 0xFF),
    range("code3_bits0", "special material, 0xC is vines", 3, 0, 0x1F),
    range("code3_bits5", "", 3, 5, 0x3F),
    range("code4", "", 4, 0, 0xFFFF_FFFF),
];

impl Attribute {
    /// Look up an attribute by name, ignoring case and `-`/`_` differences
    pub fn by_name(name: &str) -> Result<&'static Attribute> {
        let wanted = name.replace('-', "_").to_ascii_lowercase();
        ATTRIBUTES
            .iter()
            .find(|a| a.name == wanted)
            .ok_or_else(|| Error::UnknownAttribute(name.to_owned()))
    }

    /// A field holding `value` in this attribute's bits
    pub fn with_value(&self, value: u32) -> BitField {
        BitField {
            code: self.code,
            shift: self.shift,
            mask: self.mask,
            value,
        }
    }

    /// Read this attribute out of a record's codes
    pub fn get(&self, codes: &[u32; CODE_COUNT]) -> u32 {
        self.with_value(0).extract(codes[self.code])
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<16} code {} bits {:#010X}",
            self.name,
            self.code,
            self.with_value(0).region()
        )?;
        if !self.description.is_empty() {
            write!(f, "  {}", self.description)?;
        }
        Ok(())
    }
}
