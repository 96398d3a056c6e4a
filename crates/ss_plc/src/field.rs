//! Masked bit-field descriptors and patch targets

use std::fmt;

use bon::Builder;

use crate::error::{Error, Result};
use crate::table::CODE_COUNT;

/// A bit-field inside one of the five codes of a record, together with a value
///
/// The field covers the bits `mask << shift` of code `code`. A field matches a record when
/// `(codes[code] >> shift) & mask == value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct BitField {
    /// Index of the code inside the record, `0..=4`
    pub code: usize,

    /// Position of the lowest bit of the field, `0..=31`
    #[builder(default)]
    pub shift: u32,

    pub mask: u32,

    #[builder(default)]
    pub value: u32,
}

impl BitField {
    /// Creates a validated field
    pub fn new(code: usize, shift: u32, mask: u32, value: u32) -> Result<Self> {
        let field = Self {
            code,
            shift,
            mask,
            value,
        };
        field.validate()?;
        Ok(field)
    }

    /// Checks the code index and shift are usable on a record
    pub fn validate(&self) -> Result<()> {
        if self.code >= CODE_COUNT {
            return Err(Error::InvalidCode(self.code));
        }
        if self.shift > 31 {
            return Err(Error::InvalidShift(self.shift));
        }
        Ok(())
    }

    /// Bits of the code covered by this field
    pub fn region(&self) -> u32 {
        self.mask.checked_shl(self.shift).unwrap_or(0)
    }

    /// Current value of the field inside a code
    pub fn extract(&self, word: u32) -> u32 {
        word.checked_shr(self.shift).unwrap_or(0) & self.mask
    }

    pub fn is_match(&self, word: u32) -> bool {
        self.extract(word) == self.value
    }

    /// Writes the value into the field, leaving every other bit of the code as it was
    pub fn apply(&self, word: u32) -> u32 {
        let value = (self.mask & self.value).checked_shl(self.shift).unwrap_or(0);
        (word & !self.region()) | value
    }
}

impl fmt::Display for BitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "code {} mask {:#X} shift {} value {:#X}",
            self.code, self.mask, self.shift, self.value
        )
    }
}

/// Which records of a table a patch applies to
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Every record of the table
    #[default]
    All,

    /// A single record, `0 <= index < N`
    Index(usize),
}

impl Target {
    /// Maps the command line convention, where `-1` selects every record
    pub fn from_signed(index: i64) -> Result<Self> {
        match index {
            -1 => Ok(Target::All),
            i if i >= 0 => usize::try_from(i)
                .map(Target::Index)
                .map_err(|_| Error::InvalidTarget(i)),
            i => Err(Error::InvalidTarget(i)),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::All => write!(f, "all records"),
            Target::Index(index) => write!(f, "record {index}"),
        }
    }
}

/// A field to write and the records to write it to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch {
    pub field: BitField,
    pub target: Target,
}

impl Patch {
    pub fn new(field: BitField, target: Target) -> Self {
        Self { field, target }
    }

    /// Patches every record
    pub fn all(field: BitField) -> Self {
        Self::new(field, Target::All)
    }
}
