//! In-place view over a record table buffer

use std::io::Cursor;

use binrw::{BinRead, BinWrite};
use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, instrument, trace};

use crate::error::{Error, Result};
use crate::field::{BitField, Patch, Target};

/// Tag every record table starts with
pub const MAGIC: [u8; 4] = *b"SPLC";

/// The only supported format version, which is also the size of a record
pub const VERSION: u16 = 0x14;

/// Size in bytes of the table header
pub const HEADER_SIZE: usize = 8;

/// Size in bytes of a single record
pub const RECORD_SIZE: usize = 20;

/// Number of codes in a record
pub const CODE_COUNT: usize = 5;

/// Record table header
///
/// Data is stored in big endian format
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(big)]
pub struct PlcHeader {
    /// Should always be `SPLC`
    pub magic: [u8; 4],

    /// Format version, always `0x14`
    pub version: u16,

    /// Number of records following the header
    pub count: u16,
}

impl PlcHeader {
    pub fn new(count: u16) -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            count,
        }
    }
}

/// A record table borrowed from or owned by a buffer
///
/// The buffer is validated once when the table is opened. Reads and patches then work directly
/// on the bytes of each record, so everything outside the touched bits, including any bytes past
/// the last record, is left as it was.
///
/// ```
/// # fn doit() -> ss_plc::error::Result<()>
/// # {
/// use ss_plc::{BitField, Patch, RecordTable};
///
/// let mut bytes = vec![
///     b'S', b'P', b'L', b'C', 0x00, 0x14, 0x00, 0x01,
///     0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00,
///     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
///     0x00, 0x00, 0x00, 0x00,
/// ];
///
/// let mut table = RecordTable::open(&mut bytes)?;
///
/// // Is anything marked as passable by objects?
/// let pass_object = BitField::new(0, 14, 0x1, 0x1)?;
/// assert!(table.matches(&pass_object)?);
///
/// // Clear it everywhere
/// table.patch(&Patch::all(BitField::new(0, 14, 0x1, 0x0)?))?;
/// assert!(!table.matches(&pass_object)?);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RecordTable<T> {
    buffer: T,
    count: usize,
}

impl<T: AsRef<[u8]>> RecordTable<T> {
    /// Validate the tag, version and length of a buffer and wrap it.
    pub fn open(buffer: T) -> Result<Self> {
        let bytes = buffer.as_ref();
        if bytes.len() < HEADER_SIZE {
            return Err(Error::Truncated {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let header = PlcHeader::read(&mut Cursor::new(&bytes[..HEADER_SIZE]))?;
        if header.magic != MAGIC {
            return Err(Error::BadMagic(header.magic));
        }
        if header.version != VERSION {
            return Err(Error::BadVersion(header.version));
        }

        let count = header.count as usize;
        let expected = HEADER_SIZE + count * RECORD_SIZE;
        if bytes.len() < expected {
            return Err(Error::Truncated {
                expected,
                actual: bytes.len(),
            });
        }
        trace!(count, "opened record table");

        Ok(Self { buffer, count })
    }

    /// Number of records, `N`
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Offset one past the last record
    pub fn end(&self) -> usize {
        HEADER_SIZE + self.count * RECORD_SIZE
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    /// Give back the wrapped buffer
    pub fn into_inner(self) -> T {
        self.buffer
    }

    fn slot(&self, index: usize) -> &[u8] {
        let start = HEADER_SIZE + index * RECORD_SIZE;
        &self.buffer.as_ref()[start..start + RECORD_SIZE]
    }

    fn code_unchecked(&self, index: usize, code: usize) -> u32 {
        BigEndian::read_u32(&self.slot(index)[code * 4..])
    }

    /// Decode the five codes of a record
    pub fn record(&self, index: usize) -> Result<[u32; CODE_COUNT]> {
        if index >= self.count {
            return Err(Error::RecordIndexOutOfRange {
                index,
                count: self.count,
            });
        }

        let mut codes = [0u32; CODE_COUNT];
        BigEndian::read_u32_into(self.slot(index), &mut codes);
        Ok(codes)
    }

    /// Iterate over the decoded records in table order
    pub fn records(&self) -> impl Iterator<Item = [u32; CODE_COUNT]> + '_ {
        (0..self.count).map(|index| {
            let mut codes = [0u32; CODE_COUNT];
            BigEndian::read_u32_into(self.slot(index), &mut codes);
            codes
        })
    }

    /// Indices of every record whose field holds the field's value
    pub fn matching_records(&self, field: &BitField) -> Result<Vec<usize>> {
        field.validate()?;
        Ok((0..self.count)
            .filter(|&index| field.is_match(self.code_unchecked(index, field.code)))
            .collect())
    }

    /// Whether any record's field holds the field's value
    pub fn matches(&self, field: &BitField) -> Result<bool> {
        field.validate()?;
        Ok((0..self.count).any(|index| field.is_match(self.code_unchecked(index, field.code))))
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> RecordTable<T> {
    fn slot_mut(&mut self, index: usize) -> &mut [u8] {
        let start = HEADER_SIZE + index * RECORD_SIZE;
        &mut self.buffer.as_mut()[start..start + RECORD_SIZE]
    }

    /// Overwrite all five codes of a record
    pub fn set_record(&mut self, index: usize, codes: [u32; CODE_COUNT]) -> Result<()> {
        if index >= self.count {
            return Err(Error::RecordIndexOutOfRange {
                index,
                count: self.count,
            });
        }
        BigEndian::write_u32_into(&codes, self.slot_mut(index));
        Ok(())
    }

    /// Write the field into the selected records, returning how many were written.
    ///
    /// The field and target are fully checked before the first byte is touched.
    #[instrument(skip(self), fields(records = self.count), err)]
    pub fn patch(&mut self, patch: &Patch) -> Result<usize> {
        let field = patch.field;
        field.validate()?;

        let selected = match patch.target {
            Target::All => 0..self.count,
            Target::Index(index) if index < self.count => index..index + 1,
            Target::Index(index) => {
                return Err(Error::RecordIndexOutOfRange {
                    index,
                    count: self.count,
                })
            }
        };

        let patched = selected.len();
        for index in selected {
            let old = self.code_unchecked(index, field.code);
            if field.is_match(old) {
                debug!(
                    index,
                    offset = HEADER_SIZE + index * RECORD_SIZE,
                    "record already holds the value"
                );
            }
            let offset = field.code * 4;
            BigEndian::write_u32(
                &mut self.slot_mut(index)[offset..offset + 4],
                field.apply(old),
            );
        }

        Ok(patched)
    }
}
