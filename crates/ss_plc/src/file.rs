//! Owned record tables, for dumping and rebuilding whole files
//!

use std::fmt;
use std::io::{Cursor, Read, Write};

use binrw::{BinRead, BinWrite};
use derive_more::derive::{Constructor, Deref};
use tracing::instrument;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::attribute::Attribute;
use crate::error::{Error, Result};
use crate::table::{PlcHeader, RecordTable, CODE_COUNT};

/// A single record
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(big)]
pub struct PlcEntry {
    pub codes: [u32; CODE_COUNT],
}

impl PlcEntry {
    /// Value of a named attribute in this record
    pub fn get(&self, attribute: &Attribute) -> u32 {
        attribute.get(&self.codes)
    }
}

impl From<[u32; CODE_COUNT]> for PlcEntry {
    fn from(codes: [u32; CODE_COUNT]) -> Self {
        Self { codes }
    }
}

impl fmt::Display for PlcEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [c0, c1, c2, c3, c4] = self.codes;
        write!(f, "{c0:08X} {c1:08X} {c2:08X} {c3:08X} {c4:08X}")
    }
}

/// A fully decoded record table
///
/// Bytes found after the last record are kept so the file can be written back unchanged.
#[derive(Constructor, Deref, Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlcFile {
    #[deref]
    pub entries: Vec<PlcEntry>,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub trailing: Vec<u8>,
}

impl PlcFile {
    /// Read a whole record table file
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    #[instrument(skip_all, fields(size = data.len()), err)]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let table = RecordTable::open(data)?;
        let entries = table.records().map(PlcEntry::from).collect();
        Ok(Self::new(entries, data[table.end()..].to_vec()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let count = u16::try_from(self.entries.len())
            .map_err(|_| Error::TooManyRecords(self.entries.len()))?;

        let mut out = Cursor::new(Vec::new());
        PlcHeader::new(count).write(&mut out)?;
        for entry in &self.entries {
            entry.write(&mut out)?;
        }
        out.write_all(&self.trailing)?;

        Ok(out.into_inner())
    }

    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    /// Write one line of hex codes per record
    pub fn dump<W: Write>(&self, mut writer: W) -> Result<()> {
        for entry in &self.entries {
            writeln!(writer, "{entry}")?;
        }
        Ok(())
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{PlcEntry, PlcFile};
    use crate::attribute::Attribute;
    use crate::error::{Error, Result};

    #[rustfmt::skip]
    const SINGLE_RECORD: [u8; 30] = [
        // Header
        b'S', b'P', b'L', b'C', 0x00, 0x14, 0x00, 0x01,
        // Record
        0x00, 0x01, 0x40, 0x00, 0x01, 0x50, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x0C,
        0xFF, 0xFF, 0xFF, 0xFF,
        // Padding
        0x00, 0x00,
    ];

    #[test]
    fn read_single_record() -> Result<()> {
        let plc = PlcFile::read(&SINGLE_RECORD[..])?;

        assert_eq!(plc.len(), 1);
        assert_eq!(
            plc[0],
            PlcEntry::from([0x0001_4000, 0x0150_0000, 0x10, 0x0C, 0xFFFF_FFFF])
        );
        assert_eq!(plc[0].get(Attribute::by_name("pass_link")?), 1);
        assert_eq!(plc.trailing, vec![0, 0]);

        Ok(())
    }

    #[test]
    fn write_is_identical() -> Result<()> {
        let plc = PlcFile::from_bytes(&SINGLE_RECORD)?;

        let mut actual = Vec::new();
        plc.write(&mut actual)?;
        assert_eq!(actual, SINGLE_RECORD.to_vec());

        Ok(())
    }

    #[test]
    fn dump_lines() -> Result<()> {
        let plc = PlcFile::from_bytes(&SINGLE_RECORD)?;

        let mut actual = Vec::new();
        plc.dump(&mut actual)?;
        assert_eq!(
            String::from_utf8_lossy(&actual),
            "00014000 01500000 00000010 0000000C FFFFFFFF\n"
        );

        Ok(())
    }

    #[test]
    fn too_many_records() {
        let plc = PlcFile::new(vec![PlcEntry::default(); 0x1_0000], Vec::new());
        assert!(matches!(plc.to_bytes(), Err(Error::TooManyRecords(0x1_0000))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_uses_hex_codes() -> Result<()> {
        let plc = PlcFile::new(
            vec![PlcEntry::from([0x4000, 0, 0x10, 0, 0xFFFF_FFFF])],
            Vec::new(),
        );

        let json = plc.to_json()?;
        assert!(json.contains("\"00004000\""));
        assert!(!json.contains("trailing"));
        assert_eq!(PlcFile::from_json(&json)?, plc);

        Ok(())
    }
}
