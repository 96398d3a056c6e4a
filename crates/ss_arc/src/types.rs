//! Base types for structure of U8 file.

use binrw::{BinRead, BinWrite};

/// Offset of the first node, right after the header
pub const ROOT_NODE_OFFSET: u32 = 0x20;

/// Size in bytes of a single entry in the node table
pub const NODE_SIZE: u32 = 12;

/// U8 file header
///
/// Always starts with the magic `0x55AA382D`. All data is stored in big endian format
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(magic = b"\x55\xAA\x38\x2D", big)]
pub struct U8Header {
    /// The offset from the beginning of the file where the node table starts
    pub root_offset: u32,

    /// The combined size of the node table and the string table
    pub header_size: u32,

    /// The offset from the beginning of the file where file data starts
    pub data_offset: u32,

    /// Unused bytes, carried through untouched when rebuilding an archive
    pub reserved: [u8; 16],
}

impl Default for U8Header {
    fn default() -> Self {
        Self {
            root_offset: ROOT_NODE_OFFSET,
            header_size: Default::default(),
            data_offset: Default::default(),
            reserved: Default::default(),
        }
    }
}

/// Whether a node describes a file or a directory
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

/// U8 node table entry
///
/// The type and the name offset share the first word: the type is the top byte and the
/// name offset is the lower 24 bits.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(big)]
pub struct U8Node {
    /// Node type in the top byte, string table offset of the name in the lower 24 bits
    pub type_and_name: u32,

    /// For files the absolute offset of the data, for directories the index of the parent
    pub data_offset: u32,

    /// For files the size of the data, for directories the index one past its last descendant
    pub size: u32,
}

impl U8Node {
    pub fn new(kind: NodeKind, name_offset: u32, data_offset: u32, size: u32) -> Self {
        let kind_bits = match kind {
            NodeKind::File => 0,
            NodeKind::Directory => 1 << 24,
        };
        Self {
            type_and_name: kind_bits | (name_offset & 0x00FF_FFFF),
            data_offset,
            size,
        }
    }

    /// Returns `None` for type bytes other than file and directory
    pub fn kind(&self) -> Option<NodeKind> {
        match self.type_and_name >> 24 {
            0 => Some(NodeKind::File),
            1 => Some(NodeKind::Directory),
            _ => None,
        }
    }

    pub fn name_offset(&self) -> u32 {
        self.type_and_name & 0x00FF_FFFF
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{NodeKind, U8Header, U8Node};

    #[test]
    fn read_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x55, 0xAA, 0x38, 0x2D,
            0x00, 0x00, 0x00, 0x20,
            0x00, 0x00, 0x00, 0x2A,
            0x00, 0x00, 0x00, 0x60,
            0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC,
            0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC,
        ]);

        let expected = U8Header {
            header_size: 0x2A,
            data_offset: 0x60,
            reserved: [0xCC; 16],
            ..Default::default()
        };

        assert_eq!(U8Header::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn read_header_bad_magic() {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x55, 0xAA, 0x38, 0x2E,
            0x00, 0x00, 0x00, 0x20,
            0x00, 0x00, 0x00, 0x2A,
            0x00, 0x00, 0x00, 0x60,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ]);

        assert!(U8Header::read(&mut input).is_err());
    }

    #[test]
    fn write_header() -> Result<()> {
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x55, 0xAA, 0x38, 0x2D,
            0x00, 0x00, 0x00, 0x20,
            0x00, 0x00, 0x00, 0x2A,
            0x00, 0x00, 0x00, 0x60,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];

        let header = U8Header {
            header_size: 0x2A,
            data_offset: 0x60,
            ..Default::default()
        };

        let mut actual = Vec::new();
        header.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn read_directory_node() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x01, 0x00, 0x00, 0x05,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x03,
        ]);

        let node = U8Node::read(&mut input)?;
        assert_eq!(node.kind(), Some(NodeKind::Directory));
        assert_eq!(node.name_offset(), 5);
        assert_eq!(node.data_offset, 0);
        assert_eq!(node.size, 3);

        Ok(())
    }

    #[test]
    fn write_file_node() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x00, 0x00, 0x00, 0x09,
            0x00, 0x00, 0x00, 0x60,
            0x00, 0x00, 0x00, 0x1C,
        ];

        let node = U8Node::new(NodeKind::File, 9, 0x60, 0x1C);

        let mut actual = Vec::new();
        node.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn unknown_node_type() {
        let node = U8Node {
            type_and_name: 0x0200_0000,
            ..Default::default()
        };
        assert_eq!(node.kind(), None);
    }
}
