//! Types for reading U8 archives
//!

use binrw::BinRead;
use indexmap::IndexMap;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use tracing::{debug, instrument};

use crate::{
    error::{Error, FileNotFoundError, Result},
    types::{NodeKind, U8Header, U8Node, NODE_SIZE},
    write::{self, Layout, LayoutNode, U8WriterOptions},
};

#[derive(Debug, Clone)]
enum EntryKind {
    Directory { parent: u32, next: u32 },
    File {
        data: Vec<u8>,
        offset: u32,
        size: u32,
    },
}

/// Structure representing a node of a U8 archive.
#[derive(Debug, Clone)]
struct U8Entry {
    /// Full `/` separated path of the node
    path: Box<str>,
    /// Offset of the name in the string table
    name_offset: u32,
    kind: EntryKind,
}

/// U8 archive, fully loaded into memory
///
/// The node table, the string table and the raw bytes are kept as read. File contents can be
/// replaced but files can't be added or removed. When rebuilding, a file stays at its original
/// offset while its data still fits in its original size and is moved past the other files
/// otherwise.
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_u8_contents(reader: impl Read + Seek) -> ss_arc::error::Result<()> {
///     let u8 = ss_arc::U8Archive::new(reader)?;
///
///     for name in u8.file_names() {
///         println!("Filename: {}", name);
///         std::io::stdout().write_all(u8.by_name(name)?)?;
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct U8Archive {
    header: U8Header,
    entries: Vec<U8Entry>,
    string_table: Vec<u8>,
    files: IndexMap<Box<str>, usize>,
    options: U8WriterOptions,
    raw: Vec<u8>,
}

fn null_string(buf: &[u8], offset: usize) -> Result<String> {
    let slice = buf.get(offset..).ok_or(Error::InvalidArchive)?;
    let end = slice
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::CustomError(format!("unterminated name at {offset:#x}")))?;
    Ok(String::from_utf8_lossy(&slice[..end]).into_owned())
}

impl U8Archive {
    /// Read a U8 archive and load every file it contains.
    pub fn new<R: Read + Seek>(mut reader: R) -> Result<U8Archive> {
        match Self::get_metadata(&mut reader) {
            Ok(archive) => Ok(archive),
            Err(e) => {
                debug!(error = %e, "rejecting u8 archive");
                Err(Error::InvalidArchive)
            }
        }
    }

    /// Read a U8 archive held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<U8Archive> {
        Self::new(Cursor::new(data))
    }

    /// Number of files contained in this archive. Directories are not counted.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether this archive contains no files
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the paths of all files, in node table order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_ref())
    }

    /// Returns an iterator over the paths of all directories, root included.
    pub fn directory_names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| matches!(e.kind, EntryKind::Directory { .. }))
            .map(|e| e.path.as_ref())
    }

    /// Total size of the files in the archive.
    pub fn decompressed_size(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| match &e.kind {
                EntryKind::File { data, .. } => data.len() as u64,
                EntryKind::Directory { .. } => 0,
            })
            .sum()
    }

    /// The header as read, or as it was when the archive was loaded.
    pub fn header(&self) -> &U8Header {
        &self.header
    }

    /// Layout options used by [`U8Archive::to_bytes`].
    pub fn options(&self) -> &U8WriterOptions {
        &self.options
    }

    /// Get the index of a file by path, if it's present.
    #[inline(always)]
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.files.get_index_of(name)
    }

    /// Get the path of a file by index, if it's present.
    #[inline(always)]
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.files.get_index(index).map(|(name, _)| name.as_ref())
    }

    /// Search for a file by path
    pub fn by_name(&self, name: &str) -> Result<&[u8]> {
        let Some(index) = self.files.get_index_of(name) else {
            return Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            )));
        };
        self.by_index(index)
    }

    /// Get a contained file by index
    pub fn by_index(&self, file_number: usize) -> Result<&[u8]> {
        let (_, entry) = self
            .files
            .get_index(file_number)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(file_number)))?;

        match &self.entries[*entry].kind {
            EntryKind::File { data, .. } => Ok(data),
            EntryKind::Directory { .. } => Err(Error::FileNotFound(FileNotFoundError::Index(
                file_number,
            ))),
        }
    }

    /// Replace the contents of an existing file, returning the previous contents.
    #[instrument(skip(self, data), fields(size = data.len()), err)]
    pub fn replace(&mut self, name: &str, data: Vec<u8>) -> Result<Vec<u8>> {
        let Some(&entry) = self.files.get(name) else {
            return Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            )));
        };

        match &mut self.entries[entry].kind {
            EntryKind::File { data: current, .. } => Ok(std::mem::replace(current, data)),
            EntryKind::Directory { .. } => Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            ))),
        }
    }

    /// Rebuild the archive with the current file contents.
    ///
    /// An archive that was read and not modified is rebuilt byte for byte, and replacing a file
    /// with data no larger than before only changes that file's bytes and size field.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let nodes = self
            .entries
            .iter()
            .map(|entry| LayoutNode {
                name_offset: entry.name_offset,
                layout: match &entry.kind {
                    EntryKind::Directory { parent, next } => Layout::Directory {
                        parent: *parent,
                        next: *next,
                    },
                    EntryKind::File { data, offset, size } => Layout::File {
                        data,
                        origin: Some((*offset, *size)),
                    },
                },
            })
            .collect::<Vec<_>>();

        write::encode(
            self.header.reserved,
            &nodes,
            &self.string_table,
            Some(self.header.data_offset),
            &self.raw,
            &self.options,
        )
    }

    /// Rebuild the archive and write it out
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    fn get_metadata<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let start = reader.stream_position()?;
        let stream_len = reader.seek(SeekFrom::End(0))? - start;
        reader.seek(SeekFrom::Start(start))?;

        let mut raw = Vec::with_capacity(stream_len as usize);
        reader.read_to_end(&mut raw)?;
        reader.seek(SeekFrom::Start(start))?;

        let header = U8Header::read(reader)?;

        reader.seek(SeekFrom::Start(start + header.root_offset as u64))?;
        let root = U8Node::read(reader)?;
        if root.kind() != Some(NodeKind::Directory) {
            return Err(Error::CustomError("root node is not a directory".into()));
        }

        let count = root.size as usize;
        let table_len = count * NODE_SIZE as usize;
        if count == 0 || table_len > header.header_size as usize {
            return Err(Error::CustomError(format!(
                "{count} nodes do not fit in a {} byte header",
                header.header_size
            )));
        }

        let mut nodes = Vec::with_capacity(count);
        nodes.push(root);
        for _ in 1..count {
            nodes.push(U8Node::read(reader)?);
        }

        let mut string_table = vec![0u8; header.header_size as usize - table_len];
        reader.read_exact(&mut string_table)?;

        // (index one past the directory's last descendant, directory path)
        let mut parents: Vec<(usize, String)> = Vec::new();
        let mut entries = Vec::with_capacity(count);
        let mut files = IndexMap::new();
        let mut data_end = 0u64;

        for (index, node) in nodes.iter().enumerate() {
            while parents.last().is_some_and(|(next, _)| *next <= index) {
                parents.pop();
            }

            let name = null_string(&string_table, node.name_offset() as usize)?;
            let path = match parents.last() {
                Some((_, parent)) => format!("{parent}/{name}"),
                None if index == 0 => name,
                None => {
                    return Err(Error::CustomError(format!(
                        "node {index} lies outside the root directory"
                    )))
                }
            };

            let kind = match node.kind() {
                Some(NodeKind::Directory) => {
                    let next = node.size as usize;
                    if next <= index || next > count {
                        return Err(Error::CustomError(format!(
                            "directory {path} ends at invalid node {next}"
                        )));
                    }
                    parents.push((next, path.clone()));
                    EntryKind::Directory {
                        parent: node.data_offset,
                        next: node.size,
                    }
                }
                Some(NodeKind::File) => {
                    let end = node.data_offset as u64 + node.size as u64;
                    if end > stream_len {
                        return Err(Error::CustomError(format!(
                            "file {path} ends past the end of the archive"
                        )));
                    }
                    let data = raw[node.data_offset as usize..end as usize].to_vec();
                    data_end = data_end.max(end);

                    if files
                        .insert(path.clone().into_boxed_str(), entries.len())
                        .is_some()
                    {
                        return Err(Error::DuplicateEntry(path));
                    }
                    EntryKind::File {
                        data,
                        offset: node.data_offset,
                        size: node.size,
                    }
                }
                None => {
                    return Err(Error::CustomError(format!(
                        "node {index} has an unknown type"
                    )))
                }
            };

            entries.push(U8Entry {
                path: path.into_boxed_str(),
                name_offset: node.name_offset(),
                kind,
            });
        }

        let options = U8WriterOptions::builder()
            .pad_end(stream_len > data_end.max(header.data_offset as u64))
            .build();

        Ok(U8Archive {
            header,
            entries,
            string_table,
            files,
            options,
            raw,
        })
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::{
        error::{Error, Result},
        read::U8Archive,
    };

    #[rustfmt::skip]
    const SINGLE_FILE: [u8; 0x60] = [
        // Header
        0x55, 0xAA, 0x38, 0x2D, 0x00, 0x00, 0x00, 0x20,
        0x00, 0x00, 0x00, 0x1B, 0x00, 0x00, 0x00, 0x40,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        // Root node
        0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x02,
        // File node
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x40,
        0x00, 0x00, 0x00, 0x02,
        // Strings
        0x00, b'a', 0x00,
        // Padding
        0x00, 0x00, 0x00, 0x00, 0x00,
        // Data
        b'h', b'i', 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];

    #[rustfmt::skip]
    const PACKED: [u8; 0x78] = [
        // Header
        0x55, 0xAA, 0x38, 0x2D, 0x00, 0x00, 0x00, 0x20,
        0x00, 0x00, 0x00, 0x29, 0x00, 0x00, 0x00, 0x60,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        // Root node
        0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x03,
        // File nodes, 0x10 apart
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x60,
        0x00, 0x00, 0x00, 0x04,
        0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x70,
        0x00, 0x00, 0x00, 0x03,
        // Strings
        0x00, b'a', 0x00, b'b', 0x00,
        // Padding
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        // Data
        b'd', b'a', b't', b'a', 0xCC, 0xCC, 0xCC, 0xCC,
        0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC,
        b'b', b'i', b'n', 0x00, 0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn read_invalid_magic() {
        let mut input = SINGLE_FILE;
        input[0] = 0x40;

        let archive = U8Archive::from_bytes(&input);
        assert!(matches!(archive, Err(Error::InvalidArchive)));
    }

    #[test]
    fn read_single_file() -> Result<()> {
        let archive = U8Archive::from_bytes(&SINGLE_FILE)?;

        assert_eq!(archive.len(), 1);
        assert_eq!(archive.file_names().collect::<Vec<_>>(), vec!["/a"]);
        assert_eq!(archive.by_name("/a")?, b"hi");
        assert_eq!(archive.by_index(0)?, b"hi");
        assert_eq!(archive.index_for_name("/a"), Some(0));
        assert_eq!(archive.name_for_index(0), Some("/a"));
        assert!(archive.options().pad_end);

        Ok(())
    }

    #[test]
    fn read_missing_file() -> Result<()> {
        let archive = U8Archive::from_bytes(&SINGLE_FILE)?;

        assert!(matches!(
            archive.by_name("/b"),
            Err(Error::FileNotFound(_))
        ));
        assert!(archive.by_index(1).is_err());

        Ok(())
    }

    #[test]
    fn rebuild_unmodified() -> Result<()> {
        let archive = U8Archive::from_bytes(&SINGLE_FILE)?;
        assert_eq!(archive.to_bytes()?, SINGLE_FILE.to_vec());

        Ok(())
    }

    #[test]
    fn replace_keeps_layout() -> Result<()> {
        let mut archive = U8Archive::from_bytes(&SINGLE_FILE)?;
        let previous = archive.replace("/a", b"ho".to_vec())?;
        assert_eq!(previous, b"hi");

        let mut expected = SINGLE_FILE;
        expected[0x41] = b'o';
        assert_eq!(archive.to_bytes()?, expected.to_vec());

        Ok(())
    }

    #[test]
    fn rebuild_keeps_file_offsets() -> Result<()> {
        let archive = U8Archive::from_bytes(&PACKED)?;
        assert_eq!(archive.by_name("/a")?, b"data");
        assert_eq!(archive.by_name("/b")?, b"bin");
        assert_eq!(archive.to_bytes()?, PACKED.to_vec());

        Ok(())
    }

    #[test]
    fn replace_in_place_when_it_fits() -> Result<()> {
        let mut archive = U8Archive::from_bytes(&PACKED)?;
        archive.replace("/a", b"DATA".to_vec())?;

        let mut expected = PACKED;
        expected[0x60..0x64].copy_from_slice(b"DATA");
        assert_eq!(archive.to_bytes()?, expected.to_vec());

        archive.replace("/b", b"x".to_vec())?;
        expected[0x43] = 0x01;
        expected[0x70] = b'x';
        assert_eq!(archive.to_bytes()?, expected.to_vec());

        Ok(())
    }

    #[test]
    fn replace_moves_grown_file_to_the_end() -> Result<()> {
        let mut archive = U8Archive::from_bytes(&PACKED)?;
        archive.replace("/a", vec![0x5A; 0x14])?;

        let bytes = archive.to_bytes()?;
        assert_eq!(bytes.len(), 0xA0);
        assert_eq!(bytes[0x30..0x38], [0x00, 0x00, 0x00, 0x80, 0x00, 0x00, 0x00, 0x14]);
        assert_eq!(bytes[0x3C..0x40], [0x00, 0x00, 0x00, 0x70]);

        let rebuilt = U8Archive::from_bytes(&bytes)?;
        assert_eq!(rebuilt.by_name("/a")?, vec![0x5A; 0x14]);
        assert_eq!(rebuilt.by_name("/b")?, b"bin");

        Ok(())
    }

    #[test]
    fn read_truncated_data() {
        let input = &SINGLE_FILE[..0x41];
        assert!(U8Archive::from_bytes(input).is_err());
    }
}
