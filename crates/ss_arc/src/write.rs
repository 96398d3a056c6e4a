//! Types for writing U8 archives
//!

use binrw::BinWrite;
use bon::Builder;
use indexmap::IndexMap;
use std::io::{self, Cursor, Write};
use tracing::{instrument, Level};

use crate::error::{Error, Result};
use crate::types::{NodeKind, U8Header, U8Node, NODE_SIZE, ROOT_NODE_OFFSET};

/// Options for how the U8 file should be laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct U8WriterOptions {
    /// Alignment of the data section and of every file's data
    #[builder(default = 0x20)]
    pub alignment: u32,

    /// Whether the end of the archive is padded up to the alignment
    #[builder(default = true)]
    pub pad_end: bool,
}

impl Default for U8WriterOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Placement of a node in the node table before data offsets are assigned
#[derive(Debug, Clone, Copy)]
pub(crate) enum Layout<'a> {
    Directory { parent: u32, next: u32 },
    /// `origin` is the `(offset, size)` the file had in the archive it was read from
    File {
        data: &'a [u8],
        origin: Option<(u32, u32)>,
    },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutNode<'a> {
    pub name_offset: u32,
    pub layout: Layout<'a>,
}

fn align(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::TooLarge(value))
}

/// Offset a file keeps from the archive it was read from, if its data still fits there
fn kept_offset(data: &[u8], origin: Option<(u32, u32)>) -> Option<usize> {
    origin
        .filter(|(_, size)| data.len() <= *size as usize)
        .map(|(offset, _)| offset as usize)
}

/// Serialize a node table, its string table and the file data into a complete archive.
///
/// When `data_offset` is given and still lies past the string table it is kept. Files with an
/// origin keep their offset as long as their data fits in the original size, the others are
/// appended after the last kept file. `base` holds the bytes of the archive being rebuilt and
/// fills everything that isn't overwritten, so an unmodified archive rebuilds byte for byte.
#[instrument(skip_all, fields(nodes = nodes.len()), err)]
pub(crate) fn encode(
    reserved: [u8; 16],
    nodes: &[LayoutNode<'_>],
    strings: &[u8],
    data_offset: Option<u32>,
    base: &[u8],
    options: &U8WriterOptions,
) -> Result<Vec<u8>> {
    let alignment = options.alignment.max(1) as usize;
    let header_size = nodes.len() * NODE_SIZE as usize + strings.len();
    let table_end = ROOT_NODE_OFFSET as usize + header_size;
    let data_offset = match data_offset {
        Some(offset) if offset as usize >= table_end => offset as usize,
        _ => align(table_end, alignment),
    };

    let kept_end = nodes
        .iter()
        .filter_map(|node| match node.layout {
            Layout::File { data, origin } => kept_offset(data, origin).map(|o| o + data.len()),
            Layout::Directory { .. } => None,
        })
        .fold(data_offset, usize::max);

    let mut cursor = kept_end;
    let mut moved = false;
    let mut placed = Vec::with_capacity(nodes.len());
    for node in nodes {
        placed.push(match node.layout {
            Layout::Directory { parent, next } => {
                U8Node::new(NodeKind::Directory, node.name_offset, parent, next)
            }
            Layout::File { data, origin } => {
                let offset = match kept_offset(data, origin) {
                    Some(offset) => offset,
                    None => {
                        moved = true;
                        let offset = align(cursor, alignment);
                        cursor = offset + data.len();
                        offset
                    }
                };
                U8Node::new(
                    NodeKind::File,
                    node.name_offset,
                    to_u32(offset)?,
                    to_u32(data.len())?,
                )
            }
        });
    }
    let end = if !moved && !base.is_empty() {
        cursor.max(base.len())
    } else if options.pad_end {
        align(cursor, alignment)
    } else {
        cursor
    };

    let header = U8Header {
        root_offset: ROOT_NODE_OFFSET,
        header_size: to_u32(header_size)?,
        data_offset: to_u32(data_offset)?,
        reserved,
    };

    let mut out = Cursor::new(Vec::with_capacity(table_end));
    header.write(&mut out)?;
    for node in &placed {
        node.write(&mut out)?;
    }
    out.write_all(strings)?;
    let table = out.into_inner();

    let mut buffer = base[..end.min(base.len())].to_vec();
    buffer.resize(end.max(table.len()), 0);
    buffer[..table.len()].copy_from_slice(&table);
    for (node, raw) in nodes.iter().zip(&placed) {
        if let Layout::File { data, .. } = node.layout {
            let offset = raw.data_offset as usize;
            buffer[offset..offset + data.len()].copy_from_slice(data);
        }
    }

    Ok(buffer)
}

/// Split a user supplied path into its components, ignoring empty and `.` segments
pub(crate) fn path_components(name: &str) -> Result<Vec<&str>> {
    let components = name
        .split(['/', '\\'])
        .filter(|c| !c.is_empty() && *c != ".")
        .collect::<Vec<_>>();

    if components.is_empty() || components.contains(&"..") {
        return Err(Error::CustomError(format!("invalid entry path {name}")));
    }
    Ok(components)
}

enum TreeNode {
    Directory(IndexMap<String, TreeNode>),
    File(usize),
}

fn insert(
    root: &mut IndexMap<String, TreeNode>,
    components: &[&str],
    index: usize,
    path: &str,
) -> Result<()> {
    let Some((file_name, directories)) = components.split_last() else {
        return Err(Error::CustomError(format!("invalid entry path {path}")));
    };

    let mut current = root;
    for directory in directories {
        let node = current
            .entry(directory.to_string())
            .or_insert_with(|| TreeNode::Directory(IndexMap::new()));
        current = match node {
            TreeNode::Directory(children) => children,
            TreeNode::File(_) => return Err(Error::PathConflict(path.to_string())),
        };
    }

    if current.contains_key(*file_name) {
        return Err(Error::PathConflict(path.to_string()));
    }
    current.insert(file_name.to_string(), TreeNode::File(index));
    Ok(())
}

fn flatten<'a>(
    children: &IndexMap<String, TreeNode>,
    parent: u32,
    files: &'a IndexMap<String, Vec<u8>>,
    nodes: &mut Vec<LayoutNode<'a>>,
    strings: &mut Vec<u8>,
) -> Result<()> {
    for (name, child) in children {
        let name_offset = to_u32(strings.len())?;
        strings.extend_from_slice(name.as_bytes());
        strings.push(0);

        match child {
            TreeNode::Directory(grandchildren) => {
                let index = nodes.len();
                nodes.push(LayoutNode {
                    name_offset,
                    layout: Layout::Directory { parent, next: 0 },
                });
                flatten(grandchildren, to_u32(index)?, files, nodes, strings)?;
                nodes[index].layout = Layout::Directory {
                    parent,
                    next: to_u32(nodes.len())?,
                };
            }
            TreeNode::File(file) => {
                let (_, data) = files
                    .get_index(*file)
                    .ok_or_else(|| Error::CustomError(format!("missing data for {name}")))?;
                nodes.push(LayoutNode {
                    name_offset,
                    layout: Layout::File { data, origin: None },
                });
            }
        }
    }
    Ok(())
}

/// U8 archive generator
///
/// Directories are created implicitly from the `/` separated file paths and keep the order
/// in which they were first seen.
///
/// ```
/// # fn doit() -> ss_arc::error::Result<()>
/// # {
/// use ss_arc::{U8Archive, U8Writer, U8WriterOptions};
/// use std::io::Write;
///
/// let mut u8 = U8Writer::new(Vec::new(), U8WriterOptions::default());
///
/// u8.start_file("dat/hello_world.txt")?;
/// u8.write_all(b"Hello, World!")?;
///
/// // Apply the changes you've made.
/// let bytes = u8.finish()?;
///
/// let archive = U8Archive::from_bytes(&bytes)?;
/// assert_eq!(archive.by_name("/dat/hello_world.txt")?, b"Hello, World!");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct U8Writer<W: Write> {
    inner: W,
    options: U8WriterOptions,
    files: IndexMap<String, Vec<u8>>,
    current: Option<(String, Vec<u8>)>,
}

impl<W: Write> U8Writer<W> {
    /// Initializes the archive.
    ///
    /// Nothing is written to `inner` until [`U8Writer::finish`].
    pub fn new(inner: W, options: U8WriterOptions) -> Self {
        Self {
            inner,
            options,
            files: IndexMap::new(),
            current: None,
        }
    }

    /// Create a file in the archive and start writing its contents.
    ///
    /// Leading `/` and `.` segments are ignored, `..` is rejected.
    #[instrument(skip(self), err)]
    pub fn start_file(&mut self, name: &str) -> Result<()> {
        self.end_file();

        let path = path_components(name)?.join("/");
        if self.files.contains_key(&path) {
            return Err(Error::DuplicateEntry(path));
        }

        self.current = Some((path, Vec::new()));
        Ok(())
    }

    /// Add a complete file in one call
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.start_file(name)?;
        self.write_all(data)?;
        Ok(())
    }

    fn end_file(&mut self) {
        if let Some((path, data)) = self.current.take() {
            self.files.insert(path, data);
        }
    }

    /// Finish the last file and write all other archive structures
    ///
    /// This will return the writer.
    #[instrument(skip(self), err(level = Level::ERROR))]
    pub fn finish(mut self) -> Result<W> {
        self.end_file();

        let mut tree = IndexMap::new();
        for (index, path) in self.files.keys().enumerate() {
            let components = path.split('/').collect::<Vec<_>>();
            insert(&mut tree, &components, index, path)?;
        }

        let mut strings = vec![0u8];
        let mut nodes = vec![LayoutNode {
            name_offset: 0,
            layout: Layout::Directory { parent: 0, next: 0 },
        }];
        flatten(&tree, 0, &self.files, &mut nodes, &mut strings)?;
        nodes[0].layout = Layout::Directory {
            parent: 0,
            next: to_u32(nodes.len())?,
        };

        let bytes = encode([0; 16], &nodes, &strings, None, &[], &self.options)?;
        self.inner.write_all(&bytes)?;

        Ok(self.inner)
    }
}

impl<W: Write> Write for U8Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.current {
            Some((_, data)) => {
                data.extend_from_slice(buf);
                Ok(buf.len())
            }
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "no file has been started",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::{U8Writer, U8WriterOptions};
    use crate::error::{Error, Result};

    #[test]
    fn write_empty() -> Result<()> {
        let actual = U8Writer::new(Vec::new(), U8WriterOptions::default()).finish()?;

        #[rustfmt::skip]
        let expected = vec![
            // Header
            0x55, 0xAA, 0x38, 0x2D, 0x00, 0x00, 0x00, 0x20,
            0x00, 0x00, 0x00, 0x0D, 0x00, 0x00, 0x00, 0x40,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // Root node
            0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x01,
            // Strings
            0x00,
            // Padding
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00,
        ];

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn write_single_file() -> Result<()> {
        let mut u8 = U8Writer::new(Vec::new(), U8WriterOptions::default());
        u8.start_file("a")?;
        u8.write_all(b"hi")?;
        let actual = u8.finish()?;

        #[rustfmt::skip]
        let expected = vec![
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

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn write_without_started_file() {
        let mut u8 = U8Writer::new(Vec::new(), U8WriterOptions::default());
        assert!(u8.write_all(b"orphan").is_err());
    }

    #[test]
    fn reject_duplicate_file() -> Result<()> {
        let mut u8 = U8Writer::new(Vec::new(), U8WriterOptions::default());
        u8.add_file("dat/a.plc", b"one")?;

        assert!(matches!(
            u8.start_file("/dat/a.plc"),
            Err(Error::DuplicateEntry(_))
        ));

        Ok(())
    }

    #[test]
    fn reject_file_used_as_directory() -> Result<()> {
        let mut u8 = U8Writer::new(Vec::new(), U8WriterOptions::default());
        u8.add_file("dat", b"one")?;
        u8.add_file("dat/a.plc", b"two")?;

        assert!(matches!(u8.finish(), Err(Error::PathConflict(_))));

        Ok(())
    }

    #[test]
    fn reject_parent_segments() {
        let mut u8 = U8Writer::new(Vec::new(), U8WriterOptions::default());
        assert!(u8.start_file("../escape").is_err());
    }
}
