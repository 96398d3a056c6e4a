//! Decoding of the octree of relative child offsets
//!

use std::collections::HashSet;
use std::fmt;

use bon::Builder;
use byteorder::{BigEndian, ByteOrder};
use indexmap::IndexMap;
use tracing::{instrument, trace};

use crate::error::{Error, Result};
use crate::header::locate_root;

/// Number of children of every node
pub const BRANCHING: usize = 8;

/// Size in bytes of a node, one signed offset per child
pub const NODE_SIZE: usize = BRANCHING * 4;

/// Index of a node in a [`NodeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A slot of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    /// An internal node, decoded as part of the tree
    Node(NodeId),

    /// Absolute offset of a leaf
    Leaf(u32),
}

/// An internal node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Absolute offset of the node in the buffer
    pub offset: u32,

    /// Distance from the root, which has depth 0
    pub depth: usize,

    pub children: [Child; BRANCHING],
}

/// Options for [`decode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct DecodeOptions {
    /// Deepest internal node accepted, the root has depth 0
    #[builder(default = 64)]
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A decoded node tree
///
/// Nodes are stored in an arena in the order they were discovered and are keyed by their
/// absolute offset. Two slots pointing at the same offset share a node.
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: IndexMap<u32, Node>,
}

struct Frame {
    id: NodeId,
    words: [i32; BRANCHING],
    next: usize,
}

fn read_words(buffer: &[u8], offset: u32) -> Result<[i32; BRANCHING]> {
    let start = offset as usize;
    let bytes = start
        .checked_add(NODE_SIZE)
        .and_then(|end| buffer.get(start..end))
        .ok_or(Error::OutOfBounds {
            offset: offset as u64,
            size: NODE_SIZE,
            len: buffer.len(),
        })?;

    let mut words = [0i32; BRANCHING];
    BigEndian::read_i32_into(bytes, &mut words);
    Ok(words)
}

/// Decode the tree whose root node is at `root_offset`.
///
/// A negative child offset `v` of the node at `o` is a leaf at `o + v`, any other offset is an
/// internal node at `o + v`. Offsets leading back to a node still being decoded, nodes deeper
/// than [`DecodeOptions::max_depth`] and leaves before the start of the buffer are rejected
/// with [`Error::MalformedTree`].
#[instrument(skip(buffer), fields(len = buffer.len()), err)]
pub fn decode(buffer: &[u8], root_offset: u32, options: &DecodeOptions) -> Result<NodeTree> {
    let mut nodes = IndexMap::new();
    let mut on_path = HashSet::new();

    let placeholder = [Child::Leaf(0); BRANCHING];
    nodes.insert(
        root_offset,
        Node {
            offset: root_offset,
            depth: 0,
            children: placeholder,
        },
    );
    on_path.insert(root_offset);
    let mut stack = vec![Frame {
        id: NodeId(0),
        words: read_words(buffer, root_offset)?,
        next: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        let (id, slot) = (frame.id, frame.next);
        if slot == BRANCHING {
            if let Some((offset, _)) = nodes.get_index(id.0) {
                on_path.remove(offset);
            }
            stack.pop();
            continue;
        }
        let delta = frame.words[slot];
        frame.next += 1;

        let (offset, depth) = match nodes.get_index(id.0) {
            Some((_, node)) => (node.offset, node.depth),
            None => return Err(Error::malformed(root_offset, "lost track of a node")),
        };
        let target = offset as i64 + delta as i64;

        let child = if delta < 0 {
            let leaf = u32::try_from(target).map_err(|_| {
                Error::malformed(offset, format!("leaf in slot {slot} is before the buffer"))
            })?;
            Child::Leaf(leaf)
        } else {
            let target = u32::try_from(target).map_err(|_| Error::OutOfBounds {
                offset: target as u64,
                size: NODE_SIZE,
                len: buffer.len(),
            })?;

            if on_path.contains(&target) {
                return Err(Error::malformed(
                    offset,
                    format!("slot {slot} loops back to {target:#X}"),
                ));
            }

            match nodes.get_index_of(&target) {
                Some(existing) => Child::Node(NodeId(existing)),
                None => {
                    if depth + 1 > options.max_depth {
                        return Err(Error::malformed(
                            target,
                            format!("deeper than {} levels", options.max_depth),
                        ));
                    }
                    trace!(offset = target, depth = depth + 1, "node");

                    let words = read_words(buffer, target)?;
                    let (index, _) = nodes.insert_full(
                        target,
                        Node {
                            offset: target,
                            depth: depth + 1,
                            children: placeholder,
                        },
                    );
                    on_path.insert(target);
                    stack.push(Frame {
                        id: NodeId(index),
                        words,
                        next: 0,
                    });
                    Child::Node(NodeId(index))
                }
            }
        };

        if let Some((_, node)) = nodes.get_index_mut(id.0) {
            node.children[slot] = child;
        }
    }

    Ok(NodeTree { nodes })
}

impl NodeTree {
    /// Locate the root through the header and decode the tree of a KCL buffer
    pub fn from_kcl(buffer: &[u8], options: &DecodeOptions) -> Result<Self> {
        decode(buffer, locate_root(buffer)?, options)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of internal nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get_index(id.0).map(|(_, node)| node)
    }

    /// Look up a node by its absolute offset
    pub fn get(&self, offset: u32) -> Option<&Node> {
        self.nodes.get(&offset)
    }

    /// All internal nodes, in the order they were discovered
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Offsets of every distinct leaf, in the order they were discovered
    pub fn leaves(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        self.nodes
            .values()
            .flat_map(|node| node.children.iter())
            .filter_map(|child| match child {
                Child::Leaf(offset) => Some(*offset),
                Child::Node(_) => None,
            })
            .filter(|offset| seen.insert(*offset))
            .collect()
    }

    /// Depth of the deepest internal node
    pub fn depth(&self) -> usize {
        self.nodes.values().map(|node| node.depth).max().unwrap_or(0)
    }
}

/// One line per node and leaf, indented with tabs by depth
impl fmt::Display for NodeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printed = HashSet::new();
        // (child, indentation)
        let mut stack = vec![(Child::Node(self.root()), 0usize)];

        while let Some((child, indent)) = stack.pop() {
            let tabs = "\t".repeat(indent);
            match child {
                Child::Leaf(offset) => writeln!(f, "{tabs}leaf {offset:#010X}")?,
                Child::Node(id) => {
                    let Some(node) = self.node(id) else {
                        continue;
                    };
                    if !printed.insert(id) {
                        writeln!(f, "{tabs}node {:#010X} (shared)", node.offset)?;
                        continue;
                    }
                    writeln!(f, "{tabs}node {:#010X}", node.offset)?;
                    for child in node.children.iter().rev() {
                        stack.push((*child, indent + 1));
                    }
                }
            }
        }
        Ok(())
    }
}
