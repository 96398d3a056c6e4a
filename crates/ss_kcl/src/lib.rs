//! This library decodes the spatial index of the **KCL** collision files used by *Skyward Sword*.
//!
//! # KCL Format Documentation
//!
//! A KCL file holds collision triangles as prisms together with an octree used to find the
//! prisms near a point. KCL files are typically identified with the `.kcl` extension and are
//! found in the `kcl` directory of room archives.
//!
//! ## Header
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Positions Offset       | 4 bytes: Offset of the vertex positions                    |
//! | 0x0004         | Normals Offset         | 4 bytes: Offset of the normals                             |
//! | 0x0008         | Prisms Offset          | 4 bytes: Offset of the prisms                              |
//! | 0x000C         | Block Offset           | 4 bytes: Offset of the octree root node                    |
//! | 0x0010         | Prism Thickness        | 4 bytes: f32                                               |
//! | 0x0014         | Area Minimum           | 12 bytes: 3 x f32                                          |
//! | 0x0020         | Area Width Masks       | 12 bytes: x, y and z masks                                 |
//! | 0x002C         | Block Shifts           | 12 bytes: block width, x blocks and xy blocks shifts       |
//!
//! ## Octree
//!
//! Every node is made of 8 signed 32 bit offsets, one per child, relative to the node itself.
//! A negative offset points at a leaf, anything else at another node. Nothing in the format
//! bounds the depth of the tree, so [`decode`] refuses loops and trees deeper than
//! [`DecodeOptions::max_depth`].
//!
//! ## Additional Information
//!
//! - **File Extension**: `.kcl`
//! - **Endianness**: Big-endian for all multi-byte values
//!

pub mod error;
pub mod header;
pub mod tree;

pub use header::{locate_root, KclHeader};
pub use tree::{decode, Child, DecodeOptions, Node, NodeId, NodeTree};
