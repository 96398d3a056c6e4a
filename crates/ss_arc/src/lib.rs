//! This library handles reading, rebuilding and creating **U8** archives used by *Skyward Sword*,
//! together with the **LZ11** whole-file compression those archives usually ship in.
//!
//! # U8 Archive Format Documentation
//!
//! A U8 archive is a hierarchical package of named byte blobs. Stage data (`<stage>_stg_l0.arc`)
//! holds directories such as `dat`, `dzb`, `rarc` and `oarc`, and the `rarc`/`oarc` directories
//! hold further U8 archives for rooms and objects. Archives are typically identified with the
//! `.arc` extension, or `.arc.LZ` when the whole file is LZ11 compressed.
//!
//! ## File Structure
//!
//! A U8 file consists of a header, a flat node table, a string table and a data section.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x55AA382D                                        |
//! | 0x0004         | Root Node Offset       | 4 bytes: Offset to the first node, always 0x20             |
//! | 0x0008         | Header Size            | 4 bytes: Size of the node table plus the string table      |
//! | 0x000C         | Data Offset            | 4 bytes: Offset to the data section                        |
//! | 0x0010         | Reserved               | 16 bytes: Kept as read                                     |
//!
//! ### Node Table
//!
//! The node table starts at the root node offset. The root node is always a directory and its
//! `size` field holds the total number of nodes, root included. Each node has the following
//! structure:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Type                   | 1 byte: `0` for a file, `1` for a directory             |
//! | 0x0001         | Name Offset            | 3 bytes: Offset of the name within the string table     |
//! | 0x0004         | Data Offset / Parent   | 4 bytes: File data offset, or parent node index         |
//! | 0x0008         | Size / Next            | 4 bytes: File size, or index of the first node after the directory |
//!
//! Nodes are stored in depth-first order, so every directory is immediately followed by
//! its contents.
//!
//! ### String Table
//!
//! Null-terminated names, directly after the last node. The root's name is usually empty.
//!
//! ### Data Section
//!
//! File contents, each aligned to 0x20 bytes.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.arc`, `.arc.LZ` when compressed
//! - **Endianness**: Big-endian for all multi-byte integers
//! - **Paths**: built by joining the names of every ancestor with `/`, so a file `stage.plc`
//!   inside the `dat` directory of an archive with an empty root name is `/dat/stage.plc`
//!

pub mod compression;
pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use compression::CompressionMethod;
pub use read::U8Archive;
pub use write::{U8Writer, U8WriterOptions};
