//! This library walks *Skyward Sword* stage archives to query and patch the **SPLC** record
//! tables they hold, and to extract their collision files.
//!
//! # Stage Layout
//!
//! Each stage lives in `Stage/<stage>/` and its collision data is in the layer 0 archive,
//! `<stage>_stg_l0.arc.LZ`. The HD release keeps the same files under an extra `NX` directory.
//! Inside a layer 0 archive, the directory directly under the root tells what a member is:
//!
//! | Directory | Contents                                                        |
//! |-----------|-----------------------------------------------------------------|
//! | `dat`     | Stage record tables (`.plc`) and other stage data               |
//! | `dzb`     | Stage collision meshes                                          |
//! | `rarc`    | One U8 archive per room, holding its own `dat` and `kcl`        |
//! | `oarc`    | One U8 archive per object, holding `.plc` and `.dzb` files      |
//!
//! Shared objects are stored once in `Object/ObjectPack.arc.LZ`.
//!
//! # Traversal
//!
//! [`check`] and [`modify`] visit members in listing order. Record tables are queried or
//! patched in place, archives under the categories named in [`TraversalOptions`] are decoded
//! and visited the same way, and everything else is left untouched. A patched nested archive
//! is re-encoded, and recompressed when its name ends in `.LZ`, before its parent is.
//!
//! ```
//! # use ss_arc::{U8Writer, U8WriterOptions};
//! # use ss_plc::{BitField, Patch};
//! # use ss_stage::{check_archive, modify_archive, TraversalOptions};
//! # fn doit() -> ss_stage::error::Result<()> {
//! # let mut table = b"SPLC\x00\x14\x00\x01".to_vec();
//! # table.extend_from_slice(&[0u8; 20]);
//! # let mut room = U8Writer::new(Vec::new(), U8WriterOptions::default());
//! # room.add_file("dat/room.plc", &table)?;
//! # let mut stage = U8Writer::new(Vec::new(), U8WriterOptions::default());
//! # stage.add_file("rarc/F000_r00.arc", &room.finish()?)?;
//! # let stage = stage.finish()?;
//! let field = BitField::new(0, 14, 0x1, 0x1)?;
//! let options = TraversalOptions::default();
//!
//! let outcome = modify_archive(&stage, &Patch::all(field), &options)?;
//! assert_eq!(outcome.patched, ["/rarc/F000_r00.arc/dat/room.plc"]);
//! assert_eq!(check_archive(&outcome.bytes, &field, &options)?, outcome.patched);
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```

pub mod container;
pub mod error;
pub mod extract;
pub mod io;
pub mod member;
pub mod scan;
pub mod traverse;

pub use container::Container;
pub use extract::{extract_stages, ExtractReport};
pub use io::{read_archive_file, write_archive_file};
pub use member::{Category, Member, MemberKind};
pub use scan::{scan_directory, ScanOptions};
pub use traverse::{check, check_archive, modify, modify_archive, PatchOutcome, TraversalOptions};
