//! This library reads, queries and patches the **PLC** collision attribute tables used by
//! *Skyward Sword*. Every collision polygon of a stage or room refers to one record of such a
//! table, and the record's bit-fields decide what passes through the polygon, what it sounds
//! like when walked on, and so on.
//!
//! # PLC Format Documentation
//!
//! PLC files are typically identified with the `.plc` extension and live in the `dat` directory
//! of stage, room and object archives.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: `SPLC`                                            |
//! | 0x0004         | Version                | 2 bytes: Always 0x0014, which is also the record size      |
//! | 0x0006         | Record Count           | 2 bytes: Number of records                                 |
//! | 0x0008         | Records                | Record Count * 20 bytes                                    |
//!
//! ### Records
//!
//! Each record is made of five 32 bit codes, addressed by their index `0..=4`. Codes pack
//! several attributes at fixed bit positions, see [`attribute`] for the ones that are known.
//!
//! ## Bit-fields
//!
//! A [`BitField`] picks the bits `mask << shift` of one code. Querying tests
//! `(code >> shift) & mask == value`, patching writes
//! `(code & !(mask << shift)) | ((mask & value) << shift)` and leaves every other bit alone.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.plc`
//! - **Endianness**: Big-endian for all multi-byte integers
//!

pub mod attribute;
pub mod error;
pub mod field;
pub mod file;
#[cfg(feature = "serde")]
mod serde;
pub mod table;

pub use attribute::Attribute;
pub use field::{BitField, Patch, Target};
pub use file::{PlcEntry, PlcFile};
pub use table::RecordTable;
