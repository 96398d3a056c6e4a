//! Error types that can be emitted from this library
//!

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent wrapper for [`serde_json::Error`]
    #[cfg(feature = "serde")]
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// The buffer does not start with the `SPLC` tag
    #[error("invalid record table tag {0:02X?}, expected SPLC")]
    #[diagnostic(code(ss_plc::bad_magic))]
    BadMagic([u8; 4]),

    /// The format version is not the supported one
    #[error("unsupported record table version {0:#06X}, expected 0x0014")]
    #[diagnostic(code(ss_plc::bad_version))]
    BadVersion(u16),

    /// The buffer is too short to hold every record it declares
    #[error("record table needs {expected} bytes but only {actual} are available")]
    #[diagnostic(code(ss_plc::truncated))]
    Truncated { expected: usize, actual: usize },

    /// A record index past the end of the table
    #[error("record {index} is out of range for a table of {count} records")]
    #[diagnostic(code(ss_plc::index_out_of_range))]
    RecordIndexOutOfRange { index: usize, count: usize },

    /// Too many records to fit in the 16 bit count field
    #[error("{0} records do not fit in a record table")]
    TooManyRecords(usize),

    /// Field index outside of 0..=4
    #[error("code index {0} is out of range, records have 5 codes")]
    #[diagnostic(code(ss_plc::invalid_code), help("use a code index between 0 and 4"))]
    InvalidCode(usize),

    /// Shift outside of 0..=31
    #[error("shift {0} is out of range for a 32 bit code")]
    #[diagnostic(code(ss_plc::invalid_shift), help("use a shift between 0 and 31"))]
    InvalidShift(u32),

    /// Negative record index other than -1
    #[error("record index {0} is invalid")]
    #[diagnostic(
        code(ss_plc::invalid_target),
        help("use -1 to select every record, or a record index")
    )]
    InvalidTarget(i64),

    /// No attribute with that name in the catalogue
    #[error("unknown attribute {0}")]
    #[diagnostic(code(ss_plc::unknown_attribute))]
    UnknownAttribute(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
