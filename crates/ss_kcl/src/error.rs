//! Error types that can be emitted from this library

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

    /// The node tree can't be decoded
    #[error("malformed node tree at {offset:#X}: {reason}")]
    #[diagnostic(code(ss_kcl::malformed_tree))]
    MalformedTree { offset: u64, reason: String },

    /// A read past the end of the buffer
    #[error("reading {size} bytes at {offset:#X} is past the end of a {len} byte buffer")]
    #[diagnostic(code(ss_kcl::out_of_bounds))]
    OutOfBounds { offset: u64, size: usize, len: usize },
}

impl Error {
    pub(crate) fn malformed(offset: impl Into<u64>, reason: impl Into<String>) -> Self {
        Error::MalformedTree {
            offset: offset.into(),
            reason: reason.into(),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
