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

    /// file is an invalid u8 archive
    #[error("file is an invalid u8 archive")]
    InvalidArchive,

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),

    /// an entry with this path was already added
    #[error("an entry named {0} was already added")]
    DuplicateEntry(String),

    /// a path uses a file as if it were a directory, or the reverse
    #[error("path {0} conflicts with an existing entry")]
    PathConflict(String),

    /// compressed data is malformed
    #[error("invalid lz11 data: {0}")]
    InvalidCompression(&'static str),

    /// a size or offset does not fit in the 32 bit fields of the format
    #[error("{0} bytes does not fit in a 32 bit field")]
    TooLarge(usize),

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
