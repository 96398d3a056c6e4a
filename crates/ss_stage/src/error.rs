//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`walkdir::Error`]
    #[error(transparent)]
    WalkDirError(#[from] walkdir::Error),

    /// Transparent wrapper for [`ss_arc::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    ArchiveError(#[from] ss_arc::error::Error),

    /// Transparent wrapper for [`ss_plc::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    RecordTableError(#[from] ss_plc::error::Error),

    /// A member failed to decode, with the path leading to it
    #[error("in {path}")]
    Member {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// None of the layer 0 archive locations of a stage exist
    #[error("no layer 0 archive found for stage {stage} in {}", .directory.display())]
    #[diagnostic(code(ss_stage::missing_stage_archive))]
    MissingStageArchive { stage: String, directory: PathBuf },

    /// A member name that can't be used as a single file or directory name
    #[error("{0:?} can't be used as an output file name")]
    #[diagnostic(code(ss_stage::unsafe_name))]
    UnsafeName(String),

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

impl Error {
    /// Attach the member path that was being processed
    pub fn in_member(self, path: impl Into<String>) -> Self {
        Error::Member {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
