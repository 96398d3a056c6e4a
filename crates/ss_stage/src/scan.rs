//! Querying every record table under a directory

use std::fs;
use std::path::Path;

use bon::Builder;
use ss_arc::U8Archive;
use ss_plc::{BitField, RecordTable};
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::container::Container;
use crate::error::{Error, Result};
use crate::io::read_archive_file;
use crate::member::MemberKind;
use crate::traverse::{check, TraversalOptions};

/// What [`scan_directory`] looks at besides loose `.plc` files
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ScanOptions {
    /// Also search inside `.arc` and `.arc.LZ` files
    #[builder(default = false)]
    pub archives: bool,

    /// How archives are traversed when `archives` is set
    #[builder(default)]
    pub traversal: TraversalOptions,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Relative paths of every record table under `dir` with a record matching `field`, sorted.
///
/// Paths always use `/` as separator. Matches inside archives are reported as
/// `file_path:member_path`.
#[instrument(err)]
pub fn scan_directory(dir: &Path, field: &BitField, options: &ScanOptions) -> Result<Vec<String>> {
    field.validate()?;

    let mut found = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| Error::CustomError(e.to_string()))?
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        match MemberKind::from_file_name(&name) {
            MemberKind::RecordTable => {
                let data = fs::read(entry.path())?;
                let table = RecordTable::open(data.as_slice())
                    .map_err(|e| Error::from(e).in_member(&relative))?;
                if table.matches(field)? {
                    debug!(path = %relative, "match");
                    found.push(relative);
                }
            }
            MemberKind::Archive if options.archives => {
                let archive = read_archive_file(entry.path())
                    .and_then(|data| U8Archive::decode(&data))
                    .map_err(|e| e.in_member(&relative))?;
                let members = check(&archive, field, &options.traversal)
                    .map_err(|e| e.in_member(&relative))?;
                found.extend(members.into_iter().map(|m| format!("{relative}:{m}")));
            }
            _ => {}
        }
    }

    found.sort();
    Ok(found)
}
