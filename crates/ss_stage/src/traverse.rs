//! Depth-first query and patch traversal over nested archives
//!

use bon::Builder;
use ss_arc::{CompressionMethod, U8Archive};
use ss_plc::{BitField, Patch, RecordTable};
use tracing::{debug, info, instrument};

use crate::container::Container;
use crate::error::{Error, Result};
use crate::member::{Member, MemberKind};

/// Which members are descended into
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct TraversalOptions {
    /// Category names whose members are archives to traverse, `rarc` by default
    #[builder(default = vec!["rarc".to_owned()])]
    pub nested_categories: Vec<String>,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TraversalOptions {
    /// Also descend into object archives
    pub fn with_objects(mut self) -> Self {
        if !self.nested_categories.iter().any(|c| c == "oarc") {
            self.nested_categories.push("oarc".to_owned());
        }
        self
    }
}

/// Result of patching an archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchOutcome {
    /// The re-encoded top level archive
    pub bytes: Vec<u8>,

    /// Number of record tables written to
    pub tables: usize,

    /// Number of records written to, across all tables
    pub records: usize,

    /// Paths of every patched record table, nested ones prefixed by their archive's path
    pub patched: Vec<String>,
}

fn decode_nested<C: Container>(container: &C, member: &Member<'_>) -> Result<(C, CompressionMethod)> {
    let method = CompressionMethod::from_file_name(member.file_name);
    let raw = method.decompress(container.read_member(member.path)?)?;
    Ok((C::decode(&raw)?, method))
}

fn check_container<C: Container>(
    container: &C,
    field: &BitField,
    options: &TraversalOptions,
    prefix: &str,
    found: &mut Vec<String>,
) -> Result<()> {
    for path in container.paths() {
        let member = Member::parse(&path);
        let member_path = format!("{prefix}{path}");

        if member.kind == MemberKind::RecordTable {
            let table = RecordTable::open(container.read_member(&path)?)
                .map_err(|e| Error::from(e).in_member(&member_path))?;

            let matching = table.matching_records(field)?;
            if !matching.is_empty() {
                debug!(path = %member_path, records = ?matching, "match");
                found.push(member_path);
            }
        } else if member.in_category(&options.nested_categories) {
            let (inner, _) =
                decode_nested(container, &member).map_err(|e| e.in_member(&member_path))?;
            check_container(&inner, field, options, &member_path, found)?;
        }
    }
    Ok(())
}

/// Paths of every record table with a record matching `field`, in listing order.
///
/// Members of nested archives are reported as the archive member's path followed by the path
/// inside it, `/rarc/F000_r00.arc/dat/room.plc` for example.
#[instrument(skip(container), err)]
pub fn check<C: Container>(
    container: &C,
    field: &BitField,
    options: &TraversalOptions,
) -> Result<Vec<String>> {
    field.validate()?;

    let mut found = Vec::new();
    check_container(container, field, options, "", &mut found)?;
    Ok(found)
}

fn modify_container<C: Container>(
    container: &mut C,
    patch: &Patch,
    options: &TraversalOptions,
    prefix: &str,
    outcome: &mut PatchOutcome,
) -> Result<()> {
    for path in container.paths() {
        let member = Member::parse(&path);
        let member_path = format!("{prefix}{path}");

        if member.kind == MemberKind::RecordTable {
            let mut bytes = container.read_member(&path)?.to_vec();
            let records = RecordTable::open(&mut bytes)
                .and_then(|mut table| table.patch(patch))
                .map_err(|e| Error::from(e).in_member(&member_path))?;
            container.write_member(&path, bytes)?;

            info!(path = %member_path, records, "patched");
            outcome.tables += 1;
            outcome.records += records;
            outcome.patched.push(member_path);
        } else if member.in_category(&options.nested_categories) {
            let (mut inner, method) =
                decode_nested(container, &member).map_err(|e| e.in_member(&member_path))?;

            let before = outcome.tables;
            modify_container(&mut inner, patch, options, &member_path, outcome)?;
            if outcome.tables > before {
                let encoded = method.compress(&inner.encode()?)?;
                container.write_member(&path, encoded)?;
            }
        }
    }
    Ok(())
}

/// Patch every reachable record table and re-encode the archive.
///
/// Nested archives are rebuilt, and recompressed when their name ends in `.LZ`, before being
/// written back into their parent. Nested archives without record tables are left as they were.
#[instrument(skip(container), err)]
pub fn modify<C: Container>(
    mut container: C,
    patch: &Patch,
    options: &TraversalOptions,
) -> Result<PatchOutcome> {
    patch.field.validate()?;

    let mut outcome = PatchOutcome::default();
    modify_container(&mut container, patch, options, "", &mut outcome)?;
    outcome.bytes = container.encode()?;
    Ok(outcome)
}

/// Query a serialized U8 archive
pub fn check_archive(
    bytes: &[u8],
    field: &BitField,
    options: &TraversalOptions,
) -> Result<Vec<String>> {
    check(&U8Archive::decode(bytes)?, field, options)
}

/// Patch a serialized U8 archive
pub fn modify_archive(
    bytes: &[u8],
    patch: &Patch,
    options: &TraversalOptions,
) -> Result<PatchOutcome> {
    modify(U8Archive::decode(bytes)?, patch, options)
}
