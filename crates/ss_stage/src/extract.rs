//! Fanning the collision files of every stage out into a directory tree
//!
//! The output layout is
//!
//! ```text
//! <out>/<stage>/addon/         stage record tables and collision meshes
//! <out>/<stage>/rooms/Room N/  room record tables and kcl files
//! <out>/Oarc/<object>/         object record tables and collision meshes
//! ```

use std::fs;
use std::path::{Component, Path, PathBuf};

use ss_arc::{CompressionMethod, U8Archive};
use tracing::{info, instrument, warn};

use crate::container::Container;
use crate::error::{Error, Result};
use crate::io::read_archive_file;
use crate::member::{Category, Member, MemberKind};

/// Output directory used when none is given
pub const DEFAULT_OUTPUT_DIR: &str = "Collision Files";

/// What [`extract_stages`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Stages whose files were written, sorted
    pub extracted: Vec<String>,

    /// Stages without a readable layer 0 archive, sorted
    pub skipped: Vec<String>,

    /// Number of object directories written
    pub objects: usize,
}

/// Layer 0 archive of a stage, trying `.arc.LZ` before `.arc` and the stage directory before
/// its `NX` subdirectory.
pub fn locate_stage_archive(stage_dir: &Path, stage: &str) -> Result<PathBuf> {
    let compressed = format!("{stage}_stg_l0.arc.LZ");
    let plain = format!("{stage}_stg_l0.arc");
    let nx = stage_dir.join("NX");

    [
        stage_dir.join(&compressed),
        stage_dir.join(&plain),
        nx.join(&compressed),
        nx.join(&plain),
    ]
    .into_iter()
    .find(|path| path.is_file())
    .ok_or_else(|| Error::MissingStageArchive {
        stage: stage.to_owned(),
        directory: stage_dir.to_path_buf(),
    })
}

fn nested(archive: &U8Archive, member: &Member<'_>) -> Result<U8Archive> {
    let method = CompressionMethod::from_file_name(member.file_name);
    let data = method.decompress(archive.read_member(member.path)?)?;
    U8Archive::decode(&data).map_err(|e| e.in_member(member.path))
}

/// `name` if it names an entry directly inside a directory
fn entry_name(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(single)), None) if single == name => Ok(name),
        _ => Err(Error::UnsafeName(name.to_owned())),
    }
}

fn write_file(dir: &Path, name: &str, data: &[u8]) -> Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(entry_name(name)?), data)?;
    Ok(())
}

/// Record tables and collision meshes of an object archive, written only when it has any.
///
/// Returns whether a directory was written.
fn extract_object(archive: &U8Archive, member: &Member<'_>, oarc_dir: &Path) -> Result<bool> {
    let object = nested(archive, member)?;
    let files = object
        .file_names()
        .map(Member::parse)
        .filter(|m| m.file_name.ends_with(".plc") || m.file_name.ends_with(".dzb"))
        .collect::<Vec<_>>();

    if files.is_empty() {
        return Ok(false);
    }

    let dir = oarc_dir.join(entry_name(member.stem())?);
    for file in files {
        write_file(&dir, file.file_name, object.by_name(file.path)?)?;
    }
    Ok(true)
}

fn room_dir_name(member: &Member<'_>) -> Result<String> {
    match member.room_id() {
        Some(id) => Ok(format!("Room {id}")),
        None => {
            warn!(path = member.path, "no room number in archive name");
            Ok(entry_name(member.stem())?.to_owned())
        }
    }
}

fn extract_room(archive: &U8Archive, member: &Member<'_>, rooms_dir: &Path) -> Result<()> {
    let room = nested(archive, member)?;
    let dir = rooms_dir.join(room_dir_name(member)?);
    fs::create_dir_all(&dir)?;

    for path in room.file_names() {
        let file = Member::parse(path);
        let wanted = match file.category {
            Some(Category::Dat) => file.kind == MemberKind::RecordTable,
            Some(Category::Kcl) => true,
            _ => false,
        };
        if !wanted {
            continue;
        }

        let data = room.by_name(path)?;
        if data.is_empty() {
            warn!(path = %format!("{}{}", member.path, path), "has no data");
        }
        write_file(&dir, file.file_name, data)?;
    }
    Ok(())
}

/// Write the collision files of one decoded layer 0 archive. Returns the number of object
/// directories written.
#[instrument(skip(archive, out_dir), err)]
pub fn extract_stage(archive: &U8Archive, stage: &str, out_dir: &Path) -> Result<usize> {
    let addon_dir = out_dir.join(stage).join("addon");
    let rooms_dir = out_dir.join(stage).join("rooms");
    let oarc_dir = out_dir.join("Oarc");
    fs::create_dir_all(&addon_dir)?;
    fs::create_dir_all(&rooms_dir)?;

    let mut objects = 0;
    for path in archive.file_names() {
        let member = Member::parse(path);
        match member.category {
            Some(Category::Dat) if member.kind == MemberKind::RecordTable => {
                write_file(&addon_dir, member.file_name, archive.by_name(path)?)?;
            }
            Some(Category::Dzb) => {
                write_file(&addon_dir, member.file_name, archive.by_name(path)?)?;
            }
            Some(Category::Rarc) => extract_room(archive, &member, &rooms_dir)?,
            Some(Category::Oarc) => {
                if extract_object(archive, &member, &oarc_dir)? {
                    objects += 1;
                }
            }
            _ => {}
        }
    }
    Ok(objects)
}

/// Object archives of the shared object pack, written to `<out>/Oarc`.
///
/// The pack is looked up in `Object/NX` when that directory exists and in `Object` otherwise.
/// A missing pack is reported and yields zero objects.
#[instrument(err)]
pub fn extract_object_pack(data_dir: &Path, out_dir: &Path) -> Result<usize> {
    let mut object_dir = data_dir.join("Object");
    if object_dir.join("NX").is_dir() {
        object_dir = object_dir.join("NX");
    }

    let pack_path = object_dir.join("ObjectPack.arc.LZ");
    if !pack_path.is_file() {
        warn!(path = %pack_path.display(), "object pack not found");
        return Ok(0);
    }

    let pack = U8Archive::decode(&read_archive_file(&pack_path)?)?;
    let oarc_dir = out_dir.join("Oarc");
    fs::create_dir_all(&oarc_dir)?;

    let mut objects = 0;
    for path in pack.file_names() {
        let member = Member::parse(path);
        if member.category == Some(Category::Oarc) && extract_object(&pack, &member, &oarc_dir)? {
            objects += 1;
        }
    }
    Ok(objects)
}

/// Extract every stage under `<data_dir>/Stage` and the object pack into `out_dir`.
///
/// `data_dir` is the `DATA/files` directory of a Wii extract or the `romfs` directory of an HD
/// one. Stages whose layer 0 archive is missing or cannot be read are skipped with a warning,
/// any other error aborts.
#[instrument(err)]
pub fn extract_stages(data_dir: &Path, out_dir: &Path) -> Result<ExtractReport> {
    let stage_root = data_dir.join("Stage");

    let mut stages = Vec::new();
    for entry in fs::read_dir(&stage_root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            stages.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    stages.sort();

    fs::create_dir_all(out_dir)?;

    let mut report = ExtractReport::default();
    for stage in stages {
        let stage_dir = stage_root.join(&stage);
        let data = match locate_stage_archive(&stage_dir, &stage)
            .and_then(|path| read_archive_file(&path))
        {
            Ok(data) => data,
            Err(e) => {
                warn!(stage = %stage, error = %e, "unable to process stage, skipping");
                report.skipped.push(stage);
                continue;
            }
        };

        let archive = U8Archive::decode(&data).map_err(|e| e.in_member(&stage))?;
        report.objects += extract_stage(&archive, &stage, out_dir)?;
        info!(stage = %stage, "extracted");
        report.extracted.push(stage);
    }

    report.objects += extract_object_pack(data_dir, out_dir)?;
    Ok(report)
}

#[cfg(test)]
mod test {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::{entry_name, locate_stage_archive};
    use crate::error::{Error, Result};

    #[test]
    fn locate_prefers_compressed_then_plain_then_nx() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let stage = dir.path();
        fs::create_dir_all(stage.join("NX"))?;

        fs::write(stage.join("NX/F000_stg_l0.arc"), b"")?;
        assert_eq!(
            locate_stage_archive(stage, "F000")?,
            stage.join("NX/F000_stg_l0.arc")
        );

        fs::write(stage.join("NX/F000_stg_l0.arc.LZ"), b"")?;
        assert_eq!(
            locate_stage_archive(stage, "F000")?,
            stage.join("NX").join("F000_stg_l0.arc.LZ")
        );

        fs::write(stage.join("F000_stg_l0.arc"), b"")?;
        assert_eq!(
            locate_stage_archive(stage, "F000")?,
            stage.join("F000_stg_l0.arc")
        );

        fs::write(stage.join("F000_stg_l0.arc.LZ"), b"")?;
        assert_eq!(
            locate_stage_archive(stage, "F000")?,
            stage.join("F000_stg_l0.arc.LZ")
        );

        Ok(())
    }

    #[test]
    fn entry_names_stay_in_their_directory() {
        assert!(matches!(entry_name("Door.dzb"), Ok("Door.dzb")));
        assert!(matches!(entry_name("Room 3"), Ok("Room 3")));
        for name in ["", ".", "..", "a/b", "/abs"] {
            assert!(
                matches!(entry_name(name), Err(Error::UnsafeName(ref n)) if n == name),
                "{name:?}"
            );
        }
    }

    #[test]
    fn locate_missing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(matches!(
            locate_stage_archive(dir.path(), "D100"),
            Err(Error::MissingStageArchive { ref stage, .. }) if stage == "D100"
        ));
        Ok(())
    }
}
