//! Reading and writing whole archive files, compressed or not

use std::fs;
use std::io::Write;
use std::path::Path;

use ss_arc::CompressionMethod;
use tempfile::NamedTempFile;
use tracing::{info, instrument};

use crate::error::Result;

fn method_for(path: &Path) -> CompressionMethod {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(CompressionMethod::from_file_name)
        .unwrap_or_default()
}

/// Read a file, decompressing it when its name ends in `.LZ`
#[instrument(err)]
pub fn read_archive_file(path: &Path) -> Result<Vec<u8>> {
    let data = fs::read(path)?;
    Ok(method_for(path).decompress(&data)?)
}

/// Write a file, compressing it when its name ends in `.LZ`.
///
/// The data goes to a temporary file in the same directory which is then renamed over `path`,
/// so the destination is either left as it was or fully written.
#[instrument(skip(bytes), fields(size = bytes.len()), err)]
pub fn write_archive_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let data = method_for(path).compress(bytes)?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(&data)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    info!(path = %path.display(), size = data.len(), "written");
    Ok(())
}

#[cfg(test)]
mod test {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::{read_archive_file, write_archive_file};
    use crate::error::Result;

    #[test]
    fn compressed_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("F000_stg_l0.arc.LZ");
        let data = b"stage stage stage stage".repeat(8);

        write_archive_file(&path, &data)?;
        assert_eq!(fs::read(&path)?[0], 0x11);
        assert_eq!(read_archive_file(&path)?, data);

        Ok(())
    }

    #[test]
    fn plain_files_are_written_as_is() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("F000_stg_l0.arc");

        fs::write(&path, b"old contents")?;
        write_archive_file(&path, b"new")?;

        assert_eq!(fs::read(&path)?, b"new");
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);

        Ok(())
    }

    #[test]
    fn bad_compressed_data_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.arc.LZ");
        fs::write(&path, [0x10, 0x00])?;

        assert!(read_archive_file(&path).is_err());

        Ok(())
    }
}
