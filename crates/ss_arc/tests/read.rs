use ss_arc::{error::Error, CompressionMethod, U8Archive, U8Writer, U8WriterOptions};
use tracing::info;
use tracing_test::traced_test;

fn stage_archive() -> Result<Vec<u8>, Error> {
    let mut room = U8Writer::new(Vec::new(), U8WriterOptions::default());
    room.add_file("dat/room.plc", &[0x53, 0x50, 0x4C, 0x43])?;
    room.add_file("dzb/room.dzb", b"collision")?;
    let room = room.finish()?;

    let mut stage = U8Writer::new(Vec::new(), U8WriterOptions::default());
    stage.add_file("dat/stage.plc", &[0x53, 0x50, 0x4C, 0x43, 0x00])?;
    stage.add_file("rarc/F000_r00.arc", &room)?;
    stage.add_file("rarc/F000_r01.arc", &room)?;
    stage.add_file("dat/stage.bzs", b"bzs")?;
    stage.finish()
}

#[traced_test]
#[test]
fn validate_nested_paths() -> Result<(), Error> {
    let archive = U8Archive::from_bytes(&stage_archive()?)?;

    // Directories keep the order they were first seen in
    assert_eq!(
        archive.file_names().collect::<Vec<_>>(),
        vec![
            "/dat/stage.plc",
            "/dat/stage.bzs",
            "/rarc/F000_r00.arc",
            "/rarc/F000_r01.arc",
        ]
    );
    assert_eq!(
        archive.directory_names().collect::<Vec<_>>(),
        vec!["", "/dat", "/rarc"]
    );

    let room = U8Archive::from_bytes(archive.by_name("/rarc/F000_r01.arc")?)?;
    info!("room contains {} files", room.len());
    assert_eq!(room.by_name("/dzb/room.dzb")?, b"collision");

    Ok(())
}

#[traced_test]
#[test]
fn validate_rebuild_is_identical() -> Result<(), Error> {
    let input = stage_archive()?;
    let archive = U8Archive::from_bytes(&input)?;

    assert_eq!(archive.to_bytes()?, input);

    Ok(())
}

#[traced_test]
#[test]
fn validate_replace_grows_file() -> Result<(), Error> {
    let input = stage_archive()?;
    let mut archive = U8Archive::from_bytes(&input)?;

    let grown = vec![0xAB; 0x45];
    archive.replace("/dat/stage.plc", grown.clone())?;

    let rebuilt = U8Archive::from_bytes(&archive.to_bytes()?)?;
    assert_eq!(rebuilt.by_name("/dat/stage.plc")?, grown.as_slice());
    assert_eq!(rebuilt.by_name("/dat/stage.bzs")?, b"bzs");
    assert_eq!(
        rebuilt.file_names().collect::<Vec<_>>(),
        archive.file_names().collect::<Vec<_>>()
    );
    assert_eq!(rebuilt.header().reserved, archive.header().reserved);

    Ok(())
}

#[traced_test]
#[test]
fn validate_compressed_archive() -> Result<(), Error> {
    let input = stage_archive()?;
    let method = CompressionMethod::from_file_name("F000_stg_l0.arc.LZ");

    let compressed = method.compress(&input)?;
    assert!(compressed.len() < input.len());

    let archive = U8Archive::from_bytes(&method.decompress(&compressed)?)?;
    assert_eq!(archive.len(), 4);

    Ok(())
}

#[traced_test]
#[test]
fn reject_plain_data() {
    assert!(matches!(
        U8Archive::from_bytes(b"SPLC not an archive at all, just bytes"),
        Err(Error::InvalidArchive)
    ));
}
