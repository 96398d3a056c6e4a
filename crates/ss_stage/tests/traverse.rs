use pretty_assertions::assert_eq;
use ss_arc::{compression::compress_lz11, U8Archive, U8Writer, U8WriterOptions};
use ss_plc::{BitField, Patch, RecordTable, Target};
use ss_stage::error::Error;
use ss_stage::{check_archive, modify_archive, read_archive_file, write_archive_file};
use ss_stage::{Container, TraversalOptions};
use tracing_test::traced_test;

fn plc(records: &[u32]) -> Vec<u8> {
    let mut data = b"SPLC\x00\x14".to_vec();
    data.extend_from_slice(&(records.len() as u16).to_be_bytes());
    for code0 in records {
        data.extend_from_slice(&code0.to_be_bytes());
        data.extend_from_slice(&[0xA5; 16]);
    }
    data
}

fn archive(files: &[(&str, &[u8])]) -> Result<Vec<u8>, Error> {
    let mut u8 = U8Writer::new(Vec::new(), U8WriterOptions::default());
    for (name, data) in files {
        u8.add_file(name, data)?;
    }
    Ok(u8.finish()?)
}

#[traced_test]
#[test]
fn patch_compressed_room() -> Result<(), Error> {
    let room = archive(&[
        ("dat/room.plc", &plc(&[0x0000_0000, 0xFFFF_FFFF])),
        ("kcl/room.kcl", b"kcl"),
    ])?;
    let stage = archive(&[
        ("dat/stage.bzs", b"bzs"),
        ("rarc/F000_r01.arc.LZ", &compress_lz11(&room)?),
    ])?;

    let field = BitField::new(0, 4, 0xF, 0x7)?;
    let patch = Patch::new(field, Target::Index(1));
    let options = TraversalOptions::default();

    assert!(check_archive(&stage, &field, &options)?.is_empty());

    let outcome = modify_archive(&stage, &patch, &options)?;
    assert_eq!(outcome.tables, 1);
    assert_eq!(outcome.records, 1);
    assert!(logs_contain("patched"));

    let after = U8Archive::decode(&outcome.bytes)?;
    assert_eq!(after.read_member("/dat/stage.bzs")?, b"bzs");

    let nested = after.read_member("/rarc/F000_r01.arc.LZ")?;
    assert_eq!(nested[0], 0x11);
    let room = U8Archive::from_bytes(&ss_arc::CompressionMethod::Lz11.decompress(nested)?)?;
    assert_eq!(room.by_name("/kcl/room.kcl")?, b"kcl");

    let table = RecordTable::open(room.by_name("/dat/room.plc")?)?;
    assert_eq!(table.record(0)?, [0, 0xA5A5_A5A5, 0xA5A5_A5A5, 0xA5A5_A5A5, 0xA5A5_A5A5]);
    assert_eq!(table.record(1)?[0], 0xFFFF_FF7F);

    assert_eq!(
        check_archive(&outcome.bytes, &field, &options)?,
        vec!["/rarc/F000_r01.arc.LZ/dat/room.plc"]
    );

    Ok(())
}

#[test]
fn unpatched_archive_is_rebuilt_identically() -> Result<(), Error> {
    let object = archive(&[("dat/obj.plc", &plc(&[1]))])?;
    let stage = archive(&[("oarc/Obj.arc", &object), ("dzb/stage.dzb", b"mesh")])?;

    let patch = Patch::all(BitField::new(0, 0, 0x1, 0x0)?);
    let outcome = modify_archive(&stage, &patch, &TraversalOptions::default())?;

    assert_eq!(outcome.tables, 0);
    assert_eq!(outcome.bytes, stage);

    Ok(())
}

#[test]
fn patch_keeps_tightly_packed_layout() -> Result<(), Error> {
    let packed = U8WriterOptions::builder().alignment(4).pad_end(false).build();
    let build = |table: &[u8]| -> Result<Vec<u8>, Error> {
        let mut u8 = U8Writer::new(Vec::new(), packed);
        u8.add_file("dat/stage.plc", table)?;
        u8.add_file("dat/stage.bzs", b"bzs")?;
        u8.add_file("dzb/stage.dzb", b"mesh")?;
        Ok(u8.finish()?)
    };
    let stage = build(&plc(&[0, 2]))?;

    let patch = Patch::all(BitField::new(0, 0, 0x1, 0x1)?);
    let outcome = modify_archive(&stage, &patch, &TraversalOptions::default())?;

    assert_eq!(outcome.records, 2);
    assert_eq!(outcome.bytes, build(&plc(&[1, 3]))?);

    Ok(())
}

#[test]
fn patch_through_files() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("F000_stg_l0.arc.LZ");
    write_archive_file(&path, &archive(&[("dat/stage.plc", &plc(&[0]))])?)?;

    let field = BitField::new(2, 30, 0x1, 0x1)?;
    assert!(check_archive(&read_archive_file(&path)?, &field, &TraversalOptions::default())?.is_empty());

    let outcome = modify_archive(
        &read_archive_file(&path)?,
        &Patch::all(field),
        &TraversalOptions::default(),
    )?;
    write_archive_file(&path, &outcome.bytes)?;

    let found = check_archive(&read_archive_file(&path)?, &field, &TraversalOptions::default())?;
    assert_eq!(found, vec!["/dat/stage.plc"]);

    Ok(())
}
