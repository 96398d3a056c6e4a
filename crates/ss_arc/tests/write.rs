use miette::{IntoDiagnostic, Result};
use ss_arc::{U8Archive, U8Writer, U8WriterOptions};
use std::io::Write;
use tracing::{info, instrument};
use tracing_test::traced_test;

#[instrument(skip_all, fields(files = files.len()))]
fn validate_u8_pack(files: &[(&str, Vec<u8>)], options: U8WriterOptions) -> Result<Vec<u8>> {
    let mut u8 = U8Writer::new(Vec::new(), options);

    for (name, data) in files {
        info!("inserting {name}");
        u8.start_file(name)?;
        u8.write_all(data).into_diagnostic()?;
    }

    let actual = u8.finish()?;
    let archive = U8Archive::from_bytes(&actual)?;

    assert_eq!(archive.len(), files.len());
    for (name, data) in files {
        let path = format!("/{}", name.trim_start_matches('/'));
        assert_eq!(archive.by_name(&path)?, data.as_slice());
    }

    Ok(actual)
}

#[traced_test]
#[test]
fn validate_u8_pack_aligned() -> Result<()> {
    let files = vec![
        ("dat/a.plc", vec![1u8; 0x13]),
        ("dat/deep/b.plc", vec![2u8; 0x21]),
        ("c.bin", vec![3u8; 0x3F]),
    ];

    let actual = validate_u8_pack(&files, U8WriterOptions::default())?;
    assert_eq!(actual.len() % 0x20, 0);

    let archive = U8Archive::from_bytes(&actual)?;
    assert!(archive.options().pad_end);
    assert_eq!(archive.to_bytes()?, actual);

    Ok(())
}

#[traced_test]
#[test]
fn validate_u8_pack_unpadded() -> Result<()> {
    let files = vec![("dat/a.plc", vec![1u8; 0x13])];

    let options = U8WriterOptions::builder().pad_end(false).build();
    let actual = validate_u8_pack(&files, options)?;
    assert_ne!(actual.len() % 0x20, 0);

    let archive = U8Archive::from_bytes(&actual)?;
    assert!(!archive.options().pad_end);
    assert_eq!(archive.to_bytes()?, actual);

    Ok(())
}

#[traced_test]
#[test]
fn validate_u8_pack_empty_file() -> Result<()> {
    let files = vec![("dat/empty.plc", Vec::new()), ("dat/full.plc", vec![9u8; 4])];
    validate_u8_pack(&files, U8WriterOptions::default())?;

    Ok(())
}
