use std::path::PathBuf;

use clap::Args;
use miette::{Context, Result};
use ss_plc::{Patch, RecordTable, Target};
use ss_stage::{modify_archive, read_archive_file, write_archive_file, TraversalOptions};
use tracing::info;

use super::FieldArgs;

#[derive(Args)]
pub struct ModifyArgs {
    /// An input archive or record table
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Where to write the patched file, compressed when it ends in .LZ
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    #[command(flatten)]
    field: FieldArgs,

    /// The record to patch, -1 patches every record
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    index: i64,

    /// Also patch the object archives of stage archives
    #[arg(long, default_value_t = false)]
    include_objects: bool,

    /// Report what would be patched without writing anything
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

impl ModifyArgs {
    pub fn handle(&self) -> Result<()> {
        let patch = Patch::new(self.field.field()?, Target::from_signed(self.index)?);
        info!("writing {} to {}", patch.field, patch.target);

        let mut data = read_archive_file(&self.input)
            .context(format!("reading {}", self.input.display()))?;

        let output = if self.input.extension().is_some_and(|ext| ext == "plc") {
            let records = RecordTable::open(&mut data)
                .and_then(|mut table| table.patch(&patch))
                .context(format!("patching {}", self.input.display()))?;
            info!("patched {records} records");
            data
        } else {
            let options = if self.include_objects {
                TraversalOptions::default().with_objects()
            } else {
                TraversalOptions::default()
            };

            let outcome = modify_archive(&data, &patch, &options)
                .context(format!("patching {}", self.input.display()))?;
            info!(
                "patched {} records in {} tables",
                outcome.records, outcome.tables
            );
            outcome.bytes
        };

        if self.dry_run {
            info!("dry run, not writing {}", self.output.display());
            return Ok(());
        }

        write_archive_file(&self.output, &output)
            .context(format!("writing {}", self.output.display()))?;

        Ok(())
    }
}
