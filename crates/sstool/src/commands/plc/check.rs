use std::path::PathBuf;

use clap::Args;
use miette::{Context, Result};
use ss_arc::U8Archive;
use ss_plc::RecordTable;
use ss_stage::{check, read_archive_file, scan_directory, Container, ScanOptions, TraversalOptions};
use tracing::info;

use super::FieldArgs;

#[derive(Args)]
pub struct CheckArgs {
    /// A directory to search, or a single archive or record table
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    #[command(flatten)]
    field: FieldArgs,

    /// Also search inside .arc and .arc.LZ files
    #[arg(long, default_value_t = false)]
    archives: bool,

    /// Also search the object archives of stage archives
    #[arg(long, default_value_t = false)]
    include_objects: bool,
}

impl CheckArgs {
    fn traversal(&self) -> TraversalOptions {
        if self.include_objects {
            TraversalOptions::default().with_objects()
        } else {
            TraversalOptions::default()
        }
    }

    pub fn handle(&self) -> Result<()> {
        let field = self.field.field()?;
        info!("searching {} for {}", self.input.display(), field);

        let found = if self.input.is_dir() {
            let options = ScanOptions::builder()
                .archives(self.archives)
                .traversal(self.traversal())
                .build();
            scan_directory(&self.input, &field, &options)
                .context(format!("searching {}", self.input.display()))?
        } else {
            let data = read_archive_file(&self.input)
                .context(format!("reading {}", self.input.display()))?;

            if self.input.extension().is_some_and(|ext| ext == "plc") {
                let table = RecordTable::open(data.as_slice())
                    .context(format!("opening {}", self.input.display()))?;
                table
                    .matching_records(&field)?
                    .into_iter()
                    .map(|index| format!("record {index}"))
                    .collect()
            } else {
                let archive = U8Archive::decode(&data)
                    .context(format!("decoding {}", self.input.display()))?;
                check(&archive, &field, &self.traversal())?
            }
        };

        for path in &found {
            println!("{path}");
        }
        info!("{} matches", found.len());

        Ok(())
    }
}
