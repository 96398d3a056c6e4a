use std::fs::File;
use std::path::PathBuf;

use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use ss_arc::{U8Writer, U8WriterOptions};
use ss_stage::write_archive_file;
use tracing::info;
use walkdir::WalkDir;

#[derive(Args)]
pub struct PackArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target archive, compressed when it ends in .LZ
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        info!("creating {}", &self.file.display());

        let files = WalkDir::new(&self.directory)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir())
            .collect::<Vec<_>>();

        if files.is_empty() {
            return Err(miette!("directory is empty"));
        }

        if !self.overwrite && self.file.exists() {
            return Err(miette!("{} already exists", self.file.display()));
        }

        let mut u8 = U8Writer::new(Vec::new(), U8WriterOptions::default());

        for file in files {
            let name = file
                .path()
                .strip_prefix(&self.directory)
                .into_diagnostic()?;
            info!("packing {}", name.display());

            let name = name
                .components()
                .map(|c| {
                    c.as_os_str()
                        .to_str()
                        .ok_or(miette!("unable to convert {} to a string", name.display()))
                })
                .collect::<Result<Vec<_>>>()?
                .join("/");

            u8.start_file(&name)
                .context(format!("starting entry for {name}"))?;

            let mut f = File::open(file.path())
                .into_diagnostic()
                .context(format!("opening {}", file.path().display()))?;

            std::io::copy(&mut f, &mut u8)
                .into_diagnostic()
                .context(format!("copying {}", file.path().display()))?;
        }

        let data = u8.finish().context("finalizing u8 file")?;
        write_archive_file(&self.file, &data)
            .context(format!("writing {}", self.file.display()))?;

        Ok(())
    }
}
