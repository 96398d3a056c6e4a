use std::fs::File;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use ss_arc::U8Archive;
use ss_stage::read_archive_file;
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input archive, decompressed first when it ends in .LZ
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

/// Location of an archive member under `directory`, refusing names that would leave it
fn member_path(directory: &Path, name: &str) -> Result<PathBuf> {
    let relative = Path::new(name.trim_start_matches('/'));
    let mut components = relative.components().peekable();
    if components.peek().is_none()
        || !components.all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(miette!("{name} is not a path inside the target directory"));
    }
    Ok(directory.join(relative))
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_archive_file(&self.file)
            .context(format!("path: {}", &self.file.display()))?;
        let archive = U8Archive::from_bytes(&data)?;

        for name in archive.file_names() {
            let p = member_path(&self.directory, name)?;
            info!("writing {}", p.display());

            let parent = p
                .parent()
                .ok_or(miette!("{} has no parent directory", p.display()))?;
            std::fs::create_dir_all(parent)
                .into_diagnostic()
                .context(format!("creating {}", parent.display()))?;

            let mut out = if !self.overwrite {
                File::create_new(&p)
                    .into_diagnostic()
                    .context(format!("creating {}", &p.display()))?
            } else {
                File::create(&p)
                    .into_diagnostic()
                    .context(format!("creating {}", &p.display()))?
            };

            out.write_all(archive.by_name(name)?).into_diagnostic()?;
        }
        Ok(())
    }
}
