use std::path::PathBuf;

use clap::Args;
use miette::{Context, Result};
use ss_arc::U8Archive;
use ss_stage::{read_archive_file, Member, MemberKind};

#[derive(Args)]
pub struct ListArgs {
    /// An input archive, decompressed first when it ends in .LZ
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_archive_file(&self.file)
            .context(format!("path: {}", &self.file.display()))?;
        let archive = U8Archive::from_bytes(&data)?;

        for name in archive.file_names() {
            let member = Member::parse(name);
            let kind = match member.kind {
                MemberKind::RecordTable => "plc",
                MemberKind::Geometry => "mesh",
                MemberKind::Archive => "arc",
                MemberKind::Other => "",
            };
            println!("{:>8} {:<4} {}", archive.by_name(name)?.len(), kind, name);
        }
        Ok(())
    }
}
