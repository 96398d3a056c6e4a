use std::path::Path;

use miette::{Context, Result};
use ss_stage::read_archive_file;

pub mod info;
pub mod tree;

#[derive(clap::Subcommand)]
pub enum KclCommands {
    /// Print the node tree of a KCL file
    Tree(tree::TreeArgs),
    /// Summarize the header and node tree of a KCL file
    Info(info::InfoArgs),
}

impl KclCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            KclCommands::Tree(tree) => tree.handle(),
            KclCommands::Info(info) => info.handle(),
        }
    }
}

fn read_kcl(path: &Path) -> Result<Vec<u8>> {
    Ok(read_archive_file(path).context(format!("reading {}", path.display()))?)
}
