use std::path::PathBuf;

use clap::Args;
use miette::{Context, Result};
use ss_kcl::{decode, locate_root, DecodeOptions};

use super::read_kcl;
use crate::commands::plc::parse_hex;

#[derive(Args)]
pub struct TreeArgs {
    /// An input KCL file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Deepest node level accepted before the tree is considered malformed
    #[arg(long, default_value_t = 64)]
    max_depth: usize,

    /// Offset of the root node in hexadecimal, read from the header when missing
    #[arg(long, value_parser = parse_hex)]
    root: Option<u32>,
}

impl TreeArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_kcl(&self.input)?;
        let root = match self.root {
            Some(root) => root,
            None => locate_root(&data)?,
        };

        let options = DecodeOptions::builder().max_depth(self.max_depth).build();
        let tree = decode(&data, root, &options)
            .context(format!("decoding {}", self.input.display()))?;

        print!("{tree}");
        Ok(())
    }
}
