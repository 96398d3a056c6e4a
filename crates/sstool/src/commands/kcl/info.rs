use std::path::PathBuf;

use clap::Args;
use miette::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use ss_kcl::{DecodeOptions, KclHeader, NodeTree};

use super::read_kcl;

#[derive(Args)]
pub struct InfoArgs {
    /// An input KCL file
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
}

fn row(name: &str, value: impl std::fmt::Display) {
    println!(
        "{:<18} {}",
        name.if_supports_color(Stream::Stdout, |t| t.bold()),
        value
    );
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let data = read_kcl(&self.input)?;
        let header = KclHeader::from_bytes(&data)
            .context(format!("reading header of {}", self.input.display()))?;
        let tree = NodeTree::from_kcl(&data, &DecodeOptions::default())
            .context(format!("decoding {}", self.input.display()))?;

        row("positions", format!("{:#010X}", header.positions_offset));
        row("normals", format!("{:#010X}", header.normals_offset));
        row("prisms", format!("{:#010X}", header.prisms_offset));
        row("blocks", format!("{:#010X}", header.block_offset));
        row("prism thickness", header.prism_thickness);
        row(
            "area min",
            format!(
                "{} {} {}",
                header.area_min[0], header.area_min[1], header.area_min[2]
            ),
        );
        row("root blocks", header.block_count());
        row("nodes", tree.len());
        row("leaves", tree.leaves().len());
        row("depth", tree.depth());

        Ok(())
    }
}
