use clap::Args;
use miette::Result;
use ss_plc::attribute::{AttributeKind, ATTRIBUTES};

#[derive(Args)]
pub struct AttributesArgs {
    /// Only list single bit flags
    #[arg(long, default_value_t = false)]
    flags: bool,
}

impl AttributesArgs {
    pub fn handle(&self) -> Result<()> {
        ATTRIBUTES
            .iter()
            .filter(|a| !self.flags || a.kind == AttributeKind::Flag)
            .for_each(|a| println!("{a}"));
        Ok(())
    }
}
