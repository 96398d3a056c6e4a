pub mod extract;

#[derive(clap::Subcommand)]
pub enum StageCommands {
    /// Extract the collision files of every stage into a directory
    Extract(extract::ExtractArgs),
}

impl StageCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            StageCommands::Extract(extract) => extract.handle(),
        }
    }
}
