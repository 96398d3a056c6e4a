pub mod extract;
pub mod list;
pub mod pack;

#[derive(clap::Subcommand)]
pub enum ArcCommands {
    /// Extract a U8 archive into a directory
    Extract(extract::ExtractArgs),
    /// List the members of a U8 archive
    List(list::ListArgs),
    /// Pack a directory into a U8 archive
    Pack(pack::PackArgs),
}

impl ArcCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            ArcCommands::Extract(extract) => extract.handle(),
            ArcCommands::List(list) => list.handle(),
            ArcCommands::Pack(pack) => pack.handle(),
        }
    }
}
