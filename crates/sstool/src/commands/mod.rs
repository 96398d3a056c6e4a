pub mod arc;
pub mod kcl;
pub mod plc;
pub mod stage;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Query, patch and print SPLC record tables
    Plc {
        #[command(subcommand)]
        command: plc::PlcCommands,
    },
    /// Handle stage directories of an extracted game
    Stage {
        #[command(subcommand)]
        command: stage::StageCommands,
    },
    /// Inspect KCL collision files
    Kcl {
        #[command(subcommand)]
        command: kcl::KclCommands,
    },
    /// Handle U8 archives
    Arc {
        #[command(subcommand)]
        command: arc::ArcCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Plc { command } => command.handle(),
            Commands::Stage { command } => command.handle(),
            Commands::Kcl { command } => command.handle(),
            Commands::Arc { command } => command.handle(),
        }
    }
}
