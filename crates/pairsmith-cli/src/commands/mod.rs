use crate::commands::{boundaries::BoundariesArgs, train::TrainArgs};

pub mod boundaries;
pub mod train;

/// Subcommands for pairsmith.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Train a vocabulary on a corpus file.
    Train(TrainArgs),

    /// Print the chunk boundaries of a corpus file.
    Boundaries(BoundariesArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Train(cmd) => cmd.run(),
            Commands::Boundaries(cmd) => cmd.run(),
        }
    }
}
