use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::protocol::PeerCommand;

#[derive(Parser)]
#[command(name = "mipmesh", about = "Peer-synchronized animated companion", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the companion daemon (the default when no command is given)
    Run {
        /// Path to a TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Fixed identity instead of a generated one
        #[arg(long)]
        name: Option<String>,
    },
    /// Broadcast a one-shot command to peers (debugging aid)
    Send {
        #[arg(value_enum)]
        command: WireCommand,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WireCommand {
    Dance,
    PowerOff,
}

impl From<WireCommand> for PeerCommand {
    fn from(cmd: WireCommand) -> Self {
        match cmd {
            WireCommand::Dance => PeerCommand::Dance,
            WireCommand::PowerOff => PeerCommand::PowerOff,
        }
    }
}
