//! The main entry point for the command line tool.
use anyhow::Result;
use clap::Parser;
use rotoplan::commands::{
    Cli, Commands, handle_allocate_command, handle_schedule_command, handle_validate_command,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Allocate { model_dir } => handle_allocate_command(&model_dir),
        Commands::Schedule { model_dir } => handle_schedule_command(&model_dir),
        Commands::Validate { model_dir } => handle_validate_command(&model_dir),
    }
}
