mod load_samples;
mod run;
mod squeue;
mod submit;

use crate::cli::Commands;
use crate::config::Config;
use anyhow::Result;
use std::path::Path;

pub fn handle_commands(command: Commands, state_path: &Path, config: &Config) -> Result<()> {
    match command {
        Commands::Submit(args) => submit::handle_submit(args, state_path),
        Commands::Squeue(args) => squeue::handle_squeue(args, state_path),
        Commands::Run(args) => run::handle_run(args, state_path, config),
        Commands::LoadSamples(args) => load_samples::handle_load_samples(args, state_path),
    }
}
