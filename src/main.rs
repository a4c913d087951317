use clap::Parser;
use cli::Cli;
use slurmsim::cli;
use slurmsim::commands::handle_commands;
use slurmsim::config;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbose)
        .init();

    tracing::debug!(?cli, "starting slurmsim");

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("failed to load config: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = handle_commands(cli.command, &cli.state, &config) {
        tracing::error!("{e:?}");
        std::process::exit(1);
    }
}
