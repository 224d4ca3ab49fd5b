use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod input;
mod render;

#[derive(Parser)]
#[command(name = "ladder")]
#[command(about = "Track a character's position on a league ladder")]
struct Args {
    /// Tracker configuration file (TOML)
    #[arg(short, long, global = true, default_value = "ladder.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Locate a character and keep following it
    Track {
        /// Character name (case-insensitive)
        #[arg(long, env = "LADDER_CHARACTER")]
        character: String,

        /// League identifier as listed by `ladder leagues`
        #[arg(long, env = "LADDER_LEAGUE")]
        league: String,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// List leagues shown on the public ladder page
    Leagues,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so tracker output on stdout stays readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ladder=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = commands::load_config(&args.config);

    match args.command {
        Command::Track {
            character,
            league,
            no_color,
        } => commands::track::run(&character, &league, config, !no_color).await,
        Command::Leagues => commands::leagues::run(config).await,
    }
}
