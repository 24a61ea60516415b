mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{cover, distribute};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    match &cli.command {
        Commands::Cover(args) => cover::run(&cli, args),
        Commands::Distribute(args) => distribute::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
