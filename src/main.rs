use clap::Parser;
use semantic_response_cache::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => cli::serve::run().await,
        Command::Reclaim(args) => cli::reclaim::run(args).await,
        Command::RebuildIndex => cli::rebuild_index::run().await,
    }
}
