//! CLI module for the semantic response cache
//!
//! - `serve`: HTTP API with background maintenance (default)
//! - `reclaim`: run one idle and capacity sweep, then exit
//! - `rebuild-index`: rebuild the index file from the record store

pub mod rebuild_index;
pub mod reclaim;
pub mod serve;

use clap::{Parser, Subcommand};

/// Semantic response cache - serves stored answers to similar queries
#[derive(Parser)]
#[command(name = "semantic-response-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve,

    /// Run one reclaim pass and exit
    Reclaim(reclaim::ReclaimArgs),

    /// Rebuild the vector index from the record store and exit
    RebuildIndex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reclaim_overrides() {
        let cli = Cli::try_parse_from([
            "semantic-response-cache",
            "reclaim",
            "--max-vectors",
            "500",
            "--idle-days",
            "3",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Reclaim(args)) => {
                assert_eq!(args.max_vectors, Some(500));
                assert_eq!(args.idle_days, Some(3));
            }
            _ => panic!("expected reclaim"),
        }
    }

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["semantic-response-cache"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_rebuild_index() {
        let cli = Cli::try_parse_from(["semantic-response-cache", "rebuild-index"]).unwrap();
        assert!(matches!(cli.command, Some(Command::RebuildIndex)));
    }
}
