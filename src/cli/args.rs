//! CLI argument definitions using clap
//!
//! Every command reads the store configuration from `--config`
//! (a JSON file, default `./depot.json`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// depot - key-addressed byte storage on the local filesystem
#[derive(Parser, Debug)]
#[command(name = "depot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./depot.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List keys under KEY (the whole store by default)
    Ls {
        #[arg(default_value = "")]
        key: String,

        /// Descend without a depth limit
        #[arg(long, conflicts_with = "depth")]
        recursive: bool,

        /// Descend at most this many levels
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Print the contents stored at KEY
    Cat { key: String },

    /// Store stdin at KEY
    Put {
        key: String,

        /// Append instead of overwriting
        #[arg(long)]
        append: bool,
    },

    /// Delete KEY (a file or an empty directory)
    Rm { key: String },

    /// Move SOURCE to TARGET
    Mv { source: String, target: String },

    /// Update the modification time of KEY, creating it if absent
    Touch { key: String },

    /// Show existence, type, size and modification time of KEY
    Stat { key: String },

    /// Print the public URL of KEY
    Url { key: String },

    /// Print the absolute filesystem path of KEY
    Path { key: String },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ls_depth() {
        let cli = Cli::try_parse_from(["depot", "--config", "x.json", "ls", "a", "--depth", "2"])
            .unwrap();
        assert_eq!(cli.config, PathBuf::from("x.json"));
        match cli.command {
            Command::Ls { key, recursive, depth } => {
                assert_eq!(key, "a");
                assert!(!recursive);
                assert_eq!(depth, Some(2));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_recursive_conflicts_with_depth() {
        assert!(Cli::try_parse_from(["depot", "ls", "--recursive", "--depth", "1"]).is_err());
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["depot", "url", "a.png"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("./depot.json"));
    }
}
