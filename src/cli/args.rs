//! CLI argument definitions using clap
//!
//! Commands:
//! - entrydesk init --config <path>
//! - entrydesk serve --config <path>
//! - entrydesk token --config <path> --subject <id>
//! - entrydesk upload --url <signed-url> --file <path> [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// entrydesk - form schema and media upload service
#[derive(Parser, Debug)]
#[command(name = "entrydesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and database, applying migrations
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./entrydesk.json")]
        config: PathBuf,
    },

    /// Run the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./entrydesk.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Mint a bearer token signed with the configured secret
    Token {
        /// Path to configuration file
        #[arg(long, default_value = "./entrydesk.json")]
        config: PathBuf,

        /// Subject identifier placed in the token
        #[arg(long)]
        subject: String,

        /// Role claim: "admin" or "applicant"
        #[arg(long, default_value = "admin")]
        role: String,
    },

    /// Upload a file to a presigned URL and report the outcome
    Upload {
        /// Signed write URL returned by /media/signed-url
        #[arg(long)]
        url: String,

        /// File to upload
        #[arg(long)]
        file: PathBuf,

        /// Content type; must match the one the grant was issued for
        #[arg(long)]
        content_type: Option<String>,

        /// Configuration file supplying `upload_timeout_secs`
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seconds to wait for the storage response; overrides the config
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
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
    fn test_parse_upload() {
        let cli = Cli::try_parse_from([
            "entrydesk",
            "upload",
            "--url",
            "http://127.0.0.1:4000/storage/object/uploads/x/a.png?token=t",
            "--file",
            "a.png",
        ])
        .unwrap();

        match cli.command {
            Command::Upload {
                content_type,
                config,
                timeout_secs,
                ..
            } => {
                assert!(content_type.is_none());
                assert!(config.is_none());
                assert!(timeout_secs.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_upload_with_config_and_timeout() {
        let cli = Cli::try_parse_from([
            "entrydesk",
            "upload",
            "--url",
            "http://127.0.0.1:4000/storage/object/uploads/x/a.png?token=t",
            "--file",
            "a.png",
            "--config",
            "./entrydesk.json",
            "--timeout-secs",
            "5",
        ])
        .unwrap();

        match cli.command {
            Command::Upload {
                config,
                timeout_secs,
                ..
            } => {
                assert_eq!(config, Some(PathBuf::from("./entrydesk.json")));
                assert_eq!(timeout_secs, Some(5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_token_requires_subject() {
        assert!(Cli::try_parse_from(["entrydesk", "token"]).is_err());
    }
}
