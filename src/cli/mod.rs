//! CLI module for entrydesk
//!
//! Provides command-line interface for:
//! - init: Create the data directory and database
//! - serve: Run the HTTP server
//! - token: Mint an operator bearer token
//! - upload: Direct upload to a presigned URL

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, run, run_command, serve, token, upload};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
