//! CLI module for depot
//!
//! A thin front end over [`LocalStore`](crate::driver::LocalStore):
//! - ls / cat / put / rm / mv / touch
//! - stat / url / path for inspection

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{execute, open_store, run, run_command, Output};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_stdin_bytes, write_bytes, write_response};
