//! CLI command implementations
//!
//! Each command opens the store described by the config file, performs one
//! operation and reports the result on stdout.

use std::path::Path;

use log::debug;
use serde_json::{json, Value};

use crate::driver::{
    AbsolutePathAware, DirectoryAware, ListDepth, LocalStore, SizeAware, StorageConfig,
    StorageDriver, Touchable,
};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_stdin_bytes, write_bytes, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(&cli.config, cli.command)
}

/// Open the store described by the config file at `config_path`
pub fn open_store(config_path: &Path) -> CliResult<LocalStore> {
    if !config_path.exists() {
        return Err(CliError::config_error(format!(
            "config file not found: {}",
            config_path.display()
        )));
    }

    let config = StorageConfig::load(config_path)?;
    Ok(LocalStore::new(config)?)
}

/// Run the appropriate command based on CLI args
pub fn run_command(config_path: &Path, cmd: Command) -> CliResult<()> {
    let store = open_store(config_path)?;
    debug!("running {:?} against {}", cmd, store.root().display());

    match execute(&store, cmd)? {
        Output::Json(data) => write_response(data),
        Output::Raw(data) => write_bytes(&data),
    }
}

/// What a command prints on stdout
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Wrapped in the `{"status":"ok","data":..}` envelope
    Json(Value),
    /// Stored bytes, printed as-is
    Raw(Vec<u8>),
}

/// Execute one command against `store`
pub fn execute(store: &LocalStore, cmd: Command) -> CliResult<Output> {
    let data = match cmd {
        Command::Ls {
            key,
            recursive,
            depth,
        } => {
            let depth = match depth {
                Some(n) => ListDepth::from(n),
                None => ListDepth::from(recursive),
            };
            json!(store.list(&key, depth)?)
        }
        Command::Cat { key } => return Ok(Output::Raw(store.read(&key)?)),
        Command::Put { key, append } => {
            let data = read_stdin_bytes()?;
            let outcome = store.write(&key, &data, append)?;
            json!({ "key": outcome.key, "bytes_written": outcome.bytes_written })
        }
        Command::Rm { key } => {
            let deleted = store.delete(&key)?;
            json!({ "key": key, "deleted": deleted })
        }
        Command::Mv { source, target } => {
            store.rename(&source, &target)?;
            json!({ "source": source, "target": target })
        }
        Command::Touch { key } => {
            store.touch(&key)?;
            json!({ "key": key })
        }
        Command::Stat { key } => stat(store, &key)?,
        Command::Url { key } => json!({ "url": store.url(&key) }),
        Command::Path { key } => {
            let path = store.absolute_path(&key)?;
            json!({ "path": path.display().to_string() })
        }
    };

    Ok(Output::Json(data))
}

fn stat(store: &LocalStore, key: &str) -> CliResult<Value> {
    let modified = store.modified_time(key)?.map(|t| t.to_rfc3339());

    Ok(json!({
        "key": key,
        "exists": store.exists(key)?,
        "is_directory": store.is_directory(key)?,
        "size": store.size(key)?,
        "modified": modified,
    }))
}
