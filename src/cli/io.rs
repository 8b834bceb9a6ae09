//! stdin/stdout handling for CLI
//!
//! - `put` reads raw bytes from stdin
//! - `cat` writes raw bytes to stdout
//! - every other command writes a single JSON object to stdout

use std::io::{self, Read, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Read all of stdin
pub fn read_stdin_bytes() -> CliResult<Vec<u8>> {
    let mut data = Vec::new();
    io::stdin().lock().read_to_end(&mut data)?;
    Ok(data)
}

/// Write raw bytes to stdout
pub fn write_bytes(data: &[u8]) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(data)?;
    stdout.flush()?;

    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
