//! Log setup: `timestamp: LEVEL: target: message` lines to stderr or a file.

use anyhow::{Context, Result};
use chrono::Local;
use log::Record;
use std::io::{self, Write};
use std::path::Path;

use crate::context::TIME_FORMAT;
use crate::runtime::Runtime;

/// Writes one log line.
pub fn write_record(out: &mut dyn Write, timestamp: &str, record: &Record<'_>) -> io::Result<()> {
    writeln!(
        out,
        "{}: {}: {}: {}",
        timestamp,
        record.level(),
        record.target(),
        record.args()
    )
}

/// Installs the global logger. `RUST_LOG` controls the filter (default
/// `info`). With `log_file` set, records are appended to that file.
pub fn init<R: Runtime>(runtime: &R, log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    builder.format(|buf, record| {
        let timestamp = Local::now().format(TIME_FORMAT).to_string();
        write_record(buf, &timestamp, record)
    });

    if let Some(path) = log_file {
        let file = runtime.append_file(path)?;
        builder.target(env_logger::Target::Pipe(file));
    }

    builder.try_init().context("Failed to initialize logging")?;
    Ok(())
}
