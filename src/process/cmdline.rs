//! Command line parsing from `/proc/<pid>/cmdline`.

use std::fs;
use std::path::Path;

use crate::error::ReadError;
use crate::process::scanner::read_comm;

/// Executable basename and joined argument string of a process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub command: String,
    pub args: String,
}

/// Splits a NUL-separated argument vector.
///
/// Returns `None` when the vector holds no non-empty token (kernel threads,
/// zombies), so the caller can fall back to the short name.
pub fn parse_cmdline(raw: &[u8]) -> Option<CommandLine> {
    let mut tokens = raw
        .split(|&b| b == 0u8)
        .filter(|t| !t.is_empty())
        .map(String::from_utf8_lossy);

    let first = tokens.next()?;
    let command = Path::new(first.as_ref())
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| first.clone().into_owned());
    let args = tokens.collect::<Vec<_>>().join(" ");

    Some(CommandLine { command, args })
}

/// Reads the command line of the process at `proc_path`, falling back to
/// `comm` with empty args when the argument vector is empty.
pub fn read_command_line(proc_path: &Path) -> Result<CommandLine, ReadError> {
    let path = proc_path.join("cmdline");
    let raw = fs::read(&path).map_err(|e| ReadError::from_io(&path, e))?;

    match parse_cmdline(&raw) {
        Some(cl) => Ok(cl),
        None => Ok(CommandLine {
            command: read_comm(proc_path)?,
            args: String::new(),
        }),
    }
}
