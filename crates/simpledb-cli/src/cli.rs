//! Clap CLI definition for the `sdb` shell.

use std::path::PathBuf;

use clap::Parser;

/// sdb -- simpledb command-line shell.
#[derive(Parser, Debug)]
#[command(
    name = "sdb",
    about = "Command-line shell for the simpledb engine",
    version
)]
pub struct Cli {
    /// Root directory holding the database's catalog and data files.
    #[arg(long, env = "SIMPLEDB_DIR", default_value = "simpledb_data", global = true)]
    pub db: String,

    /// Execute a single SQL statement and exit.
    #[arg(short = 'e', long = "execute", value_name = "SQL")]
    pub execute: Option<String>,

    /// Execute a semicolon-separated script file and exit.
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Emit machine-readable JSON instead of a formatted table.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}
