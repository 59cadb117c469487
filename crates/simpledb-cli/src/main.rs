//! `sdb` -- command-line shell for the simpledb engine.
//!
//! Parses CLI arguments with clap, opens a database at the configured root,
//! and either runs a single statement (`-e`), a script file (`-f`), or an
//! interactive REPL.

mod cli;
mod output;

use std::io::{self, BufRead, Write};

use clap::Parser;

use cli::Cli;
use simpledb_storage::Database;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("sdb=debug,simpledb_storage=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("sdb=info,simpledb_storage=warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let result = run(&cli);

    if let Err(e) = result {
        if cli.json {
            let err_json = serde_json::json!({ "error": e.to_string() });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{s}");
            }
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let db = Database::open(&cli.db)?;

    if let Some(sql) = &cli.execute {
        let result = db.execute(sql)?;
        output::print_result(&result, cli.json);
        return Ok(());
    }

    if let Some(path) = &cli.file {
        let script = std::fs::read_to_string(path)?;
        for result in db.execute_script(&script)? {
            output::print_result(&result, cli.json);
        }
        return Ok(());
    }

    run_repl(&db, cli.json)
}

/// Reads statements from stdin, one per `;`-terminated input, until EOF or
/// `exit`/`quit`. A parse/execution error on one statement is reported and
/// the REPL continues with the next one.
fn run_repl(db: &Database, json: bool) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut buffer = String::new();

    print!("sdb> ");
    io::stdout().flush().ok();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if buffer.is_empty() && (trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit")) {
            break;
        }

        buffer.push_str(&line);
        buffer.push('\n');

        if trimmed.ends_with(';') {
            match db.execute(&buffer) {
                Ok(result) => output::print_result(&result, json),
                Err(e) => eprintln!("Error: {e}"),
            }
            buffer.clear();
            print!("sdb> ");
        } else {
            print!(" ... ");
        }
        io::stdout().flush().ok();
    }

    Ok(())
}
