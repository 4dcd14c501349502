use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use vtcompat::backend::LoopbackBackend;
use vtcompat::connection::{Connection, ConnectionConfig};
use vtcompat::output::{format_json, format_result};
use vtcompat::{AnalyzedQuery, CompatError};

/// vtcompat interactive shell
#[derive(Parser, Debug)]
#[command(name = "vtcompat")]
#[command(about = "Console for the Vitess SQL compatibility layer", long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Connection string: vitess:host=..;port=..;dbname=..
    #[arg(long)]
    dsn: Option<String>,

    /// Keyspace (overrides config and DSN)
    #[arg(short = 'k', long)]
    keyspace: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Run one statement and exit
    #[arg(short = 'e', long)]
    execute: Option<String>,
}

fn print_help() {
    println!("Meta-commands:");
    println!("  \\q, \\quit          - Quit");
    println!("  \\l, \\list          - List keyspaces (SHOW DATABASES)");
    println!("  \\dt                - List tables (SHOW TABLES)");
    println!("  \\?, \\h, \\help      - Show this help");
    println!("\nStatements are classified, then emulated or sent to the loopback backend.");
}

fn run_statement(connection: &Connection, sql: &str, json: bool) -> Result<String, CompatError> {
    let statement = connection.query(sql)?;
    info!("{:?}: {}", statement.query().query_type(), sql);
    let Some(result) = statement.result() else {
        return Ok(String::new());
    };
    if json {
        format_json(result)
    } else {
        Ok(format_result(result))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut config = ConnectionConfig::load(args.config.as_deref(), args.dsn.as_deref())?;
    if let Some(keyspace) = args.keyspace {
        config.keyspace = keyspace;
    }

    let vtctld = config.vtctld_client()?;
    let connection = Connection::open(config, Arc::new(LoopbackBackend::new()), vtctld)?;

    if let Some(sql) = args.execute {
        match run_statement(&connection, &sql, args.json) {
            Ok(output) => print!("{output}"),
            Err(e) => {
                error!("{sql}: {e}");
                return Err(e.into());
            }
        }
        return Ok(());
    }

    println!("vtcompat {} - keyspace {}", env!("CARGO_PKG_VERSION"), connection.config().keyspace);
    println!("Type \\? for help, \\q to quit.\n");

    let mut rl = DefaultEditor::new()?;
    let history_file = dirs::home_dir().map(|mut p| {
        p.push(".vtcompat_history");
        p
    });
    if let Some(ref path) = history_file {
        let _ = rl.load_history(path);
    }

    loop {
        match rl.readline("vtcompat> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                let sql = match line {
                    "\\q" | "\\quit" | "quit" | "exit" => break,
                    "\\l" | "\\list" => "SHOW DATABASES",
                    "\\dt" => "SHOW TABLES",
                    "\\?" | "\\h" | "\\help" => {
                        print_help();
                        continue;
                    }
                    _ if line.starts_with('\\') => {
                        println!("Unknown meta-command: {line}. Use \\? for help.");
                        continue;
                    }
                    _ => line,
                };

                match run_statement(&connection, sql, args.json) {
                    Ok(output) => print!("{output}"),
                    Err(e) => eprintln!("ERROR: {e}"),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }

    if let Some(ref path) = history_file {
        let _ = rl.save_history(path);
    }
    Ok(())
}
