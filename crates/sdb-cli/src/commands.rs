use std::path::PathBuf;

use anyhow::Context;
use colored::Colorize;
use sdb_core::{Command as Recorded, Database};
use sdb_server::{SdbServer, ServerConfig};
use sdb_store::{EntityStore, FileEntityStore};

use crate::cli::*;

/// Snapshot file used when `--data` is not given.
pub const DEFAULT_DATA_PATH: &str = "sdb.json";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(&args, cli.data),
        command => {
            let db = open_database(cli.data)?;
            println!("{}", execute(&db, command, &cli.format)?);
            Ok(())
        }
    }
}

fn open_database(data: Option<PathBuf>) -> anyhow::Result<Database<FileEntityStore>> {
    let path = data.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
    let store = FileEntityStore::open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Database::new(store))
}

/// Run one non-server command and render what it prints.
fn execute<S: EntityStore>(
    db: &Database<S>,
    command: Command,
    format: &OutputFormat,
) -> anyhow::Result<String> {
    let reply = match command {
        Command::Set(args) => db.set(&args.name, &args.value)?,
        Command::Get(args) => db.get(&args.name)?,
        Command::Unset(args) => db.unset(&args.name)?,
        Command::Numequalto(args) => db.num_equal_to(&args.value)?,
        Command::Undo => db.undo()?,
        Command::Redo => db.redo()?,
        Command::End => db.end()?,
        Command::History => return render_history(&db.history()?, format),
        Command::Serve(_) => anyhow::bail!("serve is not a one-shot command"),
    };
    Ok(reply.to_string())
}

fn render_history(history: &[Recorded], format: &OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(history)?),
        OutputFormat::Text if history.is_empty() => Ok("No commands.".to_string()),
        OutputFormat::Text => Ok(history
            .iter()
            .enumerate()
            .map(|(i, command)| format!("{} {}", format!("{:>3}", i + 1).dimmed(), command))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Config file first, then flag overrides.
fn serve_config(args: &ServeArgs, data: Option<PathBuf>) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.memory {
        config.data_path = None;
    } else if data.is_some() {
        config.data_path = data;
    }
    Ok(config)
}

fn cmd_serve(args: &ServeArgs, data: Option<PathBuf>) -> anyhow::Result<()> {
    let config = serve_config(args, data)?;
    let storage = match &config.data_path {
        Some(path) => path.display().to_string(),
        None => "in-memory".to_string(),
    };
    println!(
        "{} sdb server on {} (storage: {})",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        storage
    );

    let server = SdbServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}
