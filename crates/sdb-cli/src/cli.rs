use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sdb",
    about = "sdb: a variable store with unlimited undo/redo",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Snapshot file holding variables and command stacks
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Set a variable
    Set(SetArgs),
    /// Print the value of a variable
    Get(NameArgs),
    /// Unset a variable
    Unset(NameArgs),
    /// Count variables holding a value
    Numequalto(ValueArgs),
    /// Undo the last SET/UNSET
    Undo,
    /// Redo the most recently undone command
    Redo,
    /// Delete all variables and history
    End,
    /// Show the commands that can be undone
    History,
    /// Start the HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct SetArgs {
    pub name: String,
    pub value: String,
}

#[derive(Args)]
pub struct NameArgs {
    pub name: String,
}

#[derive(Args)]
pub struct ValueArgs {
    pub value: String,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on, overriding the config file
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Keep everything in memory, ignoring any data path
    #[arg(long)]
    pub memory: bool,
}
