//! Command-line access to Google Sheets.
//!
//! Usage:
//! ```bash
//! sheetsync auth                         # Authorize and cache a token
//! sheetsync create "Budget"              # Create a spreadsheet
//! sheetsync info <id-or-url>             # List the sheets of a spreadsheet
//! sheetsync get <id> B5 --sheet Totals   # Read one cell
//! sheetsync set <id> B5 42               # Write one cell
//! sheetsync row <id> 2 [--set a b c]     # Read or replace a row
//! sheetsync column <id> C [--set 1 2 3]  # Read or replace a column
//! sheetsync clear <id> --sheet -1        # Clear the last sheet
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "sheetsync", author, version, about)]
struct Cli {
    /// Path to a sheetsync.toml; skips config discovery.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authorize with Google and cache the token
    Auth(commands::auth::AuthArgs),

    /// Create a new spreadsheet
    Create(commands::create::CreateArgs),

    /// Show a spreadsheet and its sheets
    Info(commands::info::InfoArgs),

    /// Print the value of one cell
    Get(commands::cells::GetArgs),

    /// Write the value of one cell
    Set(commands::cells::SetArgs),

    /// Print or replace a row
    Row(commands::cells::RowArgs),

    /// Print or replace a column
    Column(commands::cells::ColumnArgs),

    /// Clear every value on a sheet
    Clear(commands::cells::ClearArgs),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Auth(_) => "Auth",
            Self::Create(_) => "Create",
            Self::Info(_) => "Info",
            Self::Get(_) => "Get",
            Self::Set(_) => "Set",
            Self::Row(_) => "Row",
            Self::Column(_) => "Column",
            Self::Clear(_) => "Clear",
        };
        f.debug_tuple(name).finish()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("warn".parse().context("failed to parse log directive")?),
        )
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match &cli.command {
        Command::Auth(args) => commands::auth::run(args, &config).await,
        Command::Create(args) => commands::create::run(args, &config).await,
        Command::Info(args) => commands::info::run(args, &config).await,
        Command::Get(args) => commands::cells::get(args, &config).await,
        Command::Set(args) => commands::cells::set(args, &config).await,
        Command::Row(args) => commands::cells::row(args, &config).await,
        Command::Column(args) => commands::cells::column(args, &config).await,
        Command::Clear(args) => commands::cells::clear(args, &config).await,
    }
}
