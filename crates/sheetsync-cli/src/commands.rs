//! Subcommand implementations for the `sheetsync` CLI.
//!
//! - **`auth`**: run the authorization flow and cache the token
//! - **`create`**: create an empty spreadsheet
//! - **`info`**: show a spreadsheet and its sheets
//! - **`get`** / **`set`**: read or write one cell
//! - **`row`** / **`column`**: read or replace a whole row or column
//! - **`clear`**: clear every value on a sheet
//!
//! Each module exports an `*Args` struct and a `run` function taking the
//! resolved [`Config`].

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use sheetsync::{Authenticator, Config, SheetKey, SheetsClient, Spreadsheet, auth::prompt_on_terminal};
use tracing::debug;

pub mod auth;
pub mod cells;
pub mod create;
pub mod info;

/// Loads the config named by `--config`, or resolves one from the
/// environment and the directory tree.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::resolve().context("failed to resolve sheetsync config")?,
    };
    debug!(source = ?config.source, "using config");
    Ok(config)
}

/// Obtains an access token, prompting on the terminal if needed, and builds
/// a client from it.
pub async fn connect(config: &Config) -> Result<SheetsClient> {
    let authenticator =
        Authenticator::from_config(config).context("failed to load client credentials")?;
    let token = authenticator
        .access_token(prompt_on_terminal)
        .await
        .context("failed to authorize with Google")?;
    SheetsClient::from_config(config, token).context("invalid Sheets API endpoint")
}

/// Selects a spreadsheet and one of its sheets.
#[derive(Debug, Args)]
pub struct SheetArgs {
    /// Spreadsheet id or URL.
    pub spreadsheet: String,

    /// Sheet index (negative counts from the end) or title.
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    pub sheet: String,
}

impl SheetArgs {
    pub fn key(&self) -> SheetKey {
        parse_sheet_key(&self.sheet)
    }

    pub async fn open(&self, config: &Config) -> Result<Spreadsheet> {
        let client = connect(config).await?;
        Spreadsheet::open(&client, &self.spreadsheet)
            .await
            .with_context(|| format!("failed to open spreadsheet {}", self.spreadsheet))
    }
}

/// Integers select by position, anything else by title.
pub fn parse_sheet_key(raw: &str) -> SheetKey {
    match raw.parse::<i64>() {
        Ok(index) => SheetKey::Index(index),
        Err(_) => SheetKey::Title(raw.to_string()),
    }
}
