//! Google Sheets spreadsheets as local objects.
//!
//! `sheetsync` wraps the Sheets v4 REST API with a small object model: a
//! [`Spreadsheet`] owns its [`Sheet`]s in display order, and every sheet keeps
//! a sparse [`CellGrid`] mirror of its values. Grid coordinates are 1-based
//! `(column, row)` pairs, and cells can also be addressed with A1 references.
//!
//! # Key Components
//!
//! - **Client**: [`SheetsClient`] carries the bearer token, the API endpoint
//!   and a shared [`QuotaLimiter`]
//! - **Authorization**: [`Authenticator`] runs the installed-app token flow
//!   and caches the token on disk
//! - **Configuration**: [`Config`] is resolved from `sheetsync.toml`
//! - **Facade**: [`Spreadsheet`] and [`Sheet`]
//!
//! # Example
//!
//! ```no_run
//! use sheetsync::{Authenticator, Config, SheetsClient, Spreadsheet, auth};
//!
//! # async fn example() -> sheetsync::Result<()> {
//! let config = Config::default();
//! let token = Authenticator::from_config(&config)?
//!     .access_token(auth::prompt_on_terminal)
//!     .await?;
//! let client = SheetsClient::from_config(&config, token)?;
//!
//! let mut spreadsheet = Spreadsheet::open(&client, "1aBcD-efGh").await?;
//! let sheet = spreadsheet.sheet_mut(0)?;
//! sheet.update("B2", "hello").await?;
//! assert_eq!(sheet.get((2, 2))?, "hello");
//! # Ok(())
//! # }
//! ```
//!
//! # Consistency
//!
//! Every remote call is awaited before the local cache changes, so a failed
//! write leaves the cache as it was. Changes made by other clients only
//! become visible after [`Spreadsheet::refresh`] or [`Sheet::refresh`].

pub mod a1;
pub mod auth;
mod client;
pub mod color;
mod config;
mod error;
mod grid;
pub mod quota;
mod sheet;
mod spreadsheet;
pub mod types;

#[cfg(test)]
mod testing;

pub use a1::{CellRef, ColumnRef};
pub use auth::Authenticator;
pub use client::{DEFAULT_SHEETS_ENDPOINT, SheetsClient};
pub use color::{ColorSpec, TabColor};
pub use config::{CONFIG_ENV_VAR, CONFIG_FILE_NAME, Config, ConfigError, QuotaConfig};
pub use error::{Error, Result};
pub use grid::{CellGrid, cell_text};
pub use quota::QuotaLimiter;
pub use sheet::{DEFAULT_COLUMN_COUNT, DEFAULT_ROW_COUNT, Sheet};
pub use spreadsheet::{SheetKey, Spreadsheet, spreadsheet_id_from_url};
