//! Error type shared by every sheetsync operation.

use std::path::PathBuf;

use reqwest::StatusCode;

/// Errors that can occur while talking to Google Sheets or validating input.
///
/// Argument errors are always raised locally, before any request is sent.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A cell reference such as `"B5"` could not be parsed.
    #[error("invalid cell reference {0:?}: expected a reference like \"A1\"")]
    InvalidCellReference(String),

    /// Column letters contained something other than ASCII letters.
    #[error("invalid column letters {0:?}: columns must be letters only, like \"AA\"")]
    InvalidColumnLetters(String),

    /// A spreadsheet id or URL was malformed.
    #[error("invalid spreadsheet id or URL {0:?}")]
    InvalidSpreadsheetId(String),

    /// A tab color specification was not recognized or out of range.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// An index, row or column was outside the valid range.
    #[error("{0}")]
    OutOfRange(String),

    /// An argument value broke a sheet invariant.
    #[error("{0}")]
    InvalidArgument(String),

    /// Deleting would leave the spreadsheet without any sheet.
    #[error("cannot delete all sheets; a spreadsheet must have at least one sheet")]
    LastSheet,

    /// No sheet matched the given title, index or id.
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    /// The client secrets file needed for authorization is missing.
    #[error(
        "can't find credentials file at {}. Create an OAuth client ID for a desktop app in the \
         Google Cloud console (APIs & Services > Credentials), enable the Google Sheets API, and \
         download the client secrets JSON to this path",
        .0.display()
    )]
    MissingCredentials(PathBuf),

    /// Authorization could not be completed.
    #[error("authorization failed: {0}")]
    Auth(String),

    /// The configured API endpoint is not a usable base URL.
    #[error("invalid endpoint {0:?}")]
    InvalidEndpoint(String),

    /// The remote service answered with a non-success status.
    #[error("Google Sheets API request failed ({status}): {body}")]
    Api { status: StatusCode, body: String },

    /// Transport-level failure.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// A JSON document could not be encoded or decoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Reading or writing a local file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
