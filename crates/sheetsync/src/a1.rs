//! A1-notation helpers: column letters, cell references and range strings.
//!
//! Columns use bijective base-26 numbering: there is no zero digit, so
//! `1 => "A"`, `26 => "Z"`, `27 => "AA"`. Rows and columns are 1-based
//! everywhere in this crate.

use crate::{Error, Result};

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Converts a 1-based column number to its letters (`27 => "AA"`).
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] if `column` is zero.
pub fn column_to_letters(column: u32) -> Result<String> {
    if column < 1 {
        return Err(Error::OutOfRange(
            "column number must be at least 1".to_string(),
        ));
    }

    let mut letters = Vec::new();
    let mut n = column;
    while n > 0 {
        let remainder = (n - 1) % 26;
        letters.push(char::from(ALPHABET[remainder as usize]));
        n = (n - 1) / 26;
    }
    Ok(letters.iter().rev().collect())
}

/// Converts column letters to a 1-based column number (`"AA" => 27`).
///
/// Letters are case-insensitive.
///
/// # Errors
///
/// Returns [`Error::InvalidColumnLetters`] if `letters` is empty, contains a
/// non-letter, or names a column too large to represent.
pub fn letters_to_column(letters: &str) -> Result<u32> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(Error::InvalidColumnLetters(letters.to_string()));
    }

    letters.bytes().try_fold(0u32, |acc, b| {
        let digit = u32::from(b.to_ascii_uppercase() - b'A' + 1);
        acc.checked_mul(26)
            .and_then(|n| n.checked_add(digit))
            .ok_or_else(|| Error::InvalidColumnLetters(letters.to_string()))
    })
}

/// Splits a reference like `"B5"` into `(column, row)`, here `(2, 5)`.
///
/// # Errors
///
/// Returns [`Error::InvalidCellReference`] unless the reference is
/// alphanumeric, starts with letters and ends with a positive row number.
pub fn parse_cell_reference(reference: &str) -> Result<(u32, u32)> {
    let invalid = || Error::InvalidCellReference(reference.to_string());

    if !reference.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(invalid());
    }
    let split = reference
        .bytes()
        .position(|b| b.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let column = letters_to_column(letters).map_err(|_| invalid())?;
    let row: u32 = digits.parse().map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }
    Ok((column, row))
}

/// A cell address given either as coordinates or as an A1 reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellRef {
    /// 1-based `(column, row)` coordinates.
    Coords { column: u32, row: u32 },
    /// An A1-style reference such as `"B5"`.
    Reference(String),
}

impl CellRef {
    /// Resolves this address into canonical 1-based `(column, row)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] for zero coordinates and
    /// [`Error::InvalidCellReference`] for malformed references.
    pub fn resolve(&self) -> Result<(u32, u32)> {
        match self {
            CellRef::Coords { column, row } => {
                if *column < 1 || *row < 1 {
                    return Err(Error::OutOfRange(format!(
                        "column {column}, row {row} does not exist; columns and rows are \
                         1-based, use 1 for the first row or column"
                    )));
                }
                Ok((*column, *row))
            }
            CellRef::Reference(reference) => parse_cell_reference(reference),
        }
    }
}

impl From<(u32, u32)> for CellRef {
    fn from((column, row): (u32, u32)) -> Self {
        CellRef::Coords { column, row }
    }
}

impl From<&str> for CellRef {
    fn from(reference: &str) -> Self {
        CellRef::Reference(reference.to_string())
    }
}

impl From<String> for CellRef {
    fn from(reference: String) -> Self {
        CellRef::Reference(reference)
    }
}

/// A column given either by number or by letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Number(u32),
    Letters(String),
}

impl ColumnRef {
    /// Resolves this column into a 1-based number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] for column zero and
    /// [`Error::InvalidColumnLetters`] for malformed letters.
    pub fn resolve(&self) -> Result<u32> {
        match self {
            ColumnRef::Number(0) => Err(Error::OutOfRange(
                "column 0 does not exist; columns are 1-based".to_string(),
            )),
            ColumnRef::Number(n) => Ok(*n),
            ColumnRef::Letters(letters) => letters_to_column(letters),
        }
    }
}

impl From<u32> for ColumnRef {
    fn from(n: u32) -> Self {
        ColumnRef::Number(n)
    }
}

impl From<&str> for ColumnRef {
    fn from(letters: &str) -> Self {
        ColumnRef::Letters(letters.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(letters: String) -> Self {
        ColumnRef::Letters(letters)
    }
}

/// Quotes a sheet title for use in a range, doubling embedded quotes.
pub fn quote_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Builds a range like `'Sheet 1'!A1:C3` from two corner coordinates.
///
/// # Errors
///
/// Returns [`Error::OutOfRange`] if either column is zero.
pub fn cell_range(title: &str, from: (u32, u32), to: (u32, u32)) -> Result<String> {
    Ok(format!(
        "{}!{}{}:{}{}",
        quote_title(title),
        column_to_letters(from.0)?,
        from.1,
        column_to_letters(to.0)?,
        to.1
    ))
}
