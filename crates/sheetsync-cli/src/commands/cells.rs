//! Cell, row and column access on a single sheet.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use sheetsync::{CellRef, ColumnRef, Config, Sheet, Spreadsheet};

use super::SheetArgs;

#[derive(Debug, Args)]
pub struct GetArgs {
    #[command(flatten)]
    pub target: SheetArgs,

    /// Cell reference such as `B5`.
    pub cell: String,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub target: SheetArgs,

    /// Cell reference such as `B5`.
    pub cell: String,

    /// New value; formulas such as `=SUM(A1:A3)` are evaluated by Google.
    pub value: String,
}

#[derive(Debug, Args)]
pub struct RowArgs {
    #[command(flatten)]
    pub target: SheetArgs,

    /// 1-based row number.
    pub row: u32,

    /// Replace the row with these values instead of printing it.
    #[arg(long, num_args = 0.., value_name = "VALUE")]
    pub set: Option<Vec<String>>,

    /// Print the row as a JSON array.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ColumnArgs {
    #[command(flatten)]
    pub target: SheetArgs,

    /// Column number or letters, such as `3` or `C`.
    pub column: String,

    /// Replace the column with these values instead of printing it.
    #[arg(long, num_args = 0.., value_name = "VALUE")]
    pub set: Option<Vec<String>>,

    /// Print the column as a JSON array.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ClearArgs {
    #[command(flatten)]
    pub target: SheetArgs,
}

pub async fn get(args: &GetArgs, config: &Config) -> Result<()> {
    let cell = validate_cell(&args.cell)?;
    let spreadsheet = args.target.open(config).await?;
    let sheet = spreadsheet
        .sheet(args.target.key())
        .with_context(|| format!("no sheet {} in {}", args.target.sheet, args.target.spreadsheet))?;
    println!("{}", sheet.get(cell)?);
    Ok(())
}

pub async fn set(args: &SetArgs, config: &Config) -> Result<()> {
    let cell = validate_cell(&args.cell)?;
    let mut spreadsheet = args.target.open(config).await?;
    let sheet = sheet_mut(&mut spreadsheet, &args.target)?;
    sheet
        .update(cell, args.value.as_str())
        .await
        .with_context(|| format!("failed to update {}", args.cell))?;
    println!(
        "{} {}!{} = {}",
        style("✓").green(),
        sheet.title(),
        args.cell.to_ascii_uppercase(),
        args.value
    );
    Ok(())
}

pub async fn row(args: &RowArgs, config: &Config) -> Result<()> {
    let mut spreadsheet = args.target.open(config).await?;
    let sheet = sheet_mut(&mut spreadsheet, &args.target)?;

    if let Some(values) = &args.set {
        sheet
            .update_row(args.row, values)
            .await
            .with_context(|| format!("failed to update row {}", args.row))?;
        println!("{} Updated row {} of {}", style("✓").green(), args.row, sheet.title());
        return Ok(());
    }

    print_values(&sheet.get_row(args.row)?, args.json)
}

pub async fn column(args: &ColumnArgs, config: &Config) -> Result<()> {
    let column = parse_column(&args.column);
    column
        .resolve()
        .with_context(|| format!("{:?} is not a column", args.column))?;
    let mut spreadsheet = args.target.open(config).await?;
    let sheet = sheet_mut(&mut spreadsheet, &args.target)?;

    if let Some(values) = &args.set {
        sheet
            .update_column(column.clone(), values)
            .await
            .with_context(|| format!("failed to update column {}", args.column))?;
        println!(
            "{} Updated column {} of {}",
            style("✓").green(),
            args.column,
            sheet.title()
        );
        return Ok(());
    }

    print_values(&sheet.get_column(column)?, args.json)
}

pub async fn clear(args: &ClearArgs, config: &Config) -> Result<()> {
    let mut spreadsheet = args.target.open(config).await?;
    let sheet = sheet_mut(&mut spreadsheet, &args.target)?;
    sheet.clear().await.context("failed to clear sheet")?;
    println!("{} Cleared {}", style("✓").green(), sheet.title());
    Ok(())
}

fn sheet_mut<'a>(spreadsheet: &'a mut Spreadsheet, target: &SheetArgs) -> Result<&'a mut Sheet> {
    spreadsheet
        .sheet_mut(target.key())
        .with_context(|| format!("no sheet {} in {}", target.sheet, target.spreadsheet))
}

/// Numbers select a column by position, anything else is taken as letters.
fn parse_column(raw: &str) -> ColumnRef {
    match raw.parse::<u32>() {
        Ok(number) => ColumnRef::Number(number),
        Err(_) => ColumnRef::Letters(raw.to_string()),
    }
}

fn print_values(values: &[String], json: bool) -> Result<()> {
    println!("{}", render_values(values, json)?);
    Ok(())
}

fn render_values(values: &[String], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string(values)?);
    }
    Ok(values.join("\t"))
}

/// Checks the reference before any request is made.
fn validate_cell(raw: &str) -> Result<CellRef> {
    let reference = CellRef::from(raw);
    reference
        .resolve()
        .with_context(|| format!("{raw:?} is not a cell reference"))?;
    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_accepts_numbers_and_letters() {
        assert_eq!(parse_column("3"), ColumnRef::Number(3));
        assert_eq!(parse_column("AB"), ColumnRef::Letters("AB".into()));
        assert_eq!(parse_column("c"), ColumnRef::Letters("c".into()));
    }

    #[test]
    fn test_render_values_as_tsv_and_json() {
        let values = ["a".to_string(), String::new(), "c \"d\"".to_string()];

        assert_eq!(render_values(&values, false).unwrap(), "a\t\tc \"d\"");
        assert_eq!(
            render_values(&values, true).unwrap(),
            r#"["a","","c \"d\""]"#
        );
    }

    #[test]
    fn test_validate_cell_rejects_malformed_references() {
        assert!(validate_cell("B5").is_ok());
        assert!(validate_cell("5B").is_err());
        assert!(validate_cell("A0").is_err());
    }
}
