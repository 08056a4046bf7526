//! Shows a spreadsheet and its sheets.

use anyhow::Result;
use clap::Args;
use console::style;
use serde_json::{Value, json};
use sheetsync::{Config, Sheet, Spreadsheet};

use super::connect;

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Spreadsheet id or URL.
    pub spreadsheet: String,

    /// Print machine-readable JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: &InfoArgs, config: &Config) -> Result<()> {
    let client = connect(config).await?;
    let spreadsheet = Spreadsheet::open(&client, &args.spreadsheet).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&spreadsheet_json(&spreadsheet))?);
        return Ok(());
    }

    println!("{}", style(spreadsheet.title()).bold().underlined());
    println!("{}: {}", style("URL").cyan(), spreadsheet.url());
    println!();
    println!(
        "{:<6} {:<12} {:<30} {}",
        style("INDEX").bold(),
        style("ID").bold(),
        style("TITLE").bold(),
        style("SIZE").bold()
    );
    println!("{}", "-".repeat(64));
    for sheet in &spreadsheet {
        println!(
            "{:<6} {:<12} {:<30} {}",
            sheet.index(),
            sheet.id(),
            sheet.title(),
            size_label(sheet)
        );
    }
    println!("\n{} sheet(s)", spreadsheet.len());
    Ok(())
}

/// `columns x rows`, with frozen counts when there are any.
fn size_label(sheet: &Sheet) -> String {
    let mut label = format!("{} x {}", sheet.column_count(), sheet.row_count());
    if sheet.frozen_column_count() > 0 || sheet.frozen_row_count() > 0 {
        label.push_str(&format!(
            " (frozen {} x {})",
            sheet.frozen_column_count(),
            sheet.frozen_row_count()
        ));
    }
    label
}

fn spreadsheet_json(spreadsheet: &Spreadsheet) -> Value {
    let sheets: Vec<Value> = spreadsheet
        .iter()
        .map(|sheet| {
            json!({
                "sheetId": sheet.id(),
                "title": sheet.title(),
                "index": sheet.index(),
                "columnCount": sheet.column_count(),
                "rowCount": sheet.row_count(),
                "frozenColumnCount": sheet.frozen_column_count(),
                "frozenRowCount": sheet.frozen_row_count(),
                "tabColor": sheet.tab_color(),
            })
        })
        .collect();
    json!({
        "spreadsheetId": spreadsheet.id(),
        "title": spreadsheet.title(),
        "url": spreadsheet.url(),
        "sheets": sheets,
    })
}
