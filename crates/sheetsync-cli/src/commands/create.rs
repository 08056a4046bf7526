//! Creates a new spreadsheet.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use sheetsync::{Config, Spreadsheet};

use super::connect;

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Title of the new spreadsheet.
    pub title: String,
}

pub async fn run(args: &CreateArgs, config: &Config) -> Result<()> {
    let client = connect(config).await?;
    let spreadsheet = Spreadsheet::create(&client, &args.title)
        .await
        .with_context(|| format!("failed to create spreadsheet {:?}", args.title))?;

    println!(
        "{} Created {}",
        style("✓").green(),
        style(spreadsheet.title()).bold()
    );
    println!("{}: {}", style("ID").cyan(), spreadsheet.id());
    println!("{}: {}", style("URL").cyan(), spreadsheet.url());
    Ok(())
}
