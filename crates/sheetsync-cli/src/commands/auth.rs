//! Authorizes the CLI and caches the resulting token.

use std::fs;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use sheetsync::{Authenticator, Config, auth::prompt_on_terminal};

#[derive(Debug, Args)]
pub struct AuthArgs {
    /// Discard the cached token and authorize again.
    #[arg(short, long)]
    pub force: bool,
}

pub async fn run(args: &AuthArgs, config: &Config) -> Result<()> {
    let authenticator =
        Authenticator::from_config(config).context("failed to load client credentials")?;
    let token_path = authenticator.token_path();

    if args.force && token_path.exists() {
        fs::remove_file(token_path)
            .with_context(|| format!("failed to remove {}", token_path.display()))?;
    }

    authenticator
        .access_token(prompt_on_terminal)
        .await
        .context("failed to authorize with Google")?;

    println!(
        "{} Authorized; token cached at {}",
        style("✓").green(),
        style(token_path.display()).cyan()
    );
    Ok(())
}
