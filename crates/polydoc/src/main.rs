//! polydoc CLI - per-language documentation generator.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "polydoc")]
#[command(about = "Generate per-language documentation from shared templates")]
#[command(version)]
pub struct Cli {
    /// Keep running and regenerate on template or fragment changes
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let config = config::load_config()?;

    if cli.watch {
        commands::watch::run(config).await?;
    } else {
        commands::generate::run(config)?;
    }

    Ok(())
}
