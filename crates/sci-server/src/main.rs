//! Service binary: CLI entry point for every transport.

use clap::Parser;
use sci_infrastructure::{logging, AppContext, ConfigLoader};
use sci_server::cli::{execute, Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The MCP transport owns stdout for the protocol stream.
    if matches!(cli.command, Command::Mcp) {
        logging::init_stderr("info");
    } else {
        logging::init("info");
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;
    let ctx = AppContext::init(config).await?;
    execute(ctx, cli.command).await
}
