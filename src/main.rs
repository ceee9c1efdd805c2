//! `dal` - maintenance tool for the core business and errors reporting
//! databases: apply or roll back migrations and check connectivity.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use generic_dal::{
    cli::{Cli, Commands},
    commands,
    config::Config,
    errors::AppResult,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command).await {
        tracing::error!(code = e.code(), "dal failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> AppResult<()> {
    let config = Config::from_env();
    tracing::debug!(?config, "Configuration loaded");

    match command {
        Commands::Migrate(args) => commands::migrate::execute(args, config).await,
        Commands::Ping(args) => commands::ping::execute(args, config).await,
    }
}

/// `--verbose` forces debug output; otherwise `RUST_LOG` decides, default info.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(filter)
        .init();
}
