use anyhow::Context;
use clap::Parser;
use lilurl_console::{telemetry, Cli, Console, Launcher, NoBrowser, SystemBrowser};
use lilurl_generator::HashGenerator;
use lilurl_registry::{spawn_sweeper, AccessController};
use lilurl_storage::{InMemoryEntryStore, UserRegistry};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format);

    info!(
        expiry = %cli.expiry,
        base_url = %cli.base_url,
        access_limit = cli.access_limit,
        sweep_interval = ?cli.sweep_interval,
        no_browser = cli.no_browser,
        "starting lilurl console"
    );

    let controller = AccessController::new(
        Arc::new(InMemoryEntryStore::new()),
        Arc::new(UserRegistry::new()),
        HashGenerator::new(),
        cli.settings(),
    )
    .context("invalid configuration")?;
    let controller = Arc::new(controller);

    let sweeper = cli
        .sweep_interval
        .map(|every| spawn_sweeper(Arc::clone(&controller), every));

    let launcher: Arc<dyn Launcher> = if cli.no_browser {
        Arc::new(NoBrowser)
    } else {
        Arc::new(SystemBrowser)
    };

    let mut console = Console::new(
        controller,
        launcher,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    );

    tokio::select! {
        result = console.run() => result.context("console i/o failed")?,
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }

    if let Some(sweeper) = sweeper {
        sweeper.stop().await;
    }

    Ok(())
}
