use clap::Parser;
use color_eyre::Result;
use commands::Command;

mod barcode;
mod commands;
mod http_server;
mod jobs;
mod mailer;
mod planner;
mod recommendations;
mod seed;
mod setup;
mod state;

pub(crate) use state::AppState;

#[derive(Parser)]
#[command(author, version, about)]
struct CliArgs {
    #[clap(subcommand)]
    command: Option<Command>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _sentry_guard = setup::setup_sentry();

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()?
        .block_on(async { _main().await })
}

async fn _main() -> Result<()> {
    setup::setup_tracing()?;

    let cli = CliArgs::parse();
    let command = cli.command.unwrap_or_default();

    command.run().await
}
