//! HTTP endpoint health monitor entry point

use clap::Parser;
use healthmon::cli::Cli;
use healthmon::shutdown::{listen_for_signals, ShutdownController};
use healthmon::{
    config, logging, AvailabilityAggregator, PollingScheduler, ProbeExecutor, TextReporter,
};
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init().expect("failed to initialize logging");

    let endpoints = match config::load_endpoints(&cli.config_file) {
        Ok(endpoints) => endpoints,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let executor = match ProbeExecutor::new() {
        Ok(executor) => executor,
        Err(e) => {
            eprintln!("Error: failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = ShutdownController::default();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            // 2回目のシグナルでサイクル完了を待たずに終了
            listen_for_signals(shutdown).await;
            std::process::exit(0);
        }
    });

    let mut scheduler = PollingScheduler::new(endpoints, executor)
        .with_interval(cli.interval())
        .with_concurrency(cli.concurrency);
    let mut aggregator = AvailabilityAggregator::new();
    let mut reporter = TextReporter::stdout();

    if let Err(e) = scheduler
        .run(&mut aggregator, &mut reporter, &shutdown)
        .await
    {
        error!("Health monitor aborted: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
