use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use blogflow::prelude::*;

mod api;

#[derive(Parser)]
#[command(name = "blogflow", version, about = "Content pipeline for a network of blogs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the results logger and run the scheduler on a timer
    Serve,
    /// Run the scheduler once
    Tick,
    /// Feed one storage-created event to the stages
    Dispatch {
        /// Artifact key relative to the storage root, e.g. generated/R1/content.md
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config.logging)?;
    config.log_keys();

    let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(config.storage.root.clone()));
    let loggers = LoggerRegistry::new();
    let dispatcher = Arc::new(Dispatcher::from_config(
        &config,
        store.clone(),
        &loggers,
        Arc::new(LoggingEventSink::default()),
    ));

    match cli.command {
        Command::Serve => serve(config, store, dispatcher).await,
        Command::Tick => report(&dispatcher.dispatch(&Trigger::Timer).await),
        Command::Dispatch { path } => report(&dispatcher.dispatch(&Trigger::ArtifactCreated(path)).await),
    }
}

/// Prints one line per stage and fails if any stage failed.
fn report(outputs: &[(String, StageOutput)]) -> Result<()> {
    if outputs.is_empty() {
        println!("no stage handles this trigger");
    }
    for (stage, output) in outputs {
        match output.reason() {
            Some(reason) => println!("{stage}: {} ({reason})", output.status),
            None => println!("{stage}: {}", output.status),
        }
    }
    if outputs.iter().any(|(_, o)| o.is_failure()) {
        anyhow::bail!("one or more stages failed");
    }
    Ok(())
}

async fn serve(config: Config, store: Arc<dyn BlobStore>, dispatcher: Arc<Dispatcher>) -> Result<()> {
    let tick = config.scheduler.tick();
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        loop {
            interval.tick().await;
            dispatcher.dispatch(&Trigger::Timer).await;
        }
    });
    tracing::info!(tick_secs = tick.as_secs(), "Scheduler timer started");

    let app = api::create_router(Arc::new(api::AppState {
        store,
        environment: config.environment.clone(),
    }));

    let addr = &config.server.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    ticker.abort();
    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
