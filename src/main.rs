use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use order_approval::config::{Settings, load_directories};
use order_approval::console::ConsoleGateway;
use order_approval::context::DecisionJournal;
use order_approval::gateway::ChatGateway;
use order_approval::registry::OrderRegistry;
use order_approval::router::{HandlerSet, Router};
use order_approval::service::OrderService;
use order_approval::types::InboundMessage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::parse().validate()?;

    // stdout carries the console transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let directories = match &settings.members_file {
        Some(path) => load_directories(path).context("Loading member directories: ")?,
        None => Vec::new(),
    };
    info!(directories = directories.len(), "starting order approval bot");

    let settings = Arc::new(settings);
    let gateway: Arc<dyn ChatGateway> = Arc::new(ConsoleGateway::new(directories));
    let service = Arc::new(OrderService::new(
        OrderRegistry::new(),
        DecisionJournal::new(),
        gateway.clone(),
        settings.clone(),
    ));
    let router = Router::new(service, gateway, settings.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut handlers = HandlerSet::new();
    while let Some(line) = lines.next_line().await.context("Reading stdin: ")? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<InboundMessage>(&line) {
            Ok(message) => handlers.spawn(&router, message),
            Err(e) => warn!(error = %e, "ignoring malformed inbound line"),
        }
    }

    handlers.drain().await;
    // give deferred deletions their chance before the process exits
    let grace = settings.cleanup_delay().max(settings.redirect_delete_delay());
    info!(seconds = grace.as_secs(), "input closed, waiting for deferred cleanups");
    tokio::time::sleep(grace).await;
    Ok(())
}
