//! Keel CLI Application
//!
//! Operator and ingress command line for the keel phase engine.

mod args;
mod cli;
mod renderer;

use std::sync::Arc;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use keel_core::{EngineBuilder, JsonLinesSink, LogSink};
use log::info;
use renderer::TerminalRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let renderer = TerminalRenderer::new(!args.no_color);

    let mut builder = EngineBuilder::new()
        .with_database_path(args.database_file.as_ref())
        .with_tick_delay(args.tick_delay)
        .with_call_timeout(args.call_timeout)
        .with_anchor_config(args.anchor_config())
        .with_webhook_urls(args.webhook_url.clone())
        .with_sink(Arc::new(LogSink));

    if let Some(path) = &args.events_file {
        let sink = JsonLinesSink::open(path).context("Failed to open events file")?;
        builder = builder.with_sink(Arc::new(sink));
    }
    if let Commands::Work(work) = &args.command {
        builder = builder
            .with_poll_interval(work.sleep)
            .with_boot_tick_all(work.boot_tick_all);
    }

    let engine = builder
        .build()
        .await
        .context("Failed to initialize engine")?;

    info!("Keel started");

    Cli::new(Arc::new(engine), renderer)
        .handle_command(args.command)
        .await
}
