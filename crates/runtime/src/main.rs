//! # Band Agent
//!
//! Listens for a single band-power streamer, acts on every packet it sends,
//! and applies one policy-gradient update when the episode ends.

#![deny(clippy::all, clippy::pedantic)]

use agent::Agent;
use anyhow::{Context, Result};
use clap::Parser;
use runtime::cli::Cli;
use runtime::{listen, StreamLoop};

fn main() -> Result<()> {
    runtime::logging::init();
    let cli = Cli::parse();

    let config = cli.agent_config()?;
    tracing::info!(?config, "Starting agent");
    let mut agent = Agent::new(config).context("building agent")?;

    let addr = cli.listen_addr();
    let listener = listen(&addr).with_context(|| format!("binding {addr}"))?;
    let summary = StreamLoop::new(&mut agent)
        .serve(&listener)
        .context("accepting connection")?;

    tracing::info!(
        packets = summary.packets,
        discarded = summary.discarded,
        completed = summary.completed,
        trained = summary.report.is_some(),
        "Session finished"
    );
    Ok(())
}
