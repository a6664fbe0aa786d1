//! # Band Feed
//!
//! Replays newline-delimited band packets from a file (or stdin) to a
//! running `band_agent`, standing in for a live headset streamer.

#![deny(clippy::all, clippy::pedantic)]

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "band_feed", about = "Stream band-power packets to a band_agent")]
struct Cli {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Packet file, one JSON object per line; stdin when omitted
    input: Option<PathBuf>,

    /// Pause between packets in milliseconds
    #[arg(long, default_value_t = 0)]
    interval_ms: u64,
}

fn main() -> Result<()> {
    runtime::logging::init();
    let cli = Cli::parse();

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let addr = format!("{}:{}", cli.host, cli.port);
    let mut stream = TcpStream::connect(&addr).with_context(|| format!("connecting to {addr}"))?;
    tracing::info!("Connected to {addr}");

    let interval = Duration::from_millis(cli.interval_ms);
    let mut sent = 0usize;
    for line in reader.lines() {
        let line = line.context("reading packets")?;
        if line.trim().is_empty() {
            continue;
        }
        let mut packet = line.trim_end().to_owned();
        packet.push('\n');
        match stream.write_all(packet.as_bytes()) {
            Ok(()) => sent += 1,
            Err(e) if matches!(e.kind(), io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset) => {
                tracing::info!(sent, "Agent closed the connection");
                return Ok(());
            }
            Err(e) => return Err(e).context("sending packet"),
        }
        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }
    stream.flush()?;
    tracing::info!(sent, "Finished streaming");
    Ok(())
}
