//! # Stream Loop
//!
//! Drives one episode from a single byte-stream connection.
//!
//! The loop moves through three phases: [`StreamPhase::Listening`] while it
//! waits for the one client it will ever accept, [`StreamPhase::Streaming`]
//! while it consumes newline-delimited packets, and [`StreamPhase::Finished`]
//! once the episode threshold is hit or the peer stops sending. Finishing
//! hands the trajectory to the trainer.
//!
//! Everything is blocking and single-threaded. The only suspension point is
//! the read for the next chunk of bytes; every complete line in the buffer is
//! processed before reading again. A line that grows past [`MAX_LINE_LEN`]
//! is discarded as malformed and its remaining bytes are skipped up to the
//! next newline.

use agent::{Agent, AgentError, BandPacket, EpisodeReport};
use ml::StochasticPolicy;
use std::io::{ErrorKind, Read};
use std::net::{TcpListener, ToSocketAddrs};
use tracing::{debug, info, warn};

pub const READ_CHUNK: usize = 1024;
pub const MAX_LINE_LEN: usize = 64 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamPhase {
    Listening,
    Streaming,
    Finished,
}

/// Outcome of one streamed episode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSummary {
    /// Valid packets consumed, one agent step each.
    pub packets: usize,
    /// Lines discarded as malformed.
    pub discarded: usize,
    /// Whether the episode reached its step threshold.
    pub completed: bool,
    pub report: Option<EpisodeReport>,
}

/// Binds the listening socket.
///
/// # Errors
///
/// Returns the bind error unchanged; there is no retry.
pub fn listen(addr: impl ToSocketAddrs) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(addr)?;
    info!("Listening on {}", listener.local_addr()?);
    Ok(listener)
}

pub struct StreamLoop<'a, P> {
    agent: &'a mut Agent<P>,
    phase: StreamPhase,
    buffer: Vec<u8>,
    // bytes of `buffer` already known to hold no newline
    scanned: usize,
    // inside an overlong line that has already been counted
    skipping: bool,
    packets: usize,
    discarded: usize,
}

impl<'a, P: StochasticPolicy> StreamLoop<'a, P> {
    #[must_use]
    pub fn new(agent: &'a mut Agent<P>) -> Self {
        Self {
            agent,
            phase: StreamPhase::Listening,
            buffer: Vec::with_capacity(READ_CHUNK),
            scanned: 0,
            skipping: false,
            packets: 0,
            discarded: 0,
        }
    }

    #[must_use]
    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// Accepts exactly one connection from `listener` and streams it.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Io`] if accepting fails.
    pub fn serve(&mut self, listener: &TcpListener) -> Result<SessionSummary, AgentError> {
        self.transition(StreamPhase::Listening);
        let (stream, peer) = listener.accept()?;
        info!("Connected by {peer}");
        Ok(self.run(stream))
    }

    /// Streams packets from `reader` until the episode completes or the
    /// reader is exhausted, then finishes the episode.
    pub fn run<R: Read>(&mut self, mut reader: R) -> SessionSummary {
        self.transition(StreamPhase::Streaming);
        let mut chunk = [0u8; READ_CHUNK];
        let completed = 'read: loop {
            if self.agent.is_episode_complete() {
                break true;
            }
            let n = match reader.read(&mut chunk) {
                Ok(0) => break false,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("Connection read failed, ending episode: {e}");
                    break false;
                }
            };
            self.buffer.extend_from_slice(&chunk[..n]);
            while let Some(pos) = self.next_newline() {
                let line: Vec<u8> = self.buffer.drain(..=pos).collect();
                if std::mem::take(&mut self.skipping) {
                    continue;
                }
                if pos > MAX_LINE_LEN {
                    self.reject_overlong();
                    continue;
                }
                self.handle_line(&line[..pos]);
                if self.agent.is_episode_complete() {
                    break 'read true;
                }
            }
            if self.buffer.len() > MAX_LINE_LEN {
                if !self.skipping {
                    self.reject_overlong();
                    self.skipping = true;
                }
                self.buffer.clear();
                self.scanned = 0;
            }
        };

        if !completed && !self.buffer.is_empty() {
            debug!(bytes = self.buffer.len(), "dropping unterminated trailing line");
        }
        self.buffer.clear();
        self.scanned = 0;
        self.skipping = false;
        self.transition(StreamPhase::Finished);

        let report = self.agent.finish_episode(completed);
        SessionSummary {
            packets: self.packets,
            discarded: self.discarded,
            completed,
            report,
        }
    }

    /// Index of the first newline in the buffer, resuming the search where the
    /// previous call stopped.
    fn next_newline(&mut self) -> Option<usize> {
        match self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
            Some(offset) => {
                let pos = self.scanned + offset;
                self.scanned = 0;
                Some(pos)
            }
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    fn reject_overlong(&mut self) {
        self.discarded += 1;
        warn!("Bad packet: {}", AgentError::LineTooLong { limit: MAX_LINE_LEN });
    }

    fn handle_line(&mut self, line: &[u8]) {
        match BandPacket::parse_bytes(line) {
            Ok(Some(packet)) => {
                let record = self.agent.step(packet.features());
                self.packets += 1;
                info!(
                    step = record.step,
                    state = %record.state,
                    action = record.action,
                    reward = record.reward,
                    "step"
                );
            }
            Ok(None) => {}
            Err(e) => {
                self.discarded += 1;
                warn!("Bad packet: {e}");
            }
        }
    }

    fn transition(&mut self, next: StreamPhase) {
        if self.phase != next {
            debug!(from = ?self.phase, to = ?next, "stream phase");
            self.phase = next;
        }
    }
}
