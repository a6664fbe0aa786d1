//! # Band Agent Runtime
//!
//! Process-level plumbing around the [`agent`] crate: the command line and
//! configuration loader, logging setup, and the blocking TCP
//! [`StreamLoop`](stream::StreamLoop) that feeds line-delimited band packets
//! into an [`Agent`](agent::Agent).

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod logging;
pub mod stream;

pub use stream::{listen, SessionSummary, StreamLoop, StreamPhase, MAX_LINE_LEN};
