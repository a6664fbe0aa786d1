//! # agent
//!
//! The closed learning loop behind the band-power agent: feature packets
//! update an [`EnvironmentState`], a [`StochasticPolicy`](ml::StochasticPolicy)
//! picks an action, a potential-based [`RewardModel`] scores the move towards
//! the configured band ratios, and the resulting [`Trajectory`] is turned
//! into a single REINFORCE update by the [`Trainer`] once the episode ends.
//!
//! [`Agent`] bundles all of it so that a driver (the TCP stream loop in the
//! `runtime` crate, or a test) only has to feed it packets.

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]

pub mod agent;
pub mod config;
pub mod error;
pub mod features;
pub mod packet;
pub mod reward;
pub mod state;
pub mod trainer;
pub mod trajectory;

pub use agent::{Agent, StepRecord};
pub use config::{ActivationKind, AgentConfig, OptimizerKind};
pub use error::AgentError;
pub use features::{FeatureVector, BAND_COUNT, BAND_NAMES};
pub use packet::BandPacket;
pub use reward::{normalized_ratios, RewardModel, TargetRatios};
pub use state::EnvironmentState;
pub use trainer::{discounted_returns, normalize_returns, policy_gradient_loss, EpisodeReport, Trainer};
pub use trajectory::Trajectory;
