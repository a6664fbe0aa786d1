//! Command line for the `band_agent` binary.
//!
//! Configuration is layered: a JSON file given with `--config` is loaded
//! first, then any learning flags on the command line override it. Without a
//! config file `--target-ratios` is required.

use agent::{ActivationKind, AgentConfig, OptimizerKind, TargetRatios};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "band_agent", about = "Online policy-gradient agent over streamed band-power packets")]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "BAND_AGENT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "BAND_AGENT_PORT", default_value_t = 5000)]
    pub port: u16,

    /// JSON agent configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Target share of alpha,beta,delta,theta,gamma (e.g. 0.4,0.2,0.1,0.2,0.1)
    #[arg(long, value_delimiter = ',')]
    pub target_ratios: Option<Vec<f32>>,

    #[arg(long)]
    pub discount_factor: Option<f32>,

    /// Steps per episode
    #[arg(long)]
    pub episode_length: Option<usize>,

    #[arg(long)]
    pub action_count: Option<usize>,

    #[arg(long)]
    pub learning_rate: Option<f32>,

    /// Width of the policy's hidden layer
    #[arg(long)]
    pub hidden_width: Option<usize>,

    /// Hidden activation: relu or tanh
    #[arg(long)]
    pub activation: Option<ActivationKind>,

    /// Optimizer: adam or sgd
    #[arg(long)]
    pub optimizer: Option<OptimizerKind>,

    /// Seed for weight initialisation and action sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip the update when the stream ends before the episode completes
    #[arg(long)]
    pub no_partial_training: bool,
}

impl Cli {
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the validated agent configuration.
    ///
    /// # Errors
    ///
    /// Fails if the config file cannot be loaded, no target is given, or the
    /// merged configuration does not validate.
    pub fn agent_config(&self) -> Result<AgentConfig> {
        let mut config = match &self.config {
            Some(path) => AgentConfig::from_path(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => {
                let ratios = self
                    .target_ratios
                    .as_deref()
                    .ok_or_else(|| anyhow!("--target-ratios is required without --config"))?;
                AgentConfig::new(parse_target(ratios)?)
            }
        };

        if let (Some(_), Some(ratios)) = (&self.config, &self.target_ratios) {
            config.target_ratios = parse_target(ratios)?;
        }
        if let Some(v) = self.discount_factor {
            config.discount_factor = v;
        }
        if let Some(v) = self.episode_length {
            config.episode_length = v;
        }
        if let Some(v) = self.action_count {
            config.action_count = v;
        }
        if let Some(v) = self.learning_rate {
            config.learning_rate = v;
        }
        if let Some(v) = self.hidden_width {
            config.hidden_width = v;
        }
        if let Some(v) = self.activation {
            config.activation = v;
        }
        if let Some(v) = self.optimizer {
            config.optimizer = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.no_partial_training {
            config.train_on_partial_episode = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_target(ratios: &[f32]) -> Result<TargetRatios> {
    let ratios: [f32; 5] = ratios
        .try_into()
        .map_err(|_| anyhow!("--target-ratios needs exactly 5 values, got {}", ratios.len()))?;
    Ok(TargetRatios::new(ratios)?)
}
