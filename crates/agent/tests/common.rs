#![allow(dead_code)]

use agent::{AgentConfig, FeatureVector, TargetRatios};

pub fn close(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() < tol
}

pub fn config(target: [f32; 5], episode_length: usize) -> AgentConfig {
    let mut config = AgentConfig::new(TargetRatios::new(target).unwrap());
    config.episode_length = episode_length;
    config.seed = Some(17);
    config
}

pub fn random_features(rng: &mut fastrand::Rng) -> FeatureVector {
    FeatureVector([rng.f32() * 10.0, rng.f32() * 10.0, rng.f32() * 10.0, rng.f32() * 10.0, rng.f32() * 10.0])
}
