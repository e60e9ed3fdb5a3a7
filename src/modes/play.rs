//! Greedy play mode for evaluating a saved model
//!
//! Loads the Q-network from disk and lets it play complete games without
//! exploration or learning, logging each final score.

use anyhow::{Context, Result};
use burn::tensor::backend::Backend;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tracing::info;

use crate::game::{Action, GameConfig, GameEngine};
use crate::rl::{QNetwork, QNetworkConfig, argmax, encode_state, load_network};

/// Configuration for play mode
#[derive(Debug, Clone)]
pub struct PlayConfig {
    /// Saved model to load
    pub model_path: PathBuf,

    /// Number of games to play
    pub num_games: usize,

    /// Hidden width the saved network is expected to have
    pub hidden_size: usize,

    /// Seed for food placement; `None` uses OS entropy
    pub seed: Option<u64>,

    pub game_config: GameConfig,
}

impl PlayConfig {
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            num_games: 10,
            hidden_size: QNetworkConfig::default().hidden_size,
            seed: None,
            game_config: GameConfig::default(),
        }
    }
}

/// Greedy evaluation of a saved Q-network
pub struct PlayMode<B: Backend> {
    network: QNetwork<B>,
    engine: GameEngine,
    rng: ChaCha8Rng,
    device: B::Device,
    num_games: usize,
}

impl<B: Backend> PlayMode<B> {
    /// Load the model; there is nothing to play without one
    pub fn new(config: PlayConfig, device: B::Device) -> Result<Self> {
        let expected = QNetworkConfig::new(config.hidden_size);
        let (network, metadata) = load_network::<B>(&config.model_path, &expected, &device)
            .with_context(|| format!("No playable model at {:?}", config.model_path))?;

        info!(
            episodes_trained = metadata.episodes_trained,
            record = metadata.record,
            "Loaded model for play"
        );

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let engine = GameEngine::new(config.game_config, &mut rng)
            .context("Failed to start the game")?;

        Ok(Self {
            network,
            engine,
            rng,
            device,
            num_games: config.num_games,
        })
    }

    /// Play every configured game, returning the final scores
    pub fn run(&mut self) -> Result<Vec<u32>> {
        let mut scores = Vec::with_capacity(self.num_games);

        for game in 1..=self.num_games {
            let score = self.play_game()?;
            info!(game, score, "Game over");
            scores.push(score);
        }

        if let Some(best) = scores.iter().max() {
            let mean = scores.iter().sum::<u32>() as f32 / scores.len() as f32;
            info!(games = scores.len(), best, mean, "Play finished");
        }

        Ok(scores)
    }

    /// Play one game to its end and reset for the next
    pub fn play_game(&mut self) -> Result<u32> {
        loop {
            let action = self.greedy_action()?;
            let result = self.engine.step(action, &mut self.rng)?;

            if result.terminated {
                self.engine.reset(&mut self.rng)?;
                return Ok(result.score);
            }
        }
    }

    fn greedy_action(&self) -> Result<Action> {
        let state = encode_state(self.engine.state());
        let q_values = self.network.q_values(&state, &self.device)?;
        let idx = argmax(&q_values).context("Q-network produced no values")?;
        Ok(Action::from_index(idx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{
        AgentConfig, DqnAgent, InferenceBackend, TrainingBackend, default_device, save_model,
    };
    use tempfile::TempDir;

    fn saved_model(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("model.mpk");
        let config = AgentConfig {
            hidden_size: 8,
            seed: Some(21),
            ..Default::default()
        };
        let agent = DqnAgent::<TrainingBackend>::new(config, default_device()).unwrap();
        save_model(&agent, &path).unwrap();
        path
    }

    fn play_config(path: PathBuf) -> PlayConfig {
        PlayConfig {
            num_games: 2,
            hidden_size: 8,
            seed: Some(4),
            game_config: GameConfig::small(),
            ..PlayConfig::new(path)
        }
    }

    #[test]
    fn test_missing_model_is_error() {
        let dir = TempDir::new().unwrap();
        let config = play_config(dir.path().join("absent.mpk"));

        assert!(PlayMode::<InferenceBackend>::new(config, default_device()).is_err());
    }

    #[test]
    fn test_plays_requested_games() {
        let dir = TempDir::new().unwrap();
        let config = play_config(saved_model(&dir));

        let mut play = PlayMode::<InferenceBackend>::new(config, default_device()).unwrap();
        let scores = play.run().unwrap();
        assert_eq!(scores.len(), 2);
    }

    #[test]
    fn test_seeded_play_is_reproducible() {
        let dir = TempDir::new().unwrap();
        let path = saved_model(&dir);

        let mut a =
            PlayMode::<InferenceBackend>::new(play_config(path.clone()), default_device()).unwrap();
        let mut b =
            PlayMode::<InferenceBackend>::new(play_config(path), default_device()).unwrap();
        assert_eq!(a.run().unwrap(), b.run().unwrap());
    }
}
