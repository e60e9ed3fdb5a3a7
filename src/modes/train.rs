//! Training mode for the DQN agent
//!
//! Runs the agent's tick loop episode after episode, reports progress through
//! [`TrainingStats`] and saves the model whenever a new record score is set.
//!
//! # Example
//!
//! ```rust,ignore
//! use snake_dqn::modes::{TrainConfig, TrainMode};
//! use snake_dqn::rl::{TrainingBackend, default_device};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig {
//!     num_episodes: Some(500),
//!     ..TrainConfig::new(PathBuf::from("model/model.mpk"))
//! };
//!
//! let mut train_mode = TrainMode::<TrainingBackend>::new(config, default_device())?;
//! train_mode.run()?;
//! ```

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::game::{GameConfig, GameEngine};
use crate::metrics::TrainingStats;
use crate::rl::{AgentConfig, DqnAgent, EpisodeSummary, resume_or_fresh, save_model};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to run; `None` trains until the process is stopped
    pub num_episodes: Option<usize>,

    /// Where the model is saved on every new record
    pub save_path: PathBuf,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// Start from the model at `save_path` instead of fresh parameters
    pub resume: bool,

    /// Game configuration (field size, rewards)
    pub game_config: GameConfig,

    /// DQN hyperparameters
    pub agent_config: AgentConfig,
}

impl TrainConfig {
    /// Create an open-ended, fresh training configuration with defaults
    pub fn new(save_path: PathBuf) -> Self {
        Self {
            num_episodes: None,
            save_path,
            log_frequency: 1,
            resume: false,
            game_config: GameConfig::default(),
            agent_config: AgentConfig::default(),
        }
    }
}

/// Training mode for the DQN agent
pub struct TrainMode<B: AutodiffBackend> {
    agent: DqnAgent<B>,

    engine: GameEngine,

    /// Training statistics tracker
    stats: TrainingStats,

    config: TrainConfig,
}

impl<B: AutodiffBackend> TrainMode<B> {
    /// Create a training mode, resuming from disk when configured to
    pub fn new(config: TrainConfig, device: B::Device) -> Result<Self> {
        let mut agent = if config.resume {
            resume_or_fresh::<B>(config.agent_config.clone(), &config.save_path, device)?
        } else {
            DqnAgent::new(config.agent_config.clone(), device)?
        };

        let engine = GameEngine::new(config.game_config.clone(), agent.rng_mut())
            .context("Failed to start the game")?;

        // 100-episode rolling window
        let stats = TrainingStats::new(100).with_record(agent.record());

        Ok(Self {
            agent,
            engine,
            stats,
            config,
        })
    }

    /// Run the training loop
    ///
    /// Returns the accumulated statistics once `num_episodes` episodes have
    /// completed. With no episode limit this only returns on error.
    pub fn run(&mut self) -> Result<&TrainingStats> {
        self.log_header();

        let mut completed = 0;
        while self.config.num_episodes.is_none_or(|limit| completed < limit) {
            let summary = self.run_episode()?;
            completed += 1;

            self.stats.record_episode(summary.score);

            if summary.new_record {
                save_model(&self.agent, &self.config.save_path).with_context(|| {
                    format!("Failed to save model to {:?}", self.config.save_path)
                })?;
                info!(
                    game = summary.games,
                    record = summary.record,
                    path = %self.config.save_path.display(),
                    "New record, model saved"
                );
            }

            if self.config.log_frequency > 0 && completed % self.config.log_frequency == 0 {
                info!(
                    game = summary.games,
                    score = summary.score,
                    record = summary.record,
                    mean_score = self.stats.mean_score(),
                    epsilon = self.agent.epsilon(),
                    "Episode finished"
                );
            }
        }

        info!("Training complete: {}", self.stats.format_summary());
        Ok(&self.stats)
    }

    /// Tick until the current episode ends
    fn run_episode(&mut self) -> Result<EpisodeSummary> {
        loop {
            let outcome = self.agent.tick(&mut self.engine)?;

            if let Some(summary) = outcome.episode {
                self.stats.record_losses(outcome.loss, summary.replay_loss);
                debug!(
                    game = summary.games,
                    short_loss = outcome.loss,
                    replay_loss = summary.replay_loss,
                    "Episode losses"
                );
                return Ok(summary);
            }
        }
    }

    /// Get a reference to the agent being trained
    pub fn agent(&self) -> &DqnAgent<B> {
        &self.agent
    }

    /// Get a reference to the training statistics
    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    fn log_header(&self) {
        let game = &self.config.game_config;
        let agent = &self.config.agent_config;
        info!(
            episodes = ?self.config.num_episodes,
            width = game.width,
            height = game.height,
            block = game.block_size,
            "Starting DQN training"
        );
        info!(
            learning_rate = agent.learning_rate,
            gamma = agent.gamma,
            batch_size = agent.batch_size,
            memory = agent.memory_capacity,
            hidden = agent.hidden_size,
            resumed_games = self.agent.n_games(),
            "Agent configuration"
        );
    }
}
