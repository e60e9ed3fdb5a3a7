//! DQN agent hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Configuration for the deep Q-learning agent
///
/// All hyperparameters are fixed at agent construction. Defaults reproduce the
/// classic 11-feature snake agent.
///
/// # Example
///
/// ```rust
/// use snake_dqn::rl::AgentConfig;
///
/// let config = AgentConfig {
///     batch_size: 64,
///     seed: Some(42),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Exploration ceiling: epsilon at zero completed episodes
    ///
    /// Default: 80
    pub epsilon_start: u32,

    /// Exploration floor epsilon never drops below
    ///
    /// Default: 0
    pub epsilon_floor: u32,

    /// Exclusive upper bound of the uniform draw compared against epsilon.
    /// A random action is taken when the draw is below epsilon.
    ///
    /// Default: 200
    pub exploration_range: u32,

    /// Discount factor for future rewards (gamma)
    ///
    /// Default: 0.9
    pub gamma: f32,

    /// Learning rate for the Adam optimizer
    ///
    /// Default: 1e-3
    pub learning_rate: f64,

    /// Maximum number of transitions replayed at the end of an episode
    ///
    /// Default: 1000
    pub batch_size: usize,

    /// Replay memory capacity; the oldest transition is evicted beyond it
    ///
    /// Default: 100_000
    pub memory_capacity: usize,

    /// Width of the hidden layer of the Q-network
    ///
    /// Default: 256
    pub hidden_size: usize,

    /// Seed for the shared random source and network initialization.
    /// `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            epsilon_start: 80,
            epsilon_floor: 0,
            exploration_range: 200,
            gamma: 0.9,
            learning_rate: 1e-3,
            batch_size: 1000,
            memory_capacity: 100_000,
            hidden_size: 256,
            seed: None,
        }
    }
}

impl AgentConfig {
    /// Create a new configuration with default hyperparameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Epsilon after `n_games` completed episodes:
    /// `max(floor, epsilon_start - n_games)`
    pub fn epsilon(&self, n_games: usize) -> u32 {
        let decayed = (self.epsilon_start as usize).saturating_sub(n_games) as u32;
        decayed.max(self.epsilon_floor)
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` with an error message otherwise.
    ///
    /// # Example
    ///
    /// ```rust
    /// use snake_dqn::rl::AgentConfig;
    ///
    /// let mut config = AgentConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.learning_rate = -0.1;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), String> {
        if self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            ));
        }

        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(format!("gamma must be in [0, 1], got {}", self.gamma));
        }

        if self.epsilon_floor > self.epsilon_start {
            return Err(format!(
                "epsilon_floor ({}) must not exceed epsilon_start ({})",
                self.epsilon_floor, self.epsilon_start
            ));
        }

        if self.exploration_range == 0 {
            return Err("exploration_range must be at least 1".to_string());
        }

        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }

        if self.memory_capacity == 0 {
            return Err("memory_capacity must be at least 1".to_string());
        }

        if self.hidden_size == 0 {
            return Err("hidden_size must be at least 1".to_string());
        }

        Ok(())
    }
}
