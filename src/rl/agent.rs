//! Deep Q-learning agent
//!
//! Ties together state encoding, epsilon-greedy action selection, replay
//! memory and the TD trainer. Owns the Q-network and the single random
//! source used for exploration, food placement and replay sampling.

use anyhow::{Result, anyhow};
use burn::{
    module::AutodiffModule,
    tensor::backend::{AutodiffBackend, Backend},
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::config::AgentConfig;
use super::memory::{ReplayMemory, Transition};
use super::network::{QNetwork, QNetworkConfig, argmax};
use super::observation::{StateVector, encode_state};
use super::trainer::QTrainer;
use crate::game::{Action, GameEngine};

/// What happened during one tick of the learning loop
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Reward of the step
    pub reward: f32,
    /// Whether the step ended the episode
    pub done: bool,
    /// Score reached by the step
    pub score: u32,
    /// Loss of the single-sample update
    pub loss: f32,
    /// Present when the step ended an episode
    pub episode: Option<EpisodeSummary>,
}

/// End-of-episode report
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    /// Completed episodes, this one included
    pub games: usize,
    /// Final score of the episode
    pub score: u32,
    /// Best score so far
    pub record: u32,
    /// Whether this episode set a new record
    pub new_record: bool,
    /// Loss of the replay (mini-batch) update
    pub replay_loss: f32,
}

/// Epsilon-greedy DQN agent
///
/// # Example
///
/// ```rust,ignore
/// use snake_dqn::game::{GameConfig, GameEngine};
/// use snake_dqn::rl::{AgentConfig, DqnAgent, TrainingBackend, default_device};
///
/// let mut agent = DqnAgent::<TrainingBackend>::new(AgentConfig::default(), default_device())?;
/// let mut engine = GameEngine::new(GameConfig::default(), agent.rng_mut())?;
///
/// loop {
///     if let Some(episode) = agent.tick(&mut engine)?.episode {
///         println!("game {} scored {}", episode.games, episode.score);
///     }
/// }
/// ```
pub struct DqnAgent<B: AutodiffBackend> {
    /// Q-network, updated only through the trainer
    network: QNetwork<B>,

    trainer: QTrainer<B>,

    memory: ReplayMemory,

    config: AgentConfig,

    /// Completed episodes
    n_games: usize,

    /// Best episode score
    record: u32,

    /// Shared random source
    rng: ChaCha8Rng,

    device: B::Device,
}

impl<B: AutodiffBackend> DqnAgent<B> {
    /// Create an agent with a freshly initialized network
    ///
    /// A configured seed makes the agent's own generator reproducible. It is
    /// also passed to the backend for parameter initialization, but that seed
    /// is process-wide: agents built concurrently in one process share it, so
    /// identical weights are only guaranteed when construction is not
    /// interleaved with other backend draws. Use [`DqnAgent::from_parts`] with
    /// a cloned network when two agents must start from the same parameters.
    pub fn new(config: AgentConfig, device: B::Device) -> Result<Self> {
        config
            .validate()
            .map_err(|err| anyhow!("Invalid agent configuration: {err}"))?;

        if let Some(seed) = config.seed {
            <B as Backend>::seed(seed);
        }
        let network = QNetworkConfig::new(config.hidden_size).init::<B>(&device);

        Self::from_parts(config, network, 0, 0, device)
    }

    /// Create an agent around existing network parameters and progress
    /// counters (used when resuming from disk)
    pub fn from_parts(
        config: AgentConfig,
        network: QNetwork<B>,
        n_games: usize,
        record: u32,
        device: B::Device,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|err| anyhow!("Invalid agent configuration: {err}"))?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(Self {
            network,
            trainer: QTrainer::new(config.learning_rate, config.gamma, device.clone()),
            memory: ReplayMemory::new(config.memory_capacity),
            config,
            n_games,
            record,
            rng,
            device,
        })
    }

    /// Current exploration threshold
    pub fn epsilon(&self) -> u32 {
        self.config.epsilon(self.n_games)
    }

    /// Epsilon-greedy selection, returned as a one-hot `[straight, right, left]`
    ///
    /// Draws once from `0..exploration_range`; below epsilon a uniformly random
    /// action is taken, otherwise the first action with the highest Q-value.
    pub fn select_action(&mut self, state: &StateVector) -> Result<[f32; 3]> {
        let epsilon = self.epsilon();
        let action = if self.rng.gen_range(0..self.config.exploration_range) < epsilon {
            Action::ALL[self.rng.gen_range(0..Action::COUNT)]
        } else {
            self.greedy_action(state)?
        };

        Ok(action.to_one_hot())
    }

    /// Action with the highest Q-value, ties going to the first
    pub fn greedy_action(&self, state: &StateVector) -> Result<Action> {
        let q_values = self.network.valid().q_values(state, &self.device)?;
        let idx = argmax(&q_values).ok_or_else(|| anyhow!("Q-network produced no values"))?;
        Ok(Action::from_index(idx)?)
    }

    /// Record a transition in replay memory
    pub fn remember(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// Single-sample update on the latest transition
    pub fn train_short_memory(&mut self, transition: &Transition) -> Result<f32> {
        self.trainer.train_step(&mut self.network, &[transition])
    }

    /// Mini-batch update on up to `batch_size` transitions sampled from memory
    pub fn train_long_memory(&mut self) -> Result<f32> {
        let batch = self.memory.sample(self.config.batch_size, &mut self.rng);
        self.trainer.train_step(&mut self.network, &batch)
    }

    /// One tick of the learning loop: encode, act, step, record, train.
    ///
    /// On a terminal step the engine is reset here, after the terminal
    /// transition has been recorded, and the end-of-episode work runs.
    pub fn tick(&mut self, engine: &mut GameEngine) -> Result<TickOutcome> {
        let state = encode_state(engine.state());
        let action = self.select_action(&state)?;

        let result = engine.step_one_hot(&action, &mut self.rng)?;
        let next_state = encode_state(engine.state());

        let transition = Transition {
            state,
            action,
            reward: result.reward,
            next_state,
            done: result.terminated,
        };
        let loss = self.train_short_memory(&transition)?;
        self.remember(transition);

        let episode = if result.terminated {
            engine.reset(&mut self.rng)?;
            Some(self.finish_episode(result.score)?)
        } else {
            None
        };

        Ok(TickOutcome {
            reward: result.reward,
            done: result.terminated,
            score: result.score,
            loss,
            episode,
        })
    }

    /// End-of-episode work: count the game, replay a mini-batch, track the record
    pub fn finish_episode(&mut self, score: u32) -> Result<EpisodeSummary> {
        self.n_games += 1;
        let replay_loss = self.train_long_memory()?;

        let new_record = score > self.record;
        if new_record {
            self.record = score;
        }

        debug!(
            games = self.n_games,
            score,
            replay_loss,
            memory = self.memory.len(),
            "episode finished"
        );

        Ok(EpisodeSummary {
            games: self.n_games,
            score,
            record: self.record,
            new_record,
            replay_loss,
        })
    }

    /// Completed episodes
    pub fn n_games(&self) -> usize {
        self.n_games
    }

    /// Best episode score
    pub fn record(&self) -> u32 {
        self.record
    }

    /// Get a reference to the Q-network
    pub fn network(&self) -> &QNetwork<B> {
        &self.network
    }

    /// Get a reference to the agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Get a reference to the replay memory
    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    /// Shared random source, for engine construction and resets
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Device for tensor operations
    pub fn device(&self) -> &B::Device {
        &self.device
    }
}
