//! Deep Q-learning for the snake game
//!
//! Provides:
//! - 11-feature state encoding
//! - Bounded replay memory
//! - A two-layer Q-network and its semi-gradient TD(0) trainer
//! - The epsilon-greedy agent that drives the learning loop
//! - Model persistence with a JSON metadata sidecar

pub mod agent;
pub mod backend;
pub mod config;
pub mod memory;
pub mod network;
pub mod observation;
pub mod persistence;
pub mod trainer;

pub use agent::{DqnAgent, EpisodeSummary, TickOutcome};
pub use backend::{InferenceBackend, TrainingBackend, default_device};
pub use config::AgentConfig;
pub use memory::{ReplayMemory, Transition};
pub use network::{QNetwork, QNetworkConfig, argmax};
pub use observation::{STATE_SIZE, StateVector, encode_state};
pub use persistence::{
    ModelMetadata, load_agent, load_metadata, load_network, resume_or_fresh, save_model,
};
pub use trainer::QTrainer;
