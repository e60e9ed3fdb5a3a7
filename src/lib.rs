//! Snake DQN - a snake game learned with deep Q-learning
//!
//! This library provides:
//! - Core game logic on a pixel grid (game module)
//! - State encoding, replay memory, Q-network and agent (rl module)
//! - Score history and loss reporting (metrics module)
//! - Training, greedy play and the start-up menu (modes module)

pub mod game;
pub mod metrics;
pub mod modes;
pub mod rl;
