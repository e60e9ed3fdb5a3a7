//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Randomness is borrowed from the caller so a single seeded generator can drive
//! food placement alongside the agent's own draws.

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::GameConfig;
pub use engine::{GameEngine, GameError, StepInfo, StepResult};
pub use state::{CollisionType, GameState, Point, Snake};
