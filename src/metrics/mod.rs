//! Reporting of training progress

pub mod training_stats;

pub use training_stats::TrainingStats;
