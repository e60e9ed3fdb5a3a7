use serde::{Deserialize, Serialize};

use super::engine::GameError;

/// Configuration for the game
///
/// Dimensions are in pixels; the snake moves on a lattice with a pitch of
/// `block_size` pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the playing field in pixels
    pub width: i32,
    /// Height of the playing field in pixels
    pub height: i32,
    /// Size of one grid cell in pixels
    pub block_size: i32,
    /// Initial length of the snake
    pub initial_length: usize,

    // Rewards (for RL)
    /// Reward for eating food
    pub food_reward: f32,
    /// Penalty for dying
    pub death_penalty: f32,
    /// An episode ends once the frame counter exceeds this many frames per
    /// snake segment
    pub stagnation_factor: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            block_size: 20,
            initial_length: 3,
            food_reward: 10.0,
            death_penalty: -10.0,
            stagnation_factor: 100,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with a custom field size in pixels
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Create a 10x10 cell field for testing
    pub fn small() -> Self {
        Self::new(200, 200)
    }

    /// Number of grid columns
    pub fn columns(&self) -> i32 {
        self.width / self.block_size
    }

    /// Number of grid rows
    pub fn rows(&self) -> i32 {
        self.height / self.block_size
    }

    /// Total number of grid cells
    pub fn cell_count(&self) -> usize {
        (self.columns().max(0) as usize) * (self.rows().max(0) as usize)
    }

    /// Check that the field is a whole number of cells and fits the initial snake
    pub fn validate(&self) -> Result<(), GameError> {
        if self.block_size <= 0 {
            return Err(GameError::InvalidConfig(format!(
                "block_size must be positive, got {}",
                self.block_size
            )));
        }

        if self.width <= 0 || self.height <= 0 {
            return Err(GameError::InvalidConfig(format!(
                "field must have a positive size, got {}x{}",
                self.width, self.height
            )));
        }

        if self.width % self.block_size != 0 || self.height % self.block_size != 0 {
            return Err(GameError::InvalidConfig(format!(
                "field {}x{} is not a multiple of block_size {}",
                self.width, self.height, self.block_size
            )));
        }

        if self.initial_length == 0 {
            return Err(GameError::InvalidConfig(
                "initial_length must be at least 1".to_string(),
            ));
        }

        // The snake starts centered heading right, its tail extending left.
        let head_column = self.columns() / 2;
        if head_column + 1 < self.initial_length as i32 {
            return Err(GameError::InvalidConfig(format!(
                "a snake of length {} does not fit left of the center of {} columns",
                self.initial_length,
                self.columns()
            )));
        }

        if self.initial_length >= self.cell_count() {
            return Err(GameError::InvalidConfig(format!(
                "initial_length {} leaves no room for food on {} cells",
                self.initial_length,
                self.cell_count()
            )));
        }

        if self.stagnation_factor == 0 {
            return Err(GameError::InvalidConfig(
                "stagnation_factor must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
        assert_eq!(config.block_size, 20);
        assert_eq!(config.initial_length, 3);
        assert_eq!(config.columns(), 32);
        assert_eq!(config.rows(), 24);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(300, 200);
        assert_eq!(config.columns(), 15);
        assert_eq!(config.rows(), 10);
        assert_eq!(config.cell_count(), 150);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(GameConfig::new(210, 200).validate().is_err());
        assert!(GameConfig::new(0, 200).validate().is_err());
        assert!(GameConfig::new(40, 40).validate().is_err());

        let config = GameConfig {
            block_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
