use super::{
    action::{Action, Direction},
    config::GameConfig,
    state::{CollisionType, GameState, Point, Snake},
};
use rand::{Rng, seq::SliceRandom};

/// Errors raised by the game simulation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("Invalid action: {reason}")]
    InvalidAction { reason: String },
    #[error("No free cell left for food on a grid of {cells} cells")]
    GridFull { cells: usize },
    #[error("Invalid game configuration: {0}")]
    InvalidConfig(String),
}

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Reward for this step (for RL training)
    pub reward: f32,
    /// Whether the episode has terminated
    pub terminated: bool,
    /// Score after this step
    pub score: u32,
    /// Additional information about the step
    pub info: StepInfo,
}

/// The game engine that owns the snake state and handles all game logic.
///
/// A terminal step leaves the dead state in place; callers decide when to
/// [`GameEngine::reset`].
pub struct GameEngine {
    config: GameConfig,
    state: GameState,
}

impl GameEngine {
    /// Create a new game engine with a freshly reset state
    pub fn new<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Result<Self, GameError> {
        config.validate()?;
        let state = initial_state(&config, rng)?;
        Ok(Self { config, state })
    }

    /// Create an engine around an existing state (scenario setup, replays)
    pub fn with_state(config: GameConfig, state: GameState) -> Self {
        Self { config, state }
    }

    /// Reset the game to its initial state: centered snake heading right,
    /// score and frame counter at zero, fresh food
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        self.state = initial_state(&self.config, rng)?;
        Ok(())
    }

    /// Decode a one-hot `[straight, right, left]` action and step with it
    pub fn step_one_hot<R: Rng + ?Sized>(
        &mut self,
        one_hot: &[f32],
        rng: &mut R,
    ) -> Result<StepResult, GameError> {
        let action = Action::from_one_hot(one_hot)?;
        self.step(action, rng)
    }

    /// Execute one step of the game
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        action: Action,
        rng: &mut R,
    ) -> Result<StepResult, GameError> {
        let state = &mut self.state;

        if !state.is_alive {
            return Ok(StepResult {
                reward: 0.0,
                terminated: true,
                score: state.score,
                info: StepInfo {
                    ate_food: false,
                    collision_type: None,
                },
            });
        }

        state.frame += 1;

        let direction = action.apply(state.snake.direction);
        state.snake.direction = direction;

        let new_head = state.snake.head().stepped(direction, state.block_size);
        state.snake.body.push_front(new_head);

        // Checked against the pre-move body, before any food logic
        if let Some(collision_type) = self.check_termination() {
            let state = &mut self.state;
            state.is_alive = false;

            return Ok(StepResult {
                reward: self.config.death_penalty,
                terminated: true,
                score: state.score,
                info: StepInfo {
                    ate_food: false,
                    collision_type: Some(collision_type),
                },
            });
        }

        let state = &mut self.state;
        let ate_food = new_head == state.food;
        let mut reward = 0.0;

        if ate_food {
            state.score += 1;
            reward = self.config.food_reward;
            state.food = place_food(&self.config, &state.snake, rng)?;
        } else {
            state.snake.body.pop_back();
        }

        Ok(StepResult {
            reward,
            terminated: false,
            score: state.score,
            info: StepInfo {
                ate_food,
                collision_type: None,
            },
        })
    }

    /// True iff `point` (default: the head) is outside the field or on a body
    /// segment after the head
    pub fn is_collision(&self, point: Option<Point>) -> bool {
        match point {
            Some(point) => self.state.is_collision(point),
            None => self.state.is_head_collision(),
        }
    }

    /// Current game state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Game configuration
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Runs after the new head has been prepended
    fn check_termination(&self) -> Option<CollisionType> {
        let state = &self.state;

        if !state.is_in_bounds(state.snake.head()) {
            return Some(CollisionType::Wall);
        }

        if state.snake.collides_with_body(state.snake.head()) {
            return Some(CollisionType::SelfCollision);
        }

        if state.frame > self.config.stagnation_factor * state.snake.len() {
            return Some(CollisionType::Stagnation);
        }

        None
    }
}

fn initial_state<R: Rng + ?Sized>(
    config: &GameConfig,
    rng: &mut R,
) -> Result<GameState, GameError> {
    let head = Point::new(
        (config.columns() / 2) * config.block_size,
        (config.rows() / 2) * config.block_size,
    );
    let snake = Snake::new(head, Direction::Right, config.initial_length, config.block_size);
    let food = place_food(config, &snake, rng)?;

    Ok(GameState::new(
        snake,
        food,
        config.width,
        config.height,
        config.block_size,
    ))
}

/// Pick a uniformly random free cell for the food
fn place_food<R: Rng + ?Sized>(
    config: &GameConfig,
    snake: &Snake,
    rng: &mut R,
) -> Result<Point, GameError> {
    let cells = config.cell_count();
    if snake.len() >= cells {
        return Err(GameError::GridFull { cells });
    }

    let random_cell = |rng: &mut R| {
        Point::new(
            rng.gen_range(0..config.columns()) * config.block_size,
            rng.gen_range(0..config.rows()) * config.block_size,
        )
    };

    // Rejection sampling while the board is mostly free, enumeration after
    if snake.len() < cells / 2 {
        loop {
            let pos = random_cell(rng);
            if !snake.occupies(pos) {
                return Ok(pos);
            }
        }
    }

    let free: Vec<Point> = (0..config.rows())
        .flat_map(|row| (0..config.columns()).map(move |col| (col, row)))
        .map(|(col, row)| Point::new(col * config.block_size, row * config.block_size))
        .filter(|&pos| !snake.occupies(pos))
        .collect();

    free.choose(rng).copied().ok_or(GameError::GridFull { cells })
}
