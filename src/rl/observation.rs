use crate::game::{Direction, GameState};

/// Number of features produced by [`encode_state`]
pub const STATE_SIZE: usize = 11;

/// Feature vector fed to the Q-network
pub type StateVector = [f32; STATE_SIZE];

/// Encode the observable game state into 11 binary features
///
/// Layout:
/// - 0..3: danger straight, danger right, danger left (one cell ahead in the
///   heading reached by each relative action)
/// - 3..7: current heading one-hot (left, right, up, down)
/// - 7..11: food left of, right of, above, below the head
///
/// Food sharing a row or column with the head leaves both flags of that axis
/// at 0.
pub fn encode_state(state: &GameState) -> StateVector {
    let head = state.snake.head();
    let heading = state.snake.direction;
    let food = state.food;

    let danger =
        |direction: Direction| state.is_collision(head.stepped(direction, state.block_size));

    let features = [
        danger(heading),
        danger(heading.clockwise()),
        danger(heading.counter_clockwise()),
        heading == Direction::Left,
        heading == Direction::Right,
        heading == Direction::Up,
        heading == Direction::Down,
        food.x < head.x,
        food.x > head.x,
        food.y < head.y,
        food.y > head.y,
    ];

    features.map(|flag| if flag { 1.0 } else { 0.0 })
}
