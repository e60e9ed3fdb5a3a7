use super::engine::GameError;

/// Direction the snake can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Headings in clockwise order, used to resolve relative turns
    pub const CLOCKWISE: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// Position of this heading in [`Direction::CLOCKWISE`]
    pub fn clockwise_index(&self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Up => 3,
        }
    }

    /// Heading reached after turning a quarter clockwise
    pub fn clockwise(&self) -> Direction {
        Self::CLOCKWISE[(self.clockwise_index() + 1) % 4]
    }

    /// Heading reached after turning a quarter counter-clockwise
    pub fn counter_clockwise(&self) -> Direction {
        Self::CLOCKWISE[(self.clockwise_index() + 3) % 4]
    }

    /// Returns the unit delta (dx, dy) for moving in this direction.
    /// Screen coordinates: y grows downwards.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Action relative to the current heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Keep the current heading
    Straight,
    /// Turn a quarter clockwise
    TurnRight,
    /// Turn a quarter counter-clockwise
    TurnLeft,
}

impl Action {
    /// Number of relative actions
    pub const COUNT: usize = 3;

    /// All actions, ordered by their one-hot index
    pub const ALL: [Action; 3] = [Action::Straight, Action::TurnRight, Action::TurnLeft];

    /// Index of this action in the one-hot encoding
    pub fn index(&self) -> usize {
        match self {
            Action::Straight => 0,
            Action::TurnRight => 1,
            Action::TurnLeft => 2,
        }
    }

    /// Action for a one-hot index
    pub fn from_index(idx: usize) -> Result<Self, GameError> {
        Self::ALL
            .get(idx)
            .copied()
            .ok_or(GameError::InvalidAction {
                reason: format!("index {idx} is outside 0..{}", Self::COUNT),
            })
    }

    /// Decode a one-hot vector `[straight, right, left]`.
    ///
    /// Fails unless the vector has three entries with exactly one equal to 1
    /// and the others equal to 0.
    pub fn from_one_hot(one_hot: &[f32]) -> Result<Self, GameError> {
        if one_hot.len() != Self::COUNT {
            return Err(GameError::InvalidAction {
                reason: format!("expected {} entries, got {}", Self::COUNT, one_hot.len()),
            });
        }

        let mut selected = None;
        for (idx, &value) in one_hot.iter().enumerate() {
            if value == 1.0 {
                if selected.is_some() {
                    return Err(GameError::InvalidAction {
                        reason: format!("more than one entry set in {one_hot:?}"),
                    });
                }
                selected = Some(idx);
            } else if value != 0.0 {
                return Err(GameError::InvalidAction {
                    reason: format!("entry {idx} is {value}, expected 0 or 1"),
                });
            }
        }

        match selected {
            Some(idx) => Self::from_index(idx),
            None => Err(GameError::InvalidAction {
                reason: format!("no entry set in {one_hot:?}"),
            }),
        }
    }

    /// One-hot encoding `[straight, right, left]`
    pub fn to_one_hot(&self) -> [f32; 3] {
        let mut one_hot = [0.0; 3];
        one_hot[self.index()] = 1.0;
        one_hot
    }

    /// Resolve the heading after applying this action to `current`
    pub fn apply(&self, current: Direction) -> Direction {
        match self {
            Action::Straight => current,
            Action::TurnRight => current.clockwise(),
            Action::TurnLeft => current.counter_clockwise(),
        }
    }
}
