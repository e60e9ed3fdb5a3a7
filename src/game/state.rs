use std::collections::VecDeque;

use super::action::Direction;

/// A pixel coordinate on the playing field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move point by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move point one cell of `block_size` pixels in a direction
    pub fn stepped(&self, direction: Direction, block_size: i32) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx * block_size, dy * block_size)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: VecDeque<Point>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given head position and direction, its body
    /// trailing behind the head one block apart
    pub fn new(head: Point, direction: Direction, length: usize, block_size: i32) -> Self {
        let (dx, dy) = direction.delta();
        let body = (0..length as i32)
            .map(|i| head.moved_by(-dx * block_size * i, -dy * block_size * i))
            .collect();

        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Point {
        self.body[0]
    }

    /// Segments after the head
    pub fn body_segments(&self) -> impl Iterator<Item = &Point> {
        self.body.iter().skip(1)
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Point) -> bool {
        self.body_segments().any(|&segment| segment == pos)
    }

    /// Check if any segment, head included, sits on `pos`
    pub fn occupies(&self, pos: Point) -> bool {
        self.body.contains(&pos)
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Type of collision that ended an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Too many frames without the episode ending
    Stagnation,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Point,
    pub width: i32,
    pub height: i32,
    pub block_size: i32,
    pub score: u32,
    /// Frames since the last reset
    pub frame: usize,
    pub is_alive: bool,
}

impl GameState {
    /// Create a new game state
    pub fn new(snake: Snake, food: Point, width: i32, height: i32, block_size: i32) -> Self {
        Self {
            snake,
            food,
            width,
            height,
            block_size,
            score: 0,
            frame: 0,
            is_alive: true,
        }
    }

    /// Check if a position lies on the playing field
    pub fn is_in_bounds(&self, pos: Point) -> bool {
        pos.x >= 0
            && pos.x <= self.width - self.block_size
            && pos.y >= 0
            && pos.y <= self.height - self.block_size
    }

    /// True iff `pos` is outside the field or on a body segment after the head
    pub fn is_collision(&self, pos: Point) -> bool {
        !self.is_in_bounds(pos) || self.snake.collides_with_body(pos)
    }

    /// [`GameState::is_collision`] applied to the current head
    pub fn is_head_collision(&self) -> bool {
        self.is_collision(self.snake.head())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_point_movement() {
        let pos = Point::new(100, 100);
        assert_eq!(pos.stepped(Direction::Right, 20), Point::new(120, 100));
        assert_eq!(pos.stepped(Direction::Left, 20), Point::new(80, 100));
        assert_eq!(pos.stepped(Direction::Down, 20), Point::new(100, 120));
        assert_eq!(pos.stepped(Direction::Up, 20), Point::new(100, 80));
    }

    #[test]
    fn test_snake_creation() {
        let snake = Snake::new(Point::new(100, 100), Direction::Right, 3, 20);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Point::new(100, 100));
        assert_eq!(snake.body[1], Point::new(80, 100));
        assert_eq!(snake.body[2], Point::new(60, 100));
    }

    #[test]
    fn test_body_collision_excludes_head() {
        let snake = Snake::new(Point::new(100, 100), Direction::Right, 3, 20);
        assert!(!snake.collides_with_body(Point::new(100, 100)));
        assert!(snake.collides_with_body(Point::new(80, 100)));
        assert!(!snake.collides_with_body(Point::new(180, 180)));
        assert!(snake.occupies(Point::new(100, 100)));
    }

    #[test]
    fn test_bounds_checking() {
        let state = GameState::new(
            Snake::new(Point::new(100, 100), Direction::Right, 3, 20),
            Point::new(0, 0),
            200,
            200,
            20,
        );

        assert!(state.is_in_bounds(Point::new(0, 0)));
        assert!(state.is_in_bounds(Point::new(180, 180)));
        assert!(!state.is_in_bounds(Point::new(-20, 0)));
        assert!(!state.is_in_bounds(Point::new(200, 0)));
        assert!(!state.is_in_bounds(Point::new(0, 200)));
    }

    #[test]
    fn test_is_collision() {
        let state = GameState::new(
            Snake::new(Point::new(100, 100), Direction::Right, 3, 20),
            Point::new(0, 0),
            200,
            200,
            20,
        );

        assert!(!state.is_head_collision());
        assert!(state.is_collision(Point::new(60, 100)));
        assert!(state.is_collision(Point::new(-20, 100)));
        assert!(!state.is_collision(Point::new(120, 100)));
    }

    fn grid_point() -> impl Strategy<Value = Point> {
        // One cell of margin on every side of a 200x200 field
        (-1i32..=10, -1i32..=10).prop_map(|(col, row)| Point::new(col * 20, row * 20))
    }

    proptest! {
        #[test]
        fn collision_is_out_of_bounds_or_on_body(
            body in proptest::collection::vec(grid_point(), 1..12),
            point in grid_point(),
        ) {
            let snake = Snake {
                body: body.iter().copied().collect(),
                direction: Direction::Right,
            };
            let state = GameState::new(snake, Point::new(0, 0), 200, 200, 20);

            let outside = point.x < 0 || point.x > 180 || point.y < 0 || point.y > 180;
            let on_body = body[1..].contains(&point);
            prop_assert_eq!(state.is_collision(point), outside || on_body);
        }
    }
}
