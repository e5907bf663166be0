use crate::input::{Direction, direction_change_is_valid};

/// Heading and length bookkeeping for the snake.
///
/// The body path itself lives in [`crate::grid::GridModel`]; this type only
/// tracks what the player asked for and how far the snake has grown.
#[derive(Debug, Clone)]
pub struct SnakeState {
    direction: Direction,
    queued_direction: Direction,
    length: usize,
    initial_length: usize,
}

impl SnakeState {
    #[must_use]
    pub fn new(direction: Direction, initial_length: usize) -> Self {
        Self {
            direction,
            queued_direction: direction,
            length: initial_length,
            initial_length,
        }
    }

    /// Queues a heading for the next tick, last request wins.
    ///
    /// A reversal of the current heading is dropped.
    pub fn queue_direction(&mut self, direction: Direction) {
        if !direction_change_is_valid(self.direction, direction) {
            return;
        }
        self.queued_direction = direction;
    }

    /// Makes the queued heading current and returns it.
    pub fn commit_direction(&mut self) -> Direction {
        if direction_change_is_valid(self.direction, self.queued_direction) {
            self.direction = self.queued_direction;
        }
        self.queued_direction = self.direction;
        self.direction
    }

    pub fn grow(&mut self) {
        self.length += 1;
    }

    /// Returns the current movement direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn queued_direction(&self) -> Direction {
        self.queued_direction
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Segments gained since the start of the session.
    #[must_use]
    pub fn score(&self) -> usize {
        self.length - self.initial_length
    }
}
