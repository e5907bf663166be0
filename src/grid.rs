use std::collections::{HashSet, VecDeque};

use thiserror::Error;

use crate::config::{GRID_MARGIN, GridSize, MAX_GRID_CELLS};

/// Contents of one grid cell.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    SnakeBody,
    Apple,
}

/// Cell coordinate, origin top-left.
///
/// Signed so that a step past an edge can be represented before it is
/// rejected or wrapped.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns true when the position lies inside `[0, height) x [0, width)`.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        self.row >= 0
            && self.col >= 0
            && (self.row as usize) < bounds.height
            && (self.col as usize) < bounds.width
    }

    /// Returns this position wrapped into bounds on both axes.
    #[must_use]
    pub fn wrapped(self, bounds: GridSize) -> Self {
        Self {
            row: self.row.rem_euclid(bounds.height as i32),
            col: self.col.rem_euclid(bounds.width as i32),
        }
    }
}

/// Contract violations on [`GridModel`] accessors and construction.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum GridError {
    #[error("grid {width}x{height} is not a valid field for a snake of length {snake_length}")]
    InvalidDimension {
        width: usize,
        height: usize,
        snake_length: usize,
    },
    #[error("cell ({}, {}) is outside the grid", .0.row, .0.col)]
    OutOfRange(Position),
    #[error("cell ({}, {}) is not empty", .0.row, .0.col)]
    CellOccupied(Position),
}

/// The playing field: a row-major cell grid plus the snake's body path.
///
/// The body is ordered tail first, head last. Every body coordinate is
/// marked [`Cell::SnakeBody`] and every apple coordinate [`Cell::Apple`].
#[derive(Debug, Clone)]
pub struct GridModel {
    size: GridSize,
    cells: Vec<Cell>,
    body: VecDeque<Position>,
    apples: HashSet<Position>,
}

impl GridModel {
    /// Builds an empty field with a horizontal snake on the middle row,
    /// occupying columns `0..snake_length`.
    pub fn new(width: usize, height: usize, snake_length: usize) -> Result<Self, GridError> {
        let needed = snake_length + GRID_MARGIN;
        let too_large = width
            .checked_mul(height)
            .is_none_or(|cells| cells > MAX_GRID_CELLS);
        if snake_length == 0 || width < needed || height < needed || too_large {
            return Err(GridError::InvalidDimension {
                width,
                height,
                snake_length,
            });
        }

        let size = GridSize { width, height };
        let mut grid = Self {
            size,
            cells: vec![Cell::Empty; size.total_cells()],
            body: VecDeque::with_capacity(snake_length),
            apples: HashSet::new(),
        };

        let row = (height / 2) as i32;
        for col in 0..snake_length as i32 {
            grid.push_head(Position::new(row, col));
        }

        Ok(grid)
    }

    #[must_use]
    pub fn size(&self) -> GridSize {
        self.size
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.size.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Returns the cell at `(row, col)`.
    pub fn cell_at(&self, row: i32, col: i32) -> Result<Cell, GridError> {
        let index = self.index_of(Position::new(row, col))?;
        Ok(self.cells[index])
    }

    /// Marks an empty cell as holding an apple.
    pub fn place_apple(&mut self, position: Position) -> Result<(), GridError> {
        let index = self.index_of(position)?;
        if self.cells[index] != Cell::Empty {
            return Err(GridError::CellOccupied(position));
        }

        self.cells[index] = Cell::Apple;
        self.apples.insert(position);
        Ok(())
    }

    /// Current snake head.
    #[must_use]
    pub fn head(&self) -> Position {
        *self
            .body
            .back()
            .expect("snake body must always contain at least one segment")
    }

    /// Iterates over body segments from tail to head.
    pub fn body(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }

    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Coordinates currently holding an apple.
    #[must_use]
    pub fn apples(&self) -> &HashSet<Position> {
        &self.apples
    }

    /// Number of cells holding neither snake nor apple.
    #[must_use]
    pub fn empty_cells(&self) -> usize {
        self.size.total_cells() - self.body.len() - self.apples.len()
    }

    /// Iterates over the grid one row at a time.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size.width)
    }

    /// Empties a cell, dropping any apple recorded there.
    pub(crate) fn clear_cell(&mut self, position: Position) {
        if let Ok(index) = self.index_of(position) {
            self.cells[index] = Cell::Empty;
            self.apples.remove(&position);
        }
    }

    /// Marks a cell as snake, consuming any apple recorded there.
    pub(crate) fn set_snake_cell(&mut self, position: Position) {
        if let Ok(index) = self.index_of(position) {
            self.cells[index] = Cell::SnakeBody;
            self.apples.remove(&position);
        }
    }

    pub(crate) fn push_head(&mut self, position: Position) {
        self.set_snake_cell(position);
        self.body.push_back(position);
    }

    /// Removes the tail from the body and empties its cell.
    pub(crate) fn pop_tail(&mut self) -> Option<Position> {
        let tail = self.body.pop_front()?;
        self.clear_cell(tail);
        Some(tail)
    }

    /// Re-attaches a previously popped tail.
    pub(crate) fn push_tail(&mut self, position: Position) {
        self.set_snake_cell(position);
        self.body.push_front(position);
    }

    fn index_of(&self, position: Position) -> Result<usize, GridError> {
        if !position.is_within_bounds(self.size) {
            return Err(GridError::OutOfRange(position));
        }

        Ok(position.row as usize * self.size.width + position.col as usize)
    }
}
