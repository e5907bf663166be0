use rand::Rng;

use crate::grid::{Cell, GridModel, Position};

/// Samples uniformly random cells until one is empty.
///
/// Returns `None` when the grid has no empty cell left. Otherwise retries
/// are unbounded, which is fine while the field stays sparse.
#[must_use]
pub fn sample_empty_cell<R: Rng + ?Sized>(rng: &mut R, grid: &GridModel) -> Option<Position> {
    if grid.empty_cells() == 0 {
        return None;
    }

    let height = grid.height() as i32;
    let width = grid.width() as i32;
    loop {
        let row = rng.gen_range(0..height);
        let col = rng.gen_range(0..width);
        if grid.cell_at(row, col) == Ok(Cell::Empty) {
            return Some(Position::new(row, col));
        }
    }
}
