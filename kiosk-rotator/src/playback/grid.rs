//! Leaderboard grid cursor
//!
//! In the grid variant every item owns a cell in a multi-column layout, but
//! only one cell plays at a time. The grid walks its own active-cell pointer
//! by position instead of advancing the queue index; the queue cursor stays
//! where it was when the grid was activated.

/// Active-cell pointer over a multi-column grid
#[derive(Debug, Clone)]
pub struct GridCursor {
    columns: usize,
    cells: usize,
    active: usize,
}

impl GridCursor {
    /// Cursor over `cells` cells laid out in `columns` columns
    pub fn new(cells: usize, columns: usize) -> Self {
        Self {
            columns: columns.max(1),
            cells,
            active: 0,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell_count(&self) -> usize {
        self.cells
    }

    /// Active cell, or `None` once the last cell has completed
    pub fn active(&self) -> Option<usize> {
        (self.active < self.cells).then_some(self.active)
    }

    /// Row the renderer should scroll into view
    pub fn focus_row(&self) -> usize {
        self.active.min(self.cells.saturating_sub(1)) / self.columns
    }

    /// Move to the next cell by position; returns false past the last cell
    pub fn advance(&mut self) -> bool {
        if self.active < self.cells {
            self.active += 1;
        }
        self.active < self.cells
    }
}
