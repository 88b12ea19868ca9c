//! Terrain placement grid
//!
//! One cell per placement position. A cell is either empty or holds the index
//! of the combo bank it was painted with.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::mask::NeighborMask;

/// Sparse occupancy grid painted by the terrain tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainGrid {
    columns: u32,
    rows: u32,
    /// Row-major; `None` is an empty cell
    cells: Vec<Option<usize>>,
}

impl TerrainGrid {
    /// Create an empty grid
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            cells: vec![None; (columns * rows) as usize],
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cells(&self) -> &[Option<usize>] {
        &self.cells
    }

    pub fn in_range(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.columns && (y as u32) < self.rows
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_range(x, y)
            .then(|| (y as u32 * self.columns + x as u32) as usize)
    }

    /// Bank index of the cell, or None when empty or off the grid
    pub fn get(&self, x: i32, y: i32) -> Option<usize> {
        self.index(x, y).and_then(|i| self.cells[i])
    }

    /// Whether any bank is placed at (x, y)
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some()
    }

    /// Set a cell. Returns true if the cell changed.
    pub fn set(&mut self, x: i32, y: i32, value: Option<usize>) -> bool {
        match self.index(x, y) {
            Some(i) if self.cells[i] != value => {
                self.cells[i] = value;
                true
            }
            _ => false,
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Neighbor mask of (x, y); off-grid neighbors count as empty
    pub fn neighbor_mask(&self, x: i32, y: i32) -> NeighborMask {
        NeighborMask::calculate(x, y, |nx, ny| self.is_occupied(nx, ny))
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Resize the grid, keeping existing cells centered.
    ///
    /// Cells are shifted by `floor((new - old) / 2)` on each axis; cells that
    /// fall outside the new bounds are dropped.
    pub fn resize(&mut self, columns: u32, rows: u32) {
        let offset_x = (columns as i64 - self.columns as i64).div_euclid(2);
        let offset_y = (rows as i64 - self.rows as i64).div_euclid(2);

        let mut resized = TerrainGrid::new(columns, rows);
        for y in 0..self.rows {
            for x in 0..self.columns {
                let value = self.cells[(y * self.columns + x) as usize];
                let nx = x as i64 + offset_x;
                let ny = y as i64 + offset_y;
                if let (Ok(nx), Ok(ny)) = (i32::try_from(nx), i32::try_from(ny)) {
                    resized.set(nx, ny, value);
                }
            }
        }
        *self = resized;
    }

    /// Fill each cell with probability `fill_ratio`, using a uniformly chosen bank.
    /// A ratio that is not finite fills nothing.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R, bank_count: usize, fill_ratio: f64) {
        let fill_ratio = if fill_ratio.is_finite() {
            fill_ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        for cell in &mut self.cells {
            *cell = if bank_count > 0 && rng.gen_bool(fill_ratio) {
                Some(rng.gen_range(0..bank_count))
            } else {
                None
            };
        }
    }
}
