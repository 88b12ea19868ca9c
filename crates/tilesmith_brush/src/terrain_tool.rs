//! Terrain painting: sets terrain grid cells under the pointer

/// A layer whose terrain grid can be painted
pub trait TerrainCanvas {
    /// Grid cell under a layer pixel
    fn cell_at(&self, x: f64, y: f64) -> Option<(i32, i32)>;

    /// Set a cell to a bank index or to empty. Returns true if it changed.
    fn set_cell(&mut self, x: i32, y: i32, value: Option<usize>) -> bool;

    /// Re-render after cells changed
    fn commit_terrain(&mut self);
}

/// Paints the session's bank into terrain cells, or clears them when erasing.
/// The erase modifier is read on every event so it can change mid-drag.
#[derive(Debug, Clone, Default)]
pub struct TerrainTool {
    /// Bank being painted while the pointer is down
    bank: Option<usize>,
}

impl TerrainTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.bank.is_some()
    }

    /// Start painting. With `erase` set the cell is emptied instead.
    pub fn pointer_down<T>(&mut self, canvas: &mut T, x: f64, y: f64, bank: usize, erase: bool) -> bool
    where
        T: TerrainCanvas + ?Sized,
    {
        self.bank = Some(bank);
        self.paint(canvas, x, y, bank, erase)
    }

    pub fn pointer_move<T>(&mut self, canvas: &mut T, x: f64, y: f64, erase: bool) -> bool
    where
        T: TerrainCanvas + ?Sized,
    {
        match self.bank {
            Some(bank) => self.paint(canvas, x, y, bank, erase),
            None => false,
        }
    }

    pub fn pointer_up(&mut self) -> bool {
        self.bank.take().is_some()
    }

    fn paint<T>(&self, canvas: &mut T, x: f64, y: f64, bank: usize, erase: bool) -> bool
    where
        T: TerrainCanvas + ?Sized,
    {
        let value = if erase { None } else { Some(bank) };
        let Some((cx, cy)) = canvas.cell_at(x, y) else {
            return false;
        };
        if !canvas.set_cell(cx, cy, value) {
            return false;
        }
        tracing::trace!(cx, cy, ?value, "terrain cell painted");
        canvas.commit_terrain();
        true
    }
}
