//! 9-bit neighbor masks and the candidate matching rule

use serde::{Deserialize, Serialize};
use tilesmith_core::{CornerSet, InnerCorner};

/// Neighbor flags, bit 8 (self) down to bit 0 (top-left)
pub mod neighbors {
    pub const SELF: u16 = 1 << 8;
    pub const TOP: u16 = 1 << 7;
    pub const RIGHT: u16 = 1 << 6;
    pub const BOTTOM: u16 = 1 << 5;
    pub const LEFT: u16 = 1 << 4;
    pub const TOP_RIGHT: u16 = 1 << 3;
    pub const BOTTOM_RIGHT: u16 = 1 << 2;
    pub const BOTTOM_LEFT: u16 = 1 << 1;
    pub const TOP_LEFT: u16 = 1 << 0;

    /// Self plus the four orthogonal sides, always compared exactly
    pub const SIDES: u16 = SELF | TOP | RIGHT | BOTTOM | LEFT;
    pub const ALL: u16 = 0b1_1111_1111;
}

/// Each diagonal and the two sides that make it relevant
const DIAGONALS: [(u16, u16); 4] = {
    use neighbors::*;
    [
        (TOP_RIGHT, TOP | RIGHT),
        (BOTTOM_RIGHT, RIGHT | BOTTOM),
        (BOTTOM_LEFT, BOTTOM | LEFT),
        (TOP_LEFT, LEFT | TOP),
    ]
};

/// Occupancy of a cell and its 8 neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NeighborMask(u16);

impl NeighborMask {
    pub const EMPTY: NeighborMask = NeighborMask(0);
    /// Occupied with no neighbors
    pub const ISLAND: NeighborMask = NeighborMask(neighbors::SELF);
    pub const FULL: NeighborMask = NeighborMask(neighbors::ALL);

    /// Build a mask from raw bits; bits above bit 8 are dropped
    pub const fn from_bits(bits: u16) -> Self {
        NeighborMask(bits & neighbors::ALL)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, flags: u16) -> bool {
        self.0 & flags == flags
    }

    pub const fn is_occupied(self) -> bool {
        self.contains(neighbors::SELF)
    }

    /// Compute the mask of cell (x, y). `is_occupied` is asked about all 9
    /// positions, including ones off the grid (y grows downward).
    pub fn calculate<F>(x: i32, y: i32, is_occupied: F) -> Self
    where
        F: Fn(i32, i32) -> bool,
    {
        use neighbors::*;

        let samples = [
            (0, 0, SELF),
            (0, -1, TOP),
            (1, 0, RIGHT),
            (0, 1, BOTTOM),
            (-1, 0, LEFT),
            (1, -1, TOP_RIGHT),
            (1, 1, BOTTOM_RIGHT),
            (-1, 1, BOTTOM_LEFT),
            (-1, -1, TOP_LEFT),
        ];

        let bits = samples
            .iter()
            .filter(|(dx, dy, _)| is_occupied(x + dx, y + dy))
            .fold(0u16, |acc, (_, _, bit)| acc | *bit);
        NeighborMask(bits)
    }

    /// Diagonal bits whose two adjacent sides are both set
    pub fn relevant_diagonals(self) -> u16 {
        DIAGONALS
            .iter()
            .filter(|(_, sides)| self.contains(*sides))
            .fold(0u16, |acc, (diagonal, _)| acc | *diagonal)
    }

    /// Whether `candidate` may represent a cell with this mask: self and sides
    /// must be equal, and so must every relevant diagonal
    pub fn matches(self, candidate: NeighborMask) -> bool {
        let compared = neighbors::SIDES | self.relevant_diagonals();
        (self.0 ^ candidate.0) & compared == 0
    }

    /// Clear the diagonal bit that each inner corner stands in for
    pub fn without_corners(self, corners: CornerSet) -> Self {
        use neighbors::*;

        let cleared = corners.iter().fold(0u16, |acc, corner| {
            acc | match corner {
                InnerCorner::TopLeft => TOP_LEFT,
                InnerCorner::TopRight => TOP_RIGHT,
                InnerCorner::BottomLeft => BOTTOM_LEFT,
                InnerCorner::BottomRight => BOTTOM_RIGHT,
            }
        });
        NeighborMask(self.0 & !cleared)
    }
}

impl std::fmt::Binary for NeighborMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Binary::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::neighbors::*;
    use super::*;

    fn grid_lookup(cells: &'static [&'static str]) -> impl Fn(i32, i32) -> bool {
        move |x, y| {
            if x < 0 || y < 0 {
                return false;
            }
            cells
                .get(y as usize)
                .and_then(|row| row.as_bytes().get(x as usize))
                .is_some_and(|c| *c == b'#')
        }
    }

    #[test]
    fn test_full_block_sets_every_bit() {
        let lookup = grid_lookup(&["###", "###", "###"]);
        assert_eq!(NeighborMask::calculate(1, 1, lookup).bits(), 0b1_1111_1111);
    }

    #[test]
    fn test_isolated_cell_is_island() {
        let lookup = grid_lookup(&["...", ".#.", "..."]);
        assert_eq!(NeighborMask::calculate(1, 1, lookup), NeighborMask::ISLAND);
    }

    #[test]
    fn test_off_grid_neighbors_are_empty() {
        let lookup = grid_lookup(&["##", "##"]);
        let mask = NeighborMask::calculate(0, 0, lookup);
        assert_eq!(mask.bits(), SELF | RIGHT | BOTTOM | BOTTOM_RIGHT);
    }

    #[test]
    fn test_orientation() {
        let lookup = grid_lookup(&["#..", ".#.", "..."]);
        assert_eq!(
            NeighborMask::calculate(1, 1, lookup).bits(),
            SELF | TOP_LEFT
        );
    }

    #[test]
    fn test_relevant_diagonals() {
        assert_eq!(NeighborMask::from_bits(SELF | TOP | RIGHT).relevant_diagonals(), TOP_RIGHT);
        assert_eq!(NeighborMask::ISLAND.relevant_diagonals(), 0);
        assert_eq!(
            NeighborMask::from_bits(SIDES).relevant_diagonals(),
            TOP_RIGHT | BOTTOM_RIGHT | BOTTOM_LEFT | TOP_LEFT
        );
    }

    #[test]
    fn test_only_relevant_diagonals_are_compared() {
        let target = NeighborMask::from_bits(SELF | TOP | RIGHT | TOP_RIGHT | BOTTOM_LEFT);
        // Differs only in irrelevant diagonals
        assert!(target.matches(NeighborMask::from_bits(
            SELF | TOP | RIGHT | TOP_RIGHT | BOTTOM_RIGHT | TOP_LEFT
        )));
        // Differs in the relevant diagonal
        assert!(!target.matches(NeighborMask::from_bits(SELF | TOP | RIGHT)));
        // Differs in a side
        assert!(!target.matches(NeighborMask::from_bits(SELF | TOP | TOP_RIGHT)));
    }

    #[test]
    fn test_without_corners() {
        let corners = CornerSet::from_corners([InnerCorner::TopLeft, InnerCorner::BottomRight]);
        assert_eq!(
            NeighborMask::FULL.without_corners(corners).bits(),
            SIDES | TOP_RIGHT | BOTTOM_LEFT
        );
    }
}
