use core::cmp::Ordering;
use core::hash::{Hash, Hasher};
use serde::{Deserialize, Serialize};

use crate::*;

/// A single island cell.
///
/// Identity is the position alone: two cells at the same `(x, y)` compare equal and hash the same
/// regardless of their `letter` or `layer`. Cells order row-major, by `y` then `x`.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub x: Coord,
    pub y: Coord,
    /// Display payload, opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter: Option<char>,
    /// Ring index counted from the island center, starting at 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<u8>,
}

impl Cell {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self {
            x,
            y,
            letter: None,
            layer: None,
        }
    }

    pub const fn with_letter(self, letter: char) -> Self {
        Self {
            letter: Some(letter),
            ..self
        }
    }

    pub const fn with_layer(self, layer: u8) -> Self {
        Self {
            layer: Some(layer),
            ..self
        }
    }

    pub const fn pos(&self) -> Coord2 {
        (self.x, self.y)
    }

    /// Unannotated cells count as the innermost layer.
    pub fn layer_or_inner(&self) -> u8 {
        self.layer.unwrap_or(1)
    }

    pub const fn is_adjacent_to(&self, other: &Cell) -> bool {
        are_adjacent(self.pos(), other.pos())
    }
}

impl From<Coord2> for Cell {
    fn from((x, y): Coord2) -> Self {
        Self::new(x, y)
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.pos() == other.pos()
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pos().hash(state);
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Position-keyed membership set, the shape every analysis pass builds once per call.
pub type CellSet = hashbrown::HashSet<Coord2>;

pub trait ToCellSet {
    fn to_cell_set(&self) -> CellSet;
}

impl ToCellSet for [Cell] {
    fn to_cell_set(&self) -> CellSet {
        self.iter().map(Cell::pos).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn identity_ignores_annotations() {
        let plain = Cell::new(3, -1);
        let annotated = Cell::new(3, -1).with_letter('Q').with_layer(2);

        assert_eq!(plain, annotated);
        assert_eq!([plain].to_cell_set(), [annotated].to_cell_set());
    }

    #[test]
    fn cells_sort_row_major() {
        let mut cells = vec![Cell::new(1, 1), Cell::new(0, 2), Cell::new(-1, 1), Cell::new(5, 0)];

        cells.sort();

        let positions: alloc::vec::Vec<_> = cells.iter().map(Cell::pos).collect();
        assert_eq!(positions, [(5, 0), (-1, 1), (1, 1), (0, 2)]);
    }

    #[test]
    fn unannotated_cells_are_inner() {
        assert_eq!(Cell::new(0, 0).layer_or_inner(), 1);
        assert_eq!(Cell::new(0, 0).with_layer(3).layer_or_inner(), 3);
    }
}
