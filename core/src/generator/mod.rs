use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;
pub use layered::*;

mod layered;

pub trait IslandGenerator {
    fn generate(self, path: &[Cell]) -> Result<Island>;
}

/// A freshly shaped island, ready to hand to the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Island {
    /// Every standing cell, path included.
    pub cells: Vec<Cell>,
    pub path: Vec<Cell>,
    /// Layer index of the outermost ring.
    pub outer_layer: u8,
}

impl Island {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn into_host(self) -> MemoryIsland {
        MemoryIsland::new(self.cells, self.path)
    }
}
