use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Everything one erosion cycle reads from the host, captured at a single point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IslandSnapshot {
    pub land: Vec<Cell>,
    pub path: Vec<Cell>,
    /// Player selection, already translated into grid coordinates.
    pub selected: Vec<Cell>,
    pub flashing: Vec<Cell>,
}

impl IslandSnapshot {
    pub fn capture<H: IslandHost>(host: &H, offset: SelectionOffset, flashing: &[Cell]) -> Self {
        let selected = host
            .selected_cells()
            .iter()
            .map(|cell| offset.normalize(cell))
            .collect();

        Self {
            land: host.land_cells(),
            path: host.path_cells(),
            selected,
            flashing: flashing.to_vec(),
        }
    }

    /// A host without land or without a path has no round loaded yet.
    pub fn is_ready(&self) -> bool {
        !self.land.is_empty() && !self.path.is_empty()
    }

    pub fn erodable_cells(&self) -> Vec<Cell> {
        identify_erodable_cells(&self.land, &self.path, &self.selected, &self.flashing)
    }
}
