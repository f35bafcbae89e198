use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Lifecycle signals the erosion engine sends to the UI and game-state layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ErosionEvent {
    ErosionStarted,
    ErosionStopped,
    ErosionPaused,
    ErosionUnpaused,
    CellsFlashing { cells: Vec<Cell> },
    CellsEroded { cells: Vec<Cell> },
    /// The path itself sank, the round is lost.
    PathEroded,
}

/// The grid collaborator that owns the island.
///
/// The engine never keeps the canonical land set, it reads fresh copies on every cycle and asks
/// the host to remove cells.
pub trait IslandHost {
    fn land_cells(&self) -> Vec<Cell>;

    fn path_cells(&self) -> Vec<Cell>;

    /// Cells the player is holding, in selection coordinates.
    fn selected_cells(&self) -> Vec<Cell>;

    fn is_round_completed_correctly(&self) -> bool;

    fn start_flashing(&mut self, cells: &[Cell]);

    fn stop_flashing(&mut self);

    fn remove_cells(&mut self, cells: &[Cell]);

    fn emit(&mut self, event: ErosionEvent);
}

/// Plain in-memory island, for headless play and tests.
///
/// Land includes the path cells. Every event the engine emits is recorded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryIsland {
    pub land: Vec<Cell>,
    pub path: Vec<Cell>,
    pub selected: Vec<Cell>,
    pub completed: bool,
    pub flashing: Vec<Cell>,
    pub events: Vec<ErosionEvent>,
}

impl MemoryIsland {
    pub fn new(land: Vec<Cell>, path: Vec<Cell>) -> Self {
        Self {
            land,
            path,
            ..Default::default()
        }
    }

    pub fn contains(&self, pos: Coord2) -> bool {
        self.land.iter().any(|cell| cell.pos() == pos)
    }

    pub fn path_is_standing(&self) -> bool {
        let land = self.land.to_cell_set();
        self.path.iter().all(|cell| land.contains(&cell.pos()))
    }

    pub fn take_events(&mut self) -> Vec<ErosionEvent> {
        core::mem::take(&mut self.events)
    }
}

impl IslandHost for MemoryIsland {
    fn land_cells(&self) -> Vec<Cell> {
        self.land.clone()
    }

    fn path_cells(&self) -> Vec<Cell> {
        self.path.clone()
    }

    fn selected_cells(&self) -> Vec<Cell> {
        self.selected.clone()
    }

    fn is_round_completed_correctly(&self) -> bool {
        self.completed
    }

    fn start_flashing(&mut self, cells: &[Cell]) {
        self.flashing.extend_from_slice(cells);
    }

    fn stop_flashing(&mut self) {
        self.flashing.clear();
    }

    fn remove_cells(&mut self, cells: &[Cell]) {
        let doomed = cells.to_cell_set();
        self.land.retain(|cell| !doomed.contains(&cell.pos()));
    }

    fn emit(&mut self, event: ErosionEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn remove_cells_matches_by_position() {
        let mut island = MemoryIsland::new(
            vec![Cell::new(0, 0).with_letter('A'), Cell::new(1, 0)],
            vec![Cell::new(0, 0)],
        );

        island.remove_cells(&[Cell::new(0, 0)]);

        assert!(!island.contains((0, 0)));
        assert!(island.contains((1, 0)));
        assert!(!island.path_is_standing());
    }

    #[test]
    fn events_serialize_with_kind_tag() {
        let json = serde_json::to_string(&ErosionEvent::PathEroded).unwrap();
        assert_eq!(json, r#"{"kind":"path-eroded"}"#);

        let json = serde_json::to_string(&ErosionEvent::CellsEroded {
            cells: vec![Cell::new(1, 2)],
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"cells-eroded","cells":[{"x":1,"y":2}]}"#);
    }
}
