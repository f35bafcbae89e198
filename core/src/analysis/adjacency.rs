use alloc::vec::Vec;
use smallvec::SmallVec;

use crate::*;

/// Sides of `pos` that face open water, clockwise from the top.
pub fn exposed_sides(land: &CellSet, pos: Coord2) -> SmallVec<[Direction; 4]> {
    pos.iter_neighbors()
        .filter(|(_, neighbor)| !land.contains(neighbor))
        .map(|(direction, _)| direction)
        .collect()
}

/// Whether `pos` is land with at least one orthogonal neighbor missing from `land`.
pub fn borders_water(land: &CellSet, pos: Coord2) -> bool {
    land.contains(&pos)
        && pos
            .iter_neighbors()
            .any(|(_, neighbor)| !land.contains(&neighbor))
}

/// Land cells that may erode right now.
///
/// A cell qualifies when it is not on the path, not in `excluded` (cells the player is holding),
/// not in `in_flight` (already flashing) and borders open water on at least one side. Empty
/// slices exclude nothing. The result is sorted row-major.
pub fn identify_erodable_cells(
    land: &[Cell],
    path: &[Cell],
    excluded: &[Cell],
    in_flight: &[Cell],
) -> Vec<Cell> {
    let land_set = land.to_cell_set();
    let path_set = path.to_cell_set();
    let excluded_set = excluded.to_cell_set();
    let in_flight_set = in_flight.to_cell_set();

    let mut seen = CellSet::with_capacity(land.len());
    let mut erodable: Vec<Cell> = land
        .iter()
        .filter(|cell| seen.insert(cell.pos()))
        .filter(|cell| {
            let pos = cell.pos();
            !path_set.contains(&pos)
                && !excluded_set.contains(&pos)
                && !in_flight_set.contains(&pos)
                && borders_water(&land_set, pos)
        })
        .copied()
        .collect();

    erodable.sort();
    log::trace!(
        "{} of {} land cells are erodable",
        erodable.len(),
        land_set.len()
    );
    erodable
}
