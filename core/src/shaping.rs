use alloc::vec::Vec;
use core::cmp::Ordering;
use rand::prelude::*;

use crate::*;

/// Islands this small are left untouched by the shaping pass.
pub const MIN_SHAPED_ISLAND: usize = 4;

/// Run lengths of the outer ring pattern, cells removed then cells kept.
pub const RING_REMOVE_RUN: core::ops::RangeInclusive<usize> = 4..=8;
pub const RING_KEEP_RUN: core::ops::RangeInclusive<usize> = 1..=4;

fn erode_until<R, F>(
    island: &[Cell],
    path: &[Cell],
    percentage: f64,
    rng: &mut R,
    mut select: F,
) -> Vec<Cell>
where
    R: Rng,
    F: FnMut(&[Cell], usize, &mut R) -> Vec<Cell>,
{
    if island.len() <= MIN_SHAPED_ISLAND {
        return island.to_vec();
    }

    let target = ceil_fraction(island.len(), percentage);
    let mut remaining = island.to_vec();
    let mut removed = 0;

    while removed < target {
        let erodable = identify_erodable_cells(&remaining, path, &[], &[]);
        if erodable.is_empty() {
            log::debug!(
                "Island exhausted down to the path after removing {} of {} cells",
                removed,
                target
            );
            break;
        }

        let batch_size = ((target - removed) / 2).max(1);
        let batch = select(&erodable, batch_size, rng);
        let batch_set = batch.to_cell_set();
        remaining.retain(|cell| !batch_set.contains(&cell.pos()));
        removed += batch.len();
    }

    log::trace!(
        "Initial erosion removed {} cells, {} left",
        removed,
        remaining.len()
    );
    remaining
}

/// Pre-erodes a fresh island so it does not start out as a perfect block.
///
/// Removes `ceil(len * percentage)` cells in batches of at most half the remaining quota,
/// recomputing the coastline after every batch so erosion cascades inward. Path cells are never
/// touched. Returns the surviving cells.
pub fn apply_initial_erosion<R: Rng>(
    island: &[Cell],
    path: &[Cell],
    percentage: f64,
    rng: &mut R,
) -> Vec<Cell> {
    erode_until(island, path, percentage, rng, |candidates, count, rng| {
        select_cells_to_erode(candidates, count, rng)
    })
}

/// Same as [`apply_initial_erosion`], but every batch bites into `outer_layer` first.
pub fn apply_initial_erosion_by_layer<R: Rng>(
    island: &[Cell],
    path: &[Cell],
    percentage: f64,
    outer_layer: u8,
    rng: &mut R,
) -> Vec<Cell> {
    erode_until(island, path, percentage, rng, |candidates, count, rng| {
        select_cells_to_erode_by_layer(candidates, count, outer_layer, rng)
    })
}

/// Upper half-plane (screen angle in `[0, pi)`) sorts before the lower one.
fn half_plane((x, y): (i64, i64)) -> u8 {
    if y > 0 || (y == 0 && x >= 0) {
        0
    } else {
        1
    }
}

fn compare_angle(a: (i64, i64), b: (i64, i64)) -> Ordering {
    half_plane(a).cmp(&half_plane(b)).then_with(|| {
        let cross = a.0 * b.1 - a.1 * b.0;
        0.cmp(&cross)
            .then_with(|| (a.0 * a.0 + a.1 * a.1).cmp(&(b.0 * b.0 + b.1 * b.1)))
    })
}

/// Orders cells clockwise on screen around their centroid, starting from the cell closest to the
/// origin.
pub fn order_clockwise(cells: &[Cell]) -> Vec<Cell> {
    if cells.is_empty() {
        return Vec::new();
    }

    let n = cells.len() as i64;
    let (sum_x, sum_y) = cells.iter().fold((0i64, 0i64), |(sx, sy), cell| {
        (sx + i64::from(cell.x), sy + i64::from(cell.y))
    });
    // scaled by n to keep the centroid integral
    let offset = |cell: &Cell| (i64::from(cell.x) * n - sum_x, i64::from(cell.y) * n - sum_y);

    let mut ordered = cells.to_vec();
    ordered.sort_by(|a, b| compare_angle(offset(a), offset(b)));

    let start = ordered
        .iter()
        .enumerate()
        .min_by_key(|(i, cell)| (squared_distance(cell.pos(), (0, 0)), *i))
        .map(|(i, _)| i)
        .unwrap_or_default();
    ordered.rotate_left(start);
    ordered
}

/// Cuts a jagged coastline into a ring of cells.
///
/// Walks the ring clockwise and alternates between dropping a run of 4-8 cells and keeping a run
/// of 1-4 cells until the ring is used up. Returns the kept cells in clockwise order.
pub fn apply_layer_removal_pattern<R: Rng>(ring: &[Cell], rng: &mut R) -> Vec<Cell> {
    let ordered = order_clockwise(ring);
    let mut kept = Vec::with_capacity(ordered.len() / 2);
    let mut removing = true;
    let mut index = 0;

    while index < ordered.len() {
        let run = if removing {
            rng.random_range(RING_REMOVE_RUN)
        } else {
            rng.random_range(RING_KEEP_RUN)
        };
        let end = (index + run).min(ordered.len());
        if !removing {
            kept.extend_from_slice(&ordered[index..end]);
        }
        index = end;
        removing = !removing;
    }

    kept
}

/// The cells of `cells` annotated with exactly `layer`.
pub fn cells_in_layer(cells: &[Cell], layer: u8) -> Vec<Cell> {
    cells
        .iter()
        .filter(|cell| cell.layer == Some(layer))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use rand::rngs::SmallRng;

    fn block(min: Coord, max: Coord) -> Vec<Cell> {
        let mut cells = Vec::new();
        for y in min..=max {
            for x in min..=max {
                cells.push(Cell::new(x, y));
            }
        }
        cells
    }

    fn square_ring(radius: Coord) -> Vec<Cell> {
        block(-radius, radius)
            .into_iter()
            .filter(|cell| cell.x.abs() == radius || cell.y.abs() == radius)
            .collect()
    }

    #[test]
    fn tiny_islands_are_left_alone() {
        let mut rng = SmallRng::seed_from_u64(0);
        let island = vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0), Cell::new(3, 0)];

        assert_eq!(apply_initial_erosion(&island, &[], 0.5, &mut rng), island);
    }

    #[test]
    fn initial_erosion_removes_requested_share() {
        let mut rng = SmallRng::seed_from_u64(1);
        let island = block(-4, 4);
        let path = vec![Cell::new(-1, 0), Cell::new(0, 0), Cell::new(1, 0)];

        let survivors = apply_initial_erosion(&island, &path, DEFAULT_INITIAL_EROSION, &mut rng);

        // 81 cells, quota is ceil(20.25)
        assert_eq!(island.len() - survivors.len(), 21);
        let survivor_set = survivors.to_cell_set();
        assert!(path.iter().all(|cell| survivor_set.contains(&cell.pos())));
    }

    #[test]
    fn initial_erosion_stops_at_the_path() {
        let mut rng = SmallRng::seed_from_u64(2);
        let island = block(0, 2);
        let path = vec![Cell::new(1, 1)];

        let survivors = apply_initial_erosion(&island, &path, 1.0, &mut rng);

        assert_eq!(survivors, path);
    }

    #[test]
    fn initial_erosion_cascades_inward() {
        let mut rng = SmallRng::seed_from_u64(3);
        let island = block(-3, 3);

        // 49 cells, quota 25 exceeds the 24 coastal cells of the untouched block
        let survivors = apply_initial_erosion(&island, &[Cell::new(0, 0)], 0.5, &mut rng);

        assert_eq!(island.len() - survivors.len(), 25);
    }

    #[test]
    fn layered_erosion_prefers_outer_ring() {
        let mut rng = SmallRng::seed_from_u64(4);
        let island: Vec<Cell> = block(-3, 3)
            .into_iter()
            .map(|cell| {
                let layer = cell.x.abs().max(cell.y.abs()) as u8 + 1;
                cell.with_layer(layer)
            })
            .collect();

        let survivors =
            apply_initial_erosion_by_layer(&island, &[Cell::new(0, 0)], 0.2, 4, &mut rng);

        let survivor_set = survivors.to_cell_set();
        let removed: Vec<_> = island
            .iter()
            .filter(|cell| !survivor_set.contains(&cell.pos()))
            .collect();
        assert_eq!(removed.len(), 10);
        assert!(removed.iter().all(|cell| cell.layer == Some(4)));
    }

    #[test]
    fn clockwise_order_starts_nearest_origin() {
        let ring = square_ring(1)
            .into_iter()
            .map(|cell| Cell::new(cell.x + 10, cell.y + 10))
            .collect::<Vec<_>>();

        let ordered = order_clockwise(&ring);

        let positions: Vec<_> = ordered.iter().map(Cell::pos).collect();
        assert_eq!(
            positions,
            [
                (9, 9),
                (10, 9),
                (11, 9),
                (11, 10),
                (11, 11),
                (10, 11),
                (9, 11),
                (9, 10),
            ]
        );
    }

    #[test]
    fn ring_pattern_is_jagged() {
        let mut rng = SmallRng::seed_from_u64(5);
        let ring = square_ring(4);

        for _ in 0..50 {
            let kept = apply_layer_removal_pattern(&ring, &mut rng);
            assert!(!kept.is_empty());
            assert!(kept.len() < ring.len());
            let ring_set = ring.to_cell_set();
            assert!(kept.iter().all(|cell| ring_set.contains(&cell.pos())));
        }
    }

    #[test]
    fn short_rings_can_vanish() {
        let mut rng = SmallRng::seed_from_u64(6);
        let ring = vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0)];

        assert!(apply_layer_removal_pattern(&ring, &mut rng).is_empty());
        assert!(apply_layer_removal_pattern(&[], &mut rng).is_empty());
    }

    #[test]
    fn cells_in_layer_filters_annotations() {
        let cells = vec![
            Cell::new(0, 0).with_layer(1),
            Cell::new(1, 0).with_layer(2),
            Cell::new(2, 0),
        ];

        assert_eq!(cells_in_layer(&cells, 2), [Cell::new(1, 0)]);
    }
}
