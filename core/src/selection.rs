use alloc::vec::Vec;
use hashbrown::HashMap;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Two orthogonally adjacent candidates, stored in canonical (row-major) order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPair {
    pub first: Cell,
    pub second: Cell,
}

impl CellPair {
    pub fn new(a: Cell, b: Cell) -> Self {
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    pub const fn key(&self) -> (Coord2, Coord2) {
        (self.first.pos(), self.second.pos())
    }

    pub fn cells(&self) -> [Cell; 2] {
        [self.first, self.second]
    }
}

/// How strongly a pair belongs to the outermost ring.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PairPriority {
    BothOuter,
    OneOuter,
    BothInner,
}

impl PairPriority {
    pub fn of(pair: &CellPair, outer_layer: u8) -> Self {
        let is_outer = |cell: &Cell| cell.layer_or_inner() >= outer_layer;
        match (is_outer(&pair.first), is_outer(&pair.second)) {
            (true, true) => Self::BothOuter,
            (true, false) | (false, true) => Self::OneOuter,
            (false, false) => Self::BothInner,
        }
    }
}

/// First occurrence of every position, in input order.
fn unique_cells(cells: &[Cell]) -> Vec<Cell> {
    let mut seen = CellSet::with_capacity(cells.len());
    cells
        .iter()
        .filter(|cell| seen.insert(cell.pos()))
        .copied()
        .collect()
}

/// Every unordered pair of orthogonally adjacent candidates, each reported once.
pub fn find_adjacent_pairs(candidates: &[Cell]) -> Vec<CellPair> {
    let by_pos: HashMap<Coord2, Cell> = candidates
        .iter()
        .rev()
        .map(|cell| (cell.pos(), *cell))
        .collect();

    let mut seen = hashbrown::HashSet::new();
    let mut pairs = Vec::new();
    for cell in candidates {
        for (_, neighbor_pos) in cell.pos().iter_neighbors() {
            let Some(neighbor) = by_pos.get(&neighbor_pos) else {
                continue;
            };
            let pair = CellPair::new(*cell, *neighbor);
            if seen.insert(pair.key()) {
                pairs.push(pair);
            }
        }
    }
    pairs
}

/// Orders pairs outer ring first: both cells on the outer ring, then one, then neither.
/// Order within a band is random.
pub fn prioritize_pairs_by_layer<R: Rng>(
    pairs: Vec<CellPair>,
    outer_layer: u8,
    rng: &mut R,
) -> Vec<CellPair> {
    let mut bands: [Vec<CellPair>; 3] = Default::default();
    for pair in pairs {
        let band = match PairPriority::of(&pair, outer_layer) {
            PairPriority::BothOuter => 0,
            PairPriority::OneOuter => 1,
            PairPriority::BothInner => 2,
        };
        bands[band].push(pair);
    }

    let mut ordered = Vec::new();
    for mut band in bands {
        band.shuffle(rng);
        ordered.append(&mut band);
    }
    ordered
}

/// Greedily consumes disjoint pairs, at most `count / 2` of them, while two or more cells are
/// still needed.
fn take_pairs(
    pairs: &[CellPair],
    count: usize,
    taken: &mut CellSet,
    selected: &mut Vec<Cell>,
) -> usize {
    let max_pairs = count / 2;
    let mut used = 0;
    for pair in pairs {
        if used >= max_pairs || count - selected.len() < 2 {
            break;
        }
        if taken.contains(&pair.first.pos()) || taken.contains(&pair.second.pos()) {
            continue;
        }
        for cell in pair.cells() {
            taken.insert(cell.pos());
            selected.push(cell);
        }
        used += 1;
    }
    used
}

fn fill_singles(
    singles: impl IntoIterator<Item = Cell>,
    count: usize,
    taken: &mut CellSet,
    selected: &mut Vec<Cell>,
) {
    for cell in singles {
        if selected.len() >= count {
            break;
        }
        if taken.insert(cell.pos()) {
            selected.push(cell);
        }
    }
}

/// Picks `count` cells to erode out of `candidates`.
///
/// Half of the time adjacent pairs are consumed first, which bites into the coastline in
/// chunks instead of scattering single-cell holes. The rest of the quota is filled with random
/// singles. When there are no more candidates than requested, all of them are returned.
pub fn select_cells_to_erode<R: Rng>(candidates: &[Cell], count: usize, rng: &mut R) -> Vec<Cell> {
    let count = count.max(1);
    let candidates = unique_cells(candidates);
    if candidates.len() <= count {
        return candidates;
    }

    let mut pairs = find_adjacent_pairs(&candidates);
    pairs.shuffle(rng);
    let prioritize_pairs = rng.random_bool(0.5);

    let mut taken = CellSet::with_capacity(count);
    let mut selected = Vec::with_capacity(count);
    if prioritize_pairs {
        let used = take_pairs(&pairs, count, &mut taken, &mut selected);
        log::trace!("Eroding {} pairs out of {} available", used, pairs.len());
    }

    let mut singles: Vec<Cell> = candidates
        .into_iter()
        .filter(|cell| !taken.contains(&cell.pos()))
        .collect();
    singles.shuffle(rng);
    fill_singles(singles, count, &mut taken, &mut selected);
    selected
}

/// Like [`select_cells_to_erode`], but eats the outermost ring first.
///
/// Pairs are always preferred and ordered by [`prioritize_pairs_by_layer`], singles are taken
/// from the highest layer down, random within a layer.
pub fn select_cells_to_erode_by_layer<R: Rng>(
    candidates: &[Cell],
    count: usize,
    outer_layer: u8,
    rng: &mut R,
) -> Vec<Cell> {
    let count = count.max(1);
    let candidates = unique_cells(candidates);
    if candidates.len() <= count {
        return candidates;
    }

    let pairs = prioritize_pairs_by_layer(find_adjacent_pairs(&candidates), outer_layer, rng);

    let mut taken = CellSet::with_capacity(count);
    let mut selected = Vec::with_capacity(count);
    take_pairs(&pairs, count, &mut taken, &mut selected);

    let mut singles: Vec<Cell> = candidates
        .into_iter()
        .filter(|cell| !taken.contains(&cell.pos()))
        .collect();
    singles.shuffle(rng);
    singles.sort_by_key(|cell| core::cmp::Reverse(cell.layer_or_inner()));
    fill_singles(singles, count, &mut taken, &mut selected);
    selected
}
