use alloc::collections::VecDeque;
use alloc::string::ToString;
use alloc::vec::Vec;
use ndarray::Array2;
use rand::prelude::*;

use super::*;

/// Longest side, in cells, of the area a generated island may span.
pub const MAX_ISLAND_SIDE: u64 = 1024;

/// Shape of a generated island.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandConfig {
    /// Number of rings around the path, the path sits in layer 1.
    pub layers: u8,
    /// Thickness of every ring, in cells.
    pub ring_width: u8,
    /// Share of the island removed by the initial shaping pass, zero to skip it.
    pub initial_erosion: f64,
    /// Cut a jagged coastline into the outermost ring before shaping.
    pub outer_ring_pattern: bool,
    /// Shape the outermost ring first instead of eroding any coastline cell.
    pub prefer_outer: bool,
}

impl IslandConfig {
    pub fn validate(&self) -> Result<()> {
        if self.layers == 0 {
            return Err(ErosionError::InvalidIsland {
                layers: self.layers,
                min: 1,
            });
        }
        if self.ring_width == 0 {
            return Err(ErosionError::InvalidConfig(
                "ring_width must be non-zero".to_string(),
            ));
        }
        if self.initial_erosion != 0.0 {
            validate_percentage(self.initial_erosion)?;
        }
        let side = 2 * self.margin() + 1;
        check_island_side(side, side)
    }

    /// How far the outermost ring reaches from the path.
    pub fn margin(&self) -> u64 {
        u64::from(self.layers) * u64::from(self.ring_width)
    }
}

fn check_island_side(width: u64, height: u64) -> Result<()> {
    if width > MAX_ISLAND_SIDE || height > MAX_ISLAND_SIDE {
        return Err(ErosionError::IslandTooLarge {
            width,
            height,
            max: MAX_ISLAND_SIDE,
        });
    }
    Ok(())
}

fn axis_span(coords: impl Iterator<Item = Coord> + Clone, margin: u64) -> u64 {
    let min = coords.clone().min().unwrap_or_default();
    let max = coords.max().unwrap_or_default();
    u64::from(max.abs_diff(min)) + 2 * margin + 1
}

/// Width and height of the path's bounding box grown by `margin` on every side.
fn island_extent(path: &[Cell], margin: u64) -> (u64, u64) {
    (
        axis_span(path.iter().map(|cell| cell.x), margin),
        axis_span(path.iter().map(|cell| cell.y), margin),
    )
}

/// Grows rings of land around the path, then roughens the coastline.
#[derive(Clone, Debug, PartialEq)]
pub struct LayeredIslandGenerator {
    seed: u64,
    config: IslandConfig,
}

impl LayeredIslandGenerator {
    pub fn new(seed: u64, config: IslandConfig) -> Self {
        Self { seed, config }
    }
}

/// Chebyshev distance from every cell of the bounding box to the closest path cell.
fn distance_field(path: &[Cell], margin: Coord) -> (Coord2, Array2<u32>) {
    let min_x = path.iter().map(|cell| cell.x).min().unwrap_or_default() - margin;
    let max_x = path.iter().map(|cell| cell.x).max().unwrap_or_default() + margin;
    let min_y = path.iter().map(|cell| cell.y).min().unwrap_or_default() - margin;
    let max_y = path.iter().map(|cell| cell.y).max().unwrap_or_default() + margin;
    let rows = max_y.abs_diff(min_y) as usize + 1;
    let cols = max_x.abs_diff(min_x) as usize + 1;

    let origin = (min_x, min_y);
    let index_of = |(x, y): Coord2| [y.abs_diff(min_y) as usize, x.abs_diff(min_x) as usize];

    let mut distance = Array2::from_elem([rows, cols], u32::MAX);
    let mut to_visit = VecDeque::new();
    for cell in path {
        let index = index_of(cell.pos());
        if distance[index] != 0 {
            distance[index] = 0;
            to_visit.push_back(cell.pos());
        }
    }

    while let Some(pos) = to_visit.pop_front() {
        let next = distance[index_of(pos)] + 1;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (x, y) = (pos.0 + dx, pos.1 + dy);
                if x < min_x || x > max_x || y < min_y || y > max_y {
                    continue;
                }
                let index = index_of((x, y));
                if distance[index] > next {
                    distance[index] = next;
                    to_visit.push_back((x, y));
                }
            }
        }
    }

    (origin, distance)
}

/// Every cell within `layers * ring_width` of the path, annotated with its ring.
fn layered_cells(path: &[Cell], layers: u8, ring_width: u8) -> Vec<Cell> {
    let ring_width = u32::from(ring_width);
    let margin = u32::from(layers) * ring_width;
    let (origin, distance) = distance_field(path, margin as Coord);
    let path_by_pos: hashbrown::HashMap<Coord2, Cell> =
        path.iter().map(|cell| (cell.pos(), *cell)).collect();

    distance
        .indexed_iter()
        .filter(|(_, d)| **d <= margin)
        .map(|((row, col), &d)| {
            let pos = (origin.0 + col as Coord, origin.1 + row as Coord);
            let layer = d.div_ceil(ring_width).max(1) as u8;
            match path_by_pos.get(&pos) {
                Some(cell) => *cell,
                None => Cell::from(pos).with_layer(layer),
            }
        })
        .collect()
}

impl IslandGenerator for LayeredIslandGenerator {
    fn generate(self, path: &[Cell]) -> Result<Island> {
        let IslandConfig {
            layers,
            ring_width,
            initial_erosion,
            outer_ring_pattern,
            prefer_outer,
        } = self.config;
        self.config.validate()?;

        let mut seen = CellSet::with_capacity(path.len());
        let path: Vec<Cell> = path
            .iter()
            .filter(|cell| seen.insert(cell.pos()))
            .map(|cell| cell.with_layer(1))
            .collect();
        if path.is_empty() {
            return Err(ErosionError::EmptyPath);
        }
        let (width, height) = island_extent(&path, self.config.margin());
        check_island_side(width, height)?;

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut cells = layered_cells(&path, layers, ring_width);
        let full_size = cells.len();

        if outer_ring_pattern {
            if layers > 1 {
                let ring = cells_in_layer(&cells, layers);
                let kept = apply_layer_removal_pattern(&ring, &mut rng).to_cell_set();
                cells.retain(|cell| cell.layer != Some(layers) || kept.contains(&cell.pos()));
            } else {
                log::warn!("Single layer island has no outer ring to cut, skipping pattern");
            }
        }

        if initial_erosion > 0.0 {
            cells = if prefer_outer {
                apply_initial_erosion_by_layer(&cells, &path, initial_erosion, layers, &mut rng)
            } else {
                apply_initial_erosion(&cells, &path, initial_erosion, &mut rng)
            };
        }

        log::debug!(
            "Generated island with {} of {} cells around a {} cell path",
            cells.len(),
            full_size,
            path.len()
        );
        Ok(Island {
            cells,
            path,
            outer_layer: layers,
        })
    }
}
