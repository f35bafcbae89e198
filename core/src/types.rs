use serde::{Deserialize, Serialize};

/// Single coordinate axis. Islands are centered on the origin, so negative values are legal.
pub type Coord = i32;

/// Two-dimensional coordinates `(x, y)`, with `y` growing downward as on screen.
pub type Coord2 = (Coord, Coord);

/// One of the four orthogonal sides of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Clockwise order, starting at the top.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    pub const fn delta(self) -> Coord2 {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Maps a unit step back to its direction. Anything that is not an orthogonal unit step has no
    /// direction.
    pub fn from_delta(delta: Coord2) -> Option<Self> {
        let direction = match delta {
            (0, -1) => Self::Up,
            (1, 0) => Self::Right,
            (0, 1) => Self::Down,
            (-1, 0) => Self::Left,
            _ => {
                log::warn!("Unmapped direction delta {:?}", delta);
                return None;
            }
        };
        Some(direction)
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    pub const fn step(self, (x, y): Coord2) -> Coord2 {
        let (dx, dy) = self.delta();
        (x.saturating_add(dx), y.saturating_add(dy))
    }
}

/// Returns the direction that leads from `from` to `to` when they are orthogonal neighbors.
pub fn direction_between(from: Coord2, to: Coord2) -> Option<Direction> {
    Direction::from_delta((to.0.wrapping_sub(from.0), to.1.wrapping_sub(from.1)))
}

pub const fn are_adjacent(a: Coord2, b: Coord2) -> bool {
    let dx = a.0.abs_diff(b.0);
    let dy = a.1.abs_diff(b.1);
    dx + dy == 1
}

pub const fn squared_distance((x0, y0): Coord2, (x1, y1): Coord2) -> i64 {
    let dx = x0 as i64 - x1 as i64;
    let dy = y0 as i64 - y1 as i64;
    dx * dx + dy * dy
}

/// `ceil(total * fraction)` without relying on float rounding from `std`.
pub fn ceil_fraction(total: usize, fraction: f64) -> usize {
    if fraction.is_nan() || fraction <= 0.0 {
        return 0;
    }
    let exact = total as f64 * fraction;
    let truncated = exact as usize;
    if (truncated as f64) < exact {
        truncated + 1
    } else {
        truncated
    }
}

pub trait NeighborIterExt {
    fn iter_neighbors(self) -> NeighborIter;
}

impl NeighborIterExt for Coord2 {
    fn iter_neighbors(self) -> NeighborIter {
        NeighborIter::new(self)
    }
}

/// Iterates the four orthogonal neighbors of a cell, clockwise from the top.
#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    index: u8,
}

impl NeighborIter {
    fn new(center: Coord2) -> Self {
        Self { center, index: 0 }
    }
}

impl Iterator for NeighborIter {
    type Item = (Direction, Coord2);

    fn next(&mut self) -> Option<Self::Item> {
        let direction = *Direction::ALL.get(usize::from(self.index))?;
        self.index += 1;
        Some((direction, direction.step(self.center)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = Direction::ALL.len() - usize::from(self.index);
        (left, Some(left))
    }
}

impl ExactSizeIterator for NeighborIter {}
