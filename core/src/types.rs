use alloc::format;
use alloc::string::String;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{GameError, Result};

/// Single coordinate axis used for grid width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts, snake lengths and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates. Minesweeper reads them as `(row, col)`, snake as `(x, y)`; in both cases the bounds
/// tuple uses the same axis order.
pub type Coord2 = (Coord, Coord);

/// Signed offset applied to a [`Coord2`].
pub type Delta = (i8, i8);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// How a round ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

/// Canonical string key for an address, `"a-b"`.
pub fn to_key((a, b): Coord2) -> String {
    format!("{a}-{b}")
}

/// Exact inverse of [`to_key`].
pub fn from_key(key: &str) -> Result<Coord2> {
    let (a, b) = key.split_once('-').ok_or(GameError::InvalidKey)?;
    let a = a.parse().map_err(|_| GameError::InvalidKey)?;
    let b = b.parse().map_err(|_| GameError::InvalidKey)?;
    Ok((a, b))
}

pub const fn in_bounds(coords: Coord2, bounds: Coord2) -> bool {
    coords.0 < bounds.0 && coords.1 < bounds.1
}

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
pub fn offset(coords: Coord2, delta: Delta, bounds: Coord2) -> Option<Coord2> {
    let (a, b) = coords;
    let (da, db) = delta;
    let (max_a, max_b) = bounds;

    let next_a = a.checked_add_signed(da)?;
    if next_a >= max_a {
        return None;
    }

    let next_b = b.checked_add_signed(db)?;
    if next_b >= max_b {
        return None;
    }

    Some((next_a, next_b))
}

/// Row-major offset order.
const DISPLACEMENTS: [Delta; 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    index: u8,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item = offset(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}

/// The up-to-8 axis and diagonal neighbors of `center` inside `bounds`.
pub fn neighbors(center: Coord2, bounds: Coord2) -> SmallVec<[Coord2; 8]> {
    NeighborIter::new(center, bounds).collect()
}

/// Every address inside `bounds`, row-major.
pub fn iter_coords(bounds: Coord2) -> impl Iterator<Item = Coord2> {
    let (end_a, end_b) = bounds;
    (0..end_a).flat_map(move |a| (0..end_b).map(move |b| (a, b)))
}

/// Flat row-major index, the inverse of [`from_flat_index`].
pub fn flat_index((a, b): Coord2, bounds: Coord2) -> CellCount {
    CellCount::from(a) * CellCount::from(bounds.1) + CellCount::from(b)
}

pub fn from_flat_index(index: CellCount, bounds: Coord2) -> Coord2 {
    let width = CellCount::from(bounds.1);
    // both fit in a Coord as long as index < mult(bounds)
    ((index / width) as Coord, (index % width) as Coord)
}
