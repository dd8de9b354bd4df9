use alloc::vec::Vec;
use hashbrown::HashMap;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::MinesweeperConfig;
use crate::*;

/// Content of a cell that is either a mine or touches at least one. Cells absent from a [`MineLayout`] are empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    Mine,
    Adjacent(u8),
}

/// Immutable per-round board: sparse map of mines and adjacency counts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineLayout {
    size: Coord2,
    values: HashMap<Coord2, CellValue>,
    mine_count: CellCount,
}

impl MineLayout {
    /// Builds the layout for an exact set of mines; duplicates are counted once.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::EmptyGrid);
        }

        let mut values = HashMap::with_capacity(mine_coords.len() * 4);
        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::InvalidCoords);
            }
            values.insert(coords, CellValue::Mine);
        }

        let mine_count = values.len() as CellCount;
        let mines: Vec<Coord2> = values.keys().copied().collect();
        for mine in mines {
            for neighbor in neighbors(mine, size) {
                match values.get_mut(&neighbor) {
                    Some(CellValue::Mine) => {}
                    Some(CellValue::Adjacent(count)) => *count += 1,
                    None => {
                        values.insert(neighbor, CellValue::Adjacent(1));
                    }
                }
            }
        }

        Ok(Self {
            size,
            values,
            mine_count,
        })
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.size) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn value_at(&self, coords: Coord2) -> Option<CellValue> {
        self.values.get(&coords).copied()
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        matches!(self.value_at(coords), Some(CellValue::Mine))
    }

    /// Adjacent mine count of a safe cell, 0 for mines and empty cells.
    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        match self.value_at(coords) {
            Some(CellValue::Adjacent(count)) => count,
            _ => 0,
        }
    }

    /// Every mapped cell: mines and numbered cells, in no particular order.
    pub fn iter_values(&self) -> impl Iterator<Item = (Coord2, CellValue)> + '_ {
        self.values.iter().map(|(&coords, &value)| (coords, value))
    }

    pub fn iter_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.iter_values()
            .filter(|&(_, value)| value == CellValue::Mine)
            .map(|(coords, _)| coords)
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + use<> {
        neighbors(coords, self.size).into_iter()
    }
}

pub trait BoardGenerator {
    fn generate(self, config: &MinesweeperConfig) -> Result<MineLayout>;
}

/// Uniform placement: partial Fisher-Yates over the flat cell indices.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, config: &MinesweeperConfig) -> Result<MineLayout> {
        config.validate()?;

        let size = config.size();
        let total_cells = config.total_cells();
        let mines = config.mine_count();

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut cells: Vec<CellCount> = (0..total_cells).collect();
        for i in 0..mines {
            let pick = rng.random_range(i..total_cells);
            cells.swap(usize::from(i), usize::from(pick));
        }

        let mine_coords: Vec<Coord2> = cells[..usize::from(mines)]
            .iter()
            .map(|&index| from_flat_index(index, size))
            .collect();
        log::debug!(
            "Generated {}x{} board with {} mines (seed {})",
            size.0,
            size.1,
            mines,
            self.seed
        );
        MineLayout::from_mine_coords(size, &mine_coords)
    }
}

/// Places mines exactly where told, ignoring the configured density.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedBoardGenerator {
    mines: Vec<Coord2>,
}

impl FixedBoardGenerator {
    pub fn new(mines: Vec<Coord2>) -> Self {
        Self { mines }
    }
}

impl BoardGenerator for FixedBoardGenerator {
    fn generate(self, config: &MinesweeperConfig) -> Result<MineLayout> {
        MineLayout::from_mine_coords(config.size(), &self.mines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force_count(layout: &MineLayout, coords: Coord2) -> u8 {
        layout
            .iter_neighbors(coords)
            .filter(|&pos| layout.contains_mine(pos))
            .count() as u8
    }

    #[test]
    fn fixed_mines_determine_counts() {
        let layout = MineLayout::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();

        assert_eq!(layout.mine_count(), 2);
        assert_eq!(layout.value_at((0, 0)), Some(CellValue::Mine));
        assert_eq!(layout.value_at((1, 1)), Some(CellValue::Adjacent(2)));
        assert_eq!(layout.value_at((0, 1)), Some(CellValue::Adjacent(1)));
        assert_eq!(layout.value_at((0, 2)), None);
        assert_eq!(layout.adjacent_mine_count((0, 2)), 0);
    }

    #[test]
    fn duplicate_and_out_of_range_mines() {
        let layout = MineLayout::from_mine_coords((2, 2), &[(1, 1), (1, 1)]).unwrap();
        assert_eq!(layout.mine_count(), 1);
        assert_eq!(layout.value_at((0, 0)), Some(CellValue::Adjacent(1)));

        assert_eq!(
            MineLayout::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn random_board_has_exact_mines_and_consistent_counts() {
        let config = MinesweeperConfig::default();
        let layout = RandomBoardGenerator::new(7).generate(&config).unwrap();

        assert_eq!(layout.mine_count(), 20);
        assert_eq!(layout.iter_mines().count(), 20);
        for coords in iter_coords(layout.size()) {
            if !layout.contains_mine(coords) {
                assert_eq!(
                    layout.adjacent_mine_count(coords),
                    brute_force_count(&layout, coords),
                    "count mismatch at {coords:?}"
                );
            }
        }
    }

    #[test]
    fn random_board_is_reproducible_from_seed() {
        let config = MinesweeperConfig::default();
        let a = RandomBoardGenerator::new(42).generate(&config).unwrap();
        let b = RandomBoardGenerator::new(42).generate(&config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn full_board_is_all_mines() {
        let config = MinesweeperConfig {
            rows: 2,
            cols: 3,
            mine_density: 1.0,
        };
        let layout = RandomBoardGenerator::new(1).generate(&config).unwrap();

        assert_eq!(layout.mine_count(), 6);
        assert_eq!(layout.safe_cell_count(), 0);
    }
}
