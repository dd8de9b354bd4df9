use serde::{Deserialize, Serialize};

use crate::*;

pub use engine::*;
pub use layout::*;
pub use session::*;

mod engine;
mod layout;
mod session;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinesweeperConfig {
    pub rows: Coord,
    pub cols: Coord,
    /// Fraction of cells holding a mine, rounded up to a whole mine count.
    pub mine_density: f64,
}

impl Default for MinesweeperConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 10,
            mine_density: 0.20,
        }
    }
}

impl MinesweeperConfig {
    pub const fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }

    /// `ceil(rows * cols * mine_density)`
    pub fn mine_count(&self) -> CellCount {
        let exact = f64::from(self.total_cells()) * self.mine_density;
        let whole = exact as CellCount;
        if f64::from(whole) < exact {
            whole.saturating_add(1)
        } else {
            whole
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::EmptyGrid);
        }
        if !(0.0..=1.0).contains(&self.mine_density) {
            return Err(GameError::TooManyMines);
        }
        if self.mine_count() > self.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }
}

/// Input accepted by a [`MinesweeperSession`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Reveal(Coord2),
    ToggleFlag(Coord2),
    Restart,
}

/// What a renderer should show for a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Number(u8),
    Mine,
    Flagged,
    Exploded,
}

/// Update emitted towards the renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    UpdateCell { coords: Coord2, view: CellView },
    UpdateMinesLeft(isize),
    UpdateTimer(u32),
    GameEnded(Outcome),
}
