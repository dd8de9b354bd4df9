use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

pub use engine::*;
pub use session::*;

mod engine;
mod session;

/// Timing and scoring knobs for a snake session. Coordinates on this grid are `(x, y)`, so the bounds are
/// `(cols, rows)`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    pub rows: Coord,
    pub cols: Coord,
    pub base_interval_ms: u32,
    /// Tick length while boost is held. Never slower than the regular interval.
    pub boost_interval_ms: u32,
    pub min_interval_ms: u32,
    pub score_increment: u32,
    pub speed_decay_factor: f64,
    pub initial_length: CellCount,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            rows: 30,
            cols: 30,
            base_interval_ms: 100,
            boost_interval_ms: 20,
            min_interval_ms: 10,
            score_increment: 15,
            speed_decay_factor: 0.9,
            initial_length: 5,
        }
    }
}

impl SnakeConfig {
    pub const fn size(&self) -> Coord2 {
        (self.cols, self.rows)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.cols, self.rows)
    }

    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms.into())
    }

    pub fn boost_interval(&self) -> Duration {
        Duration::from_millis(self.boost_interval_ms.into())
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms.into())
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::EmptyGrid);
        }
        if self.min_interval_ms == 0
            || self.boost_interval_ms == 0
            || self.base_interval_ms < self.min_interval_ms
            || !(self.speed_decay_factor > 0.0 && self.speed_decay_factor <= 1.0)
        {
            return Err(GameError::InvalidInterval);
        }
        if self.initial_length == 0 || self.initial_length > CellCount::from(self.cols) {
            return Err(GameError::InvalidSnakeLength);
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector `(dx, dy)`; `y` grows downwards.
    pub const fn delta(self) -> Delta {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Whether turning from `self` to `other` changes axis, the only kind of turn a snake can make.
    pub const fn crosses(self, other: Self) -> bool {
        self.is_horizontal() != other.is_horizontal()
    }
}

/// Input accepted by a [`SnakeSession`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Turn(Direction),
    SetBoost(bool),
    Restart,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelView {
    Empty,
    Body,
    Head,
    Food,
}

/// Update emitted towards the renderer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    UpdatePixel { coords: Coord2, view: PixelView },
    UpdateScore(u32),
    GameEnded(Outcome),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_map_to_unit_vectors() {
        assert_eq!(Direction::Up.delta(), (0, -1));
        assert_eq!(Direction::Down.delta(), (0, 1));
        assert_eq!(Direction::Left.delta(), (-1, 0));
        assert_eq!(Direction::Right.delta(), (1, 0));
    }

    #[test]
    fn only_perpendicular_turns_cross() {
        assert!(Direction::Right.crosses(Direction::Up));
        assert!(!Direction::Right.crosses(Direction::Left));
        assert!(!Direction::Up.crosses(Direction::Up));
    }

    #[test]
    fn validate_rejects_broken_timing() {
        assert_eq!(SnakeConfig::default().validate(), Ok(()));

        let zero_min = SnakeConfig {
            min_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(zero_min.validate(), Err(GameError::InvalidInterval));

        let speeding_up = SnakeConfig {
            speed_decay_factor: 1.5,
            ..Default::default()
        };
        assert_eq!(speeding_up.validate(), Err(GameError::InvalidInterval));

        let too_long = SnakeConfig {
            cols: 4,
            ..Default::default()
        };
        assert_eq!(too_long.validate(), Err(GameError::InvalidSnakeLength));
    }
}
