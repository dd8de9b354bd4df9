use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Invalid cell key")]
    InvalidKey,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Grid has no cells")]
    EmptyGrid,
    #[error("Tick intervals must be positive with a decay factor in (0, 1]")]
    InvalidInterval,
    #[error("Initial snake does not fit on the grid")]
    InvalidSnakeLength,
}

pub type Result<T> = core::result::Result<T, GameError>;
