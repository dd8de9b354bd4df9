//! Engines for two small grid games, minesweeper and snake.
//!
//! Neither engine draws anything or listens to devices. Hosts feed them commands and elapsed time, and receive
//! intents describing what changed through a callback.

#![no_std]

extern crate alloc;

pub use clock::*;
pub use error::*;
pub use types::*;

mod clock;
mod error;
pub mod minesweeper;
pub mod snake;
mod types;
