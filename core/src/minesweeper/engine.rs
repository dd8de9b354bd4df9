use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::num::Saturating;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{CellView, Intent, MineLayout};
use crate::*;

/// Valid transitions: `Playing -> Won` and `Playing -> Lost`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Playing,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::Playing
    }
}

/// Player-visible state of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineCell {
    Hidden,
    Revealed(u8),
    Flagged,
}

impl Default for EngineCell {
    fn default() -> Self {
        Self::Hidden
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Owns one round of minesweeper: the immutable layout plus revealed and flagged cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealEngine {
    layout: MineLayout,
    board: Array2<EngineCell>,
    revealed_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    state: EngineState,
    detonated: Option<Coord2>,
}

impl RevealEngine {
    pub fn new(layout: MineLayout) -> Self {
        let size = layout.size();
        Self {
            layout,
            board: Array2::default(size.to_nd_index()),
            revealed_count: Saturating(0),
            flagged_count: Saturating(0),
            state: Default::default(),
            detonated: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn layout(&self) -> &MineLayout {
        &self.layout
    }

    pub fn size(&self) -> Coord2 {
        self.layout.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.layout.mine_count()
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count.0
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count.0
    }

    /// Mines minus flags; negative when over-flagged.
    pub fn remaining_flags(&self) -> isize {
        (self.layout.mine_count() as isize) - (self.flagged_count.0 as isize)
    }

    pub fn detonated(&self) -> Option<Coord2> {
        self.detonated
    }

    pub fn cell_at(&self, coords: Coord2) -> EngineCell {
        self.board[coords.to_nd_index()]
    }

    pub fn is_revealed(&self, coords: Coord2) -> bool {
        matches!(self.cell_at(coords), EngineCell::Revealed(_))
    }

    pub fn is_flagged(&self, coords: Coord2) -> bool {
        matches!(self.cell_at(coords), EngineCell::Flagged)
    }

    /// What the renderer should currently show at `coords`.
    pub fn cell_view(&self, coords: Coord2) -> CellView {
        if self.detonated == Some(coords) {
            return CellView::Exploded;
        }
        if self.detonated.is_some() && self.layout.contains_mine(coords) {
            return CellView::Mine;
        }
        match self.cell_at(coords) {
            EngineCell::Hidden => CellView::Hidden,
            EngineCell::Revealed(count) => CellView::Number(count),
            EngineCell::Flagged => CellView::Flagged,
        }
    }

    pub fn toggle_flag(&mut self, coords: Coord2, emit: &mut impl FnMut(Intent)) -> Result<MarkOutcome> {
        use EngineCell::*;

        let coords = self.layout.validate_coords(coords)?;
        if self.state.is_finished() {
            return Ok(MarkOutcome::NoChange);
        }

        let index = coords.to_nd_index();
        match self.board[index] {
            Hidden => {
                self.board[index] = Flagged;
                self.flagged_count += 1;
            }
            Flagged => {
                self.board[index] = Hidden;
                self.flagged_count -= 1;
            }
            Revealed(_) => return Ok(MarkOutcome::NoChange),
        }
        log::debug!("toggle flag at {:?}, {} left", coords, self.remaining_flags());

        self.emit_cell(coords, emit);
        emit(Intent::UpdateMinesLeft(self.remaining_flags()));
        Ok(MarkOutcome::Changed)
    }

    pub fn reveal(&mut self, coords: Coord2, emit: &mut impl FnMut(Intent)) -> Result<RevealOutcome> {
        let coords = self.layout.validate_coords(coords)?;
        if self.state.is_finished() || self.is_revealed(coords) {
            return Ok(RevealOutcome::NoChange);
        }

        if self.layout.contains_mine(coords) {
            log::debug!("mine hit at {:?}", coords);
            self.detonated = Some(coords);
            self.state = EngineState::Lost;
            let mapped: Vec<Coord2> = self.layout.iter_values().map(|(pos, _)| pos).collect();
            for pos in mapped {
                self.emit_cell(pos, emit);
            }
            emit(Intent::GameEnded(Outcome::Lost));
            return Ok(RevealOutcome::HitMine);
        }

        let flags_before = self.flagged_count;
        self.flood_reveal(coords, emit);
        if self.flagged_count != flags_before {
            emit(Intent::UpdateMinesLeft(self.remaining_flags()));
        }

        if self.revealed_count == Saturating(self.layout.safe_cell_count()) {
            log::debug!("all safe cells revealed");
            self.state = EngineState::Won;
            emit(Intent::GameEnded(Outcome::Won));
            Ok(RevealOutcome::Won)
        } else {
            Ok(RevealOutcome::Revealed)
        }
    }

    /// Reveals `start` and, through every empty cell reached, all of its safe neighbors. Revealed cells are never
    /// queued twice past the check at the top of the loop, so the work is bounded by the board size.
    fn flood_reveal(&mut self, start: Coord2, emit: &mut impl FnMut(Intent)) {
        let mut to_visit = VecDeque::from([start]);

        while let Some(coords) = to_visit.pop_front() {
            let index = coords.to_nd_index();
            match self.board[index] {
                EngineCell::Revealed(_) => continue,
                EngineCell::Flagged => self.flagged_count -= 1,
                EngineCell::Hidden => {}
            }

            let count = self.layout.adjacent_mine_count(coords);
            self.board[index] = EngineCell::Revealed(count);
            self.revealed_count += 1;
            self.emit_cell(coords, emit);
            log::trace!("revealed {:?} with count {}", coords, count);

            if count == 0 {
                to_visit.extend(self.layout.iter_neighbors(coords).filter(|&pos| {
                    !self.layout.contains_mine(pos)
                        && !matches!(self.board[pos.to_nd_index()], EngineCell::Revealed(_))
                }));
            }
        }
    }

    fn emit_cell(&self, coords: Coord2, emit: &mut impl FnMut(Intent)) {
        emit(Intent::UpdateCell {
            coords,
            view: self.cell_view(coords),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(size: Coord2, mines: &[Coord2]) -> RevealEngine {
        RevealEngine::new(MineLayout::from_mine_coords(size, mines).unwrap())
    }

    fn ignore(_: Intent) {}

    fn assert_win_invariant(engine: &RevealEngine) {
        let total = mult(engine.size().0, engine.size().1);
        let full = engine.revealed_count() + engine.total_mines() == total;
        assert_eq!(full, engine.state() == EngineState::Won);
    }

    #[test]
    fn reveal_hits_mine_and_shows_every_mine() {
        let mut engine = engine((3, 3), &[(0, 0), (2, 2)]);
        let mut intents = Vec::new();

        let outcome = engine.reveal((0, 0), &mut |i| intents.push(i)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(engine.state(), EngineState::Lost);
        assert_eq!(engine.detonated(), Some((0, 0)));
        assert!(intents.contains(&Intent::UpdateCell {
            coords: (0, 0),
            view: CellView::Exploded
        }));
        assert!(intents.contains(&Intent::UpdateCell {
            coords: (2, 2),
            view: CellView::Mine
        }));
        assert_eq!(intents.last(), Some(&Intent::GameEnded(Outcome::Lost)));
        assert_win_invariant(&engine);
    }

    #[test]
    fn flood_fill_opens_zero_region_and_border() {
        let mut engine = engine((4, 4), &[(3, 3)]);
        let mut intents = Vec::new();

        let outcome = engine.reveal((0, 0), &mut |i| intents.push(i)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(engine.cell_at((0, 0)), EngineCell::Revealed(0));
        assert_eq!(engine.cell_at((0, 3)), EngineCell::Revealed(0));
        assert_eq!(engine.cell_at((2, 2)), EngineCell::Revealed(1));
        assert_eq!(engine.cell_at((3, 3)), EngineCell::Hidden);
        assert_eq!(engine.revealed_count(), 15);
        assert_eq!(intents.last(), Some(&Intent::GameEnded(Outcome::Won)));
        assert_win_invariant(&engine);
    }

    #[test]
    fn flood_fill_stops_at_numbered_cells() {
        // a wall of mines splits the board: column 2 is mined
        let mut engine = engine((3, 5), &[(0, 2), (1, 2), (2, 2)]);

        engine.reveal((1, 0), &mut ignore).unwrap();

        assert_eq!(engine.cell_at((1, 0)), EngineCell::Revealed(0));
        assert_eq!(engine.cell_at((1, 1)), EngineCell::Revealed(3));
        assert_eq!(engine.cell_at((0, 1)), EngineCell::Revealed(2));
        assert_eq!(engine.cell_at((1, 3)), EngineCell::Hidden);
        assert_eq!(engine.revealed_count(), 6);
        assert_eq!(engine.state(), EngineState::Playing);
        assert_win_invariant(&engine);
    }

    #[test]
    fn reveal_twice_is_a_no_op() {
        let mut engine = engine((3, 5), &[(0, 2), (1, 2), (2, 2)]);
        engine.reveal((1, 0), &mut ignore).unwrap();
        let snapshot = engine.clone();
        let mut intents = Vec::new();

        let outcome = engine.reveal((1, 0), &mut |i| intents.push(i)).unwrap();

        assert_eq!(outcome, RevealOutcome::NoChange);
        assert!(intents.is_empty());
        assert_eq!(engine, snapshot);
    }

    #[test]
    fn flood_fill_clears_flags_on_the_way() {
        let mut engine = engine((3, 5), &[(0, 2), (1, 2), (2, 2)]);
        engine.toggle_flag((2, 0), &mut ignore).unwrap();
        assert_eq!(engine.remaining_flags(), 2);
        let mut intents = Vec::new();

        engine.reveal((0, 0), &mut |i| intents.push(i)).unwrap();

        assert_eq!(engine.cell_at((2, 0)), EngineCell::Revealed(0));
        assert_eq!(engine.flagged_count(), 0);
        assert!(intents.contains(&Intent::UpdateMinesLeft(3)));
    }

    #[test]
    fn toggle_flag_flips_and_counts_down() {
        let mut engine = engine((2, 2), &[(0, 0)]);
        let mut intents = Vec::new();

        let outcome = engine.toggle_flag((1, 1), &mut |i| intents.push(i)).unwrap();
        assert_eq!(outcome, MarkOutcome::Changed);
        assert!(engine.is_flagged((1, 1)));
        assert_eq!(
            intents,
            [
                Intent::UpdateCell {
                    coords: (1, 1),
                    view: CellView::Flagged
                },
                Intent::UpdateMinesLeft(0),
            ]
        );

        engine.toggle_flag((0, 1), &mut ignore).unwrap();
        assert_eq!(engine.remaining_flags(), -1);

        engine.toggle_flag((1, 1), &mut ignore).unwrap();
        assert!(!engine.is_flagged((1, 1)));
        assert_eq!(engine.remaining_flags(), 0);
    }

    #[test]
    fn toggle_flag_ignores_revealed_cells() {
        let mut engine = engine((2, 2), &[(0, 0)]);
        engine.reveal((1, 1), &mut ignore).unwrap();

        let outcome = engine.toggle_flag((1, 1), &mut ignore).unwrap();

        assert_eq!(outcome, MarkOutcome::NoChange);
        assert_eq!(engine.flagged_count(), 0);
    }

    #[test]
    fn finished_engine_ignores_input() {
        let mut engine = engine((2, 1), &[(0, 0)]);
        assert_eq!(engine.reveal((1, 0), &mut ignore).unwrap(), RevealOutcome::Won);

        let mut intents = Vec::new();
        assert_eq!(
            engine.toggle_flag((0, 0), &mut |i| intents.push(i)).unwrap(),
            MarkOutcome::NoChange
        );
        assert_eq!(
            engine.reveal((0, 0), &mut |i| intents.push(i)).unwrap(),
            RevealOutcome::NoChange
        );
        assert!(intents.is_empty());
        assert_eq!(engine.state(), EngineState::Won);
    }

    #[test]
    fn out_of_range_coords_are_rejected() {
        let mut engine = engine((2, 2), &[(0, 0)]);
        assert_eq!(engine.reveal((2, 0), &mut ignore), Err(GameError::InvalidCoords));
        assert_eq!(engine.toggle_flag((0, 5), &mut ignore), Err(GameError::InvalidCoords));
    }
}
