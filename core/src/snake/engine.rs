use alloc::collections::VecDeque;
use core::time::Duration;
use hashbrown::HashSet;
use rand::prelude::*;
use rand::rngs::SmallRng;

use super::{Direction, Intent, PixelView, SnakeConfig};
use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SnakeState {
    Running,
    GameOver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The engine was already over, nothing happened.
    NoChange,
    Moved,
    Ate,
    GameOver,
}

/// One snake round. `step` is the only thing that moves the snake; `turn` and `set_boost` only record input for it.
#[derive(Clone, Debug)]
pub struct SnakeEngine {
    config: SnakeConfig,
    rng: SmallRng,
    /// Tail first, head last.
    body: VecDeque<Coord2>,
    occupied: HashSet<Coord2>,
    food: Option<Coord2>,
    direction: Direction,
    pending: VecDeque<Direction>,
    score: u32,
    interval: Duration,
    boost: bool,
    state: SnakeState,
}

impl SnakeEngine {
    pub fn new(config: SnakeConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut engine = Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
            body: VecDeque::new(),
            occupied: HashSet::new(),
            food: None,
            direction: Direction::Down,
            pending: VecDeque::new(),
            score: 0,
            interval: config.base_interval(),
            boost: false,
            state: SnakeState::Running,
        };
        engine.reset();
        Ok(engine)
    }

    /// Builds an engine around an explicit body (tail first) and food position, for replaying a known situation.
    pub fn with_body(
        config: SnakeConfig,
        seed: u64,
        body: &[Coord2],
        direction: Direction,
        food: Option<Coord2>,
    ) -> Result<Self> {
        let mut engine = Self::new(config, seed)?;
        if body.is_empty() {
            return Err(GameError::InvalidSnakeLength);
        }
        let size = config.size();
        if body.iter().chain(food.iter()).any(|&pos| !in_bounds(pos, size)) {
            return Err(GameError::InvalidCoords);
        }

        engine.body = body.iter().copied().collect();
        engine.occupied = body.iter().copied().collect();
        if engine.occupied.len() != body.len() || food.is_some_and(|pos| engine.occupied.contains(&pos)) {
            return Err(GameError::InvalidCoords);
        }
        engine.food = food;
        engine.direction = direction;
        Ok(engine)
    }

    pub fn state(&self) -> SnakeState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state == SnakeState::GameOver
    }

    pub fn size(&self) -> Coord2 {
        self.config.size()
    }

    pub fn body(&self) -> impl ExactSizeIterator<Item = Coord2> + '_ {
        self.body.iter().copied()
    }

    pub fn head(&self) -> Option<Coord2> {
        self.body.back().copied()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn food(&self) -> Option<Coord2> {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_turns(&self) -> impl ExactSizeIterator<Item = Direction> + '_ {
        self.pending.iter().copied()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current regular tick length, shrinking as food is eaten.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_boosted(&self) -> bool {
        self.boost
    }

    /// Delay until the next step should run.
    pub fn tick_interval(&self) -> Duration {
        if self.boost {
            self.config.boost_interval().min(self.interval)
        } else {
            self.interval
        }
    }

    /// Queues a direction change for a later step. Returns whether it was queued.
    pub fn turn(&mut self, direction: Direction) -> bool {
        if self.is_over() || self.pending.back() == Some(&direction) {
            return false;
        }
        log::debug!("queue turn {:?}", direction);
        self.pending.push_back(direction);
        true
    }

    pub fn set_boost(&mut self, boost: bool) {
        if self.is_over() {
            return;
        }
        self.boost = boost;
    }

    /// Starts a new round: fresh body and food, zero score, no queued turns.
    pub fn restart(&mut self, emit: &mut impl FnMut(Intent)) {
        log::debug!("new round");
        for coords in iter_coords(self.size()) {
            emit(Intent::UpdatePixel {
                coords,
                view: PixelView::Empty,
            });
        }
        self.reset();
        self.emit_snake(emit);
        if let Some(coords) = self.food {
            emit(Intent::UpdatePixel {
                coords,
                view: PixelView::Food,
            });
        }
        emit(Intent::UpdateScore(self.score));
    }

    fn reset(&mut self) {
        self.body = (0..self.config.initial_length)
            .map(|x| (x as Coord, 0))
            .collect();
        self.occupied = self.body.iter().copied().collect();
        self.direction = Direction::Down;
        self.pending.clear();
        self.score = 0;
        self.interval = self.config.base_interval();
        self.boost = false;
        self.state = SnakeState::Running;
        self.food = self.spawn_food();
        // placing the first food already counts as one speed step
        self.speed_up();
    }

    /// Advances the snake one cell.
    pub fn step(&mut self, emit: &mut impl FnMut(Intent)) -> StepOutcome {
        if self.is_over() {
            return StepOutcome::NoChange;
        }
        self.resolve_direction();

        let Some(head) = self.head() else {
            return StepOutcome::NoChange;
        };
        let next = offset(head, self.direction.delta(), self.size())
            .filter(|pos| !self.occupied.contains(pos));
        let Some(next) = next else {
            log::debug!("game over at {:?} heading {:?}", head, self.direction);
            self.state = SnakeState::GameOver;
            emit(Intent::GameEnded(Outcome::Lost));
            return StepOutcome::GameOver;
        };

        self.body.push_back(next);
        self.occupied.insert(next);

        let outcome = if self.food == Some(next) {
            self.eat();
            StepOutcome::Ate
        } else {
            if let Some(tail) = self.body.pop_front() {
                self.occupied.remove(&tail);
                emit(Intent::UpdatePixel {
                    coords: tail,
                    view: PixelView::Empty,
                });
            }
            StepOutcome::Moved
        };
        log::trace!("snake head at {:?}, length {}", next, self.body.len());

        self.emit_snake(emit);
        if outcome == StepOutcome::Ate {
            if let Some(coords) = self.food {
                emit(Intent::UpdatePixel {
                    coords,
                    view: PixelView::Food,
                });
            }
            emit(Intent::UpdateScore(self.score));
        }
        outcome
    }

    /// Takes queued turns in order until one changes axis; the ones skipped on the way are stale and dropped.
    fn resolve_direction(&mut self) {
        while let Some(next) = self.pending.pop_front() {
            if self.direction.crosses(next) {
                self.direction = next;
                break;
            }
        }
    }

    fn eat(&mut self) {
        self.score = self.score.saturating_add(self.config.score_increment);
        self.speed_up();
        self.food = self.spawn_food();
        log::debug!("ate food, score {}, interval {:?}", self.score, self.interval);
    }

    fn speed_up(&mut self) {
        let min = self.config.min_interval();
        if self.interval > min {
            self.interval = self.interval.mul_f64(self.config.speed_decay_factor).max(min);
        }
    }

    /// Uniform pick among the cells not covered by the snake.
    fn spawn_food(&mut self) -> Option<Coord2> {
        let free = self.config.total_cells() as usize - self.occupied.len();
        if free == 0 {
            log::warn!("No free cell left for food");
            return None;
        }
        let pick = self.rng.random_range(0..free);
        iter_coords(self.size())
            .filter(|pos| !self.occupied.contains(pos))
            .nth(pick)
    }

    fn emit_snake(&self, emit: &mut impl FnMut(Intent)) {
        let Some(head) = self.head() else {
            return;
        };
        for &coords in self.body.range(..self.body.len() - 1) {
            emit(Intent::UpdatePixel {
                coords,
                view: PixelView::Body,
            });
        }
        emit(Intent::UpdatePixel {
            coords: head,
            view: PixelView::Head,
        });
    }
}
