use core::time::Duration;

use super::*;
use crate::GameClock;

/// A snake game driven by [`Command`]s and elapsed host time. The session's clock is the only thing that ever calls
/// [`SnakeEngine::step`].
#[derive(Clone, Debug)]
pub struct SnakeSession {
    engine: SnakeEngine,
    clock: GameClock,
}

impl SnakeSession {
    /// Creates a session with its first tick already armed.
    pub fn new(config: SnakeConfig, seed: u64) -> Result<Self> {
        Ok(Self::from_engine(SnakeEngine::new(config, seed)?))
    }

    pub fn from_engine(engine: SnakeEngine) -> Self {
        let mut clock = GameClock::new();
        if !engine.is_over() {
            clock.start(engine.tick_interval());
        }
        Self { engine, clock }
    }

    pub fn engine(&self) -> &SnakeEngine {
        &self.engine
    }

    pub fn is_tick_pending(&self) -> bool {
        self.clock.is_pending()
    }

    /// How long the host may sleep before calling [`SnakeSession::advance`] again.
    pub fn time_until_tick(&self) -> Option<Duration> {
        self.clock.time_until_due()
    }

    pub fn handle(&mut self, command: Command, emit: &mut impl FnMut(Intent)) {
        match command {
            Command::Turn(direction) => {
                self.engine.turn(direction);
            }
            Command::SetBoost(boost) => {
                log::debug!("boost: {}", boost);
                self.engine.set_boost(boost);
            }
            Command::Restart => self.restart(emit),
        }
    }

    /// Cancels whatever tick was pending and starts a fresh round.
    pub fn restart(&mut self, emit: &mut impl FnMut(Intent)) {
        self.clock.stop();
        self.engine.restart(emit);
        self.clock.start(self.engine.tick_interval());
    }

    /// Feeds elapsed host time, running every step that became due. Each step re-arms the clock relative to when it
    /// was due, using the interval in force after that step.
    pub fn advance(&mut self, elapsed: Duration, emit: &mut impl FnMut(Intent)) {
        self.clock.advance(elapsed);
        while let Some(at) = self.clock.take_due() {
            match self.engine.step(emit) {
                StepOutcome::GameOver | StepOutcome::NoChange => self.clock.stop(),
                StepOutcome::Moved | StepOutcome::Ate => {
                    self.clock.schedule_at(at + self.engine.tick_interval());
                }
            }
        }
    }

    /// Emits the complete current picture.
    pub fn redraw(&self, emit: &mut impl FnMut(Intent)) {
        let engine = &self.engine;
        let head = engine.head();
        for coords in iter_coords(engine.size()) {
            let view = if Some(coords) == head {
                PixelView::Head
            } else if engine.food() == Some(coords) {
                PixelView::Food
            } else {
                PixelView::Empty
            };
            emit(Intent::UpdatePixel { coords, view });
        }
        for coords in engine.body().filter(|&pos| Some(pos) != head) {
            emit(Intent::UpdatePixel {
                coords,
                view: PixelView::Body,
            });
        }
        emit(Intent::UpdateScore(engine.score()));
        if engine.is_over() {
            emit(Intent::GameEnded(Outcome::Lost));
        }
    }
}
