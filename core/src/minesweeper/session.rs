use core::time::Duration;
use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;
use crate::GameClock;

const TIMER_TICK: Duration = Duration::from_secs(1);

/// A sequence of minesweeper rounds, driven by [`Command`]s and elapsed host time.
#[derive(Clone, Debug)]
pub struct MinesweeperSession {
    config: MinesweeperConfig,
    rng: SmallRng,
    engine: RevealEngine,
    clock: GameClock,
    timer_started: bool,
    elapsed_secs: u32,
}

impl MinesweeperSession {
    pub fn new(config: MinesweeperConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let layout = RandomBoardGenerator::new(rng.random()).generate(&config)?;
        Ok(Self::with_layout(config, rng, layout))
    }

    /// Starts with a predetermined first board; later rounds are random again.
    pub fn with_generator(
        config: MinesweeperConfig,
        seed: u64,
        generator: impl BoardGenerator,
    ) -> Result<Self> {
        config.validate()?;
        let layout = generator.generate(&config)?;
        Ok(Self::with_layout(config, SmallRng::seed_from_u64(seed), layout))
    }

    fn with_layout(config: MinesweeperConfig, rng: SmallRng, layout: MineLayout) -> Self {
        Self {
            config,
            rng,
            engine: RevealEngine::new(layout),
            clock: GameClock::new(),
            timer_started: false,
            elapsed_secs: 0,
        }
    }

    pub fn config(&self) -> &MinesweeperConfig {
        &self.config
    }

    pub fn engine(&self) -> &RevealEngine {
        &self.engine
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn is_timer_running(&self) -> bool {
        self.clock.is_pending()
    }

    pub fn handle(&mut self, command: Command, emit: &mut impl FnMut(Intent)) -> Result<()> {
        match command {
            Command::Reveal(coords) => {
                log::debug!("reveal cell: {:?}", coords);
                let playing = !self.engine.is_finished();
                self.engine.reveal(coords, emit)?;
                if playing && !self.timer_started {
                    self.timer_started = true;
                    self.clock.start(TIMER_TICK);
                }
                if self.engine.is_finished() {
                    self.clock.stop();
                }
            }
            Command::ToggleFlag(coords) => {
                log::debug!("mark cell: {:?}", coords);
                self.engine.toggle_flag(coords, emit)?;
            }
            Command::Restart => self.restart(emit)?,
        }
        Ok(())
    }

    /// Feeds elapsed host time, emitting a timer update for every whole second that passed.
    pub fn advance(&mut self, elapsed: Duration, emit: &mut impl FnMut(Intent)) {
        self.clock.advance(elapsed);
        while let Some(at) = self.clock.take_due() {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
            emit(Intent::UpdateTimer(self.elapsed_secs));
            self.clock.schedule_at(at + TIMER_TICK);
        }
    }

    pub fn restart(&mut self, emit: &mut impl FnMut(Intent)) -> Result<()> {
        let layout = RandomBoardGenerator::new(self.rng.random()).generate(&self.config)?;
        log::debug!("new round");
        self.engine = RevealEngine::new(layout);
        self.clock.stop();
        self.timer_started = false;
        self.elapsed_secs = 0;
        self.redraw(emit);
        Ok(())
    }

    /// Emits the complete current state, for a renderer that starts from nothing.
    pub fn redraw(&self, emit: &mut impl FnMut(Intent)) {
        for coords in iter_coords(self.engine.size()) {
            emit(Intent::UpdateCell {
                coords,
                view: self.engine.cell_view(coords),
            });
        }
        emit(Intent::UpdateMinesLeft(self.engine.remaining_flags()));
        emit(Intent::UpdateTimer(self.elapsed_secs));
        match self.engine.state() {
            EngineState::Playing => {}
            EngineState::Won => emit(Intent::GameEnded(Outcome::Won)),
            EngineState::Lost => emit(Intent::GameEnded(Outcome::Lost)),
        }
    }
}
