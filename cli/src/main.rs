use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gridgames_core::minesweeper::{MinesweeperConfig, MinesweeperSession};
use gridgames_core::snake::{SnakeConfig, SnakeSession};
use gridgames_core::{minesweeper, snake};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use script::Step;

mod script;

/// Plays scripted grid games and prints every renderer update as a JSON line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file with `minesweeper` and/or `snake` settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Command script to play, read from stdin when absent
    #[arg(long)]
    script: Option<PathBuf>,

    #[command(subcommand)]
    game: GameKind,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum GameKind {
    Minesweeper,
    Snake,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ConfigFile {
    minesweeper: MinesweeperConfig,
    snake: SnakeConfig,
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing {}", path.display()))
    }
}

/// What the script runner needs from a session.
trait Game {
    type Command;
    type Intent: Serialize;

    fn parse(line: &str) -> Result<Option<Step<Self::Command>>>;
    fn redraw(&self, out: &mut Vec<Self::Intent>);
    fn handle(&mut self, command: Self::Command, out: &mut Vec<Self::Intent>) -> Result<()>;
    fn advance(&mut self, elapsed: Duration, out: &mut Vec<Self::Intent>);
}

impl Game for MinesweeperSession {
    type Command = minesweeper::Command;
    type Intent = minesweeper::Intent;

    fn parse(line: &str) -> Result<Option<Step<Self::Command>>> {
        script::parse_minesweeper(line)
    }

    fn redraw(&self, out: &mut Vec<Self::Intent>) {
        MinesweeperSession::redraw(self, &mut |i| out.push(i));
    }

    fn handle(&mut self, command: Self::Command, out: &mut Vec<Self::Intent>) -> Result<()> {
        MinesweeperSession::handle(self, command, &mut |i| out.push(i))?;
        Ok(())
    }

    fn advance(&mut self, elapsed: Duration, out: &mut Vec<Self::Intent>) {
        MinesweeperSession::advance(self, elapsed, &mut |i| out.push(i));
    }
}

impl Game for SnakeSession {
    type Command = snake::Command;
    type Intent = snake::Intent;

    fn parse(line: &str) -> Result<Option<Step<Self::Command>>> {
        script::parse_snake(line)
    }

    fn redraw(&self, out: &mut Vec<Self::Intent>) {
        SnakeSession::redraw(self, &mut |i| out.push(i));
    }

    fn handle(&mut self, command: Self::Command, out: &mut Vec<Self::Intent>) -> Result<()> {
        SnakeSession::handle(self, command, &mut |i| out.push(i));
        Ok(())
    }

    fn advance(&mut self, elapsed: Duration, out: &mut Vec<Self::Intent>) {
        SnakeSession::advance(self, elapsed, &mut |i| out.push(i));
    }
}

fn write_intents<T: Serialize>(out: &mut impl Write, intents: &mut Vec<T>) -> Result<()> {
    for intent in intents.drain(..) {
        serde_json::to_writer(&mut *out, &intent)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn play<G: Game>(mut game: G, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    let mut intents = Vec::new();
    game.redraw(&mut intents);
    write_intents(out, &mut intents)?;

    for (number, line) in input.lines().enumerate() {
        let line = line.context("reading script")?;
        let step = G::parse(&line).with_context(|| format!("script line {}", number + 1))?;
        match step {
            None => continue,
            Some(Step::Command(command)) => game
                .handle(command, &mut intents)
                .with_context(|| format!("script line {}", number + 1))?,
            Some(Step::Wait(elapsed)) => game.advance(elapsed, &mut intents),
        }
        write_intents(out, &mut intents)?;
    }
    out.flush()?;
    Ok(())
}

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let seed = args.seed.unwrap_or_else(seed_from_clock);
    log::info!("seed: {}", seed);

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };
    let mut out = BufWriter::new(io::stdout().lock());

    match args.game {
        GameKind::Minesweeper => {
            let session = MinesweeperSession::new(config.minesweeper, seed)
                .context("starting minesweeper")?;
            play(session, input, &mut out)
        }
        GameKind::Snake => {
            let session = SnakeSession::new(config.snake, seed).context("starting snake")?;
            play(session, input, &mut out)
        }
    }
}
