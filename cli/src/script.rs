//! Line-oriented input scripts.
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! reveal 3-4
//! flag 0-9
//! wait 1500
//! turn left
//! boost on
//! restart
//! ```

use anyhow::{Context, Result, anyhow, bail};
use gridgames_core::{from_key, minesweeper, snake};
use std::time::Duration;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Step<C> {
    Command(C),
    /// Let this much host time pass.
    Wait(Duration),
}

/// Splits a line into its word and arguments; `None` for blank and comment lines.
fn tokenize(line: &str) -> Option<(&str, Vec<&str>)> {
    let line = line.split('#').next().unwrap_or_default();
    let mut words = line.split_whitespace();
    let word = words.next()?;
    Some((word, words.collect()))
}

fn single_arg<'a>(word: &str, args: &[&'a str]) -> Result<&'a str> {
    match args {
        [arg] => Ok(*arg),
        _ => bail!("`{word}` takes exactly one argument"),
    }
}

fn no_args(word: &str, args: &[&str]) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        bail!("`{word}` takes no arguments")
    }
}

fn parse_wait(word: &str, args: &[&str]) -> Result<Duration> {
    let ms = single_arg(word, args)?;
    let ms: u64 = ms.parse().with_context(|| format!("invalid milliseconds `{ms}`"))?;
    Ok(Duration::from_millis(ms))
}

pub fn parse_minesweeper(line: &str) -> Result<Option<Step<minesweeper::Command>>> {
    use minesweeper::Command;

    let Some((word, args)) = tokenize(line) else {
        return Ok(None);
    };
    let step = match word {
        "reveal" | "flag" => {
            let key = single_arg(word, &args)?;
            let coords = from_key(key).with_context(|| format!("invalid cell `{key}`"))?;
            if word == "reveal" {
                Step::Command(Command::Reveal(coords))
            } else {
                Step::Command(Command::ToggleFlag(coords))
            }
        }
        "restart" => {
            no_args(word, &args)?;
            Step::Command(Command::Restart)
        }
        "wait" => Step::Wait(parse_wait(word, &args)?),
        _ => return Err(anyhow!("unknown minesweeper command `{word}`")),
    };
    Ok(Some(step))
}

pub fn parse_snake(line: &str) -> Result<Option<Step<snake::Command>>> {
    use snake::{Command, Direction};

    let Some((word, args)) = tokenize(line) else {
        return Ok(None);
    };
    let step = match word {
        "turn" => {
            let direction = match single_arg(word, &args)? {
                "up" => Direction::Up,
                "down" => Direction::Down,
                "left" => Direction::Left,
                "right" => Direction::Right,
                other => bail!("unknown direction `{other}`"),
            };
            Step::Command(Command::Turn(direction))
        }
        "boost" => {
            let boost = match single_arg(word, &args)? {
                "on" => true,
                "off" => false,
                other => bail!("boost is `on` or `off`, not `{other}`"),
            };
            Step::Command(Command::SetBoost(boost))
        }
        "restart" => {
            no_args(word, &args)?;
            Step::Command(Command::Restart)
        }
        "wait" => Step::Wait(parse_wait(word, &args)?),
        _ => return Err(anyhow!("unknown snake command `{word}`")),
    };
    Ok(Some(step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_minesweeper("").unwrap(), None);
        assert_eq!(parse_minesweeper("   # only a comment").unwrap(), None);
        assert_eq!(parse_snake("\t").unwrap(), None);
    }

    #[test]
    fn minesweeper_commands() {
        use minesweeper::Command;

        assert_eq!(
            parse_minesweeper("reveal 3-4").unwrap(),
            Some(Step::Command(Command::Reveal((3, 4))))
        );
        assert_eq!(
            parse_minesweeper("flag 0-9 # corner").unwrap(),
            Some(Step::Command(Command::ToggleFlag((0, 9))))
        );
        assert_eq!(
            parse_minesweeper("restart").unwrap(),
            Some(Step::Command(Command::Restart))
        );
        assert_eq!(
            parse_minesweeper("wait 1500").unwrap(),
            Some(Step::Wait(Duration::from_millis(1500)))
        );
    }

    #[test]
    fn snake_commands() {
        use snake::{Command, Direction};

        assert_eq!(
            parse_snake("turn left").unwrap(),
            Some(Step::Command(Command::Turn(Direction::Left)))
        );
        assert_eq!(
            parse_snake("boost on").unwrap(),
            Some(Step::Command(Command::SetBoost(true)))
        );
        assert_eq!(
            parse_snake("wait 20").unwrap(),
            Some(Step::Wait(Duration::from_millis(20)))
        );
    }

    #[test]
    fn malformed_lines_are_errors() {
        assert!(parse_minesweeper("reveal").is_err());
        assert!(parse_minesweeper("reveal 3_4").is_err());
        assert!(parse_minesweeper("restart now").is_err());
        assert!(parse_minesweeper("turn up").is_err());
        assert!(parse_snake("turn sideways").is_err());
        assert!(parse_snake("boost maybe").is_err());
        assert!(parse_snake("wait soon").is_err());
    }
}
