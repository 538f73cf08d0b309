//! Log verbosity: repeated `-v` flags or `BOLALAB_LOG_LEVEL`.
//!
//! Both forms resolve to a count that indexes [`LEVELS`].

use clap::{builder::ValueParser, Arg, ArgAction, Command};
use std::str::FromStr;
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

/// Tracing level for each verbosity count, quietest first.
pub const LEVELS: [Level; 5] = [
    Level::ERROR,
    Level::WARN,
    Level::INFO,
    Level::DEBUG,
    Level::TRACE,
];

/// Level for a verbosity count; counts past the table stay at `TRACE`.
#[must_use]
pub fn level_for(count: u8) -> Level {
    LEVELS
        .get(usize::from(count))
        .copied()
        .unwrap_or(Level::TRACE)
}

fn count_for(level: Level) -> Option<u8> {
    LEVELS
        .iter()
        .position(|candidate| *candidate == level)
        .and_then(|index| u8::try_from(index).ok())
}

/// Accepts a count (`0`-`4`) or a level name such as `info` or `DEBUG`.
fn parse_verbosity(value: &str) -> Result<u8, String> {
    let value = value.trim();
    // numbers are counts here, not tracing's 1-based level numbers
    if let Ok(count) = value.parse::<u8>() {
        if usize::from(count) < LEVELS.len() {
            return Ok(count);
        }
        return Err(format!("verbosity count `{count}` is out of range 0-4"));
    }

    Level::from_str(value)
        .ok()
        .and_then(count_for)
        .ok_or_else(|| format!("unknown log level `{value}`"))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Increase log verbosity (-v warn, -vv info, -vvv debug, -vvvv trace)")
            .env("BOLALAB_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::new(parse_verbosity)),
    )
}
