//! The line-oriented command surface.
//!
//! Each line read from stdin parses into one [`Command`], which maps onto a
//! single controller operation.

use std::num::ParseIntError;
use std::str::FromStr;

use saltitantes_types::CreatureId;

/// Errors produced while parsing a command line.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    /// The line was blank.
    #[error("empty command")]
    Empty,

    /// The verb is not one of the known commands.
    #[error("unknown command `{verb}` (try: add [x], remove <id>, start [x], stop, status, new, quit)")]
    Unknown {
        /// The unrecognized verb.
        verb: String,
    },

    /// A required argument was not given.
    #[error("`{verb}` needs an argument")]
    MissingArgument {
        /// The verb missing its argument.
        verb: &'static str,
    },

    /// An argument was not an integer.
    #[error("`{value}` is not a number: {source}")]
    InvalidNumber {
        /// The offending text.
        value: String,
        /// The underlying parse error.
        source: ParseIntError,
    },

    /// More arguments than the command takes.
    #[error("`{verb}` takes at most one argument")]
    TooManyArguments {
        /// The verb given too many arguments.
        verb: &'static str,
    },
}

/// A command typed by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Add a creature at x, or at a random x.
    Add(Option<i32>),
    /// Remove the creature with this id.
    Remove(CreatureId),
    /// Start the simulation with the guardian at x, or at a random x.
    Start(Option<i32>),
    /// Stop the running simulation.
    Stop,
    /// Print the session status.
    Status,
    /// Reset a stopped session so another game can be played.
    New,
    /// Stop if running, then exit.
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();
        let arg = words.next();

        let command = match verb.as_str() {
            "add" => Self::Add(arg.map(parse_number).transpose()?),
            "start" => Self::Start(arg.map(parse_number).transpose()?),
            "remove" | "rm" => {
                let raw = arg.ok_or(CommandError::MissingArgument { verb: "remove" })?;
                let id = parse_number::<u64>(raw.trim_start_matches('#'))?;
                Self::Remove(CreatureId(id))
            }
            "stop" => Self::Stop,
            "status" => Self::Status,
            "new" | "reset" => Self::New,
            "quit" | "exit" => Self::Quit,
            _ => return Err(CommandError::Unknown { verb }),
        };

        let takes_argument = matches!(command, Self::Add(_) | Self::Start(_) | Self::Remove(_));
        if (!takes_argument && arg.is_some()) || words.next().is_some() {
            return Err(CommandError::TooManyArguments {
                verb: command.verb(),
            });
        }
        Ok(command)
    }
}

impl Command {
    /// Canonical verb for messages.
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Remove(_) => "remove",
            Self::Start(_) => "start",
            Self::Stop => "stop",
            Self::Status => "status",
            Self::New => "new",
            Self::Quit => "quit",
        }
    }
}

fn parse_number<T>(value: &str) -> Result<T, CommandError>
where
    T: FromStr<Err = ParseIntError>,
{
    value
        .parse()
        .map_err(|source| CommandError::InvalidNumber {
            value: value.to_owned(),
            source,
        })
}
