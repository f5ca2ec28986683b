use std::error::Error;
use std::fmt::{self, Display};
use std::path::PathBuf;

/// One line of user input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Picks a file for the next question.
    Attach(PathBuf),
    /// Drops the picked file.
    Detach,
    /// Draws the whole conversation again.
    History,
    /// Leaves the program.
    Quit,
    /// Anything else: a question for the service.
    Query(String),
}

/// A line that looks like a command but is not a valid one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandError {
    /// `/attach` without a path.
    MissingPath,
    /// A slash command nobody knows.
    Unknown(String),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::MissingPath => write!(f, "usage: /attach <path>"),
            CommandError::Unknown(name) => write!(
                f,
                "unknown command /{name} (try /attach, /detach, /history or /quit)"
            ),
        }
    }
}

impl Error for CommandError {}

/// Parses a line read from the terminal.
///
/// Lines starting with `/` are commands; a leading `//` escapes a query
/// that really starts with a slash.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Query(line.to_owned()));
    };
    if rest.starts_with('/') {
        return Ok(Command::Query(rest.to_owned()));
    }

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "attach" if arg.is_empty() => Err(CommandError::MissingPath),
        "attach" => Ok(Command::Attach(PathBuf::from(arg))),
        "detach" => Ok(Command::Detach),
        "history" => Ok(Command::History),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err(CommandError::Unknown(name.to_owned())),
    }
}
