use std::fmt;

/// Something the player typed at the prompt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    Roll,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing but whitespace.
    Empty,
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "No command given. Type 'help' to see available commands"),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{cmd}'. Type 'help' to see available commands"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

pub const HELP_TEXT: &str = "Commands:
  roll, r    roll the dice when it's your turn
  help, ?    show this help
  quit, exit leave the game";

/// Parse a line of user input into a [`Command`].
///
/// Matching ignores case and surrounding whitespace.
///
/// # Examples
///
/// ```
/// use dd_client::commands::{Command, ParseError, parse_command};
///
/// assert_eq!(parse_command("roll"), Ok(Command::Roll));
/// assert_eq!(parse_command("  R "), Ok(Command::Roll));
/// assert_eq!(parse_command("?"), Ok(Command::Help));
/// assert!(matches!(parse_command("fold"), Err(ParseError::UnrecognizedCommand(_))));
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    match trimmed.to_lowercase().as_str() {
        "roll" | "r" => Ok(Command::Roll),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}
