//! Line commands for the terminal front end.
//!
//! Each command maps onto one page event. Row numbers are 1-based positions in
//! the currently visible list.

use crate::types::ViewFilter;
use std::str::FromStr;
use thiserror::Error;

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Type `text` into the new-todo input and press Enter
    Add(String),
    /// Set the toggle-all checkbox
    ToggleAll(bool),
    /// Check or uncheck a row
    Toggle {
        /// Row number
        row: usize,
        /// New checkbox value
        checked: bool,
    },
    /// Replace a row's content
    Edit {
        /// Row number
        row: usize,
        /// New content
        content: String,
    },
    /// Delete a row
    Remove(usize),
    /// Delete every todo
    Clear,
    /// Change the view filter
    Show(ViewFilter),
    /// Dismiss the error banner
    Dismiss,
    /// Print usage
    Help,
    /// Leave the application
    Quit,
}

/// Why a line could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Nothing was typed
    #[error("empty command")]
    Empty,

    /// First word is not a command
    #[error("unknown command: {0}")]
    Unknown(String),

    /// Command is missing its argument or has a bad one
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Usage text printed by `help`
pub const HELP: &str = "\
commands:
  add <text>         create a todo
  all on|off         toggle every todo
  done <n>           mark row n completed
  undo <n>           mark row n active
  edit <n> <text>    change row n
  rm <n>             delete row n
  clear              delete every todo
  show all|active|completed
  dismiss            hide the error banner
  quit";

fn row(arg: Option<&str>, usage: &'static str) -> Result<usize, CommandError> {
    arg.and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .ok_or(CommandError::Usage(usage))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "add" | "a" => Ok(Self::Add(rest.to_string())),
            "all" => match rest {
                "on" => Ok(Self::ToggleAll(true)),
                "off" => Ok(Self::ToggleAll(false)),
                _ => Err(CommandError::Usage("all on|off")),
            },
            "done" => Ok(Self::Toggle {
                row: row(Some(rest), "done <n>")?,
                checked: true,
            }),
            "undo" => Ok(Self::Toggle {
                row: row(Some(rest), "undo <n>")?,
                checked: false,
            }),
            "edit" => {
                let (n, content) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::Usage("edit <n> <text>"))?;
                Ok(Self::Edit {
                    row: row(Some(n), "edit <n> <text>")?,
                    content: content.trim().to_string(),
                })
            },
            "rm" | "delete" => Ok(Self::Remove(row(Some(rest), "rm <n>")?)),
            "clear" => Ok(Self::Clear),
            "show" => rest
                .parse()
                .map(Self::Show)
                .map_err(|_| CommandError::Usage("show all|active|completed")),
            "dismiss" => Ok(Self::Dismiss),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
