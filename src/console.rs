//! Line commands read from stdin by the binary.

use std::str::FromStr;

use thiserror::Error;

use crate::catalog::{MediaCategory, UnknownMediaCategory};

pub const HELP: &str = "\
commands:
  get              search with the current term and media type
  term <text>      set the search term
  media <category> set the media type (music, movie, podcast, musicVideo,
                   audiobook, shortFilm, tvShow, software, ebook, all)
  play             start or pause the rotation
  pause            stop the rotation
  show             print the grid
  help             print this help
  quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Get,
    Term(String),
    Media(MediaCategory),
    Play,
    Pause,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Media(#[from] UnknownMediaCategory),
}

impl FromStr for ConsoleCommand {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_ascii_lowercase().as_str() {
            "" => Err(ConsoleError::Empty),
            "get" => Ok(Self::Get),
            "term" if rest.is_empty() => Err(ConsoleError::MissingArgument("term")),
            "term" => Ok(Self::Term(rest.to_string())),
            "media" if rest.is_empty() => Err(ConsoleError::MissingArgument("media")),
            "media" => Ok(Self::Media(rest.parse()?)),
            "play" => Ok(Self::Play),
            "pause" | "stop" => Ok(Self::Pause),
            "show" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(ConsoleError::Unknown(word.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            "term  lana del rey ".parse::<ConsoleCommand>(),
            Ok(ConsoleCommand::Term("lana del rey".into()))
        );
        assert_eq!(
            "media tvShow".parse::<ConsoleCommand>(),
            Ok(ConsoleCommand::Media(MediaCategory::TvShow))
        );
        assert_eq!("GET".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Get));
        assert_eq!("stop".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Pause));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("".parse::<ConsoleCommand>(), Err(ConsoleError::Empty));
        assert_eq!(
            "term".parse::<ConsoleCommand>(),
            Err(ConsoleError::MissingArgument("term"))
        );
        assert!(matches!(
            "media vinyl".parse::<ConsoleCommand>(),
            Err(ConsoleError::Media(_))
        ));
        assert_eq!(
            "dance".parse::<ConsoleCommand>(),
            Err(ConsoleError::Unknown("dance".into()))
        );
    }
}
