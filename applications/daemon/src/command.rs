//! Control message grammar
//!
//! One datagram carries one command. Exact matches win over prefixes, and
//! anything unrecognized is treated as a bare path.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const PLAY_PREFIX: &str = "play:";
pub const ENQUEUE_PREFIX: &str = "q:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `""`
    Stop,
    /// `"n"`
    Next,
    /// `"p"`
    Previous,
    /// `"q"`
    Quit,
    /// `"play:<path>"`, a file or a directory to shuffle
    Play(PathBuf),
    /// `"q:<path>"`, a file or a directory to shuffle into the queue
    Enqueue(PathBuf),
    /// Any other text, played as a file or a directory playlist
    Legacy(PathBuf),
}

impl Command {
    pub fn parse(message: &str) -> Self {
        match message {
            "" => Self::Stop,
            "n" => Self::Next,
            "p" => Self::Previous,
            "q" => Self::Quit,
            _ => {
                if let Some(path) = message.strip_prefix(PLAY_PREFIX) {
                    Self::Play(PathBuf::from(path))
                } else if let Some(path) = message.strip_prefix(ENQUEUE_PREFIX) {
                    Self::Enqueue(PathBuf::from(path))
                } else {
                    Self::Legacy(PathBuf::from(message))
                }
            }
        }
    }

    /// Wire form of the command
    pub fn to_message(&self) -> String {
        match self {
            Self::Stop => String::new(),
            Self::Next => "n".to_string(),
            Self::Previous => "p".to_string(),
            Self::Quit => "q".to_string(),
            Self::Play(path) => format!("{}{}", PLAY_PREFIX, path.display()),
            Self::Enqueue(path) => format!("{}{}", ENQUEUE_PREFIX, path.display()),
            Self::Legacy(path) => path.display().to_string(),
        }
    }
}

impl FromStr for Command {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stop => write!(f, "stop"),
            Self::Next => write!(f, "next"),
            Self::Previous => write!(f, "previous"),
            Self::Quit => write!(f, "quit"),
            Self::Play(path) => write!(f, "play {}", path.display()),
            Self::Enqueue(path) => write!(f, "enqueue {}", path.display()),
            Self::Legacy(path) => write!(f, "legacy {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_commands() {
        assert_eq!(Command::parse(""), Command::Stop);
        assert_eq!(Command::parse("n"), Command::Next);
        assert_eq!(Command::parse("p"), Command::Previous);
        assert_eq!(Command::parse("q"), Command::Quit);
    }

    #[test]
    fn prefixed_commands() {
        assert_eq!(
            Command::parse("play:/music/a.mp3"),
            Command::Play(PathBuf::from("/music/a.mp3"))
        );
        assert_eq!(
            Command::parse("q:/music/album"),
            Command::Enqueue(PathBuf::from("/music/album"))
        );
    }

    #[test]
    fn exact_match_beats_prefix() {
        // "q" alone quits; only "q:" enqueues
        assert_eq!(Command::parse("q"), Command::Quit);
        assert_eq!(Command::parse("q:"), Command::Enqueue(PathBuf::new()));
        assert_eq!(Command::parse("play:"), Command::Play(PathBuf::new()));
    }

    #[test]
    fn everything_else_is_legacy() {
        assert_eq!(
            Command::parse("C:/music/song.flac"),
            Command::Legacy(PathBuf::from("C:/music/song.flac"))
        );
        assert_eq!(Command::parse("N"), Command::Legacy(PathBuf::from("N")));
        assert_eq!(Command::parse("n "), Command::Legacy(PathBuf::from("n ")));
        assert_eq!(
            Command::parse("qq:/x"),
            Command::Legacy(PathBuf::from("qq:/x"))
        );
    }

    #[test]
    fn message_text_parses_back() {
        for message in ["", "n", "p", "q", "play:/a b/c.mp3", "q:/dir", "/plain.wav"] {
            assert_eq!(Command::parse(message).to_message(), message);
        }
    }
}
