//! User intents and their terminal spelling.
//!
//! [`Intent`] is what the sidebar emits (keyed by fingerprint). [`Command`] is
//! one line typed in `chatoc watch`, keyed by the 1-based positions shown in
//! the rendered outline; it is resolved against the current model.
//!
//! | Line        | Command                          |
//! |-------------|----------------------------------|
//! | `t N`       | toggle entry N                   |
//! | `a`         | toggle all                       |
//! | `r`         | refresh now                      |
//! | `g N[.M]`   | go to question N (or heading M)  |
//! | `d`         | show / hide the drawer           |
//! | `m X Y`     | move the widget                  |
//! | `p`         | print the outline                |
//! | `q`         | quit                             |

use std::str::FromStr;

use thiserror::Error;

use crate::outline::{Fingerprint, OutlineModel};
use crate::sidebar::{Navigation, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Toggle(Fingerprint),
    ToggleAll,
    Refresh,
    Navigate(Navigation),
    ToggleDrawer,
    Drag(Position),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}` (try t, a, r, g, d, m, p, q)")]
    Unknown(String),
    #[error("`{command}` expects {expected}")]
    BadArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("no entry {0}")]
    NoEntry(usize),
    #[error("entry {entry} has no heading {heading}")]
    NoHeading { entry: usize, heading: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle(usize),
    ToggleAll,
    Refresh,
    Goto { entry: usize, heading: Option<usize> },
    Drawer,
    Move { x: i32, y: i32 },
    Print,
    Quit,
}

fn position(arg: Option<&str>, command: &'static str) -> Result<usize, CommandError> {
    arg.and_then(|a| a.parse::<usize>().ok())
        .filter(|&n| n > 0)
        .ok_or(CommandError::BadArgument {
            command,
            expected: "a position starting at 1",
        })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(CommandError::Empty);
        };
        let arg = parts.next();

        match head {
            "t" | "toggle" => Ok(Self::Toggle(position(arg, "t")?)),
            "a" | "all" => Ok(Self::ToggleAll),
            "r" | "refresh" => Ok(Self::Refresh),
            "g" | "go" => {
                let (entry, heading) = match arg.and_then(|a| a.split_once('.')) {
                    Some((e, h)) => (position(Some(e), "g")?, Some(position(Some(h), "g")?)),
                    None => (position(arg, "g")?, None),
                };
                Ok(Self::Goto { entry, heading })
            }
            "d" | "drawer" => Ok(Self::Drawer),
            "m" | "move" => {
                let bad = CommandError::BadArgument {
                    command: "m",
                    expected: "two pixel coordinates",
                };
                let x = arg.and_then(|a| a.parse().ok()).ok_or(bad.clone())?;
                let y = parts.next().and_then(|a| a.parse().ok()).ok_or(bad)?;
                Ok(Self::Move { x, y })
            }
            "p" | "print" => Ok(Self::Print),
            "q" | "quit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

impl Command {
    /// Resolve positions against the rendered outline.
    ///
    /// `Print` and `Quit` are handled by the caller and resolve to `None`.
    pub fn resolve(self, model: &OutlineModel) -> Result<Option<Intent>, CommandError> {
        let entry_at = |n: usize| model.get(n - 1).ok_or(CommandError::NoEntry(n));

        let intent = match self {
            Self::Toggle(n) => Intent::Toggle(entry_at(n)?.fingerprint.clone()),
            Self::ToggleAll => Intent::ToggleAll,
            Self::Refresh => Intent::Refresh,
            Self::Goto { entry, heading } => {
                let e = entry_at(entry)?;
                if let Some(h) = heading
                    && h > e.headings.len()
                {
                    return Err(CommandError::NoHeading { entry, heading: h });
                }
                Intent::Navigate(Navigation {
                    entry: e.fingerprint.clone(),
                    heading: heading.map(|h| h - 1),
                })
            }
            Self::Drawer => Intent::ToggleDrawer,
            Self::Move { x, y } => Intent::Drag(Position { x, y }),
            Self::Print | Self::Quit => return Ok(None),
        };
        Ok(Some(intent))
    }
}
