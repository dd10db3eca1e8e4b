//! Controller command parsing.

use std::time::Duration;

use crate::error::ProtocolError;

/// One parsed controller line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Commands acknowledged without any effect
    /// (`xboard`, `accepted`, `easy`, `hard`, `otim`, `random`).
    Noop,
    /// `protover N` — announce our feature set.
    Protover(u32),
    /// `new` — reset, engine plays Black.
    New,
    /// `force` — engine plays neither side.
    Force,
    /// `go` — engine plays the side to move.
    Go,
    /// `playother` — engine plays the side not on move.
    PlayOther,
    /// `analyze` — search the current side until told otherwise.
    Analyze,
    /// `exit` — leave analysis mode.
    ExitAnalysis,
    /// `hint` — suggest a move without playing it.
    Hint,
    /// `ics X` — whether we are on a chess server (`-` means no).
    Ics(String),
    /// `level M T` — M moves per period of T.
    Level { moves: u32, time: Duration },
    /// `st N` — fixed N seconds per move.
    St(Duration),
    /// `sd N` — depth cap.
    Sd(u32),
    /// `time N` — our remaining clock, in centiseconds on the wire.
    TimeLeft(Duration),
    /// `setboard FEN` — load a position.
    SetBoard(String),
    /// `undo` — take back one half-move.
    Undo,
    /// `remove` — take back a full move.
    Remove,
    /// `result ...` — the game ended.
    Result,
    /// `post` / `nopost` — search-info output on/off.
    Post,
    NoPost,
    /// `quit`.
    Quit,
    /// Anything else: most likely a coordinate move for the current side.
    Other(String),
}

/// Parse an xboard clock field: `mm` or `mm:ss`.
pub fn parse_clock(s: &str) -> Option<Duration> {
    let mut parts = s.split(':');
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = match parts.next() {
        Some(sec) => sec.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(Duration::from_secs(minutes * 60 + seconds))
}

fn required<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
) -> Result<&'a str, ProtocolError> {
    words.next().ok_or(ProtocolError::MissingArgument { command })
}

fn number<T: std::str::FromStr>(
    value: &str,
    command: &'static str,
) -> Result<T, ProtocolError> {
    value.parse().map_err(|_| ProtocolError::InvalidArgument {
        command,
        value: value.to_string(),
    })
}

/// Parse one line from the controller.
pub fn parse_command(line: &str) -> Result<Command, ProtocolError> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Ok(Command::Noop);
    };

    let command = match cmd {
        "xboard" | "accepted" | "easy" | "hard" | "otim" | "random" => Command::Noop,
        "protover" => {
            let version = number(required(&mut words, "protover")?, "protover")?;
            Command::Protover(version)
        }
        "new" => Command::New,
        "force" => Command::Force,
        "go" => Command::Go,
        "playother" => Command::PlayOther,
        "analyze" => Command::Analyze,
        "exit" => Command::ExitAnalysis,
        "hint" => Command::Hint,
        "ics" => Command::Ics(required(&mut words, "ics")?.to_string()),
        "level" => {
            let moves = number(required(&mut words, "level")?, "level")?;
            let clock = required(&mut words, "level")?;
            let time = parse_clock(clock).ok_or(ProtocolError::InvalidArgument {
                command: "level",
                value: clock.to_string(),
            })?;
            // A third "increment" field may follow; we do not use it.
            Command::Level { moves, time }
        }
        "st" => {
            let seconds: u64 = number(required(&mut words, "st")?, "st")?;
            Command::St(Duration::from_secs(seconds))
        }
        "sd" => Command::Sd(number(required(&mut words, "sd")?, "sd")?),
        "time" => {
            let centis: u64 = number(required(&mut words, "time")?, "time")?;
            Command::TimeLeft(Duration::from_millis(centis * 10))
        }
        "setboard" => {
            let fen = line.trim_start().strip_prefix("setboard").unwrap_or("").trim();
            if fen.is_empty() {
                return Err(ProtocolError::MissingArgument { command: "setboard" });
            }
            Command::SetBoard(fen.to_string())
        }
        "undo" => Command::Undo,
        "remove" => Command::Remove,
        "result" => Command::Result,
        "post" => Command::Post,
        "nopost" => Command::NoPost,
        "quit" => Command::Quit,
        other => Command::Other(other.to_string()),
    };

    Ok(command)
}
