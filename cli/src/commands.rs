use std::fmt;
use std::str::FromStr;

use winnow::Parser;
use winnow::Result as WinnowResult;
use winnow::ascii::digit1;
use winnow::combinator::{alt, preceded};
use winnow::token::{rest, take_while};

/// One line of the interactive protocol.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    New,
    Go,
    Force,
    SetBoard { fen: String },
    SetDepth { depth: i32 },
    Undo,
    Remove,
    Fen,
    Print,
    Post,
    NoPost,
    Ping { id: u32 },
    Help,
    Quit,
    Xboard,
    Protover { version: u32 },
    /// The interface's verdict, ends the game.
    Result { text: String },
    /// The opponent offers a draw.
    Draw,
    /// Accepted and dropped: settings and hints the engine has no use for.
    Ignored { text: String },
    /// Coordinate notation, checked against the board later.
    UserMove { text: String },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::New => write!(f, "new"),
            Command::Go => write!(f, "go"),
            Command::Force => write!(f, "force"),
            Command::SetBoard { fen } => write!(f, "setboard {}", fen),
            Command::SetDepth { depth } => write!(f, "sd {}", depth),
            Command::Undo => write!(f, "undo"),
            Command::Remove => write!(f, "remove"),
            Command::Fen => write!(f, "fen"),
            Command::Print => write!(f, "print"),
            Command::Post => write!(f, "post"),
            Command::NoPost => write!(f, "nopost"),
            Command::Ping { id } => write!(f, "ping {}", id),
            Command::Help => write!(f, "help"),
            Command::Quit => write!(f, "quit"),
            Command::Xboard => write!(f, "xboard"),
            Command::Protover { version } => write!(f, "protover {}", version),
            Command::Result { text } => write!(f, "result {}", text),
            Command::Draw => write!(f, "draw"),
            Command::Ignored { text } => write!(f, "{}", text),
            Command::UserMove { text } => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct CommandParseError(pub String);

impl fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error (unknown command): {}", self.0)
    }
}

impl std::error::Error for CommandParseError {}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        alt((
            parse_keyword("nopost", Command::NoPost),
            parse_keyword("new", Command::New),
            parse_keyword("go", Command::Go),
            parse_keyword("force", Command::Force),
            parse_setboard,
            parse_sd,
            parse_keyword("undo", Command::Undo),
            parse_keyword("remove", Command::Remove),
            parse_keyword("fen", Command::Fen),
            parse_keyword("print", Command::Print),
            parse_keyword("post", Command::Post),
            parse_ping,
            parse_keyword("help", Command::Help),
            parse_keyword("quit", Command::Quit),
            parse_xboard,
            // last: any four to six letter word would pass as a move
            parse_user_move,
        ))
        .parse(trimmed)
        .map_err(|_| CommandParseError(trimmed.to_string()))
    }
}

fn parse_keyword<'a>(
    keyword: &'static str,
    command: Command,
) -> impl Parser<&'a str, Command, winnow::error::ContextError> {
    keyword.value(command)
}

fn parse_setboard(input: &mut &str) -> WinnowResult<Command> {
    preceded("setboard ", rest)
        .map(|fen: &str| Command::SetBoard {
            fen: fen.trim().to_string(),
        })
        .parse_next(input)
}

fn parse_sd(input: &mut &str) -> WinnowResult<Command> {
    preceded("sd ", digit1.try_map(i32::from_str))
        .map(|depth| Command::SetDepth { depth })
        .parse_next(input)
}

fn parse_ping(input: &mut &str) -> WinnowResult<Command> {
    preceded("ping ", digit1.try_map(u32::from_str))
        .map(|id| Command::Ping { id })
        .parse_next(input)
}

/// Commands only an xboard-style interface sends.
fn parse_xboard(input: &mut &str) -> WinnowResult<Command> {
    alt((
        parse_keyword("xboard", Command::Xboard),
        preceded("protover ", digit1.try_map(u32::from_str))
            .map(|version| Command::Protover { version }),
        preceded("result ", rest).map(|text: &str| Command::Result {
            text: text.trim().to_string(),
        }),
        parse_keyword("draw", Command::Draw),
        parse_ignored,
    ))
    .parse_next(input)
}

fn parse_ignored(input: &mut &str) -> WinnowResult<Command> {
    alt((
        alt(("random", "?", "hint", "hard", "easy", "computer")).void(),
        (
            alt((
                "name ", "rating ", "level ", "accepted ", "rejected ", "time ", "otim ",
            )),
            rest,
        )
            .void(),
    ))
    .take()
    .map(|text: &str| Command::Ignored {
        text: text.to_string(),
    })
    .parse_next(input)
}

fn parse_user_move(input: &mut &str) -> WinnowResult<Command> {
    take_while(4..=6, |c: char| c.is_ascii_alphanumeric() || c == '-')
        .map(|text: &str| Command::UserMove {
            text: text.to_string(),
        })
        .parse_next(input)
}
