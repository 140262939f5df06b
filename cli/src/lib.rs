mod commands;
mod game;

pub use commands::{Command, CommandParseError};
pub use game::{Game, Reply, result_line};
