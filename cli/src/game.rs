use std::str::FromStr;

use bejola_engine::search::{MAX_PLY, SearchResult};
use bejola_engine::{
    Board, EngineConfig, GameStatus, Move, Side, TranspositionTable, process_computer_move,
    validate_move,
};
use tracing::{debug, info, warn};

use crate::commands::Command;

const HELP: &[&str] = &[
    "new            start a new game, the computer plays black",
    "go             the computer plays the side to move",
    "force          stop the computer from moving",
    "setboard FEN   load a position",
    "sd N           search N plies deep",
    "undo           take back one ply",
    "remove         take back two plies",
    "fen            print the position as FEN",
    "print          print the board",
    "post / nopost  show or hide the search output",
    "ping N         answer pong N",
    "protover N     list the xboard features this engine supports",
    "result R       end the game with result R",
    "draw           offer a draw, accepted when the position is drawn",
    "quit           exit",
    "Moves are entered in coordinate notation: e2e4, e7e8q.",
];

const FEATURES: &[&str] = &[
    "feature myname=\"bejola\"",
    "feature ping=1",
    "feature setboard=1",
    "feature san=0",
    "feature usermove=0",
    "feature time=0",
    "feature colors=0",
    "feature sigint=0",
    "feature sigterm=0",
    "feature reuse=1",
    "feature analyze=0",
    "feature done=1",
];

/// What the command loop should do after one input line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn line(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
            quit: false,
        }
    }
}

/// A game against the engine driven by text commands.
pub struct Game {
    board: Board,
    cache: TranspositionTable,
    config: EngineConfig,
    /// `None` in force mode.
    computer_side: Option<Side>,
    post: bool,
    /// Set once the interface declares a result or a draw is agreed.
    finished: bool,
    /// The rest of the last principal variation, starting with the reply the
    /// engine expects from its opponent.
    expected: Vec<Move>,
}

impl Game {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            board: Board::start(),
            cache: TranspositionTable::from_config(&config),
            config,
            computer_side: Some(Side::Black),
            post: false,
            finished: false,
            expected: vec![],
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn handle_line(&mut self, line: &str) -> Reply {
        debug!("> {}", line.trim());
        if line.trim().is_empty() {
            return Reply::default();
        }
        match Command::from_str(line) {
            Ok(command) => self.handle_command(command),
            Err(err) => {
                warn!("{}", err);
                Reply::line(err.to_string())
            }
        }
    }

    pub fn handle_command(&mut self, command: Command) -> Reply {
        match command {
            Command::New => {
                self.reset_board(Board::start());
                self.computer_side = Some(Side::Black);
                Reply::default()
            }
            Command::Go => {
                self.computer_side = Some(self.board.side_to_move());
                Reply {
                    lines: self.computer_move(),
                    quit: false,
                }
            }
            Command::Force => {
                self.computer_side = None;
                Reply::default()
            }
            Command::SetBoard { fen } => match Board::from_fen(&fen) {
                Ok(board) => {
                    self.reset_board(board);
                    Reply::default()
                }
                Err(err) => Reply::line(format!("Error (bad position): {}", err)),
            },
            Command::SetDepth { depth } => {
                if (1..MAX_PLY as i32).contains(&depth) {
                    self.config.search_depth = depth;
                    Reply::default()
                } else {
                    Reply::line(format!("Error (depth out of range): {}", depth))
                }
            }
            Command::Undo => self.take_back(1),
            Command::Remove => self.take_back(2),
            Command::Fen => Reply::line(self.board.to_fen()),
            Command::Print => Reply {
                lines: self.board.to_string().lines().map(String::from).collect(),
                quit: false,
            },
            Command::Post => {
                self.post = true;
                Reply::default()
            }
            Command::NoPost => {
                self.post = false;
                Reply::default()
            }
            Command::Ping { id } => Reply::line(format!("pong {}", id)),
            Command::Help => Reply {
                lines: HELP.iter().map(|line| line.to_string()).collect(),
                quit: false,
            },
            Command::Quit => Reply {
                lines: vec![],
                quit: true,
            },
            Command::Xboard => {
                info!("xboard mode");
                Reply::default()
            }
            Command::Protover { version } => {
                debug!("protocol version {}", version);
                Reply {
                    lines: FEATURES.iter().map(|line| line.to_string()).collect(),
                    quit: false,
                }
            }
            Command::Result { text } => {
                info!("game over: {}", text);
                self.finish();
                Reply::default()
            }
            Command::Draw => {
                if self.board.is_draw() {
                    self.finish();
                    Reply::line("offer draw")
                } else {
                    debug!("draw declined");
                    Reply::default()
                }
            }
            Command::Ignored { text } => {
                debug!("ignoring {}", text);
                Reply::default()
            }
            Command::UserMove { text } => Reply {
                lines: self.user_move(&text),
                quit: false,
            },
        }
    }

    /// A new position invalidates everything the cache and the last search
    /// knew.
    fn reset_board(&mut self, board: Board) {
        self.board = board;
        self.cache.clear();
        self.expected.clear();
        self.finished = false;
    }

    fn finish(&mut self) {
        self.finished = true;
        self.computer_side = None;
    }

    fn take_back(&mut self, plies: usize) -> Reply {
        if self.board.history_len() < plies {
            return Reply::line("Error (nothing to undo)");
        }
        for _ in 0..plies {
            self.board.undo();
        }
        self.expected.clear();
        self.finished = false;
        Reply::default()
    }

    fn user_move(&mut self, text: &str) -> Vec<String> {
        if self.finished || self.board.game_status() != GameStatus::Ongoing {
            return vec![format!("Error (game is over): {}", text)];
        }
        let mve = match validate_move(&mut self.board, text) {
            Ok(mve) => mve,
            Err(err) => {
                debug!("{}", err);
                return vec![format!("Illegal move: {}", text)];
            }
        };

        self.expected = match self.expected.split_first() {
            Some((reply, rest)) if reply.same_action(&mve) => rest.to_vec(),
            _ => vec![],
        };
        self.board.apply_move(&mve);
        info!("user played {}", mve.pretty());

        if let Some(result) = result_line(self.board.game_status()) {
            return vec![result];
        }
        if self.computer_side == Some(self.board.side_to_move()) {
            return self.computer_move();
        }
        vec![]
    }

    fn computer_move(&mut self) -> Vec<String> {
        if self.finished {
            return vec!["Error (game is over): go".to_string()];
        }
        if let Some(result) = result_line(self.board.game_status()) {
            return vec![result];
        }

        let hint = std::mem::take(&mut self.expected);
        let SearchResult {
            best_move,
            line,
            iterations,
            ..
        } = match process_computer_move(&mut self.board, &mut self.cache, &self.config, &hint) {
            Ok(result) => result,
            Err(err) => return vec![format!("Error (search failed): {}", err)],
        };

        let mut out = vec![];
        if self.post {
            out.extend(iterations.iter().map(|report| report.to_string()));
        }
        out.push(format!("move {}", best_move));
        self.expected = line.into_iter().skip(1).collect();

        if let Some(result) = result_line(self.board.game_status()) {
            out.push(result);
        }
        out
    }
}

/// The protocol's result string for a finished game.
pub fn result_line(status: GameStatus) -> Option<String> {
    let line = match status {
        GameStatus::Ongoing => return None,
        GameStatus::Checkmate {
            winner: Side::White,
        } => "1-0 {White mates}",
        GameStatus::Checkmate {
            winner: Side::Black,
        } => "0-1 {Black mates}",
        GameStatus::Stalemate => "1/2-1/2 {Stalemate}",
        GameStatus::FiftyMoveRule => "1/2-1/2 {Draw by fifty move rule}",
        GameStatus::InsufficientMaterial => "1/2-1/2 {Draw by insufficient material}",
        GameStatus::ThreefoldRepetition => "1/2-1/2 {Draw by repetition}",
    };
    Some(line.to_string())
}
