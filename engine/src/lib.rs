pub mod board;
pub mod config;
pub mod evaluation;
pub mod move_gen;
pub mod moves;
pub mod perft;
pub mod piece;
pub mod search;
pub mod square;
pub mod transposition_table;

pub use board::{Board, BoardError, FenParseError, GameStatus, START_FEN};
pub use config::EngineConfig;
pub use move_gen::{MoveInputError, generate_move_list, legal_moves, return_validated_move, validate_move};
pub use moves::Move;
pub use perft::{perft, perft_full};
pub use piece::{Piece, PieceKind, Side};
pub use search::{SearchContext, SearchError, SearchResult, negamax, process_computer_move};
pub use square::Square;
pub use transposition_table::{ReplacementPolicy, TranspositionTable};
