mod attacks;
mod fen;
mod make_move;
pub mod zobrist;

use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::evaluation::{self, pst};
use crate::moves::Move;
use crate::piece::{Piece, PieceKind, Side, NUM_PIECE_CODES};
use crate::square::{Square, BOARD_SIZE};
use zobrist::ZobristHash;

pub use fen::{FenParseError, START_FEN};

/// Upper bound on how many pieces of one kind and colour can be on the board
/// (two originals plus eight promotions).
pub(crate) const MAX_PER_PIECE: usize = 10;

/// Castling rights, side to move and the cached in-check flag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Attributes(u8);

impl Attributes {
    pub const W_CASTLE_QUEEN: Attributes = Attributes(1);
    pub const W_CASTLE_KING: Attributes = Attributes(2);
    pub const B_CASTLE_QUEEN: Attributes = Attributes(4);
    pub const B_CASTLE_KING: Attributes = Attributes(8);
    pub const W_TO_MOVE: Attributes = Attributes(16);
    pub const IN_CHECK: Attributes = Attributes(32);

    pub const ALL_CASTLING: Attributes = Attributes(0b1111);

    pub const fn empty() -> Attributes {
        Attributes(0)
    }

    pub const fn contains(self, other: Attributes) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Attributes) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Attributes) -> Attributes {
        Attributes(self.0 | other.0)
    }

    pub fn insert(&mut self, other: Attributes) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Attributes) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: Attributes, on: bool) {
        if on {
            self.insert(other);
        } else {
            self.remove(other);
        }
    }

    pub const fn castling(self) -> Attributes {
        Attributes(self.0 & Self::ALL_CASTLING.0)
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attributes({:06b})", self.0)
    }
}

/// State needed to take back one move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct UndoRecord {
    pub(crate) mve: Move,
    pub(crate) attrs: Attributes,
    pub(crate) ep_target: Option<Square>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
    pub(crate) hash: ZobristHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Side },
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
    ThreefoldRepetition,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BoardError {
    #[error("piece lists disagree with the board at {0}")]
    PieceList(Square),

    #[error("incremental score {incremental} but recomputed {recomputed}")]
    Score { incremental: i32, recomputed: i32 },

    #[error("incremental hash {incremental} but recomputed {recomputed}")]
    Hash {
        incremental: ZobristHash,
        recomputed: ZobristHash,
    },

    #[error("occupancy mask out of date")]
    Occupancy,
}

/// A chess position on a padded 10x12 board.
///
/// Alongside the squares the board keeps, incrementally:
/// - a list of squares per piece code
/// - the material plus piece-square score of every non-king piece (white
///   minus black); kings are scored at evaluation time because their table
///   depends on the game phase
/// - a 64-bit occupancy mask, used as a fingerprint by the transposition table
/// - the zobrist hash
/// - an undo stack of every applied move
#[derive(Clone)]
pub struct Board {
    pub(crate) squares: [Piece; BOARD_SIZE],
    pub(crate) attrs: Attributes,
    pub(crate) ep_target: Option<Square>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
    pub(crate) locations: [ArrayVec<Square, MAX_PER_PIECE>; NUM_PIECE_CODES],
    pub(crate) score: i32,
    pub(crate) occupancy: u64,
    pub(crate) hash: ZobristHash,
    pub(crate) history: Vec<UndoRecord>,
}

impl Board {
    /// No pieces, white to move, no castling rights.
    pub(crate) fn empty() -> Board {
        let mut squares = [Piece::OFF_BOARD; BOARD_SIZE];
        for square in Square::iter() {
            squares[square.index()] = Piece::EMPTY;
        }

        Board {
            squares,
            attrs: Attributes::W_TO_MOVE,
            ep_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            locations: std::array::from_fn(|_| ArrayVec::new()),
            score: 0,
            occupancy: 0,
            hash: ZobristHash::default(),
            history: Vec::new(),
        }
    }

    /// The standard starting position.
    pub fn start() -> Board {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut board = Board::empty();
        for (file, kind) in BACK_RANK.into_iter().enumerate() {
            let file = file as u8;
            board.put_piece(Square::from_rank_file(0, file), Piece::new(kind, Side::White));
            board.put_piece(Square::from_rank_file(1, file), Piece::WHITE_PAWN);
            board.put_piece(Square::from_rank_file(6, file), Piece::BLACK_PAWN);
            board.put_piece(Square::from_rank_file(7, file), Piece::new(kind, Side::Black));
        }
        board.attrs.insert(Attributes::ALL_CASTLING);
        board.hash = ZobristHash::calculate(&board);
        board
    }

    pub fn piece_at(&self, square: Square) -> Piece {
        self.squares[square.index()]
    }

    pub fn side_to_move(&self) -> Side {
        if self.attrs.contains(Attributes::W_TO_MOVE) {
            Side::White
        } else {
            Side::Black
        }
    }

    pub fn attributes(&self) -> Attributes {
        self.attrs
    }

    /// Cached flag: the side to move is in check.
    pub fn in_check(&self) -> bool {
        self.attrs.contains(Attributes::IN_CHECK)
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.ep_target
    }

    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    pub fn hash(&self) -> ZobristHash {
        self.hash
    }

    /// Occupied squares as a 64-bit mask (a1 = bit 0).
    pub fn fingerprint(&self) -> u64 {
        self.occupancy
    }

    /// Material plus piece-square score of every non-king piece, white minus
    /// black.
    pub fn position_score(&self) -> i32 {
        self.score
    }

    /// Squares holding `piece`, in no particular order.
    pub fn pieces(&self, piece: Piece) -> &[Square] {
        &self.locations[piece.code()]
    }

    pub fn count(&self, piece: Piece) -> usize {
        self.locations[piece.code()].len()
    }

    pub fn king_square(&self, side: Side) -> Option<Square> {
        self.pieces(Piece::new(PieceKind::King, side)).first().copied()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|record| record.mve)
    }

    /// Takes back the last move. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.history.is_empty() {
            return false;
        }
        self.unapply_move();
        true
    }

    pub(crate) fn put_piece(&mut self, square: Square, piece: Piece) {
        assert!(self.squares[square.index()].is_empty(), "{square} is occupied");
        self.squares[square.index()] = piece;
        self.locations[piece.code()].push(square);
        self.score += pst::square_value(piece, square);
        self.occupancy |= 1u64 << square.to_index64();
    }

    pub(crate) fn take_piece(&mut self, square: Square) -> Piece {
        let piece = self.squares[square.index()];
        assert!(piece.is_piece(), "{square} is empty");
        self.squares[square.index()] = Piece::EMPTY;
        let list = &mut self.locations[piece.code()];
        let Some(pos) = list.iter().position(|&s| s == square) else {
            panic!("location list of {piece:?} is missing {square}");
        };
        list.swap_remove(pos);
        self.score -= pst::square_value(piece, square);
        self.occupancy &= !(1u64 << square.to_index64());
        piece
    }

    pub fn fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// No pawns, rooks or queens, and at most one minor piece on the board.
    pub fn insufficient_material(&self) -> bool {
        let heavy_or_pawn = [PieceKind::Pawn, PieceKind::Rook, PieceKind::Queen];
        let minors = [PieceKind::Knight, PieceKind::Bishop];

        let mut num_minors = 0;
        for side in [Side::White, Side::Black] {
            if heavy_or_pawn
                .iter()
                .any(|&kind| self.count(Piece::new(kind, side)) > 0)
            {
                return false;
            }
            num_minors += minors
                .iter()
                .map(|&kind| self.count(Piece::new(kind, side)))
                .sum::<usize>();
        }
        num_minors <= 1
    }

    /// The current position has occurred at least twice before since the last
    /// capture or pawn move.
    pub fn threefold_repetition(&self) -> bool {
        self.repetition_count() >= 3
    }

    /// How many times the current position has occurred, counting itself.
    /// Only positions with the same side to move inside the halfmove-clock
    /// window can match.
    pub fn repetition_count(&self) -> usize {
        let horizon = (self.halfmove_clock as usize).min(self.history.len());
        let len = self.history.len();
        (2..=horizon)
            .step_by(2)
            .filter(|&plies_back| self.history[len - plies_back].hash == self.hash)
            .count()
            + 1
    }

    pub fn is_draw(&self) -> bool {
        self.fifty_move_draw() || self.insufficient_material() || self.threefold_repetition()
    }

    /// Static evaluation from the point of view of the side to move.
    pub fn evaluate_board(&self) -> i32 {
        evaluation::evaluate(self) * self.side_to_move().sign()
    }

    pub fn game_status(&mut self) -> GameStatus {
        if !crate::move_gen::has_legal_moves(self) {
            return if self.in_check() {
                GameStatus::Checkmate {
                    winner: self.side_to_move().opposite(),
                }
            } else {
                GameStatus::Stalemate
            };
        }
        if self.fifty_move_draw() {
            GameStatus::FiftyMoveRule
        } else if self.insufficient_material() {
            GameStatus::InsufficientMaterial
        } else if self.threefold_repetition() {
            GameStatus::ThreefoldRepetition
        } else {
            GameStatus::Ongoing
        }
    }

    /// Checks every incrementally maintained field against a recomputation.
    pub fn validate(&self) -> Result<(), BoardError> {
        let mut score = 0;
        let mut occupancy = 0;
        for square in Square::iter() {
            let piece = self.piece_at(square);
            if piece.is_piece() {
                if !self.pieces(piece).contains(&square) {
                    return Err(BoardError::PieceList(square));
                }
                score += pst::square_value(piece, square);
                occupancy |= 1u64 << square.to_index64();
            }
        }
        for (code, list) in self.locations.iter().enumerate() {
            if let Some(&square) = list.iter().find(|s| self.squares[s.index()].code() != code) {
                return Err(BoardError::PieceList(square));
            }
        }

        if score != self.score {
            return Err(BoardError::Score {
                incremental: self.score,
                recomputed: score,
            });
        }
        if occupancy != self.occupancy {
            return Err(BoardError::Occupancy);
        }
        let hash = ZobristHash::calculate(self);
        if hash != self.hash {
            return Err(BoardError::Hash {
                incremental: self.hash,
                recomputed: hash,
            });
        }
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::start()
    }
}

/// Positions compare equal regardless of how they were reached.
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.squares == other.squares
            && self.attrs == other.attrs
            && self.ep_target == other.ep_target
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
            && self.score == other.score
            && self.occupancy == other.occupancy
            && self.hash == other.hash
            && self
                .locations
                .iter()
                .zip(other.locations.iter())
                .all(|(a, b)| a.len() == b.len() && a.iter().all(|s| b.contains(s)))
    }
}

impl Eq for Board {}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                write!(f, "{}", self.piece_at(Square::from_rank_file(rank, file)).to_char())?;
            }
            writeln!(f)?;
        }
        write!(f, "  abcdefgh")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self)?;
        write!(f, "{}", self.to_fen())
    }
}
