use std::str::FromStr;

use crate::board::zobrist::ZobristHash;
use crate::board::{Attributes, Board, MAX_PER_PIECE};
use crate::piece::{Piece, PieceKind, Side};
use crate::square::Square;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FenParseError {
    #[error("num fields: want 4 or 6 got {0}")]
    NumFields(usize),

    #[error("piece placement: got {0}, err at {1}")]
    PiecePlacement(String, usize),

    #[error("side to move: want 'w'|'b' got {0}")]
    SideToMove(String),

    #[error("castling rights given: got {0}, err at idx {1}")]
    CastlingRights(String, usize),

    #[error("en passant target: got {0}")]
    EnPassantTarget(String),

    #[error("halfmove clock: want 0 <= x < 65_535 got {0}")]
    HalfmoveClock(String),

    #[error("full move counter: want 1 <= x < 65_535 got {0}")]
    FullMoveCounter(String),

    #[error("want exactly one {0} king, got {1}")]
    KingCount(Side, usize),

    #[error("too many {0} on the board")]
    TooManyPieces(String),

    #[error("pawn on back rank at {0}")]
    PawnOnBackRank(Square),

    #[error("{0} is in check but it is not their move")]
    OpponentInCheck(Side),
}

impl Board {
    /// Parses a FEN record. The clock fields may be left off, in which case
    /// they default to `0 1`.
    pub fn from_fen(fen: &str) -> Result<Board, FenParseError> {
        let fields = fen.split_whitespace().collect::<Vec<&str>>();
        if fields.len() != 4 && fields.len() != 6 {
            Err(FenParseError::NumFields(fields.len()))?
        }

        let mut board = Board::empty();
        place_pieces(&mut board, fields[0])?;

        let to_move = match fields[1] {
            "w" => Side::White,
            "b" => Side::Black,
            _ => Err(FenParseError::SideToMove(String::from(fields[1])))?,
        };
        board.attrs.set(Attributes::W_TO_MOVE, to_move == Side::White);
        board.attrs.insert(castling_rights_from_fen(fields[2])?);
        board.ep_target = en_passant_target_from_fen(fields[3], to_move)?;
        if board
            .ep_target
            .is_some_and(|target| !just_double_pushed(&board, target, to_move))
        {
            Err(FenParseError::EnPassantTarget(fields[3].to_string()))?
        }

        if fields.len() == 6 {
            board.halfmove_clock = fields[4]
                .parse::<u16>()
                .ok()
                .filter(|&n| n < u16::MAX)
                .ok_or_else(|| FenParseError::HalfmoveClock(fields[4].to_string()))?;
            board.fullmove_number = fields[5]
                .parse::<u16>()
                .ok()
                .filter(|&n| (1..u16::MAX).contains(&n))
                .ok_or_else(|| FenParseError::FullMoveCounter(fields[5].to_string()))?;
        }

        check_legal(&board, to_move)?;

        board.attrs.set(Attributes::IN_CHECK, board.side_to_move_is_in_check());
        board.hash = ZobristHash::calculate(&board);
        Ok(board)
    }

    /// Replaces this board with the FEN position, leaving it untouched if the
    /// record does not parse.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), FenParseError> {
        *self = Board::from_fen(fen)?;
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let piece = self.piece_at(Square::from_rank_file(rank, file));
                if piece.is_piece() {
                    if empty > 0 {
                        fen.push_str(&empty.to_string());
                        empty = 0;
                    }
                    fen.push(piece.to_char());
                } else {
                    empty += 1;
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move() {
            Side::White => 'w',
            Side::Black => 'b',
        });

        fen.push(' ');
        let rights = [
            (Attributes::W_CASTLE_KING, 'K'),
            (Attributes::W_CASTLE_QUEEN, 'Q'),
            (Attributes::B_CASTLE_KING, 'k'),
            (Attributes::B_CASTLE_QUEEN, 'q'),
        ];
        let before = fen.len();
        for (right, ch) in rights {
            if self.attrs.contains(right) {
                fen.push(ch);
            }
        }
        if fen.len() == before {
            fen.push('-');
        }

        fen.push(' ');
        match self.ep_target {
            Some(target) => fen.push_str(&target.to_string()),
            None => fen.push('-'),
        }

        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }
}

impl FromStr for Board {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::from_fen(s)
    }
}

fn place_pieces(board: &mut Board, placement: &str) -> Result<(), FenParseError> {
    let err = |idx: usize| FenParseError::PiecePlacement(placement.to_string(), idx);

    let ranks = placement.split('/').collect::<Vec<&str>>();
    if ranks.len() != 8 {
        return Err(err(placement.len()));
    }

    let mut idx = 0;
    for (row, rank_str) in ranks.into_iter().enumerate() {
        let rank = 7 - row as u8;
        let mut file = 0u8;
        for ch in rank_str.chars() {
            if let Some(skip) = ch.to_digit(10) {
                if skip == 0 || skip > 8 {
                    return Err(err(idx));
                }
                file += skip as u8;
            } else {
                let piece = Piece::from_char(ch).ok_or_else(|| err(idx))?;
                if file >= 8 {
                    return Err(err(idx));
                }
                let square = Square::from_rank_file(rank, file);
                if board.count(piece) >= MAX_PER_PIECE {
                    return Err(FenParseError::TooManyPieces(piece.to_string()));
                }
                board.put_piece(square, piece);
                file += 1;
            }
            if file > 8 {
                return Err(err(idx));
            }
            idx += 1;
        }
        if file != 8 {
            return Err(err(idx));
        }
        idx += 1;
    }
    Ok(())
}

fn castling_rights_from_fen(fen: &str) -> Result<Attributes, FenParseError> {
    let mut rights = Attributes::empty();
    if fen == "-" {
        return Ok(rights);
    }

    for (idx, ch) in fen.chars().enumerate() {
        let right = match ch {
            'K' => Attributes::W_CASTLE_KING,
            'Q' => Attributes::W_CASTLE_QUEEN,
            'k' => Attributes::B_CASTLE_KING,
            'q' => Attributes::B_CASTLE_QUEEN,
            _ => Err(FenParseError::CastlingRights(fen.to_string(), idx))?,
        };
        rights.insert(right);
    }
    Ok(rights)
}

/// The target must sit behind a pawn of the side that just moved.
fn en_passant_target_from_fen(fen: &str, to_move: Side) -> Result<Option<Square>, FenParseError> {
    if fen == "-" {
        return Ok(None);
    }

    let square =
        Square::from_str(fen).map_err(|_| FenParseError::EnPassantTarget(fen.to_string()))?;
    let want_rank = match to_move {
        Side::White => 5,
        Side::Black => 2,
    };
    if square.rank() != want_rank {
        Err(FenParseError::EnPassantTarget(fen.to_string()))?
    }
    Ok(Some(square))
}

/// The double-pushed pawn must still stand in front of the target, with the
/// target and the square it came from both empty.
fn just_double_pushed(board: &Board, target: Square, to_move: Side) -> bool {
    let pushed = to_move.opposite();
    let (pawn_rank, start_rank) = match pushed {
        Side::White => (3, 1),
        Side::Black => (4, 6),
    };
    let pawn = Square::from_rank_file(pawn_rank, target.file());
    let start = Square::from_rank_file(start_rank, target.file());

    board.piece_at(pawn) == Piece::new(PieceKind::Pawn, pushed)
        && board.piece_at(target).is_empty()
        && board.piece_at(start).is_empty()
}

fn check_legal(board: &Board, to_move: Side) -> Result<(), FenParseError> {
    for side in [Side::White, Side::Black] {
        let kings = board.count(Piece::new(PieceKind::King, side));
        if kings != 1 {
            return Err(FenParseError::KingCount(side, kings));
        }

        let pawn = Piece::new(PieceKind::Pawn, side);
        if let Some(&square) = board
            .pieces(pawn)
            .iter()
            .find(|square| square.rank() == 0 || square.rank() == 7)
        {
            return Err(FenParseError::PawnOnBackRank(square));
        }
    }

    let waiting = to_move.opposite();
    if board.is_king_attacked(waiting) {
        return Err(FenParseError::OpponentInCheck(waiting));
    }
    Ok(())
}
