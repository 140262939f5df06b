use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Debug, PartialEq, Eq, EnumIter, Clone, Copy, Display, Hash, Deserialize, Serialize)]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// +1 for white, -1 for black.
    pub(crate) const fn sign(self) -> i32 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }
}

#[derive(Debug, PartialEq, Eq, EnumIter, Clone, Copy, Display, Hash, Deserialize, Serialize)]
pub enum PieceKind {
    Pawn = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
    King = 6,
}

impl PieceKind {
    pub const fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 100,
            PieceKind::Knight => 290,
            PieceKind::Bishop => 300,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 20_000,
        }
    }
}

impl From<PieceKind> for char {
    fn from(kind: PieceKind) -> char {
        match kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}

impl TryFrom<char> for PieceKind {
    type Error = char;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase() {
            'p' => Ok(PieceKind::Pawn),
            'n' => Ok(PieceKind::Knight),
            'b' => Ok(PieceKind::Bishop),
            'r' => Ok(PieceKind::Rook),
            'q' => Ok(PieceKind::Queen),
            'k' => Ok(PieceKind::King),
            _ => Err(value),
        }
    }
}

/// The contents of one board cell: empty, off the board, or a coloured piece.
///
/// The low three bits hold the piece kind and bit 3 is set for black, so a
/// piece code is always in 1..=14 and can index small per-piece tables.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Piece(u8);

const KIND_MASK: u8 = 0b0111;
const BLACK_BIT: u8 = 0b1000;
const OFF_BOARD_BIT: u8 = 0b1000_0000;

/// One past the largest piece code.
pub(crate) const NUM_PIECE_CODES: usize = 16;

impl Piece {
    pub const EMPTY: Piece = Piece(0);
    pub const OFF_BOARD: Piece = Piece(OFF_BOARD_BIT);

    pub const WHITE_PAWN: Piece = Piece::new(PieceKind::Pawn, Side::White);
    pub const WHITE_KNIGHT: Piece = Piece::new(PieceKind::Knight, Side::White);
    pub const WHITE_BISHOP: Piece = Piece::new(PieceKind::Bishop, Side::White);
    pub const WHITE_ROOK: Piece = Piece::new(PieceKind::Rook, Side::White);
    pub const WHITE_QUEEN: Piece = Piece::new(PieceKind::Queen, Side::White);
    pub const WHITE_KING: Piece = Piece::new(PieceKind::King, Side::White);
    pub const BLACK_PAWN: Piece = Piece::new(PieceKind::Pawn, Side::Black);
    pub const BLACK_KNIGHT: Piece = Piece::new(PieceKind::Knight, Side::Black);
    pub const BLACK_BISHOP: Piece = Piece::new(PieceKind::Bishop, Side::Black);
    pub const BLACK_ROOK: Piece = Piece::new(PieceKind::Rook, Side::Black);
    pub const BLACK_QUEEN: Piece = Piece::new(PieceKind::Queen, Side::Black);
    pub const BLACK_KING: Piece = Piece::new(PieceKind::King, Side::Black);

    pub const fn new(kind: PieceKind, side: Side) -> Piece {
        match side {
            Side::White => Piece(kind as u8),
            Side::Black => Piece(kind as u8 | BLACK_BIT),
        }
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_off_board(self) -> bool {
        self.0 & OFF_BOARD_BIT != 0
    }

    /// True for a real piece of either colour.
    pub const fn is_piece(self) -> bool {
        self.0 != 0 && !self.is_off_board()
    }

    pub const fn is_black(self) -> bool {
        self.is_piece() && self.0 & BLACK_BIT != 0
    }

    pub const fn is_white(self) -> bool {
        self.is_piece() && self.0 & BLACK_BIT == 0
    }

    /// Only meaningful for real pieces.
    pub const fn side(self) -> Side {
        if self.0 & BLACK_BIT != 0 {
            Side::Black
        } else {
            Side::White
        }
    }

    pub const fn is_side(self, side: Side) -> bool {
        match side {
            Side::White => self.is_white(),
            Side::Black => self.is_black(),
        }
    }

    pub fn kind(self) -> Option<PieceKind> {
        if !self.is_piece() {
            return None;
        }
        match self.0 & KIND_MASK {
            1 => Some(PieceKind::Pawn),
            2 => Some(PieceKind::Knight),
            3 => Some(PieceKind::Bishop),
            4 => Some(PieceKind::Rook),
            5 => Some(PieceKind::Queen),
            6 => Some(PieceKind::King),
            _ => None,
        }
    }

    pub const fn is_kind(self, kind: PieceKind) -> bool {
        self.is_piece() && self.0 & KIND_MASK == kind as u8
    }

    pub const fn is_pawn(self) -> bool {
        self.is_kind(PieceKind::Pawn)
    }

    pub const fn is_king(self) -> bool {
        self.is_kind(PieceKind::King)
    }

    /// Material value, zero for an empty square.
    pub fn value(self) -> i32 {
        self.kind().map_or(0, PieceKind::value)
    }

    pub(crate) const fn code(self) -> usize {
        self.0 as usize
    }

    /// FEN letter: uppercase for white.
    pub fn to_char(self) -> char {
        match self.kind() {
            Some(kind) => {
                let ch: char = kind.into();
                if self.is_white() {
                    ch.to_ascii_uppercase()
                } else {
                    ch
                }
            }
            None => '.',
        }
    }

    pub fn from_char(ch: char) -> Option<Piece> {
        let kind = PieceKind::try_from(ch).ok()?;
        let side = if ch.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        Some(Piece::new(kind, side))
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_off_board() {
            write!(f, "#")
        } else {
            write!(f, "{}", self.to_char())
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{} {}", self.side(), kind),
            None => write!(f, "empty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_piece_bits() {
        for side in Side::iter() {
            for kind in PieceKind::iter() {
                let piece = Piece::new(kind, side);
                assert!(piece.is_piece());
                assert_eq!(piece.kind(), Some(kind));
                assert_eq!(piece.side(), side);
                assert!(piece.is_side(side));
                assert!(!piece.is_side(side.opposite()));
                assert!(piece.code() < NUM_PIECE_CODES);
                assert_eq!(Piece::from_char(piece.to_char()), Some(piece));
            }
        }
    }

    #[test]
    fn test_empty_and_off_board() {
        assert!(!Piece::EMPTY.is_piece());
        assert!(!Piece::OFF_BOARD.is_piece());
        assert!(Piece::OFF_BOARD.is_off_board());
        assert!(!Piece::OFF_BOARD.is_black());
        assert!(!Piece::OFF_BOARD.is_white());
        assert_eq!(Piece::EMPTY.kind(), None);
        assert_eq!(Piece::EMPTY.value(), 0);
    }

    #[test]
    fn test_fen_letters() {
        assert_eq!(Piece::WHITE_QUEEN.to_char(), 'Q');
        assert_eq!(Piece::BLACK_KNIGHT.to_char(), 'n');
        assert_eq!(Piece::from_char('x'), None);
    }
}
