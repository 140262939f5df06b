use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SquareParseError {
    #[error("square: want 2 chars like `e4`, got `{0}`")]
    Length(String),

    #[error("square: file must be in a..h, got `{0}`")]
    File(char),

    #[error("square: rank must be in 1..8, got `{0}`")]
    Rank(char),
}

/// An index into the padded 10x12 board.
///
/// ```text
/// 110 111 112 113 114 115 116 117 118 119
/// 100 101 102 103 104 105 106 107 108 109
///  90  91 ...                      98  99   <- rank 8
///  ...
///  20  21 ...                      28  29   <- rank 1
///  10  11 ...
///   0   1 ...
/// ```
///
/// The two outer ranks and the outer file on each side never hold a piece, so
/// adding any king, knight or sliding offset to an on-board square always lands
/// inside the array.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Square(u8);

pub const BOARD_SIZE: usize = 120;

pub(crate) const NORTH: i8 = 10;
pub(crate) const SOUTH: i8 = -10;
pub(crate) const EAST: i8 = 1;
pub(crate) const WEST: i8 = -1;

pub(crate) const ORTHOGONALS: [i8; 4] = [NORTH, EAST, SOUTH, WEST];
pub(crate) const DIAGONALS: [i8; 4] = [NORTH + EAST, NORTH + WEST, SOUTH + EAST, SOUTH + WEST];
pub(crate) const KING_OFFSETS: [i8; 8] = [
    NORTH,
    EAST,
    SOUTH,
    WEST,
    NORTH + EAST,
    NORTH + WEST,
    SOUTH + EAST,
    SOUTH + WEST,
];
pub(crate) const KNIGHT_OFFSETS: [i8; 8] = [-21, -19, -12, -8, 8, 12, 19, 21];

impl Square {
    /// Board-relative rank and file, both in 0..8.
    pub const fn from_rank_file(rank: u8, file: u8) -> Square {
        debug_assert!(rank < 8 && file < 8);
        Square((rank + 2) * 10 + file + 1)
    }

    pub(crate) const fn from_index(idx: u8) -> Square {
        Square(idx)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn rank(self) -> u8 {
        self.0 / 10 - 2
    }

    pub const fn file(self) -> u8 {
        self.0 % 10 - 1
    }

    pub const fn is_on_board(self) -> bool {
        let file = self.0 % 10;
        self.0 >= 21 && self.0 <= 98 && file != 0 && file != 9
    }

    /// Index in 0..64 with a1 = 0 and h8 = 63.
    pub const fn to_index64(self) -> usize {
        (self.rank() * 8 + self.file()) as usize
    }

    pub(crate) const fn offset(self, delta: i8) -> Square {
        Square((self.0 as i16 + delta as i16) as u8)
    }

    /// The same file on the opposite rank (a1 <-> a8).
    pub const fn flip_rank(self) -> Square {
        Square::from_rank_file(7 - self.rank(), self.file())
    }

    pub fn iter() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|rank| (0..8u8).map(move |file| Square::from_rank_file(rank, file)))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.file()) as char;
        let rank = (b'1' + self.rank()) as char;
        write!(f, "{}{}", file, rank)
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_on_board() {
            write!(f, "{}", self)
        } else {
            write!(f, "Square({})", self.0)
        }
    }
}

impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(file_ch), Some(rank_ch), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(SquareParseError::Length(s.to_string()));
        };

        let file_ch = file_ch.to_ascii_lowercase();
        if !('a'..='h').contains(&file_ch) {
            return Err(SquareParseError::File(file_ch));
        }
        if !('1'..='8').contains(&rank_ch) {
            return Err(SquareParseError::Rank(rank_ch));
        }

        Ok(Square::from_rank_file(
            rank_ch as u8 - b'1',
            file_ch as u8 - b'a',
        ))
    }
}

#[rustfmt::skip]
mod named {
    use super::Square;

    pub const A1: Square = Square(21); pub const B1: Square = Square(22); pub const C1: Square = Square(23); pub const D1: Square = Square(24);
    pub const E1: Square = Square(25); pub const F1: Square = Square(26); pub const G1: Square = Square(27); pub const H1: Square = Square(28);
    pub const A2: Square = Square(31); pub const B2: Square = Square(32); pub const C2: Square = Square(33); pub const D2: Square = Square(34);
    pub const E2: Square = Square(35); pub const F2: Square = Square(36); pub const G2: Square = Square(37); pub const H2: Square = Square(38);
    pub const A3: Square = Square(41); pub const B3: Square = Square(42); pub const C3: Square = Square(43); pub const D3: Square = Square(44);
    pub const E3: Square = Square(45); pub const F3: Square = Square(46); pub const G3: Square = Square(47); pub const H3: Square = Square(48);
    pub const A4: Square = Square(51); pub const B4: Square = Square(52); pub const C4: Square = Square(53); pub const D4: Square = Square(54);
    pub const E4: Square = Square(55); pub const F4: Square = Square(56); pub const G4: Square = Square(57); pub const H4: Square = Square(58);
    pub const A5: Square = Square(61); pub const B5: Square = Square(62); pub const C5: Square = Square(63); pub const D5: Square = Square(64);
    pub const E5: Square = Square(65); pub const F5: Square = Square(66); pub const G5: Square = Square(67); pub const H5: Square = Square(68);
    pub const A6: Square = Square(71); pub const B6: Square = Square(72); pub const C6: Square = Square(73); pub const D6: Square = Square(74);
    pub const E6: Square = Square(75); pub const F6: Square = Square(76); pub const G6: Square = Square(77); pub const H6: Square = Square(78);
    pub const A7: Square = Square(81); pub const B7: Square = Square(82); pub const C7: Square = Square(83); pub const D7: Square = Square(84);
    pub const E7: Square = Square(85); pub const F7: Square = Square(86); pub const G7: Square = Square(87); pub const H7: Square = Square(88);
    pub const A8: Square = Square(91); pub const B8: Square = Square(92); pub const C8: Square = Square(93); pub const D8: Square = Square(94);
    pub const E8: Square = Square(95); pub const F8: Square = Square(96); pub const G8: Square = Square(97); pub const H8: Square = Square(98);
}

pub use named::*;

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use testresult::TestResult;

    #[test]
    fn test_algebraic_round_trip_every_square() -> TestResult {
        for square in Square::iter() {
            let text = square.to_string();
            assert_eq!(Square::from_str(&text)?, square);
        }
        Ok(())
    }

    #[test]
    fn test_padded_round_trip_every_index() {
        for idx in 0..BOARD_SIZE as u8 {
            let square = Square::from_index(idx);
            if !square.is_on_board() {
                continue;
            }
            let back = Square::from_str(&square.to_string()).unwrap();
            assert_eq!(back.index(), idx as usize);
        }
        assert_eq!(Square::iter().count(), 64);
    }

    #[test_case("a1", A1)]
    #[test_case("h1", H1)]
    #[test_case("e4", E4)]
    #[test_case("A8", A8 ; "uppercase file")]
    #[test_case("h8", H8)]
    fn test_from_str(inp: &str, want: Square) -> TestResult {
        assert_eq!(Square::from_str(inp)?, want);
        Ok(())
    }

    #[test_case("e"   ; "too short")]
    #[test_case("e44" ; "too long")]
    #[test_case("i4"  ; "bad file")]
    #[test_case("e9"  ; "bad rank")]
    fn test_from_str_invalid(inp: &str) {
        assert!(Square::from_str(inp).is_err());
    }

    #[test]
    fn test_sentinel_ring() {
        assert!(!Square::from_index(20).is_on_board());
        assert!(!Square::from_index(29).is_on_board());
        assert!(!Square::from_index(99).is_on_board());
        assert!(!Square::from_index(0).is_on_board());
        for square in Square::iter() {
            for delta in KNIGHT_OFFSETS {
                assert!(square.offset(delta).index() < BOARD_SIZE);
            }
        }
    }

    #[test]
    fn test_rank_file_and_flip() {
        assert_eq!(E2.rank(), 1);
        assert_eq!(E2.file(), 4);
        assert_eq!(E2.flip_rank(), E7);
        assert_eq!(A1.to_index64(), 0);
        assert_eq!(H8.to_index64(), 63);
    }
}
