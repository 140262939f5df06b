use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::Piece;
use crate::square::Square;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MoveFlags(u8);

impl MoveFlags {
    pub const NONE: MoveFlags = MoveFlags(0);
    pub const CASTLE: MoveFlags = MoveFlags(1);
    pub const EN_PASSANT: MoveFlags = MoveFlags(2);
    pub const CHECK: MoveFlags = MoveFlags(4);
    pub const DOUBLE_PAWN_PUSH: MoveFlags = MoveFlags(8);

    pub const fn contains(self, other: MoveFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: MoveFlags) {
        self.0 |= other.0;
    }
}

impl fmt::Debug for MoveFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (MoveFlags::CASTLE, "castle"),
            (MoveFlags::EN_PASSANT, "ep"),
            (MoveFlags::CHECK, "check"),
            (MoveFlags::DOUBLE_PAWN_PUSH, "double"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "[{}]", set.join(","))
    }
}

/// A fully described move.
///
/// Besides the squares it carries the moving piece, the captured piece, and the
/// capture differential (captured value minus mover value) so ordering and undo
/// never need to look at the board again.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Move {
    pub start: Square,
    pub end: Square,
    pub piece: Piece,
    pub captured: Piece,
    pub capture_diff: i16,
    pub promoted_to: Piece,
    pub flags: MoveFlags,
}

impl Move {
    /// Sentinel for "no move".
    pub const NULL: Move = Move {
        start: Square::from_index(0),
        end: Square::from_index(0),
        piece: Piece::EMPTY,
        captured: Piece::EMPTY,
        capture_diff: 0,
        promoted_to: Piece::EMPTY,
        flags: MoveFlags::NONE,
    };

    pub(crate) fn new(start: Square, end: Square, piece: Piece, captured: Piece) -> Move {
        let capture_diff = if captured.is_piece() {
            (captured.value() - piece.value()) as i16
        } else {
            0
        };
        Move {
            start,
            end,
            piece,
            captured,
            capture_diff,
            promoted_to: Piece::EMPTY,
            flags: MoveFlags::NONE,
        }
    }

    pub(crate) fn with_promotion(mut self, promoted_to: Piece) -> Move {
        self.promoted_to = promoted_to;
        self
    }

    pub(crate) fn with_flag(mut self, flag: MoveFlags) -> Move {
        self.flags.insert(flag);
        self
    }

    pub fn is_null(&self) -> bool {
        self.piece.is_empty()
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_piece()
    }

    pub fn is_promotion(&self) -> bool {
        self.promoted_to.is_piece()
    }

    /// Neither a capture nor a promotion.
    pub fn is_quiet(&self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }

    pub fn is_castle(&self) -> bool {
        self.flags.contains(MoveFlags::CASTLE)
    }

    pub fn is_en_passant(&self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT)
    }

    pub fn is_double_pawn_push(&self) -> bool {
        self.flags.contains(MoveFlags::DOUBLE_PAWN_PUSH)
    }

    pub fn gives_check(&self) -> bool {
        self.flags.contains(MoveFlags::CHECK)
    }

    /// Same start, end and promotion. Ignores the check tag, which depends on
    /// the position the move was generated in.
    pub fn same_action(&self, other: &Move) -> bool {
        self.start == other.start && self.end == other.end && self.promoted_to == other.promoted_to
    }

    /// Long-form notation: `e2-e4`, `e4xd5`, `a7-a8(Q)+`, `O-O`.
    pub fn pretty(&self) -> String {
        if self.is_null() {
            return "{END}".to_string();
        }
        let check = if self.gives_check() { "+" } else { "" };
        if self.is_castle() {
            let castle = if self.end > self.start { "O-O" } else { "O-O-O" };
            return format!("{castle}{check}");
        }

        let sep = if self.is_capture() { 'x' } else { '-' };
        let promotion = if self.is_promotion() {
            format!("({})", self.promoted_to.to_char().to_ascii_uppercase())
        } else {
            String::new()
        };
        format!("{}{sep}{}{promotion}{check}", self.start, self.end)
    }
}

impl Default for Move {
    fn default() -> Self {
        Move::NULL
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "null");
        }
        write!(f, "{} ({:?}", self, self.piece)?;
        if self.is_capture() {
            write!(f, "x{:?}", self.captured)?;
        }
        write!(f, " {:?})", self.flags)
    }
}

/// Coordinate notation, e.g. `e2e4` or `e7e8q`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "0000");
        }
        write!(f, "{}{}", self.start, self.end)?;
        if self.is_promotion() {
            write!(f, "{}", self.promoted_to.to_char().to_ascii_lowercase())?;
        }
        Ok(())
    }
}
