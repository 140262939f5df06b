use std::ops::ControlFlow;

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::piece::{Piece, PieceKind, Side};
use crate::square::*;

impl Board {
    /// Walks outward from `target` and reports every piece of `by` that
    /// attacks it, stopping early when `visit` breaks.
    fn scan_attackers(
        &self,
        target: Square,
        by: Side,
        mut visit: impl FnMut(Square) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        let pawn_origins = match by {
            Side::White => [SOUTH + EAST, SOUTH + WEST],
            Side::Black => [NORTH + EAST, NORTH + WEST],
        };
        let pawn = Piece::new(PieceKind::Pawn, by);
        for delta in pawn_origins {
            let from = target.offset(delta);
            if self.piece_at(from) == pawn {
                visit(from)?;
            }
        }

        let knight = Piece::new(PieceKind::Knight, by);
        for delta in KNIGHT_OFFSETS {
            let from = target.offset(delta);
            if self.piece_at(from) == knight {
                visit(from)?;
            }
        }

        let king = Piece::new(PieceKind::King, by);
        for delta in KING_OFFSETS {
            let from = target.offset(delta);
            if self.piece_at(from) == king {
                visit(from)?;
            }
        }

        let queen = Piece::new(PieceKind::Queen, by);
        let rays = [
            (ORTHOGONALS, Piece::new(PieceKind::Rook, by)),
            (DIAGONALS, Piece::new(PieceKind::Bishop, by)),
        ];
        for (directions, slider) in rays {
            for delta in directions {
                let mut from = target.offset(delta);
                while self.piece_at(from).is_empty() {
                    from = from.offset(delta);
                }
                let piece = self.piece_at(from);
                if piece == slider || piece == queen {
                    visit(from)?;
                }
            }
        }

        ControlFlow::Continue(())
    }

    pub fn is_square_attacked(&self, target: Square, by: Side) -> bool {
        self.scan_attackers(target, by, |_| ControlFlow::Break(()))
            .is_break()
    }

    /// Squares of every piece of `by` attacking `target`.
    pub fn attackers(&self, target: Square, by: Side) -> ArrayVec<Square, 16> {
        let mut found = ArrayVec::new();
        let _ = self.scan_attackers(target, by, |from| {
            found.push(from);
            ControlFlow::Continue(())
        });
        found
    }

    /// A board without a king for `side` is never in check.
    pub fn is_king_attacked(&self, side: Side) -> bool {
        self.king_square(side)
            .is_some_and(|king| self.is_square_attacked(king, side.opposite()))
    }

    /// Recomputes check from scratch rather than trusting the cached flag.
    pub fn side_to_move_is_in_check(&self) -> bool {
        self.is_king_attacked(self.side_to_move())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use testresult::TestResult;

    #[test_case("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1", true ; "pawn")]
    #[test_case("4k3/8/8/8/8/3n4/8/4K3 w - - 0 1", true ; "knight")]
    #[test_case("4k3/8/8/8/8/8/8/r3K3 w - - 0 1", true ; "rook along rank")]
    #[test_case("4k3/8/8/8/8/8/8/r1N1K3 w - - 0 1", false ; "rook blocked")]
    #[test_case("4k3/8/8/b7/8/8/8/4K3 w - - 0 1", true ; "bishop diagonal")]
    #[test_case("4k3/4q3/8/8/8/8/8/4K3 w - - 0 1", true ; "queen file")]
    #[test_case("4k3/8/8/8/8/8/4p3/4K3 w - - 0 1", false ; "pawn in front")]
    fn test_side_to_move_is_in_check(fen: &str, want: bool) -> TestResult {
        let board = Board::from_fen(fen)?;
        assert_eq!(board.side_to_move_is_in_check(), want);
        assert_eq!(board.in_check(), want);
        Ok(())
    }

    #[test]
    fn test_attackers_double_check() -> TestResult {
        let board = Board::from_fen("4k3/8/8/8/7b/3n4/8/4K3 w - - 0 1")?;
        let mut attackers = board.attackers(E1, Side::Black);
        attackers.sort();
        assert_eq!(attackers.as_slice(), &[D3, H4]);
        Ok(())
    }

    #[test]
    fn test_king_adjacency() -> TestResult {
        let board = Board::from_fen("8/8/8/8/8/3k4/8/3K4 w - - 0 1")?;
        assert!(board.is_square_attacked(D2, Side::Black));
        assert!(board.is_square_attacked(D2, Side::White));
        assert!(!board.is_square_attacked(D1, Side::Black));
        Ok(())
    }
}
