use arrayvec::ArrayVec;

use crate::board::{Attributes, Board};
use crate::move_gen::MoveList;
use crate::moves::{Move, MoveFlags};
use crate::piece::{Piece, PieceKind, Side};
use crate::square::*;

const KING_SIDE_BETWEEN: [i8; 2] = [EAST, 2 * EAST];
const QUEEN_SIDE_BETWEEN: [i8; 3] = [WEST, 2 * WEST, 3 * WEST];

const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// Every move for `side` that obeys piece movement rules, ignoring whether it
/// leaves the mover's king attacked. Castling only checks emptiness and rook
/// presence here.
pub(super) fn gen_pseudo_legal(board: &Board, side: Side, moves: &mut MoveList) {
    for &from in board.pieces(Piece::new(PieceKind::Pawn, side)) {
        gen_pawn_moves(board, from, side, moves);
    }
    for &from in board.pieces(Piece::new(PieceKind::Knight, side)) {
        gen_leaping_moves(board, from, side, &KNIGHT_OFFSETS, moves);
    }
    for &from in board.pieces(Piece::new(PieceKind::Bishop, side)) {
        gen_sliding_moves(board, from, side, &DIAGONALS, moves);
    }
    for &from in board.pieces(Piece::new(PieceKind::Rook, side)) {
        gen_sliding_moves(board, from, side, &ORTHOGONALS, moves);
    }
    for &from in board.pieces(Piece::new(PieceKind::Queen, side)) {
        gen_sliding_moves(board, from, side, &DIAGONALS, moves);
        gen_sliding_moves(board, from, side, &ORTHOGONALS, moves);
    }
    for &from in board.pieces(Piece::new(PieceKind::King, side)) {
        gen_leaping_moves(board, from, side, &KING_OFFSETS, moves);
        gen_castling_moves(board, from, side, moves);
    }
}

fn push_pawn_move(moves: &mut MoveList, mve: Move, promotes: bool, side: Side) {
    if promotes {
        for kind in PROMOTION_KINDS {
            moves.push(mve.with_promotion(Piece::new(kind, side)));
        }
    } else {
        moves.push(mve);
    }
}

fn gen_pawn_moves(board: &Board, from: Square, side: Side, moves: &mut MoveList) {
    let pawn = Piece::new(PieceKind::Pawn, side);
    let (forward, start_rank, last_rank) = match side {
        Side::White => (NORTH, 1, 7),
        Side::Black => (SOUTH, 6, 0),
    };

    let one = from.offset(forward);
    let promotes = one.rank() == last_rank;
    if board.piece_at(one).is_empty() {
        push_pawn_move(moves, Move::new(from, one, pawn, Piece::EMPTY), promotes, side);

        let two = one.offset(forward);
        if from.rank() == start_rank && board.piece_at(two).is_empty() {
            moves.push(
                Move::new(from, two, pawn, Piece::EMPTY).with_flag(MoveFlags::DOUBLE_PAWN_PUSH),
            );
        }
    }

    for delta in [forward + EAST, forward + WEST] {
        let to = from.offset(delta);
        let target = board.piece_at(to);
        if target.is_side(side.opposite()) {
            push_pawn_move(moves, Move::new(from, to, pawn, target), promotes, side);
        } else if board.en_passant_target() == Some(to) {
            let victim = Piece::new(PieceKind::Pawn, side.opposite());
            moves.push(Move::new(from, to, pawn, victim).with_flag(MoveFlags::EN_PASSANT));
        }
    }
}

fn gen_leaping_moves(board: &Board, from: Square, side: Side, offsets: &[i8], moves: &mut MoveList) {
    let piece = board.piece_at(from);
    for &delta in offsets {
        let to = from.offset(delta);
        let target = board.piece_at(to);
        if target.is_empty() || target.is_side(side.opposite()) {
            moves.push(Move::new(from, to, piece, target));
        }
    }
}

fn gen_sliding_moves(board: &Board, from: Square, side: Side, directions: &[i8], moves: &mut MoveList) {
    let piece = board.piece_at(from);
    for &delta in directions {
        let mut to = from.offset(delta);
        loop {
            let target = board.piece_at(to);
            if target.is_empty() {
                moves.push(Move::new(from, to, piece, Piece::EMPTY));
            } else {
                if target.is_side(side.opposite()) {
                    moves.push(Move::new(from, to, piece, target));
                }
                break;
            }
            to = to.offset(delta);
        }
    }
}

fn gen_castling_moves(board: &Board, from: Square, side: Side, moves: &mut MoveList) {
    let (home, rights) = match side {
        Side::White => (E1, [Attributes::W_CASTLE_KING, Attributes::W_CASTLE_QUEEN]),
        Side::Black => (E8, [Attributes::B_CASTLE_KING, Attributes::B_CASTLE_QUEEN]),
    };
    if from != home {
        return;
    }

    let king = Piece::new(PieceKind::King, side);
    let rook = Piece::new(PieceKind::Rook, side);
    let attrs = board.attributes();

    // (right, rook square, squares that must be empty, king destination)
    let options = [
        (
            rights[0],
            from.offset(3 * EAST),
            &KING_SIDE_BETWEEN[..],
            from.offset(2 * EAST),
        ),
        (
            rights[1],
            from.offset(4 * WEST),
            &QUEEN_SIDE_BETWEEN[..],
            from.offset(2 * WEST),
        ),
    ];
    for (right, rook_square, between, to) in options {
        if attrs.contains(right)
            && board.piece_at(rook_square) == rook
            && between.iter().all(|&d| board.piece_at(from.offset(d)).is_empty())
        {
            moves.push(Move::new(from, to, king, Piece::EMPTY).with_flag(MoveFlags::CASTLE));
        }
    }
}

/// Squares holding a piece of `side` that shields its own king from an enemy
/// slider on the same line.
pub(crate) fn pinned_squares(board: &Board, side: Side) -> ArrayVec<Square, 8> {
    let mut pinned = ArrayVec::new();
    let Some(king) = board.king_square(side) else {
        return pinned;
    };

    let enemy = side.opposite();
    let queen = Piece::new(PieceKind::Queen, enemy);
    let rays = [
        (ORTHOGONALS, Piece::new(PieceKind::Rook, enemy)),
        (DIAGONALS, Piece::new(PieceKind::Bishop, enemy)),
    ];
    for (directions, slider) in rays {
        for delta in directions {
            let mut sq = king.offset(delta);
            while board.piece_at(sq).is_empty() {
                sq = sq.offset(delta);
            }
            if !board.piece_at(sq).is_side(side) {
                continue;
            }
            let blocker = sq;

            sq = sq.offset(delta);
            while board.piece_at(sq).is_empty() {
                sq = sq.offset(delta);
            }
            let beyond = board.piece_at(sq);
            if beyond == slider || beyond == queen {
                pinned.push(blocker);
            }
        }
    }
    pinned
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use testresult::TestResult;

    fn pseudo_legal(board: &Board) -> Vec<String> {
        let mut moves = MoveList::new();
        gen_pseudo_legal(board, board.side_to_move(), &mut moves);
        let mut moves = moves.iter().map(|m| m.to_string()).collect::<Vec<_>>();
        moves.sort();
        moves
    }

    #[test]
    fn test_start_position_count() {
        assert_eq!(pseudo_legal(&Board::start()).len(), 20);
    }

    #[test]
    fn test_promotions() -> TestResult {
        let board = Board::from_fen("3nk3/2P5/8/8/8/8/8/4K3 w - - 0 1")?;
        let moves = pseudo_legal(&board);
        for want in ["c7c8q", "c7c8r", "c7c8b", "c7c8n", "c7d8q", "c7d8n"] {
            assert!(moves.contains(&want.to_string()), "missing {want}");
        }
        assert!(!moves.contains(&"c7c8".to_string()));
        Ok(())
    }

    #[test]
    fn test_en_passant_generated() -> TestResult {
        let board = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2")?;
        let mut moves = MoveList::new();
        gen_pseudo_legal(&board, Side::White, &mut moves);
        let ep = moves
            .iter()
            .find(|m| m.is_en_passant())
            .ok_or("no en passant move")?;
        assert_eq!(ep.to_string(), "e5d6");
        assert_eq!(ep.captured, Piece::BLACK_PAWN);
        Ok(())
    }

    #[test_case("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", &["e1c1", "e1g1"] ; "both sides open")]
    #[test_case("r3k2r/8/8/8/8/8/8/RN2K1NR w KQkq - 0 1", &[] ; "both sides blocked")]
    #[test_case("r3k2r/8/8/8/8/8/8/R3K2R w Qk - 0 1", &["e1c1"] ; "queen side right only")]
    #[test_case("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1", &["e8c8", "e8g8"] ; "black")]
    #[test_case("r3k2r/8/8/8/8/8/8/R3K1BR w KQkq - 0 1", &["e1c1"] ; "bishop in the way")]
    fn test_castling(fen: &str, want: &[&str]) -> TestResult {
        let board = Board::from_fen(fen)?;
        let mut moves = MoveList::new();
        gen_pseudo_legal(&board, board.side_to_move(), &mut moves);
        let mut castles = moves
            .iter()
            .filter(|m| m.is_castle())
            .map(|m| m.to_string())
            .collect::<Vec<_>>();
        castles.sort();
        assert_eq!(castles, want);
        Ok(())
    }

    #[test]
    fn test_pinned_squares() -> TestResult {
        // Knight pinned on the file, bishop pinned on the diagonal.
        let board = Board::from_fen("k3r3/8/8/8/4N2q/8/5B2/4K3 w - - 0 1")?;
        let mut pinned = pinned_squares(&board, Side::White);
        pinned.sort();
        assert_eq!(pinned.as_slice(), &[F2, E4]);
        Ok(())
    }

    #[test]
    fn test_two_blockers_is_not_a_pin() -> TestResult {
        let board = Board::from_fen("k3r3/8/4P3/8/4N3/8/8/4K3 w - - 0 1")?;
        assert!(pinned_squares(&board, Side::White).is_empty());
        Ok(())
    }
}
