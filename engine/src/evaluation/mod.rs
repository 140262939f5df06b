pub(crate) mod pst;

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::piece::{Piece, PieceKind, Side};
use crate::square::Square;

pub const DRAW_SCORE: i32 = 0;

/// Phase once every knight, bishop, rook and queen is off the board.
pub const PHASE_TOTAL: i32 = 24;

/// Reward for a king standing on a key square of one of its own pawns when
/// nothing but kings and pawns remain.
pub const KEY_SQUARE_BONUS: i32 = 75;

/// Static score of `board`, white minus black, or [`DRAW_SCORE`] if the
/// position is drawn by rule.
pub fn evaluate(board: &Board) -> i32 {
    if board.is_draw() {
        return DRAW_SCORE;
    }

    let phase = game_phase(board);
    board.position_score() + king_placement(board, phase) + key_square_bonus(board)
}

/// 0 with all pieces on the board, [`PHASE_TOTAL`] with bare kings and pawns.
pub fn game_phase(board: &Board) -> i32 {
    let weights = [
        (PieceKind::Knight, 1),
        (PieceKind::Bishop, 1),
        (PieceKind::Rook, 2),
        (PieceKind::Queen, 4),
    ];
    let material: i32 = weights
        .iter()
        .map(|&(kind, weight)| {
            let count = board.count(Piece::new(kind, Side::White))
                + board.count(Piece::new(kind, Side::Black));
            count as i32 * weight
        })
        .sum();
    PHASE_TOTAL - material.min(PHASE_TOTAL)
}

fn king_placement(board: &Board, phase: i32) -> i32 {
    [Side::White, Side::Black]
        .into_iter()
        .filter_map(|side| {
            let king = board.king_square(side)?;
            let (middle, end) = pst::king_values(king, side);
            let blended = (middle * (PHASE_TOTAL - phase) + end * phase) / PHASE_TOTAL;
            Some(side.sign() * blended)
        })
        .sum()
}

/// Squares which, if occupied by the pawn's own king, let the pawn promote
/// against a lone king no matter who moves.
pub fn key_squares(pawn: Square, side: Side) -> ArrayVec<Square, 6> {
    let to_board_rank = |relative: u8| match side {
        Side::White => relative,
        Side::Black => 7 - relative,
    };
    let relative_rank = match side {
        Side::White => pawn.rank(),
        Side::Black => 7 - pawn.rank(),
    };
    let file = pawn.file();

    let mut squares = ArrayVec::new();
    if file == 0 || file == 7 {
        let key_file = if file == 0 { 1 } else { 6 };
        for relative in [6, 7] {
            squares.push(Square::from_rank_file(to_board_rank(relative), key_file));
        }
        return squares;
    }

    let (nearest, furthest) = match relative_rank {
        0..=3 => (relative_rank + 2, relative_rank + 2),
        6 => (7, 7),
        _ => (relative_rank + 1, relative_rank + 2),
    };
    for relative in nearest..=furthest {
        for key_file in file - 1..=file + 1 {
            squares.push(Square::from_rank_file(to_board_rank(relative), key_file));
        }
    }
    squares
}

fn key_square_bonus(board: &Board) -> i32 {
    let pieces_left = [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
    ]
    .into_iter()
    .any(|kind| {
        board.count(Piece::new(kind, Side::White)) + board.count(Piece::new(kind, Side::Black)) > 0
    });
    if pieces_left {
        return 0;
    }

    [Side::White, Side::Black]
        .into_iter()
        .filter(|&side| {
            let Some(king) = board.king_square(side) else {
                return false;
            };
            board
                .pieces(Piece::new(PieceKind::Pawn, side))
                .iter()
                .any(|&pawn| key_squares(pawn, side).contains(&king))
        })
        .map(|side| side.sign() * KEY_SQUARE_BONUS)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::*;
    use test_case::test_case;
    use testresult::TestResult;

    /// Same position with colours swapped and the board flipped vertically.
    fn mirror_fen(fen: &str) -> String {
        let fields = fen.split(' ').collect::<Vec<&str>>();
        let swap_case = |s: &str| {
            s.chars()
                .map(|c| {
                    if c.is_ascii_uppercase() {
                        c.to_ascii_lowercase()
                    } else {
                        c.to_ascii_uppercase()
                    }
                })
                .collect::<String>()
        };
        let placement = fields[0]
            .split('/')
            .rev()
            .map(swap_case)
            .collect::<Vec<_>>()
            .join("/");
        let side = if fields[1] == "w" { "b" } else { "w" };
        let mut castling = swap_case(fields[2]).chars().collect::<Vec<_>>();
        castling.sort_by_key(|c| "KQkq-".find(*c));
        let castling = castling.into_iter().collect::<String>();
        let ep = match fields[3] {
            "-" => "-".to_string(),
            sq => {
                let rank = if &sq[1..] == "3" { "6" } else { "3" };
                format!("{}{}", &sq[..1], rank)
            }
        };
        format!("{placement} {side} {castling} {ep} {} {}", fields[4], fields[5])
    }

    #[test_case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")]
    #[test_case("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")]
    #[test_case("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1")]
    #[test_case("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1")]
    #[test_case("8/8/8/4k3/8/8/4P3/4K3 w - - 0 1")]
    #[test_case("6k1/5ppp/8/8/8/8/5PPP/3R2K1 b - - 0 30")]
    fn test_colour_flip_negates_score(fen: &str) -> TestResult {
        let board = Board::from_fen(fen)?;
        let mirrored = Board::from_fen(&mirror_fen(fen))?;
        assert_eq!(evaluate(&board), -evaluate(&mirrored));
        assert_eq!(board.evaluate_board(), mirrored.evaluate_board());
        Ok(())
    }

    #[test]
    fn test_start_position_is_level() {
        let board = Board::start();
        assert_eq!(evaluate(&board), 0);
        assert_eq!(game_phase(&board), 0);
    }

    #[test]
    fn test_material_advantage() -> TestResult {
        let up_a_rook = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1")?;
        assert!(evaluate(&up_a_rook) > 400);
        assert!(up_a_rook.evaluate_board() > 400);

        let black_to_move = Board::from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 0 1")?;
        assert!(black_to_move.evaluate_board() < -400);
        Ok(())
    }

    #[test_case("8/8/4k3/8/8/2K5/8/8 w - - 0 1" ; "bare kings")]
    #[test_case("8/8/4k3/8/8/2K5/5B2/8 w - - 0 1" ; "lone bishop")]
    #[test_case("8/8/4k3/8/8/2K5/5R2/8 w - - 100 80" ; "fifty moves")]
    fn test_draws_score_zero(fen: &str) -> TestResult {
        let board = Board::from_fen(fen)?;
        assert_eq!(evaluate(&board), DRAW_SCORE);
        assert_eq!(board.evaluate_board(), DRAW_SCORE);
        Ok(())
    }

    #[test]
    fn test_phase() -> TestResult {
        assert_eq!(game_phase(&Board::from_fen("4k3/pppppppp/8/8/8/8/PPPPPPPP/4K3 w - - 0 1")?), 24);
        assert_eq!(game_phase(&Board::from_fen("3qk3/8/8/8/8/8/8/3QK3 w - - 0 1")?), 16);
        Ok(())
    }

    #[test]
    fn test_king_prefers_centre_in_endgame() -> TestResult {
        let centre = Board::from_fen("7k/8/8/8/3K4/8/8/8 w - - 0 1")?;
        let corner = Board::from_fen("7k/8/8/8/8/8/8/K7 w - - 0 1")?;
        // Both positions are dead draws, so compare the king term directly.
        let phase = PHASE_TOTAL;
        assert!(king_placement(&centre, phase) > king_placement(&corner, phase));
        Ok(())
    }

    #[test_case(E2, Side::White, &[D4, E4, F4] ; "white pawn on second rank")]
    #[test_case(E5, Side::White, &[D6, E6, F6, D7, E7, F7] ; "white pawn past the middle")]
    #[test_case(E7, Side::White, &[D8, E8, F8] ; "white pawn on seventh")]
    #[test_case(E7, Side::Black, &[D5, E5, F5] ; "black pawn on its second rank")]
    #[test_case(A3, Side::White, &[B7, B8] ; "rook pawn")]
    #[test_case(H6, Side::Black, &[G2, G1] ; "black rook pawn")]
    fn test_key_squares(pawn: Square, side: Side, want: &[Square]) {
        assert_eq!(key_squares(pawn, side).as_slice(), want);
    }

    #[test]
    fn test_key_square_bonus() -> TestResult {
        let ahead = Board::from_fen("8/8/8/8/4K3/8/4P3/7k w - - 0 1")?;
        assert_eq!(key_square_bonus(&ahead), KEY_SQUARE_BONUS);

        let behind = Board::from_fen("8/8/8/4k3/8/3K4/4P3/8 w - - 0 1")?;
        assert_eq!(key_square_bonus(&behind), 0);

        let black_ahead = Board::from_fen("7K/4p3/8/4k3/8/8/8/8 b - - 0 1")?;
        assert_eq!(key_square_bonus(&black_ahead), -KEY_SQUARE_BONUS);

        let with_knight = Board::from_fen("8/8/8/8/4K3/8/4P3/6nk w - - 0 1")?;
        assert_eq!(key_square_bonus(&with_knight), 0);
        Ok(())
    }
}
