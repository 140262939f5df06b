use crate::board::Board;
use crate::move_gen::legal_moves;
use crate::moves::Move;
use crate::piece::PieceKind;
use crate::square::Square;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MoveInputError {
    #[error("malformed move: {0}")]
    Malformed(String),

    #[error("illegal move: {0}")]
    Illegal(String),
}

/// Splits coordinate notation (`e2e4`, `e2-e4`, `e7e8q`) into its start, end
/// and promotion piece. Says nothing about whether the move is legal.
pub fn parse_coordinate_move(
    text: &str,
) -> Result<(Square, Square, Option<PieceKind>), MoveInputError> {
    let malformed = || MoveInputError::Malformed(text.to_string());

    let cleaned = text.trim().to_ascii_lowercase();
    let cleaned = match cleaned.get(2..3) {
        Some("-") => format!("{}{}", &cleaned[..2], &cleaned[3..]),
        _ => cleaned,
    };
    if !cleaned.is_ascii() || !(4..=5).contains(&cleaned.len()) {
        return Err(malformed());
    }

    let start = cleaned[0..2].parse::<Square>().map_err(|_| malformed())?;
    let end = cleaned[2..4].parse::<Square>().map_err(|_| malformed())?;
    let promotion = match cleaned[4..].chars().next() {
        None => None,
        Some(ch) => match PieceKind::try_from(ch) {
            Ok(kind @ (PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight)) => {
                Some(kind)
            }
            _ => return Err(malformed()),
        },
    };
    Ok((start, end, promotion))
}

/// Finds the legal move in `board` that `text` describes. A pawn reaching the
/// last rank with no promotion letter promotes to a queen.
pub fn validate_move(board: &mut Board, text: &str) -> Result<Move, MoveInputError> {
    let (start, end, promotion) = parse_coordinate_move(text)?;
    let promotion = promotion.unwrap_or(PieceKind::Queen);

    legal_moves(board)
        .into_iter()
        .find(|mve| {
            mve.start == start
                && mve.end == end
                && (!mve.is_promotion() || mve.promoted_to.kind() == Some(promotion))
        })
        .ok_or_else(|| MoveInputError::Illegal(text.trim().to_string()))
}

/// [`validate_move`] for callers that only care whether a move was found.
pub fn return_validated_move(board: &mut Board, text: &str) -> Option<Move> {
    validate_move(board, text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;
    use crate::square::*;
    use test_case::test_case;
    use testresult::TestResult;

    #[test_case("e2e4", E2, E4, None ; "plain")]
    #[test_case("e2-e4", E2, E4, None ; "dash")]
    #[test_case(" E7E8Q\n", E7, E8, Some(PieceKind::Queen) ; "upper case and whitespace")]
    #[test_case("a2a1n", A2, A1, Some(PieceKind::Knight) ; "knight promotion")]
    fn test_parse(text: &str, start: Square, end: Square, promotion: Option<PieceKind>) -> TestResult {
        assert_eq!(parse_coordinate_move(text)?, (start, end, promotion));
        Ok(())
    }

    #[test_case("" ; "empty")]
    #[test_case("e2" ; "too short")]
    #[test_case("e2e4e5" ; "too long")]
    #[test_case("i2e4" ; "bad file")]
    #[test_case("e9e4" ; "bad rank")]
    #[test_case("e7e8k" ; "king promotion")]
    #[test_case("e2–e4" ; "non ascii dash")]
    fn test_parse_malformed(text: &str) {
        assert_eq!(
            parse_coordinate_move(text),
            Err(MoveInputError::Malformed(text.to_string()))
        );
    }

    #[test]
    fn test_validate_legal_and_illegal() -> TestResult {
        let mut board = Board::start();
        let mve = validate_move(&mut board, "g1f3")?;
        assert_eq!(mve.piece, Piece::WHITE_KNIGHT);

        assert_eq!(
            validate_move(&mut board, "e2e5"),
            Err(MoveInputError::Illegal("e2e5".to_string()))
        );
        assert!(return_validated_move(&mut board, "e7e5").is_none());
        assert!(matches!(
            validate_move(&mut board, "xx"),
            Err(MoveInputError::Malformed(_))
        ));
        Ok(())
    }

    #[test]
    fn test_promotion_defaults_to_queen() -> TestResult {
        let mut board = Board::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1")?;
        let queen = validate_move(&mut board, "b7b8")?;
        assert_eq!(queen.promoted_to, Piece::WHITE_QUEEN);

        let knight = validate_move(&mut board, "b7b8n")?;
        assert_eq!(knight.promoted_to, Piece::WHITE_KNIGHT);
        Ok(())
    }

    #[test]
    fn test_validated_move_keeps_flags() -> TestResult {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")?;
        let castle = return_validated_move(&mut board, "e1g1").ok_or("castle not found")?;
        assert!(castle.is_castle());
        Ok(())
    }
}
