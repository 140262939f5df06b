mod notation;
mod ordering;
mod pieces;

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::moves::{Move, MoveFlags};
use crate::square::*;

pub use notation::{parse_coordinate_move, return_validated_move, validate_move, MoveInputError};
pub use ordering::order_moves;
pub(crate) use pieces::pinned_squares;

/// Comfortably above the most moves any legal position allows (218).
pub const MAX_MOVES: usize = 256;

pub type MoveList = ArrayVec<Move, MAX_MOVES>;

/// The square a castling king passes over on its way to `end`.
fn castle_transit(start: Square, end: Square) -> Square {
    if end > start {
        start.offset(EAST)
    } else {
        start.offset(WEST)
    }
}

/// Runs `visit` on each legal move in generation order, with its check tag
/// set, until `visit` returns false.
fn for_each_legal(board: &mut Board, mut visit: impl FnMut(Move) -> bool) {
    let side = board.side_to_move();
    let enemy = side.opposite();
    let in_check = board.in_check();
    let pinned = pinned_squares(board, side);

    let mut pseudo = MoveList::new();
    pieces::gen_pseudo_legal(board, side, &mut pseudo);

    for mut mve in pseudo {
        if mve.is_castle()
            && (in_check || board.is_square_attacked(castle_transit(mve.start, mve.end), enemy))
        {
            continue;
        }

        // Only these moves can expose the mover's own king.
        let needs_king_test =
            in_check || mve.piece.is_king() || mve.is_en_passant() || pinned.contains(&mve.start);

        board.apply_move(&mve);
        let legal = !needs_king_test || !board.is_king_attacked(side);
        if legal && board.side_to_move_is_in_check() {
            mve.flags.insert(MoveFlags::CHECK);
        }
        board.unapply_move();

        if legal && !visit(mve) {
            return;
        }
    }
}

/// Every legal move, each tagged with whether it gives check, ordered so that
/// `hint` comes first, then captures by descending capture differential, then
/// the killer moves, then checks, then everything else.
///
/// Pass [`Move::NULL`] for any hint or killer that is not known.
pub fn generate_move_list(board: &mut Board, hint: Move, killers: &[Move; 2]) -> MoveList {
    let mut moves = unordered_legal_moves(board);
    order_moves(&mut moves, hint, killers);
    moves
}

/// Every legal move in generation order. Ordering this list with
/// [`order_moves`] gives the same result as [`generate_move_list`].
pub fn unordered_legal_moves(board: &mut Board) -> MoveList {
    let mut moves = MoveList::new();
    for_each_legal(board, |mve| {
        moves.push(mve);
        true
    });
    moves
}

/// Ordered legal moves with no hint or killers.
pub fn legal_moves(board: &mut Board) -> MoveList {
    generate_move_list(board, Move::NULL, &[Move::NULL; 2])
}

/// Stops at the first legal move found.
pub fn has_legal_moves(board: &mut Board) -> bool {
    let mut found = false;
    for_each_legal(board, |_| {
        found = true;
        false
    });
    found
}
