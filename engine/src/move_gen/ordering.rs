use std::cmp::Reverse;

use crate::moves::Move;

const HINT_KEY: i32 = i32::MAX;
const CAPTURE_BASE: i32 = 1_000_000;
const KILLER_KEY: i32 = 500_000;
const CHECK_KEY: i32 = 400_000;

/// Sorts `moves` in place: `hint` first, then captures by descending capture
/// differential, then killers, then checking moves, then the rest. Ties keep
/// generation order.
pub fn order_moves(moves: &mut [Move], hint: Move, killers: &[Move; 2]) {
    moves.sort_by_key(|mve| Reverse(move_sort_key(mve, &hint, killers)));
}

fn move_sort_key(mve: &Move, hint: &Move, killers: &[Move; 2]) -> i32 {
    if !hint.is_null() && mve.same_action(hint) {
        return HINT_KEY;
    }

    if mve.is_capture() {
        return CAPTURE_BASE + i32::from(mve.capture_diff);
    }

    if killers
        .iter()
        .any(|killer| !killer.is_null() && mve.same_action(killer))
    {
        return KILLER_KEY;
    }

    if mve.gives_check() {
        return CHECK_KEY;
    }

    0
}
