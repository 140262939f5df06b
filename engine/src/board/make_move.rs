use crate::board::{Attributes, Board, UndoRecord};
use crate::moves::Move;
use crate::piece::Side;
use crate::square::*;

/// Rook start and end squares for a castle, keyed by the king's destination.
fn castle_rook_squares(king_end: Square) -> (Square, Square) {
    match king_end {
        G1 => (H1, F1),
        C1 => (A1, D1),
        G8 => (H8, F8),
        C8 => (A8, D8),
        _ => panic!("{king_end} is not a castling destination"),
    }
}

/// Rights lost when a piece leaves or lands on `square`.
fn castling_rights_touched(square: Square) -> Attributes {
    match square {
        E1 => Attributes::W_CASTLE_KING.union(Attributes::W_CASTLE_QUEEN),
        H1 => Attributes::W_CASTLE_KING,
        A1 => Attributes::W_CASTLE_QUEEN,
        E8 => Attributes::B_CASTLE_KING.union(Attributes::B_CASTLE_QUEEN),
        H8 => Attributes::B_CASTLE_KING,
        A8 => Attributes::B_CASTLE_QUEEN,
        _ => Attributes::empty(),
    }
}

/// Square of the pawn taken by an en passant capture landing on `end`.
fn en_passant_victim(end: Square, mover: Side) -> Square {
    match mover {
        Side::White => end.offset(SOUTH),
        Side::Black => end.offset(NORTH),
    }
}

impl Board {
    /// Plays `mve`, which must be legal in this position, and pushes what is
    /// needed to take it back onto the undo stack.
    ///
    /// The in-check flag of the resulting position is taken from the move's
    /// check tag, so moves should come from the move generator.
    pub fn apply_move(&mut self, mve: &Move) {
        debug_assert_eq!(self.piece_at(mve.start), mve.piece, "{mve:?} does not match board");

        self.history.push(UndoRecord {
            mve: *mve,
            attrs: self.attrs,
            ep_target: self.ep_target,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash: self.hash,
        });

        let mover = self.side_to_move();
        let mut hash = self.hash;
        if let Some(target) = self.ep_target {
            hash.toggle_en_passant(target);
        }
        hash.toggle_castling(self.attrs);

        if mve.is_en_passant() {
            let victim = en_passant_victim(mve.end, mover);
            let captured = self.take_piece(victim);
            hash.toggle_piece(victim, captured);
        } else if mve.is_capture() {
            assert!(!mve.captured.is_king(), "{mve:?} captures a king");
            let captured = self.take_piece(mve.end);
            hash.toggle_piece(mve.end, captured);
        }

        let moved = self.take_piece(mve.start);
        hash.toggle_piece(mve.start, moved);
        let placed = if mve.is_promotion() { mve.promoted_to } else { moved };
        self.put_piece(mve.end, placed);
        hash.toggle_piece(mve.end, placed);

        if mve.is_castle() {
            let (rook_start, rook_end) = castle_rook_squares(mve.end);
            let rook = self.take_piece(rook_start);
            self.put_piece(rook_end, rook);
            hash.toggle_piece(rook_start, rook);
            hash.toggle_piece(rook_end, rook);
        }

        self.attrs.remove(castling_rights_touched(mve.start));
        self.attrs.remove(castling_rights_touched(mve.end));

        self.ep_target = if mve.is_double_pawn_push() {
            let mid = (mve.start.index() + mve.end.index()) / 2;
            Some(Square::from_index(mid as u8))
        } else {
            None
        };

        if moved.is_pawn() || mve.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if mover == Side::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        let white_to_move = !self.attrs.contains(Attributes::W_TO_MOVE);
        self.attrs.set(Attributes::W_TO_MOVE, white_to_move);
        self.attrs.set(Attributes::IN_CHECK, mve.gives_check());

        hash.toggle_castling(self.attrs);
        if let Some(target) = self.ep_target {
            hash.toggle_en_passant(target);
        }
        hash.toggle_side();
        self.hash = hash;
    }

    /// Takes back the most recent move.
    ///
    /// # Panics
    ///
    /// Panics if no move has been applied.
    pub fn unapply_move(&mut self) {
        let Some(record) = self.history.pop() else {
            panic!("unapply_move called with an empty history");
        };
        let mve = record.mve;

        if mve.is_castle() {
            let (rook_start, rook_end) = castle_rook_squares(mve.end);
            let rook = self.take_piece(rook_end);
            self.put_piece(rook_start, rook);
        }

        self.take_piece(mve.end);
        self.put_piece(mve.start, mve.piece);

        if mve.is_en_passant() {
            let mover = mve.piece.side();
            self.put_piece(en_passant_victim(mve.end, mover), mve.captured);
        } else if mve.is_capture() {
            self.put_piece(mve.end, mve.captured);
        }

        self.attrs = record.attrs;
        self.ep_target = record.ep_target;
        self.halfmove_clock = record.halfmove_clock;
        self.fullmove_number = record.fullmove_number;
        self.hash = record.hash;
    }
}
