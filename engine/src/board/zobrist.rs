use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::board::{Attributes, Board};
use crate::piece::{Piece, Side, NUM_PIECE_CODES};
use crate::square::Square;

const RNG_SEED: u64 = 123456789;

struct RandomU64Generator {
    curr: u64,
}

impl RandomU64Generator {
    const fn new(seed: u64) -> Self {
        Self { curr: seed }
    }

    /// Standard Xorshift
    const fn generate(&mut self) -> u64 {
        let mut x = self.curr;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 5;
        self.curr = x;
        x
    }
}

struct ZobristRandomHashes {
    pieces: [u64; NUM_PIECE_CODES * 64],
    black_to_move: u64,
    castling_rights: [u64; 4],
    en_passant_file: [u64; 8],
}

impl ZobristRandomHashes {
    const fn init() -> Self {
        let mut rng = RandomU64Generator::new(RNG_SEED);

        let mut pieces = [0; NUM_PIECE_CODES * 64];
        let mut i = 0;
        while i < NUM_PIECE_CODES * 64 {
            pieces[i] = rng.generate();
            i += 1;
        }

        let black_to_move = rng.generate();

        let mut castling_rights = [0; 4];
        let mut i = 0;
        while i < 4 {
            castling_rights[i] = rng.generate();
            i += 1;
        }

        let mut en_passant_file = [0; 8];
        let mut i = 0;
        while i < 8 {
            en_passant_file[i] = rng.generate();
            i += 1;
        }

        Self {
            pieces,
            black_to_move,
            castling_rights,
            en_passant_file,
        }
    }
}

const ZOBRIST_RANDOM_HASHES: ZobristRandomHashes = ZobristRandomHashes::init();

/// 64-bit position signature: pieces on squares, side to move, castling
/// rights and the en passant file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub struct ZobristHash(u64);

impl Display for ZobristHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl ZobristHash {
    /// Hashes a board from scratch.
    pub fn calculate(board: &Board) -> ZobristHash {
        let mut hash = ZobristHash(0);
        for square in Square::iter() {
            let piece = board.piece_at(square);
            if piece.is_piece() {
                hash.toggle_piece(square, piece);
            }
        }

        if board.side_to_move() == Side::Black {
            hash.toggle_side();
        }
        hash.toggle_castling(board.attributes());
        if let Some(target) = board.en_passant_target() {
            hash.toggle_en_passant(target);
        }
        hash
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub(crate) fn toggle_piece(&mut self, square: Square, piece: Piece) {
        self.0 ^= ZOBRIST_RANDOM_HASHES.pieces[piece.code() * 64 + square.to_index64()];
    }

    pub(crate) fn toggle_side(&mut self) {
        self.0 ^= ZOBRIST_RANDOM_HASHES.black_to_move;
    }

    /// Toggles every castling right present in `attrs`.
    pub(crate) fn toggle_castling(&mut self, attrs: Attributes) {
        let rights = [
            Attributes::W_CASTLE_QUEEN,
            Attributes::W_CASTLE_KING,
            Attributes::B_CASTLE_QUEEN,
            Attributes::B_CASTLE_KING,
        ];
        for (idx, right) in rights.into_iter().enumerate() {
            if attrs.contains(right) {
                self.0 ^= ZOBRIST_RANDOM_HASHES.castling_rights[idx];
            }
        }
    }

    pub(crate) fn toggle_en_passant(&mut self, target: Square) {
        self.0 ^= ZOBRIST_RANDOM_HASHES.en_passant_file[target.file() as usize];
    }
}
