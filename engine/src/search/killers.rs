use crate::moves::Move;

use super::MAX_PLY;

/// Two quiet moves per ply that most recently caused a beta cutoff.
#[derive(Debug, Clone)]
pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl KillerTable {
    pub fn new() -> Self {
        Self {
            slots: [[Move::NULL; 2]; MAX_PLY],
        }
    }

    /// Makes `mve` the newest killer at `ply`, pushing out the older one.
    pub fn record(&mut self, ply: usize, mve: Move) {
        let Some(entry) = self.slots.get_mut(ply) else {
            return;
        };
        if entry[0].same_action(&mve) {
            return;
        }
        entry[1] = entry[0];
        entry[0] = mve;
    }

    pub fn get(&self, ply: usize) -> [Move; 2] {
        self.slots.get(ply).copied().unwrap_or([Move::NULL; 2])
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::move_gen::return_validated_move;
    use testresult::TestResult;

    #[test]
    fn test_newest_displaces_oldest() -> TestResult {
        let mut board = Board::start();
        let [a, b, c] = ["g1f3", "b1c3", "e2e4"]
            .map(|text| return_validated_move(&mut board, text).unwrap_or(Move::NULL));

        let mut killers = KillerTable::new();
        killers.record(3, a);
        killers.record(3, b);
        assert_eq!(killers.get(3), [b, a]);

        killers.record(3, b);
        assert_eq!(killers.get(3), [b, a]);

        killers.record(3, c);
        assert_eq!(killers.get(3), [c, b]);
        assert_eq!(killers.get(2), [Move::NULL; 2]);
        assert!(!a.is_null());
        Ok(())
    }

    #[test]
    fn test_out_of_range_ply_is_ignored() {
        let mut killers = KillerTable::new();
        killers.record(MAX_PLY, Move::NULL);
        assert_eq!(killers.get(MAX_PLY), [Move::NULL; 2]);
    }
}
