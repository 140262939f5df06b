use std::fmt::Display;
use std::time::{Duration, Instant};

use tabled::{Table, Tabled};

use crate::board::Board;
use crate::move_gen::{has_legal_moves, legal_moves};
use crate::moves::Move;
use crate::square::Square;

/// Counts for every move made at one depth of a perft tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Tabled)]
pub struct PerftDepthResult {
    pub depth: usize,
    pub tot: u64,
    pub captures: u64,
    pub en_passants: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub discovery_checks: u64,
    pub double_checks: u64,
    pub checkmates: u64,
}

pub struct PerftResult {
    pub depth_results: Vec<PerftDepthResult>,
    pub tot_nodes: u64,
    pub time_elapsed: Duration,
    pub nodes_per_second: f64,
}

impl Display for PerftResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "total nodes: {}", self.tot_nodes)?;
        writeln!(f, "time elapsed: {}", self.time_elapsed.as_secs_f32())?;
        writeln!(f, "nodes/s: {:.0}", self.nodes_per_second)?;
        writeln!(f, "{}", Table::new(&self.depth_results))?;
        Ok(())
    }
}

/// Leaf count of the legal move tree `depth` plies deep, split by root move.
pub fn perft(board: &mut Board, depth: usize) -> (Vec<(Move, u64)>, u64) {
    if depth == 0 {
        return (vec![], 1);
    }

    let per_move = legal_moves(board)
        .into_iter()
        .map(|mve| {
            board.apply_move(&mve);
            let nodes = count_leaves(board, depth - 1);
            board.unapply_move();
            (mve, nodes)
        })
        .collect::<Vec<_>>();
    let total = per_move.iter().map(|(_, nodes)| nodes).sum();
    (per_move, total)
}

fn count_leaves(board: &mut Board, depth: usize) -> u64 {
    match depth {
        0 => 1,
        1 => legal_moves(board).len() as u64,
        _ => {
            let mut nodes = 0;
            for mve in legal_moves(board) {
                board.apply_move(&mve);
                nodes += count_leaves(board, depth - 1);
                board.unapply_move();
            }
            nodes
        }
    }
}

/// Walks the whole tree and tallies move kinds at every depth.
pub fn perft_full(board: &mut Board, depth: usize) -> PerftResult {
    let mut depth_results = (1..=depth)
        .map(|depth| PerftDepthResult {
            depth,
            ..Default::default()
        })
        .collect::<Vec<_>>();

    let start = Instant::now();
    perft_full_helper(board, &mut depth_results);
    let time_elapsed = start.elapsed();

    let tot_nodes = depth_results.iter().map(|res| res.tot).sum();
    let nodes_per_second = tot_nodes as f64 / time_elapsed.as_secs_f64().max(f64::EPSILON);

    PerftResult {
        depth_results,
        tot_nodes,
        time_elapsed,
        nodes_per_second,
    }
}

fn perft_full_helper(board: &mut Board, depth_results: &mut [PerftDepthResult]) {
    let Some((curr_res, deeper)) = depth_results.split_first_mut() else {
        return;
    };
    let mover = board.side_to_move();

    for mve in legal_moves(board) {
        curr_res.tot += 1;
        curr_res.captures += u64::from(mve.is_capture());
        curr_res.en_passants += u64::from(mve.is_en_passant());
        curr_res.castles += u64::from(mve.is_castle());
        curr_res.promotions += u64::from(mve.is_promotion());

        board.apply_move(&mve);
        if mve.gives_check() {
            curr_res.checks += 1;

            let checkers = board
                .king_square(mover.opposite())
                .map(|king| board.attackers(king, mover))
                .unwrap_or_default();
            if checkers.len() > 1 {
                curr_res.double_checks += 1;
            } else if checkers.iter().all(|&sq| !moved_to(&mve, sq)) {
                curr_res.discovery_checks += 1;
            }

            if !has_legal_moves(board) {
                curr_res.checkmates += 1;
            }
        }
        perft_full_helper(board, deeper);
        board.unapply_move();
    }
}

/// Whether `square` is where `mve` put a piece, counting the rook of a castle.
fn moved_to(mve: &Move, square: Square) -> bool {
    if square == mve.end {
        return true;
    }
    mve.is_castle() && square.rank() == mve.end.rank() && square.file().abs_diff(mve.end.file()) == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use testresult::TestResult;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    #[test_case(0, 1)]
    #[test_case(1, 20)]
    #[test_case(2, 400)]
    #[test_case(3, 8_902)]
    fn test_start_position(depth: usize, want: u64) {
        let mut board = Board::start();
        let (_, total) = perft(&mut board, depth);
        assert_eq!(total, want);
    }

    #[test]
    fn test_split_by_root_move() -> TestResult {
        let mut board = Board::from_fen(KIWIPETE)?;
        let (per_move, total) = perft(&mut board, 2);
        assert_eq!(per_move.len(), 48);
        assert_eq!(total, 2_039);

        let castle = per_move
            .iter()
            .find(|(mve, _)| mve.to_string() == "e1g1")
            .ok_or("no castle")?;
        assert_eq!(castle.1, 43);
        Ok(())
    }

    #[test]
    fn test_full_start_position() {
        let mut board = Board::start();
        let res = perft_full(&mut board, 3);
        assert_eq!(res.tot_nodes, 20 + 400 + 8_902);
        assert_eq!(
            res.depth_results[2],
            PerftDepthResult {
                depth: 3,
                tot: 8_902,
                captures: 34,
                checks: 12,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_full_kiwipete() -> TestResult {
        let mut board = Board::from_fen(KIWIPETE)?;
        let res = perft_full(&mut board, 2);
        assert_eq!(
            res.depth_results,
            vec![
                PerftDepthResult {
                    depth: 1,
                    tot: 48,
                    captures: 8,
                    castles: 2,
                    ..Default::default()
                },
                PerftDepthResult {
                    depth: 2,
                    tot: 2_039,
                    captures: 351,
                    en_passants: 1,
                    castles: 91,
                    checks: 3,
                    ..Default::default()
                },
            ]
        );
        assert_eq!(board.history_len(), 0);
        Ok(())
    }

    #[test]
    fn test_checkmate_counted() -> TestResult {
        let mut board = Board::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1")?;
        let res = perft_full(&mut board, 1);
        assert_eq!(res.depth_results[0].checkmates, 1);
        assert_eq!(res.depth_results[0].checks, 1);
        Ok(())
    }

    #[test]
    fn test_discovered_and_double_check() -> TestResult {
        // The knight can step off the file for a discovered check, or land on
        // d6 or f6 for a double check.
        let mut board = Board::from_fen("4k3/8/8/8/4N3/8/8/K3R3 w - - 0 1")?;
        let res = perft_full(&mut board, 1);
        assert_eq!(res.depth_results[0].double_checks, 2);
        assert_eq!(res.depth_results[0].discovery_checks, 6);
        assert_eq!(res.depth_results[0].checks, 8);
        Ok(())
    }

    #[test]
    fn test_display_has_table() {
        let mut board = Board::start();
        let out = perft_full(&mut board, 1).to_string();
        assert!(out.contains("total nodes: 20"));
        assert!(out.contains("discovery_checks"));
    }
}
