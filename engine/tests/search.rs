use bejola_engine::search::{INFINITY, MATE};
use bejola_engine::{
    Board, EngineConfig, GameStatus, ReplacementPolicy, SearchContext, Side, TranspositionTable,
    negamax, process_computer_move, return_validated_move,
};
use test_case::test_case;
use testresult::TestResult;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn play(board: &mut Board, moves: &[&str]) -> TestResult {
    for text in moves {
        let mve = return_validated_move(board, text).ok_or(format!("illegal move {text}"))?;
        board.apply_move(&mve);
    }
    Ok(())
}

#[test]
fn test_finds_mate_in_two() -> TestResult {
    let mut board = Board::from_fen("7k/8/5K2/8/8/8/8/6R1 w - - 0 1")?;
    let mut cache = TranspositionTable::new(10_007, ReplacementPolicy::TwoTier);
    let mut ctx = SearchContext::new(&mut cache);
    let result = ctx.iterative_deepening(&mut board, 5, &[])?;

    assert_eq!(result.score, MATE);
    assert_eq!(result.iterations.len(), 3);
    assert_eq!(result.line.len(), 3);

    for mve in &result.line {
        board.apply_move(mve);
    }
    assert_eq!(
        board.game_status(),
        GameStatus::Checkmate {
            winner: Side::White
        }
    );
    Ok(())
}

#[test]
fn test_avoids_stalemate() -> TestResult {
    let mut board = Board::from_fen("k7/8/2Q5/8/8/8/8/K7 w - - 0 1")?;
    let mut cache = TranspositionTable::new(10_007, ReplacementPolicy::TwoTier);
    let config = EngineConfig {
        search_depth: 3,
        ..Default::default()
    };
    let result = process_computer_move(&mut board, &mut cache, &config, &[])?;

    assert_ne!(result.best_move.to_string(), "c6b6");
    assert_ne!(board.game_status(), GameStatus::Stalemate);
    assert!(result.score > 500);
    Ok(())
}

#[test]
fn test_losing_side_takes_repetition() -> TestResult {
    let mut board = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1")?;
    play(
        &mut board,
        &["d1d2", "e8e7", "d2d1", "e7e8", "d1d2", "e8e7", "d2d1"],
    )?;
    assert!(!board.threefold_repetition());

    let mut cache = TranspositionTable::new(10_007, ReplacementPolicy::TwoTier);
    let mut ctx = SearchContext::new(&mut cache);
    let result = ctx.iterative_deepening(&mut board, 2, &[])?;
    assert_eq!(result.best_move.to_string(), "e7e8");
    assert_eq!(result.score, 0);

    board.apply_move(&result.best_move);
    assert!(board.threefold_repetition());
    assert_eq!(board.evaluate_board(), 0);
    assert_eq!(board.game_status(), GameStatus::ThreefoldRepetition);
    Ok(())
}

#[test_case(Board::start(), 3 ; "start")]
#[test_case(Board::from_fen(KIWIPETE).unwrap(), 2 ; "kiwipete")]
#[test_case(Board::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap(), 3 ; "rook endgame")]
#[test_case(Board::from_fen("7k/8/5K2/8/8/8/8/6R1 w - - 0 1").unwrap(), 3 ; "mate in two")]
#[test_case(Board::from_fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1").unwrap(), 3 ; "hanging queen")]
fn test_alpha_beta_agrees_with_negamax(mut board: Board, max_depth: i32) {
    for depth in 1..=max_depth {
        let want = negamax(&mut board, depth);

        let mut no_cache = TranspositionTable::disabled();
        let (got, _) =
            SearchContext::new(&mut no_cache).search(&mut board, depth, -INFINITY, INFINITY, depth, &[]);
        assert_eq!(got, want, "without cache at depth {depth}");

        let mut cache = TranspositionTable::new(10_007, ReplacementPolicy::TwoTier);
        let (got, _) =
            SearchContext::new(&mut cache).search(&mut board, depth, -INFINITY, INFINITY, depth, &[]);
        assert_eq!(got, want, "with cache at depth {depth}");
    }
    assert_eq!(board.history_len(), 0);
}

#[test_case("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1", true ; "hanging queen")]
#[test_case("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", true ; "back rank mate")]
#[test_case("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1", true ; "two rooks with tied lines")]
#[test_case(KIWIPETE, false ; "kiwipete")]
#[test_case("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3", false ; "open game")]
fn test_cache_is_transparent(fen: &str, unique_best: bool) -> TestResult {
    let depth = 3;
    let mut with_cache = TranspositionTable::new(10_007, ReplacementPolicy::TwoTier);
    let mut always_replace = TranspositionTable::new(10_007, ReplacementPolicy::AlwaysReplace);
    let mut without_cache = TranspositionTable::disabled();

    let mut results = vec![];
    for cache in [&mut with_cache, &mut always_replace, &mut without_cache] {
        let mut board = Board::from_fen(fen)?;
        results.push(SearchContext::new(cache).iterative_deepening(&mut board, depth, &[])?);
    }

    for result in &results[1..] {
        assert_eq!(result.score, results[0].score);
        if unique_best {
            assert_eq!(result.best_move, results[0].best_move);
        }
    }
    assert!(with_cache.stats().probes > 0);
    assert_eq!(without_cache.stats().probes, 0);
    Ok(())
}

#[test]
fn test_seed_line_does_not_change_score() -> TestResult {
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
    let mut board = Board::from_fen(fen)?;
    let mut cache = TranspositionTable::new(10_007, ReplacementPolicy::TwoTier);
    let first = SearchContext::new(&mut cache).iterative_deepening(&mut board, 3, &[])?;

    let mut board = Board::from_fen(fen)?;
    let mut cache = TranspositionTable::new(10_007, ReplacementPolicy::TwoTier);
    let seeded = SearchContext::new(&mut cache).iterative_deepening(&mut board, 3, &first.line)?;

    assert_eq!(seeded.score, first.score);
    assert_eq!(board.history_len(), 0);
    Ok(())
}

#[test]
fn test_computer_plays_both_sides() -> TestResult {
    let mut board = Board::start();
    let mut cache = TranspositionTable::new(10_007, ReplacementPolicy::TwoTier);
    let config = EngineConfig {
        search_depth: 2,
        ..Default::default()
    };

    let mut hint = vec![];
    for _ in 0..8 {
        let result = process_computer_move(&mut board, &mut cache, &config, &hint)?;
        hint = result.line.iter().skip(1).copied().collect();
        board.validate()?;
    }
    assert_eq!(board.history_len(), 8);
    assert_eq!(board.fullmove_number(), 5);
    Ok(())
}
