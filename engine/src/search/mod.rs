use std::fmt::Display;
use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::board::Board;
use crate::config::EngineConfig;
use crate::evaluation::DRAW_SCORE;
use crate::move_gen::{has_legal_moves, legal_moves, order_moves, unordered_legal_moves};
use crate::moves::Move;
use crate::transposition_table::{Bound, CacheEntry, TranspositionTable};

mod killers;

pub use killers::KillerTable;

/// Score of a side that is checkmated with no search depth left. Mates found
/// with depth remaining score further from zero, so nearer mates win out.
pub const MATE: i32 = 100_000;

/// Above any score a search can return.
pub const INFINITY: i32 = 101_000;

/// Deepest line the search can produce.
pub const MAX_PLY: usize = 64;

pub type Line = ArrayVec<Move, MAX_PLY>;

pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE
}

/// `e2-e4 e7-e5 g1-f3`
pub fn format_line(line: &[Move]) -> String {
    line.iter()
        .map(Move::pretty)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SearchError {
    #[error("no legal moves in this position")]
    NoLegalMoves,

    #[error("search depth: want 1 <= x < {MAX_PLY} got {0}")]
    DepthOutOfRange(i32),
}

/// One completed iteration of iterative deepening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationReport {
    pub depth: i32,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    pub line: Vec<Move>,
}

/// `depth score centiseconds nodes line`
impl Display for IterationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.depth,
            self.score,
            self.elapsed.as_millis() / 10,
            self.nodes,
            format_line(&self.line)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// From the point of view of the side to move at the root.
    pub score: i32,
    pub best_move: Move,
    /// Principal variation, starting with `best_move`.
    pub line: Vec<Move>,
    pub nodes: u64,
    pub elapsed: Duration,
    pub iterations: Vec<IterationReport>,
}

/// Per-search state threaded through the recursion.
pub struct SearchContext<'a> {
    pub cache: &'a mut TranspositionTable,
    pub killers: KillerTable,
    pub nodes: u64,
}

impl<'a> SearchContext<'a> {
    pub fn new(cache: &'a mut TranspositionTable) -> Self {
        Self {
            cache,
            killers: KillerTable::new(),
            nodes: 0,
        }
    }

    /// Negamax alpha-beta search of `board` to `depth` plies.
    ///
    /// Returns the score from the side to move's point of view and the line
    /// that leads to it. `best_known_line` is tried first, one move per ply,
    /// for as long as the search follows it.
    pub fn search(
        &mut self,
        board: &mut Board,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        depth_at_root: i32,
        best_known_line: &[Move],
    ) -> (i32, Line) {
        self.nodes += 1;
        let ply = (depth_at_root - depth).max(0) as usize;

        // Depends on how the position was reached, so never cached.
        if ply > 0 && (board.threefold_repetition() || board.fifty_move_draw()) {
            return (DRAW_SCORE, Line::new());
        }

        if depth <= 0 {
            return (horizon_score(board), Line::new());
        }

        let mut hint = best_known_line.first().copied().unwrap_or(Move::NULL);
        let mut cached_moves = None;
        if let Some(entry) = self.cache.probe(board) {
            if entry.depth >= depth {
                match entry.bound {
                    Bound::Exact => return (entry.score, truncated(&entry.best_line, depth)),
                    Bound::LowerBound => alpha = alpha.max(entry.score),
                    Bound::UpperBound => beta = beta.min(entry.score),
                }
                if alpha >= beta {
                    return (entry.score, truncated(&entry.best_line, depth));
                }
            }
            if hint.is_null() {
                hint = entry.best_line.first().copied().unwrap_or(Move::NULL);
            }
            cached_moves = Some(entry.moves.clone());
        }

        // The cache keeps generation order so that ordering a reused list
        // matches ordering a fresh one.
        let generated = cached_moves.unwrap_or_else(|| unordered_legal_moves(board).to_vec());
        let mut moves = generated.clone();
        order_moves(&mut moves, hint, &self.killers.get(ply));

        if moves.is_empty() {
            let score = if board.in_check() {
                -(MATE + depth)
            } else {
                DRAW_SCORE
            };
            self.cache.insert(
                board,
                CacheEntry {
                    moves: generated,
                    depth,
                    score,
                    bound: Bound::Exact,
                    best_line: vec![],
                },
            );
            return (score, Line::new());
        }

        let window_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_line = Line::new();
        for mve in &moves {
            let child_known = match best_known_line.split_first() {
                Some((head, rest)) if head.same_action(mve) => rest,
                _ => &[],
            };

            board.apply_move(mve);
            let (child_score, child_line) =
                self.search(board, depth - 1, -beta, -alpha, depth_at_root, child_known);
            board.unapply_move();

            let score = -child_score;
            if score > best_score {
                best_score = score;
                best_line.clear();
                best_line.push(*mve);
                best_line.extend(child_line);
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                if mve.is_quiet() {
                    self.killers.record(ply, *mve);
                }
                break;
            }
        }

        let bound = if best_score <= window_alpha {
            Bound::UpperBound
        } else if best_score >= beta {
            Bound::LowerBound
        } else {
            Bound::Exact
        };
        self.cache.insert(
            board,
            CacheEntry {
                moves: generated,
                depth,
                score: best_score,
                bound,
                best_line: best_line.to_vec(),
            },
        );

        (best_score, best_line)
    }

    /// Searches depth 1, 2, ... up to `max_depth`, each iteration seeded with
    /// the previous one's line. Stops early once a mate is proven.
    pub fn iterative_deepening(
        &mut self,
        board: &mut Board,
        max_depth: i32,
        seed_line: &[Move],
    ) -> Result<SearchResult, SearchError> {
        if !(1..MAX_PLY as i32).contains(&max_depth) {
            return Err(SearchError::DepthOutOfRange(max_depth));
        }
        if !has_legal_moves(board) {
            return Err(SearchError::NoLegalMoves);
        }

        let _span = info_span!("iterative_deepening", fen = %board.to_fen(), max_depth).entered();
        let start = Instant::now();
        let mut line = seed_line.to_vec();
        let mut score = DRAW_SCORE;
        let mut iterations = Vec::with_capacity(max_depth as usize);

        for depth in 1..=max_depth {
            let nodes_before = self.nodes;
            let (iteration_score, iteration_line) =
                self.search(board, depth, -INFINITY, INFINITY, depth, &line);
            score = iteration_score;
            line = iteration_line.to_vec();

            let report = IterationReport {
                depth,
                score,
                nodes: self.nodes - nodes_before,
                elapsed: start.elapsed(),
                line: line.clone(),
            };
            info!("{report}");
            iterations.push(report);

            if is_mate_score(score) {
                debug!("mate found at depth {depth}, stopping");
                break;
            }
        }

        let stats = self.cache.stats();
        debug!(
            "cache: probes={} hits={} inserts={} hit_rate={:.2} occupied={}",
            stats.probes,
            stats.hits,
            stats.inserts,
            stats.hit_rate(),
            self.cache.occupied()
        );

        let best_move = line.first().copied().ok_or(SearchError::NoLegalMoves)?;
        Ok(SearchResult {
            score,
            best_move,
            line,
            nodes: self.nodes,
            elapsed: start.elapsed(),
            iterations,
        })
    }
}

/// Static score at the end of a line. A side in check with no replies is
/// mated rather than evaluated.
fn horizon_score(board: &mut Board) -> i32 {
    if board.in_check() && !has_legal_moves(board) {
        return -MATE;
    }
    board.evaluate_board()
}

fn truncated(line: &[Move], depth: i32) -> Line {
    line.iter().take(depth.max(0) as usize).copied().collect()
}

/// Picks and plays the computer's move in `board`, searching to the
/// configured depth. `hint` is the expected continuation from the previous
/// search, if any.
pub fn process_computer_move(
    board: &mut Board,
    cache: &mut TranspositionTable,
    config: &EngineConfig,
    hint: &[Move],
) -> Result<SearchResult, SearchError> {
    let mut ctx = SearchContext::new(cache);
    let result = ctx.iterative_deepening(board, config.search_depth, hint)?;
    board.apply_move(&result.best_move);
    Ok(result)
}

/// Plain minimax to `depth` with no pruning and no cache. Scores the same
/// leaves the same way as [`SearchContext::search`], so both must agree.
pub fn negamax(board: &mut Board, depth: i32) -> i32 {
    negamax_helper(board, depth, depth)
}

fn negamax_helper(board: &mut Board, depth: i32, depth_at_root: i32) -> i32 {
    if depth < depth_at_root && (board.threefold_repetition() || board.fifty_move_draw()) {
        return DRAW_SCORE;
    }
    if depth <= 0 {
        return horizon_score(board);
    }

    let moves = legal_moves(board);
    if moves.is_empty() {
        return if board.in_check() {
            -(MATE + depth)
        } else {
            DRAW_SCORE
        };
    }

    moves.iter().fold(-INFINITY, |best, mve| {
        board.apply_move(mve);
        let score = -negamax_helper(board, depth - 1, depth_at_root);
        board.unapply_move();
        best.max(score)
    })
}
