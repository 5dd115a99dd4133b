//! Iterative deepening alpha-beta search
//!
//! Scores are in centipawns from the side to move's point of view. Mate scores are
//! `MATE + depth`, where `depth` is the remaining depth at the mated node, so faster
//! mates score higher. A search that runs into a position where the side that just
//! moved left its king in check returns [`ILLEGAL`]; the caller takes the move
//! back and tries the next one.

use crate::board::Board;
use crate::eval;
use crate::movepick::{self, MovePicker};
use crate::moves::{self, Move};
use crate::tt::{Bound, TranspositionTable};
use crate::types::Piece;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace};

pub const ILLEGAL: i32 = 0xfff_ffff;
pub const INFINITY: i32 = 0xff_ffff;
pub const MATE: i32 = 0xf_ffff;
pub const DRAW: i32 = 0;

/// Size of the principal variation buffer, which bounds the search depth
pub const MAX_PLY: usize = 32;

#[derive(Debug, Clone)]
pub struct SearchLimits {
    /// Depths up to this one are always completed
    pub min_depth: u8,
    pub max_depth: u8,
    /// Once a depth of at least `min_depth` completes past this time, the search stops
    pub time_budget: Duration,
    /// Polled between depths
    pub stop: Option<Arc<AtomicBool>>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            min_depth: 1,
            max_depth: (MAX_PLY - 1) as u8,
            time_budget: Duration::from_millis(1200),
            stop: None,
        }
    }
}

impl SearchLimits {
    pub fn with_min_depth(mut self, depth: u8) -> Self {
        self.min_depth = depth;
        self
    }

    pub fn with_max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    pub fn with_stop(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn max_depth(&self) -> u8 {
        self.max_depth.clamp(1, (MAX_PLY - 1) as u8)
    }

    fn is_stopped(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|s| s.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(pub i32);

impl Score {
    #[inline]
    pub fn is_mate(self) -> bool {
        self.0.abs() >= MATE
    }

    /// Moves until mate for a score obtained at iteration `depth`
    ///
    /// Positive if the side to move mates, negative if it gets mated.
    pub fn mate_distance(self, depth: u8) -> Option<i32> {
        if !self.is_mate() {
            return None;
        }
        let rem = self.0.abs() - MATE;
        let depth = depth as i32;
        Some(match self.0 > 0 {
            true => (1 + depth - rem) / 2,
            false => (rem - 1 - depth) / 2,
        })
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_mate(), self.0 > 0) {
            (true, true) => write!(f, "mate+"),
            (true, false) => write!(f, "mate-"),
            (false, _) => write!(f, "cp {}", self.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` if the side to move is checkmated or stalemated
    pub best_move: Option<Move>,
    pub score: Score,
    /// Last completed depth
    pub depth: u8,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

impl SearchResult {
    pub fn mate_distance(&self) -> Option<i32> {
        self.score.mate_distance(self.depth)
    }
}

fn pv_string(pv: &[Move]) -> String {
    pv.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Score of a node whose halfmove clock reached 100
///
/// Checkmate still takes precedence over the fifty-move draw.
fn fifty_moves_score(b: &Board, depth: u8) -> i32 {
    match b.is_check() && !b.has_legal_moves() {
        true => -(MATE + depth as i32),
        false => DRAW,
    }
}

/// State owned by a single search call
struct SearchContext<'a> {
    board: Board,
    tt: &'a mut TranspositionTable,
    nodes: u64,
    // Triangular buffer indexed by remaining depth: `pv[d][..d]` is the best line
    // found by the last node at depth `d` that raised alpha
    pv: Box<[[Move; MAX_PLY]; MAX_PLY]>,
}

impl<'a> SearchContext<'a> {
    fn new(board: Board, tt: &'a mut TranspositionTable) -> Self {
        SearchContext {
            board,
            tt,
            nodes: 0,
            pv: Box::new([[Move::NULL; MAX_PLY]; MAX_PLY]),
        }
    }

    fn update_pv(&mut self, depth: usize, mv: Move) {
        let (lower, upper) = self.pv.split_at_mut(depth);
        let line = &mut upper[0];
        line[0] = mv;
        if depth > 0 {
            line[1..depth].copy_from_slice(&lower[depth - 1][..depth - 1]);
        }
    }

    fn pv(&self, depth: usize) -> Vec<Move> {
        self.pv[depth][..depth]
            .iter()
            .copied()
            .take_while(|mv| !mv.is_null())
            .collect()
    }

    /// Probes the table for a move hint, dropping moves that do not fit the position
    fn hint(&self, mv: Move) -> Option<Move> {
        if mv.is_null() {
            return None;
        }
        if self.board.is_pseudolegal(mv) {
            Some(mv)
        } else {
            trace!(%mv, "stale table move");
            None
        }
    }

    fn quiescence(&mut self, mut alpha: i32, beta: i32) -> i32 {
        if self.board.is_opponent_king_attacked() {
            return ILLEGAL;
        }

        let stand_pat = eval::evaluate(&self.board);
        if stand_pat >= beta {
            return beta;
        }
        alpha = alpha.max(stand_pat);

        let mut picker = MovePicker::captures();
        while let Some(mv) = picker.next(&self.board) {
            // Captures come in MVV/LVA order, so only pawn captures remain from here on
            if movepick::victim(&self.board, mv) == Some(Piece::Pawn) {
                return alpha;
            }

            let u = moves::make_move(&mut self.board, mv);
            let score = -self.quiescence(-beta, -alpha);
            moves::unmake_move(&mut self.board, u);
            if score == -ILLEGAL {
                continue;
            }

            if score > alpha {
                if score >= beta {
                    return beta;
                }
                alpha = score;
            }
        }

        alpha
    }

    fn search(&mut self, mut alpha: i32, beta: i32, depth: u8) -> i32 {
        if depth == 0 {
            return self.quiescence(alpha, beta);
        }
        if self.board.is_opponent_king_attacked() {
            return ILLEGAL;
        }

        self.nodes += 1;
        self.pv[depth as usize][0] = Move::NULL;
        if self.board.halfmove() >= 100 {
            return fifty_moves_score(&self.board, depth);
        }

        let key = self.board.zobrist_hash();
        let mut hint = None;
        if let Some(e) = self.tt.probe(key) {
            hint = self.hint(e.mv);
            if e.depth >= depth {
                match e.bound {
                    Bound::Lower if e.score >= beta => return beta,
                    Bound::Upper if e.score <= alpha => return alpha,
                    Bound::Exact => return e.score.clamp(alpha, beta),
                    Bound::Const => return e.score,
                    _ => {}
                }
            }
        }

        let mut picker = MovePicker::new(hint);
        let mut best_move = Move::NULL;
        let mut bound = Bound::Upper;
        let mut moves_played = 0;

        while let Some(mv) = picker.next(&self.board) {
            let u = moves::make_move(&mut self.board, mv);
            let score = -self.search(-beta, -alpha, depth - 1);
            moves::unmake_move(&mut self.board, u);
            if score == -ILLEGAL {
                continue;
            }
            moves_played += 1;

            if score > alpha {
                if score >= beta {
                    self.tt.store(key, mv, score, Bound::Lower, depth);
                    return beta;
                }
                alpha = score;
                bound = Bound::Exact;
                best_move = mv;
                self.update_pv(depth as usize, mv);
            }
        }

        if moves_played == 0 {
            return match self.board.is_check() {
                true => -(MATE + depth as i32),
                false => DRAW,
            };
        }

        self.tt.store(key, best_move, alpha, bound, depth);
        alpha
    }
}

/// Result of one root iteration
struct RootIteration {
    best_move: Option<Move>,
    score: i32,
    moves_played: usize,
}

impl<'a> SearchContext<'a> {
    fn search_root(&mut self, depth: u8) -> RootIteration {
        let key = self.board.zobrist_hash();
        let hint = self.tt.probe(key).and_then(|e| self.hint(e.mv));
        let mut picker = MovePicker::new(hint);
        let mut best_move = None;
        let mut best_score = -INFINITY;
        let mut moves_played = 0;

        while let Some(mv) = picker.next(&self.board) {
            let u = moves::make_move(&mut self.board, mv);
            let score = -self.search(-INFINITY, -best_score, depth - 1);
            moves::unmake_move(&mut self.board, u);
            if score == -ILLEGAL {
                continue;
            }
            moves_played += 1;

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
                self.update_pv(depth as usize, mv);
            }
        }

        if moves_played == 0 {
            best_score = match self.board.is_check() {
                true => -(MATE + depth as i32),
                false => DRAW,
            };
        }
        self.tt.store(
            key,
            best_move.unwrap_or(Move::NULL),
            best_score,
            Bound::Exact,
            depth,
        );

        RootIteration {
            best_move,
            score: best_score,
            moves_played,
        }
    }
}

/// Search driver, owning the transposition table between searches
pub struct Searcher {
    tt: TranspositionTable,
    limits: SearchLimits,
}

impl Searcher {
    pub fn new(limits: SearchLimits) -> Searcher {
        Searcher::with_table(TranspositionTable::default(), limits)
    }

    pub fn with_table(tt: TranspositionTable, limits: SearchLimits) -> Searcher {
        Searcher { tt, limits }
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    pub fn set_limits(&mut self, limits: SearchLimits) {
        self.limits = limits;
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Searches `root` until one of the limits fires
    ///
    /// `history` lists the hashes of the positions played before `root`. They score
    /// as draws when the search reaches them again.
    pub fn search(&mut self, root: &Board, history: &[u64]) -> SearchResult {
        self.tt.clear();
        for &key in history {
            self.tt.pin(key);
        }

        let start = Instant::now();
        let max_depth = self.limits.max_depth();
        let mut ctx = SearchContext::new(root.clone(), &mut self.tt);
        let mut result = SearchResult {
            best_move: None,
            score: Score(DRAW),
            depth: 0,
            nodes: 0,
            pv: Vec::new(),
        };

        for depth in 1..=max_depth {
            let iter_start = Instant::now();
            let nodes_before = ctx.nodes;
            let it = ctx.search_root(depth);

            result.best_move = it.best_move;
            result.score = Score(it.score);
            result.depth = depth;
            result.nodes = ctx.nodes;
            result.pv = match it.best_move {
                Some(_) => ctx.pv(depth as usize),
                None => Vec::new(),
            };

            debug!(
                depth,
                score = it.score,
                nodes = ctx.nodes - nodes_before,
                elapsed_ms = iter_start.elapsed().as_millis() as u64,
                pv = %pv_string(&result.pv),
                "iteration done"
            );

            let done = it.moves_played <= 1
                || it.score >= MATE
                || (depth >= self.limits.min_depth && start.elapsed() > self.limits.time_budget)
                || self.limits.is_stopped();
            if done {
                break;
            }
        }

        info!(
            best_move = %result.best_move.unwrap_or(Move::NULL),
            score = %result.score,
            depth = result.depth,
            nodes = result.nodes,
            elapsed_ms = start.elapsed().as_millis() as u64,
            tt_fill_permille = self.tt.fill_permille(),
            "search done"
        );

        result
    }
}

/// Searches with default limits and a fresh table, returning the best move
pub fn search(b: &Board, min_depth: u8) -> Option<Move> {
    Searcher::new(SearchLimits::default().with_min_depth(min_depth))
        .search(b, &[])
        .best_move
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen;

    fn searcher(depth: u8) -> Searcher {
        Searcher::with_table(
            TranspositionTable::new(16),
            SearchLimits::default()
                .with_min_depth(depth)
                .with_max_depth(depth)
                .with_time_budget(Duration::from_secs(3600)),
        )
    }

    /// Plain negamax without pruning or table, sharing the leaf evaluation
    fn negamax(ctx: &mut SearchContext<'_>, depth: u8) -> i32 {
        if depth == 0 {
            return ctx.quiescence(-INFINITY, INFINITY);
        }
        if ctx.board.is_opponent_king_attacked() {
            return ILLEGAL;
        }
        if ctx.board.halfmove() >= 100 {
            return fifty_moves_score(&ctx.board, depth);
        }
        let mut best = -INFINITY;
        let mut played = 0;
        for mv in movegen::gen_all(&ctx.board).iter().copied() {
            let u = moves::make_move(&mut ctx.board, mv);
            let score = -negamax(ctx, depth - 1);
            moves::unmake_move(&mut ctx.board, u);
            if score == -ILLEGAL {
                continue;
            }
            played += 1;
            best = best.max(score);
        }
        if played == 0 {
            return match ctx.board.is_check() {
                true => -(MATE + depth as i32),
                false => DRAW,
            };
        }
        best
    }

    #[test]
    fn test_alpha_beta_equivalence() {
        for (fen, depth) in [
            ("4k3/pp3ppp/2n5/3p4/3P4/2N5/PP3PPP/4K3 w - - 0 1", 3),
            (
                "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
                2,
            ),
            ("6k1/5ppp/8/8/8/8/1q3PPP/R5K1 w - - 0 1", 3),
        ] {
            let b = Board::from_fen(fen).unwrap();
            let res = searcher(depth).search(&b, &[]);

            // A forced mate ends the iterations early
            let depth = res.depth;
            let mut tt = TranspositionTable::new(4);
            let mut ctx = SearchContext::new(b.clone(), &mut tt);
            let expected = negamax(&mut ctx, depth);
            assert_eq!(res.score.0, expected, "{}", fen);

            let mv = res.best_move.unwrap();
            let u = moves::make_move(&mut ctx.board, mv);
            let child = -negamax(&mut ctx, depth - 1);
            moves::unmake_move(&mut ctx.board, u);
            assert_eq!(child, expected, "{}", fen);
        }
    }

    #[test]
    fn test_mate_in_one() {
        let b = Board::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let res = searcher(10).search(&b, &[]);
        assert_eq!(res.best_move.unwrap().to_string(), "a1a8");
        assert!(res.score.is_mate());
        assert_eq!(res.depth, 2);
        assert_eq!(res.mate_distance(), Some(1));
        assert_eq!(res.pv[0].to_string(), "a1a8");
    }

    #[test]
    fn test_mated_and_stalemate() {
        let b = Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
        let res = searcher(5).search(&b, &[]);
        assert_eq!(res.best_move, None);
        assert_eq!(res.score, Score(-(MATE + 1)));
        assert_eq!(res.depth, 1);
        assert!(res.pv.is_empty());

        let b = Board::from_fen("7K/8/5n2/5n2/8/8/7k/8 w - - 0 1").unwrap();
        let res = searcher(5).search(&b, &[]);
        assert_eq!(res.best_move, None);
        assert_eq!(res.score, Score(DRAW));
    }

    #[test]
    fn test_single_move() {
        // Taking the rook is the only legal move
        let b = Board::from_fen("6k1/8/8/8/8/8/6r1/7K w - - 0 1").unwrap();
        let res = searcher(8).search(&b, &[]);
        assert_eq!(res.depth, 1);
        assert_eq!(res.best_move.unwrap().to_string(), "h1g2");
    }

    #[test]
    fn test_wins_material() {
        let b = Board::from_fen("4k3/8/8/3q4/8/8/3R4/3K4 w - - 0 1").unwrap();
        assert_eq!(search(&b, 2).unwrap().to_string(), "d2d5");
    }

    #[test]
    fn test_repetition_pin() {
        let b = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        let after = b.make_move(Move::from_uci("d1d2", &b).unwrap()).unwrap();
        let mut s = searcher(2);
        s.search(&b, &[after.zobrist_hash()]);
        let e = s.tt().probe(after.zobrist_hash()).unwrap();
        assert_eq!(e.bound, Bound::Const);
        assert_eq!(e.score, DRAW);
    }

    #[test]
    fn test_stop_flag() {
        let stop = Arc::new(AtomicBool::new(true));
        let mut s = Searcher::with_table(
            TranspositionTable::new(12),
            SearchLimits::default().with_stop(stop),
        );
        let res = s.search(&Board::initial(), &[]);
        assert_eq!(res.depth, 1);
        assert!(res.best_move.is_some());
    }

    #[test]
    fn test_mate_beats_fifty_moves() {
        let b = Board::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 99 80").unwrap();
        let res = searcher(4).search(&b, &[]);
        assert_eq!(res.best_move.unwrap().to_string(), "a1a8");
        assert_eq!(res.score, Score(MATE + 1));
        assert_eq!(res.mate_distance(), Some(1));

        let mated = b.make_move(res.best_move.unwrap()).unwrap();
        assert_eq!(mated.halfmove(), 100);
        assert_eq!(fifty_moves_score(&mated, 3), -(MATE + 3));
    }

    #[test]
    fn test_fifty_move_draw() {
        // A queen up, but no move resets the clock and none mates
        let fen = "k7/8/8/8/8/8/8/4KQ2 w - - 99 80";
        let b = Board::from_fen(fen).unwrap();
        let res = searcher(3).search(&b, &[]);
        assert_eq!(res.depth, 3);
        assert_eq!(res.score, Score(DRAW));

        let fresh = Board::from_fen("k7/8/8/8/8/8/8/4KQ2 w - - 0 80").unwrap();
        let res = searcher(3).search(&fresh, &[]);
        assert!(res.score.0 > 500, "{}", res.score);

        let drawn = b.make_move(Move::from_uci("f1f2", &b).unwrap()).unwrap();
        assert_eq!(fifty_moves_score(&drawn, 2), DRAW);
    }

    #[test]
    fn test_budget_respects_min_depth() {
        let mut s = Searcher::with_table(
            TranspositionTable::new(14),
            SearchLimits::default()
                .with_min_depth(3)
                .with_max_depth(10)
                .with_time_budget(Duration::ZERO),
        );
        let res = s.search(&Board::initial(), &[]);
        assert_eq!(res.depth, 3);
        assert_eq!(res.pv.first().copied(), res.best_move);
        assert!(res.pv.len() <= 3);
    }

    #[test]
    fn test_quiescence_skips_pawn_victims() {
        let mut tt = TranspositionTable::new(4);

        // exd5 is the only capture and takes a pawn, so the stand-pat score stands
        let b = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut ctx = SearchContext::new(b.clone(), &mut tt);
        assert_eq!(ctx.quiescence(-INFINITY, INFINITY), eval::evaluate(&b));
        assert_eq!(ctx.board, b);
    }

    #[test]
    fn test_quiescence_captures() {
        let mut tt = TranspositionTable::new(4);

        // exd5 wins a knight for free
        let b = Board::from_fen("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let stand_pat = eval::evaluate(&b);
        let mut ctx = SearchContext::new(b.clone(), &mut tt);
        assert!(ctx.quiescence(-INFINITY, INFINITY) > stand_pat + 200);

        // Cut off at once when standing pat already reaches beta
        assert_eq!(ctx.quiescence(-INFINITY, stand_pat - 1), stand_pat - 1);
        assert_eq!(ctx.board, b);

        // The bishop is pinned, so moving it leaves the king attacked
        let pinned = Board::from_fen("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        let mut ctx = SearchContext::new(pinned.clone(), &mut tt);
        let _u = moves::make_move(&mut ctx.board, Move::from_uci("e2d3", &pinned).unwrap());
        assert_eq!(ctx.quiescence(-INFINITY, INFINITY), ILLEGAL);
    }

    #[test]
    fn test_mate_distance() {
        assert_eq!(Score(MATE + 1).mate_distance(2), Some(1));
        assert_eq!(Score(MATE + 1).mate_distance(4), Some(2));
        assert_eq!(Score(-(MATE + 1)).mate_distance(3), Some(-1));
        assert_eq!(Score(35).mate_distance(3), None);
        assert_eq!(Score(35).to_string(), "cp 35");
    }
}
