//! Iterative-deepening alpha-beta search.

pub mod control;
pub mod heuristics;
pub mod ordering;
pub mod tt;

use std::time::{Duration, Instant};

use tracing::debug;

use scacchi_core::{GameKind, Move, Position};

use crate::eval::eval;
use crate::score::{is_mate, Score, INF};
use control::Constraint;
use heuristics::{History, Killers};
use ordering::MoveProvider;
use tt::{ScoreType, TranspositionTable};

/// One ply in fractional-depth units: extensions and reductions move the
/// horizon in quarters of a ply.
pub const PLY: i32 = 4;

/// How many node expansions pass between stop-condition checks.
const NODES_BETWEEN_CHECKS: u64 = 2048;

/// Running totals and the persistent root move list.
#[derive(Debug, Default, Clone)]
pub struct Statistics {
    /// Full-width search nodes.
    pub snodes: u64,
    /// Quiescence nodes.
    pub qnodes: u64,
    /// Current iterative-deepening depth.
    pub depth: u32,
    /// Score of the last completed iteration.
    pub score_at_root: Score,
    /// Root moves, rotated so the best known move leads. Kept across
    /// iterations — this ordering is what makes deepening converge fast.
    pub moves_at_root: Vec<Move>,
}

/// A completed iteration, handed to the controller for its info line.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub depth: u32,
    pub score: Score,
    pub elapsed: Duration,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

/// Per-search mutable state shared by every node: the repetition path
/// and the quiet-move heuristics.
struct Driver {
    /// Hashes of every position from the game's start down to the node
    /// being searched.
    path: Vec<u64>,
    killers: Killers,
    history: History,
}

impl Driver {
    fn new(states: &[Position]) -> Driver {
        Driver {
            path: states.iter().map(Position::hash).collect(),
            killers: Killers::new(),
            history: History::new(),
        }
    }

    /// Has the current position occurred before on the path? Inside the
    /// tree a single earlier occurrence already scores as a draw.
    fn repetitions(&self) -> bool {
        let Some((&current, earlier)) = self.path.split_last() else {
            return false;
        };
        earlier.contains(&current)
    }

    /// Reward a quiet move that refuted the node: killer slot plus a
    /// history bump weighted by the remaining draft.
    fn update_heuristics(&mut self, m: Move, mover: scacchi_core::Piece, ply: usize, draft: i32) {
        debug_assert!(m.is_quiet());
        debug_assert!(mover.is_piece());

        self.killers.store(ply, m);
        self.history.bump(mover, m.to, draft / PLY);
    }
}

/// One root search over a game history.
///
/// `states` is the sequence of positions reached so far (possibly partial
/// for a set-up board); the last entry is searched. The transposition
/// table is borrowed so it survives from move to move.
pub struct Search<'a> {
    root: Position,
    driver: Driver,
    tt: &'a mut TranspositionTable,
    pub constraint: Constraint,
    pub stats: Statistics,
    timer: Instant,
    stopped: bool,
}

impl<'a> Search<'a> {
    pub fn new(states: &[Position], tt: &'a mut TranspositionTable) -> Search<'a> {
        debug_assert!(!states.is_empty());
        Search {
            root: states.last().cloned().unwrap_or_else(Position::startpos),
            driver: Driver::new(states),
            tt,
            constraint: Constraint::default(),
            stats: Statistics::default(),
            timer: Instant::now(),
            stopped: false,
        }
    }

    /// Time since the search started.
    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    /// Did the last `run` stop before finishing its iteration?
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    /// Count a node; every `NODES_BETWEEN_CHECKS` expansions (or at once
    /// when already stopped) re-evaluate the stop conditions.
    fn check_stop(&mut self) -> bool {
        self.stats.snodes += 1;
        if self.stopped || self.stats.snodes % NODES_BETWEEN_CHECKS == 0 {
            if self
                .constraint
                .exhausted(self.timer.elapsed(), self.stats.snodes + self.stats.qnodes)
            {
                self.stopped = true;
            }
            return self.stopped;
        }
        false
    }

    /// Draft left for a child node.
    ///
    /// The base cost of a move is one ply. A check extension shrinks with
    /// the remaining draft, so deep in the tree checks cost nearly the
    /// full ply while near the leaves they extend almost a whole one
    /// (keeps forced sequences from being cut at the horizon without
    /// letting them run away). Captures earn half a ply. The clamp keeps
    /// extensions from ever growing the net horizon.
    fn new_draft(&self, draft: i32, in_check: bool, m: Move) -> i32 {
        let mut delta = -PLY;

        if in_check {
            delta += 2 * PLY * PLY / draft.max(1);
        }
        if m.is_capture() {
            delta += PLY / 2;
        }

        draft + delta.min(0)
    }

    /// Captures ordered most-valuable-victim first, cheapest attacker
    /// breaking ties.
    fn sorted_captures(s: &Position) -> Vec<Move> {
        let mut captures = s.captures();
        captures.sort_by_key(|m| std::cmp::Reverse(20 * s[m.to].value() - s[m.from].value()));
        captures
    }

    /// Capture-only negamax from a quiet starting point.
    ///
    /// The static evaluation is the "stand-pat" score (the term is from
    /// poker): barring zugzwang the side to move has at least one move
    /// matching it, so it is a sound lower bound. Exchanges are then
    /// resolved until a calm position justifies trusting the evaluation.
    /// Results are never written to the transposition table.
    fn quiesce(&mut self, s: &Position, mut alpha: Score, beta: Score) -> Score {
        debug_assert!(alpha < beta);
        self.stats.qnodes += 1;

        let stand_pat = eval(s);
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        for m in Self::sorted_captures(s) {
            let x = -self.quiesce(&s.after_move(m), -beta, -alpha);

            if x > alpha {
                if x >= beta {
                    return beta;
                }
                alpha = x;
            }
        }

        alpha
    }

    /// Root moves ordered for the first iteration: hash move, then
    /// MVV/LVA captures, promotions boosted, the rest as generated.
    fn sorted_moves(&mut self, s: &Position) -> Vec<Move> {
        let best_move = self
            .tt
            .find(s.hash())
            .map_or_else(Move::sentry, |e| e.best_move());

        let score = |m: &Move| -> i64 {
            let mut ms = 0i64;
            if *m == best_move {
                ms = 2_000_000;
            } else if m.is_capture() {
                ms = ((i64::from(s[m.to].value())) << 8) - i64::from(s[m.from].value())
                    + 1_000_000;
            }
            if let Some(kind) = m.promote() {
                ms += i64::from(kind.value()) + 100_000;
            }
            ms
        };

        let mut moves = s.moves();
        moves.sort_by_key(|m| std::cmp::Reverse(score(m)));
        moves
    }

    /// Negamax alpha-beta on `s` at `ply` from the root with `draft`
    /// fractional units left to the horizon. Ply and draft are decoupled:
    /// the ply always advances by one while extensions bend the draft.
    fn ab(&mut self, s: &Position, alpha: Score, beta: Score, ply: u32, draft: i32) -> Score {
        debug_assert!(alpha < beta);

        if draft < PLY {
            return self.quiesce(s, alpha, beta);
        }

        // On a stop every frame unwinds with 0; the driver discards
        // everything from an unfinished iteration, so the value never
        // surfaces.
        if self.check_stop() {
            return 0;
        }

        self.driver.path.push(s.hash());
        let x = self.ab_node(s, alpha, beta, ply, draft);
        self.driver.path.pop();
        x
    }

    fn ab_node(
        &mut self,
        s: &Position,
        mut alpha: Score,
        beta: Score,
        ply: u32,
        draft: i32,
    ) -> Score {
        // Repetition and fifty-move draws: the cheapest way out of any
        // further searching.
        if self.driver.repetitions() || s.fifty() >= 100 {
            return 0;
        }

        // A stored result deep enough for this node may answer it
        // outright: an exact score returns as is; a fail-low that is
        // still under alpha, or a fail-high still over beta, keeps the
        // window result. Whatever happens, the stored move seeds the
        // provider.
        let mut cached_move = Move::sentry();
        if let Some(entry) = self.tt.find(s.hash()) {
            cached_move = entry.best_move();
            if entry.draft() >= draft {
                match entry.score_type() {
                    ScoreType::Exact => return entry.value(),
                    ScoreType::FailLow => {
                        if entry.value() <= alpha {
                            return alpha;
                        }
                    }
                    ScoreType::FailHigh => {
                        if entry.value() >= beta {
                            return beta;
                        }
                    }
                    ScoreType::Ignore => {}
                }
            }
        }

        let mut provider = MoveProvider::new(s, cached_move);
        let in_check = s.in_check(s.side());

        if provider.is_empty() {
            // Mate at this ply — the `+ ply` prefers the quicker one — or
            // stalemate.
            return if in_check { -INF + ply as Score } else { 0 };
        }

        let mut best_move = Move::sentry();
        let mut score_type = ScoreType::FailLow;
        let mut first = true;

        while let Some(m) =
            provider.next(&self.driver.killers, &self.driver.history, ply as usize)
        {
            let d = self.new_draft(draft, in_check, m);
            let s1 = s.after_move(m);

            // Principal-variation search: the first move gets the full
            // window, later ones a null window with a re-search only when
            // they surprise.
            let x = if first {
                first = false;
                -self.ab(&s1, -beta, -alpha, ply + 1, d)
            } else {
                let x = -self.ab(&s1, -alpha - 1, -alpha, ply + 1, d);
                if alpha < x && x < beta {
                    -self.ab(&s1, -beta, -alpha, ply + 1, d)
                } else {
                    x
                }
            };

            if x > alpha {
                best_move = m;

                if x >= beta {
                    score_type = ScoreType::FailHigh;

                    if m.is_quiet() {
                        self.driver
                            .update_heuristics(m, s[m.from], ply as usize, draft);
                    }
                    break;
                }

                score_type = ScoreType::Exact;
                alpha = x;
            }
        }

        let val = if score_type == ScoreType::FailHigh {
            beta
        } else {
            alpha
        };

        if !self.stopped {
            self.tt.insert(s.hash(), best_move, draft, score_type, val);
        }

        val
    }

    /// Root-level alpha-beta. Differs from [`Search::ab`] in that the
    /// root move list is persistent (rotated so the best move leads), the
    /// root is already on the path, draw rules are ignored — a move is
    /// wanted no matter what — and mate/stalemate were handled before the
    /// iteration started.
    fn ab_root(&mut self, mut alpha: Score, beta: Score, draft: i32) -> Score {
        debug_assert!(alpha < beta);
        debug_assert!(draft >= PLY);
        self.stats.snodes += 1;

        debug_assert_eq!(self.driver.path.last(), Some(&self.root.hash()));

        let root = self.root.clone();
        if self.stats.moves_at_root.is_empty() {
            self.stats.moves_at_root = self.sorted_moves(&root);
        }
        debug_assert!(!self.stats.moves_at_root.is_empty());

        let in_check = root.in_check(root.side());

        let mut best_move = Move::sentry();
        let mut score_type = ScoreType::FailLow;

        for i in 0..self.stats.moves_at_root.len() {
            let m = self.stats.moves_at_root[i];
            let d = self.new_draft(draft, in_check, m);
            let s1 = root.after_move(m);

            let x = if i == 0 {
                -self.ab(&s1, -beta, -alpha, 1, d)
            } else {
                let x = -self.ab(&s1, -alpha - 1, -alpha, 1, d);
                if alpha < x && x < beta {
                    -self.ab(&s1, -beta, -alpha, 1, d)
                } else {
                    x
                }
            };

            if x > alpha {
                best_move = m;

                // Root moves are kept in the best known order: the new
                // best slides to the front, the others keep their
                // relative order.
                self.stats.moves_at_root[..=i].rotate_right(1);

                if x >= beta {
                    score_type = ScoreType::FailHigh;
                    break;
                }

                alpha = x;
                score_type = ScoreType::Exact;
            }
        }

        let val = if score_type == ScoreType::FailHigh {
            beta
        } else {
            alpha
        };

        if !self.stopped {
            self.tt
                .insert(root.hash(), best_move, draft, score_type, val);
        }

        val
    }

    /// Walk the best-move chain out of the transposition table. Stops
    /// when an entry or its move is missing, the line ends the game, a
    /// move fails verification, or the line exceeds three times the
    /// iteration depth.
    fn extract_pv(&mut self) -> Vec<Move> {
        let mut history = self.driver.path.clone();
        let mut s = self.root.clone();
        let mut pv: Vec<Move> = Vec::new();

        loop {
            let Some(entry) = self.tt.find(s.hash()) else {
                break;
            };
            let m = entry.best_move();
            if m.is_sentry() || pv.len() > 3 * self.stats.depth as usize {
                break;
            }
            if !pv.is_empty() && s.mate_or_draw(Some(&history)) != GameKind::Standard {
                break;
            }
            if !s.is_legal(m) {
                break;
            }
            s.make_move(m);
            history.push(s.hash());
            pv.push(m);
        }

        pv
    }

    /// One aspiration-window probe. The window from the previous
    /// iteration usually contains the new score and the narrow bounds
    /// buy extra cutoffs; when the score escapes the window the position
    /// is re-searched with full bounds. On success the window re-centers
    /// around the score.
    fn aspiration_search(&mut self, alpha: &mut Score, beta: &mut Score, draft: i32) -> Score {
        let mut x = self.ab_root(*alpha, *beta, draft);

        if self.stopped {
            return 0;
        }

        if x <= *alpha || x >= *beta {
            debug!(
                depth = self.stats.depth,
                score = x,
                fail = if x <= *alpha { "low" } else { "high" },
                nodes = self.stats.snodes,
                "aspiration window missed, re-searching"
            );
            x = self.ab_root(-INF, INF, draft);
        }

        if self.stopped {
            return 0;
        }

        self.stats.score_at_root = x;
        *alpha = x - 50;
        *beta = x + 50;

        x
    }

    /// Iterative deepening: call the aspiration search with increasing
    /// depth until the budget runs out, reporting each completed
    /// iteration. When a stop lands mid-iteration the previous
    /// iteration's move stands — embedding depth-first alpha-beta in a
    /// best-first frame at almost no cost.
    pub fn run(&mut self, mut on_iter: impl FnMut(&SearchReport)) -> Move {
        match self.root.mate_or_draw(Some(&self.driver.path)) {
            GameKind::Mated | GameKind::DrawStalemate => return Move::sentry(),
            _ => {}
        }

        self.timer = Instant::now();
        self.tt.inc_age();
        self.stats = Statistics::default();
        self.stopped = false;

        let mut best_move = Move::sentry();
        let (mut alpha, mut beta) = (-INF, INF);

        let max_depth = self.constraint.max_depth.filter(|&d| d > 0).unwrap_or(1000);
        for depth in 1..=max_depth {
            self.stats.depth = depth;

            let x = self.aspiration_search(&mut alpha, &mut beta, depth as i32 * PLY);

            if self.stopped {
                break;
            }

            best_move = self.stats.moves_at_root[0];
            let pv = self.extract_pv();
            debug_assert!(pv.is_empty() || pv[0] == best_move);

            on_iter(&SearchReport {
                depth,
                score: x,
                elapsed: self.timer.elapsed(),
                nodes: self.stats.snodes,
                pv,
            });

            if is_mate(x) || (self.stats.moves_at_root.len() == 1 && depth == 5) {
                break;
            }
            if let Some(condition) = &self.constraint.condition {
                if condition() {
                    break;
                }
            }
        }

        // A stop before the first completed iteration still yields a real
        // move, never the sentry.
        if best_move.is_sentry() {
            if let Some(&m) = self.stats.moves_at_root.first() {
                best_move = m;
            } else if let Some(&m) = self.root.moves().first() {
                best_move = m;
            }
        }

        best_move
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        fen.parse().unwrap()
    }

    fn search_to_depth(fen: &str, depth: u32) -> (Move, Score, u32) {
        let root = pos(fen);
        let mut tt = TranspositionTable::new(16);
        let mut search = Search::new(&[root], &mut tt);
        search.constraint.max_depth = Some(depth);

        let mut last_depth = 0;
        let m = search.run(|report| last_depth = report.depth);
        (m, search.stats.score_at_root, last_depth)
    }

    #[test]
    fn finds_mate_in_one() {
        let (m, score, _) = search_to_depth(
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq -",
            3,
        );
        assert_eq!(format!("{m}"), "h5f7");
        assert!(is_mate(score), "score {score} should be a mate score");
    }

    #[test]
    fn mated_root_returns_sentry() {
        let (m, _, _) = search_to_depth("7k/6Q1/5K2/8/8/8/8/8 b - -", 3);
        assert!(m.is_sentry());
    }

    #[test]
    fn stalemate_root_returns_sentry() {
        let (m, _, _) = search_to_depth("k7/2K5/1Q6/8/8/8/8/8 b - -", 3);
        assert!(m.is_sentry());
    }

    #[test]
    fn prefers_the_quicker_mate() {
        // A back-rank mate in one exists; deeper mates must not displace it.
        let (m, score, _) = search_to_depth("6k1/8/6K1/8/8/8/8/R7 w - -", 5);
        assert_eq!(format!("{m}"), "a1a8");
        assert!(is_mate(score));
    }

    #[test]
    fn single_reply_stops_at_depth_five() {
        // The black king has exactly one legal move (h8h7).
        let root = pos("7k/5K2/8/8/8/8/8/6R1 b - -");
        assert_eq!(root.moves().len(), 1);

        let mut tt = TranspositionTable::new(14);
        let mut search = Search::new(&[root], &mut tt);
        let mut max_depth_seen = 0;
        let m = search.run(|report| max_depth_seen = max_depth_seen.max(report.depth));

        assert!(!m.is_sentry());
        assert!(
            max_depth_seen <= 5,
            "single-reply search ran to depth {max_depth_seen}"
        );
    }

    #[test]
    fn node_cap_stops_the_search() {
        let root = Position::startpos();
        let mut tt = TranspositionTable::new(14);
        let mut search = Search::new(&[root], &mut tt);
        search.constraint.max_nodes = Some(20_000);

        let m = search.run(|_| {});
        assert!(!m.is_sentry(), "a stopped search still returns a move");
        assert!(search.stopped());
        // The overshoot is bounded by the check interval plus whatever
        // quiescence burst was in flight.
        assert!(search.stats.snodes + search.stats.qnodes < 60_000);
    }

    #[test]
    fn immediate_condition_still_returns_a_root_move() {
        let root = Position::startpos();
        let mut tt = TranspositionTable::new(14);
        let mut search = Search::new(&[root], &mut tt);
        search.constraint.condition = Some(Box::new(|| true));

        let m = search.run(|_| {});
        assert!(!m.is_sentry());
        assert!(root_legal(&Position::startpos(), m));
    }

    fn root_legal(pos: &Position, m: Move) -> bool {
        pos.moves().contains(&m)
    }

    #[test]
    #[ignore] // slow
    fn repetition_inside_the_tree_scores_zero() {
        // A rook-versus-queen corner perpetual: White holds the draw by
        // chasing the queen forever.
        let root = pos("8/6pk/1p3pQp/q4P2/2PP4/r1PKP2P/p7/R7 b - - 14 55");
        let mut tt = TranspositionTable::new(18);
        let mut search = Search::new(&[root], &mut tt);
        search.constraint.max_depth = Some(9);

        search.run(|_| {});
        assert_eq!(search.stats.score_at_root, 0);
    }

    #[test]
    fn deepening_reports_every_depth() {
        let root = Position::startpos();
        let mut tt = TranspositionTable::new(16);
        let mut search = Search::new(&[root], &mut tt);
        search.constraint.max_depth = Some(4);

        let mut depths = Vec::new();
        search.run(|report| depths.push(report.depth));
        assert_eq!(depths, vec![1, 2, 3, 4]);
    }

    #[test]
    fn report_pv_starts_with_best_move() {
        let root = Position::startpos();
        let mut tt = TranspositionTable::new(16);
        let mut search = Search::new(&[root], &mut tt);
        search.constraint.max_depth = Some(4);

        let mut last_pv = Vec::new();
        let m = search.run(|report| last_pv = report.pv.clone());
        assert!(!last_pv.is_empty());
        assert_eq!(last_pv[0], m);
    }

    #[test]
    fn pv_moves_form_a_legal_line() {
        let root = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -");
        let mut tt = TranspositionTable::new(16);
        let mut search = Search::new(&[root.clone()], &mut tt);
        search.constraint.max_depth = Some(3);

        let mut last_pv = Vec::new();
        search.run(|report| last_pv = report.pv.clone());

        let mut s = root;
        for m in last_pv {
            assert!(s.is_legal(m), "{m} must be legal along the PV");
            s.make_move(m);
        }
    }

    #[test]
    fn takes_the_hanging_queen() {
        let (m, score, _) = search_to_depth("4k3/8/8/3q4/4P3/8/8/4K3 w - -", 3);
        assert_eq!(format!("{m}"), "e4d5");
        assert!(score > 800);
    }

    #[test]
    fn root_list_keeps_best_move_in_front() {
        let root = Position::startpos();
        let mut tt = TranspositionTable::new(16);
        let mut search = Search::new(&[root], &mut tt);
        search.constraint.max_depth = Some(3);

        let m = search.run(|_| {});
        assert_eq!(search.stats.moves_at_root[0], m);
        assert_eq!(search.stats.moves_at_root.len(), 20);
    }

    #[test]
    fn check_extension_shrinks_with_draft() {
        let root = Position::startpos();
        let mut tt = TranspositionTable::new(4);
        let search = Search::new(&[root], &mut tt);
        let quiet = Move::new(
            scacchi_core::Square::G1,
            scacchi_core::Square::F3,
            0,
        );

        // Not in check: exactly one ply off.
        assert_eq!(search.new_draft(12, false, quiet), 8);
        // In check near the leaves: delta = -4 + 2*4*4/4 = +4, clamped to 0.
        assert_eq!(search.new_draft(4, true, quiet), 4);
        // In check deep in the tree: the extension fades.
        assert_eq!(search.new_draft(32, true, quiet), 32 - 3);

        let capture = Move::new(
            scacchi_core::Square::E4,
            scacchi_core::Square::D5,
            Move::CAPTURE,
        );
        // Capture: half a ply refunded.
        assert_eq!(search.new_draft(12, false, capture), 10);
        // Extensions never grow the net horizon.
        assert!(search.new_draft(4, true, capture) <= 4);
    }
}
