//! Lazy best-first move provider.
//!
//! Moves come out one at a time. The hash move (when the table had a
//! legal one) is returned before any generation runs — often it causes a
//! cutoff all by itself and the generation never happens. After that the
//! full list is generated once and a selection scan yields the highest
//! scored remaining move per call; most nodes cut off after the first
//! few moves, so sorting the whole list would be wasted work.

use scacchi_core::{Move, Position};

use crate::search::heuristics::{History, Killers, SORT_CAPTURE, SORT_KILLER};

enum Stage {
    Hash,
    Generate,
    Iterate,
}

/// One-at-a-time move source for a single node.
pub struct MoveProvider<'a> {
    pos: &'a Position,
    stage: Stage,
    from_cache: Move,
    moves: Vec<Move>,
    start: usize,
}

impl<'a> MoveProvider<'a> {
    /// Build a provider, seeded with the transposition-table move when it
    /// is legal here (pass the sentry for "none").
    pub fn new(pos: &'a Position, cache_move: Move) -> MoveProvider<'a> {
        if !cache_move.is_sentry() && pos.is_legal(cache_move) {
            MoveProvider {
                pos,
                stage: Stage::Hash,
                from_cache: cache_move,
                moves: Vec::new(),
                start: 0,
            }
        } else {
            let mut provider = MoveProvider {
                pos,
                stage: Stage::Iterate,
                from_cache: Move::sentry(),
                moves: Vec::new(),
                start: 0,
            };
            provider.generate();
            provider
        }
    }

    /// `true` when the node has no legal move at all.
    pub fn is_empty(&self) -> bool {
        self.from_cache.is_sentry() && self.moves.is_empty()
    }

    fn generate(&mut self) {
        self.moves = self.pos.moves();
        self.start = 0;

        // The hash move already went out; drop it from the working list.
        if !self.from_cache.is_sentry() {
            if let Some(i) = self.moves.iter().position(|&m| m == self.from_cache) {
                debug_assert!(i < self.moves.len());
                self.moves.swap(0, i);
                self.start = 1;
            }
        }
    }

    fn score(&self, m: Move, killers: &Killers, history: &History, ply: usize) -> i32 {
        if m.is_quiet() {
            if m == killers.primary(ply) {
                return SORT_KILLER;
            }
            if m == killers.secondary(ply) {
                return SORT_KILLER - 1;
            }
            return history.score(self.pos[m.from], m.to);
        }

        // MVV/LVA with the victim dominant; en passant lands below other
        // pawn-takes-pawn captures (empty destination) but stays in the
        // capture band.
        let mut v = SORT_CAPTURE;
        if m.is_capture() {
            v += (self.pos[m.to].value() << 8) - self.pos[m.from].value();
        }
        if let Some(kind) = m.promote() {
            v += kind.value();
        }
        v
    }

    fn pick(&mut self, killers: &Killers, history: &History, ply: usize) -> Option<Move> {
        if self.start >= self.moves.len() {
            return None;
        }

        let mut best_i = self.start;
        let mut best_s = self.score(self.moves[best_i], killers, history, ply);
        for i in self.start + 1..self.moves.len() {
            let s = self.score(self.moves[i], killers, history, ply);
            if s > best_s {
                best_i = i;
                best_s = s;
            }
        }

        self.moves.swap(self.start, best_i);
        let m = self.moves[self.start];
        self.start += 1;
        Some(m)
    }

    /// The next move in best-first order, `None` when exhausted.
    pub fn next(&mut self, killers: &Killers, history: &History, ply: usize) -> Option<Move> {
        match self.stage {
            Stage::Hash => {
                self.stage = Stage::Generate;
                Some(self.from_cache)
            }
            Stage::Generate => {
                self.stage = Stage::Iterate;
                self.generate();
                self.pick(killers, history, ply)
            }
            Stage::Iterate => self.pick(killers, history, ply),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MoveProvider;
    use crate::search::heuristics::{History, Killers};
    use scacchi_core::{Move, Position};

    fn drain(provider: &mut MoveProvider<'_>) -> Vec<Move> {
        let killers = Killers::new();
        let history = History::new();
        let mut out = Vec::new();
        while let Some(m) = provider.next(&killers, &history, 0) {
            out.push(m);
        }
        out
    }

    #[test]
    fn yields_every_move_exactly_once() {
        let pos = Position::startpos();
        let mut provider = MoveProvider::new(&pos, Move::sentry());
        let mut all = drain(&mut provider);
        assert_eq!(all.len(), 20);
        all.sort_by_key(|m| (m.from.index(), m.to.index()));
        all.dedup();
        assert_eq!(all.len(), 20);
    }

    #[test]
    fn hash_move_comes_first_and_is_not_repeated() {
        let pos = Position::startpos();
        let seed = pos.parse_move("g1f3");
        let mut provider = MoveProvider::new(&pos, seed);
        assert!(!provider.is_empty());

        let all = drain(&mut provider);
        assert_eq!(all[0], seed);
        assert_eq!(all.len(), 20);
        assert_eq!(all.iter().filter(|&&m| m == seed).count(), 1);
    }

    #[test]
    fn illegal_cache_move_is_discarded() {
        let pos = Position::startpos();
        let bogus = pos.parse_move("e2e4");
        let other: Position = "4k3/8/8/8/8/8/8/4K3 w - -".parse().unwrap();
        let mut provider = MoveProvider::new(&other, bogus);
        let all = drain(&mut provider);
        assert!(!all.contains(&bogus));
        assert_eq!(all.len(), other.moves().len());
    }

    #[test]
    fn captures_outrank_quiet_moves() {
        // White can take the d5 pawn with the e4 pawn or play quiet moves.
        let pos: Position = "4k3/8/8/3p4/4P3/8/8/4K3 w - -".parse().unwrap();
        let mut provider = MoveProvider::new(&pos, Move::sentry());
        let all = drain(&mut provider);
        assert!(all[0].is_capture(), "first out should be the capture");
    }

    #[test]
    fn victim_value_dominates_attacker() {
        // Pawn takes queen must come before queen takes pawn.
        let pos: Position = "4k3/8/2q5/3p4/2P1Q3/8/8/4K3 w - -".parse().unwrap();
        let mut provider = MoveProvider::new(&pos, Move::sentry());
        let all = drain(&mut provider);
        let first = all[0];
        assert!(first.is_capture());
        assert_eq!(pos[first.to], scacchi_core::Piece::BLACK_QUEEN);
        assert_eq!(pos[first.from], scacchi_core::Piece::WHITE_PAWN);
    }

    #[test]
    fn killers_outrank_plain_quiets() {
        let pos = Position::startpos();
        let killer = pos.parse_move("b1c3");
        let mut killers = Killers::new();
        killers.store(0, killer);
        let history = History::new();

        let mut provider = MoveProvider::new(&pos, Move::sentry());
        let first = provider.next(&killers, &history, 0).unwrap();
        assert_eq!(first, killer);
    }

    #[test]
    fn history_orders_remaining_quiets() {
        let pos = Position::startpos();
        let liked = pos.parse_move("a2a3");
        let mut history = History::new();
        history.bump(pos[liked.from], liked.to, 9);
        let killers = Killers::new();

        let mut provider = MoveProvider::new(&pos, Move::sentry());
        let first = provider.next(&killers, &history, 0).unwrap();
        assert_eq!(first, liked);
    }

    #[test]
    fn empty_when_no_moves() {
        let mated: Position = "7k/6Q1/5K2/8/8/8/8/8 b - -".parse().unwrap();
        let mut provider = MoveProvider::new(&mated, Move::sentry());
        assert!(provider.is_empty());
        assert!(drain(&mut provider).is_empty());
    }
}
