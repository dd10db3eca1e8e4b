//! The transposition table.
//!
//! A power-of-two array of buckets, each holding two slots:
//!
//! - the first is **depth-preferred**: it is overwritten only by an entry
//!   from a newer search (age) or one searched at least as deep;
//! - the second is **always-replace**: the freshest result wins.
//!
//! The scheme is due to Ken Thompson: deep results stick around, recent
//! shallow ones stay available too. Allowing cutoffs from the table makes
//! the search mildly unstable — an entry may be overwritten between two
//! visits, and a stored score never knows the path that produced it, so a
//! repetition elsewhere in the tree could have given a different value.
//! There is nothing that can be done about this.

use scacchi_core::Move;

use crate::score::{Score, MATE};

/// Mate scores this close to `MATE` are rewritten into bounds before
/// being stored (they are distance-from-root sensitive).
pub const MATE_BOUND: Score = MATE - 500;

/// What the stored value means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ScoreType {
    /// The value is unusable for cutoffs; the best move may still seed
    /// move ordering.
    Ignore,
    /// The value is exact (a PV node).
    Exact,
    /// The value is a lower bound (a beta cutoff happened).
    FailHigh,
    /// The value is an upper bound (every move disappointed).
    FailLow,
}

/// One stored search result.
#[derive(Debug, Clone, Copy)]
pub struct Slot {
    hash: u64,
    best_move: Move,
    draft: i32,
    value: i16,
    score_type: ScoreType,
    age: u8,
}

impl Slot {
    const fn empty() -> Slot {
        Slot {
            hash: 0,
            best_move: Move::sentry(),
            draft: 0,
            value: 0,
            score_type: ScoreType::Ignore,
            age: 0,
        }
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn best_move(&self) -> Move {
        self.best_move
    }

    /// Search depth spent below this entry, in fractional-ply units.
    #[inline]
    pub fn draft(&self) -> i32 {
        self.draft
    }

    #[inline]
    pub fn value(&self) -> Score {
        Score::from(self.value)
    }

    #[inline]
    pub fn score_type(&self) -> ScoreType {
        self.score_type
    }

    #[inline]
    pub fn age(&self) -> u8 {
        self.age
    }
}

/// Fixed-size two-slot transposition table.
pub struct TranspositionTable {
    tt: Vec<(Slot, Slot)>,
    age: u8,
}

impl TranspositionTable {
    /// Create a table of `2^bits` buckets.
    pub fn new(bits: u8) -> TranspositionTable {
        TranspositionTable {
            tt: vec![(Slot::empty(), Slot::empty()); 1usize << bits],
            age: 0,
        }
    }

    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        (hash & (self.tt.len() as u64 - 1)) as usize
    }

    /// Advance the age counter. Called once per root search.
    pub fn inc_age(&mut self) {
        self.age = self.age.wrapping_add(1);
    }

    /// Look a position up. A hit on the depth-preferred slot refreshes its
    /// age so it counts as recent for the replacement policy.
    pub fn find(&mut self, hash: u64) -> Option<Slot> {
        let age = self.age;
        let idx = self.bucket_index(hash);
        let pair = &mut self.tt[idx];

        if pair.0.hash == hash {
            pair.0.age = age;
            Some(pair.0)
        } else if pair.1.hash == hash {
            Some(pair.1)
        } else {
            None
        }
    }

    /// Store a search result.
    ///
    /// Mate scores are rewritten first: an exact/fail-high mate becomes a
    /// fail-high at `MATE_BOUND`, while a mate failing low is stored as
    /// `Ignore` so it can never cause a cutoff (mirrored for being
    /// mated). The entry then always lands in the always-replace slot,
    /// and additionally in the depth-preferred slot when that one is
    /// stale or shallower.
    pub fn insert(
        &mut self,
        hash: u64,
        best_move: Move,
        draft: i32,
        mut score_type: ScoreType,
        mut value: Score,
    ) {
        if value >= MATE_BOUND {
            if score_type == ScoreType::FailLow {
                score_type = ScoreType::Ignore;
            } else {
                score_type = ScoreType::FailHigh;
                value = MATE_BOUND;
            }
        } else if value <= -MATE_BOUND {
            if score_type == ScoreType::FailHigh {
                score_type = ScoreType::Ignore;
            } else {
                score_type = ScoreType::FailLow;
                value = -MATE_BOUND;
            }
        }

        let slot = Slot {
            hash,
            best_move,
            draft,
            value: value as i16,
            score_type,
            age: self.age,
        };

        let age = self.age;
        let index = self.bucket_index(hash);
        let pair = &mut self.tt[index];

        if pair.0.age != age || draft >= pair.0.draft {
            pair.0 = slot;
        }
        pair.1 = slot;
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("buckets", &self.tt.len())
            .field("age", &self.age)
            .finish()
    }
}
