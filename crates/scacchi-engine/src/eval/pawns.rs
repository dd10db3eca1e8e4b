//! Pawn-structure evaluation.

use scacchi_core::{Color, Piece, PieceKind, Position, Square};

use crate::eval::params::Parameters;
use crate::score::Score;

/// Classify every pawn of `side` and return its (middlegame, endgame)
/// structure score.
///
/// - **passed**: no enemy pawn ahead on the same or an adjacent file;
///   bonus by relative rank, half again when a friendly pawn defends it.
/// - **doubled**: a friendly pawn ahead on the same file.
/// - **weak**: isolated (no friendly pawn on either adjacent file) or
///   backward (all adjacent friends are ahead); per-file penalty, larger
///   when no enemy pawn blocks the file.
pub(crate) fn structure(pos: &Position, side: Color, db: &Parameters) -> (Score, Score) {
    let t = db.tunables();
    let own = Piece::new(side, PieceKind::Pawn);
    let enemy = Piece::new(!side, PieceKind::Pawn);

    let mut mg = 0;
    let mut eg = 0;

    for sq in Square::all() {
        if pos[sq] != own {
            continue;
        }

        let file = i32::from(sq.file());
        let rank = sq.relative_rank(side);

        let mut passed = true;
        let mut opposed = false;
        let mut doubled = false;
        let mut supported = false;
        let mut isolated = true;
        let mut adjacent_support_behind = false;

        for other in Square::all() {
            if other == sq {
                continue;
            }
            let p = pos[other];
            if p != own && p != enemy {
                continue;
            }

            let of = i32::from(other.file());
            if (of - file).abs() > 1 {
                continue;
            }
            let orank = other.relative_rank(side);

            if p == own {
                if of == file {
                    if orank > rank {
                        doubled = true;
                    }
                } else {
                    isolated = false;
                    if orank <= rank {
                        adjacent_support_behind = true;
                    }
                    if orank + 1 == rank {
                        supported = true;
                    }
                }
            } else if orank > rank {
                // Enemy pawn ahead of us within one file.
                passed = false;
                if of == file {
                    opposed = true;
                }
            }
        }

        if passed {
            let mut bonus = t.passed_pawn_bonus[rank as usize];
            if supported {
                bonus += bonus / 2;
            }
            mg += bonus / 2;
            eg += bonus;
        }

        if doubled {
            mg -= t.doubled_pawn_penalty / 2;
            eg -= t.doubled_pawn_penalty;
        }

        let backward = !isolated && !adjacent_support_behind;
        if isolated || backward {
            let mut penalty = t.weak_pawn_file_penalty[file as usize];
            if !opposed {
                penalty += t.weak_pawn_open_file_extra;
            }
            mg -= penalty;
            eg -= penalty;
        }
    }

    (mg, eg)
}
