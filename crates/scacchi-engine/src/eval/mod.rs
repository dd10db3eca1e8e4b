//! Static evaluation.
//!
//! The score is side-to-move relative: positive favors whoever is on
//! move. Material and the combination terms count at face value; the
//! positional tables, pawn structure, and king shield blend between a
//! middlegame and an endgame reading by the phase index.

mod king_safety;
mod material;
mod params;
mod pawns;
mod pcsq;
mod phase;

pub use params::{Parameters, Tunables, PARAMS_FILE};
pub use phase::phase;

use scacchi_core::{Color, Position, Square};

use crate::score::Score;

/// Evaluate a position for the side to move.
pub fn eval(pos: &Position) -> Score {
    let db = Parameters::global();

    let mut material = [0i32; 2];
    let mut mg = [0i32; 2];
    let mut eg = [0i32; 2];

    for sq in Square::all() {
        let p = pos[sq];
        let Some(c) = p.color() else {
            continue;
        };
        material[c.index()] += p.value();
        mg[c.index()] += db.pcsq_m(p, sq);
        eg[c.index()] += db.pcsq_e(p, sq);
    }

    let mut adjustments = [0i32; 2];
    for c in Color::ALL {
        let i = c.index();
        adjustments[i] += material::combinations(pos, c, db);

        let (pawn_mg, pawn_eg) = pawns::structure(pos, c, db);
        mg[i] += pawn_mg;
        eg[i] += pawn_eg;

        // Shelter only matters while there is an attack to shelter from.
        mg[i] += king_safety::shield(pos, c, db);
    }

    let us = pos.side().index();
    let them = (!pos.side()).index();
    let ph = phase(pos);

    material[us] - material[them] + adjustments[us] - adjustments[them]
        + ((mg[us] - mg[them]) * (256 - ph) + (eg[us] - eg[them]) * ph) / 256
}
