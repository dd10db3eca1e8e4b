//! Piece-square table construction.
//!
//! The tables are derived from the narrow profile in [`Tunables`] rather
//! than tuned cell by cell; the general idea comes from Fruit. White's
//! tables are built first, then flipped vertically for Black.

use scacchi_core::{Piece, Square};

use crate::eval::params::Tunables;
use crate::score::Score;

type Table = [[Score; 64]; Piece::SUP_ID];

/// Fold a file or rank onto its distance-from-edge index 0..=3.
#[inline]
fn fold(v: u8) -> usize {
    let v = v as usize;
    if v < 4 {
        v
    } else {
        7 - v
    }
}

fn weight(table: &mut Table, id: usize, percent: i32) {
    for v in &mut table[id] {
        *v = *v * percent / 100;
    }
}

/// Build the middlegame and endgame tables for a profile.
pub(crate) fn build(t: &Tunables) -> (Table, Table) {
    let mut m: Table = [[0; 64]; Piece::SUP_ID];
    let mut e: Table = [[0; 64]; Piece::SUP_ID];

    let wp = Piece::WHITE_PAWN.id() as usize;
    let wn = Piece::WHITE_KNIGHT.id() as usize;
    let wb = Piece::WHITE_BISHOP.id() as usize;
    let wr = Piece::WHITE_ROOK.id() as usize;
    let wq = Piece::WHITE_QUEEN.id() as usize;
    let wk = Piece::WHITE_KING.id() as usize;

    // # Pawns
    // ## File
    for sq in Square::all() {
        m[wp][sq.index()] += t.pawn_file_base[fold(sq.file())] * t.pawn_file_mult_m;
    }
    // ## Centre control
    m[wp][Square::D3.index()] += 10;
    m[wp][Square::E3.index()] += 10;
    m[wp][Square::D4.index()] += 20;
    m[wp][Square::E4.index()] += 20;
    m[wp][Square::D5.index()] += 10;
    m[wp][Square::E5.index()] += 10;
    // ## Weight
    weight(&mut m, wp, t.pawn_weight);
    weight(&mut e, wp, t.pawn_weight);

    // # Knights
    // ## Centre
    for sq in Square::all() {
        let centre =
            t.knight_centre_base[fold(sq.file())] + t.knight_centre_base[fold(sq.rank())];
        m[wn][sq.index()] += centre * t.knight_centre_mult_m;
        e[wn][sq.index()] += centre * t.knight_centre_mult_e;
    }
    // ## Rank
    for sq in Square::all() {
        m[wn][sq.index()] += t.knight_rank_base[sq.rank() as usize] * t.knight_rank_mult_m;
    }
    // ## Back rank
    for i in Square::A1.index()..=Square::H1.index() {
        m[wn][i] -= t.knight_backrank_base_m;
    }
    // ## "Trapped"
    m[wn][Square::A8.index()] -= t.knight_trapped_base_m;
    m[wn][Square::H8.index()] -= t.knight_trapped_base_m;
    // ## Weight
    weight(&mut m, wn, t.piece_weight);
    weight(&mut e, wn, t.piece_weight);

    // # Bishops
    // ## Centre
    for sq in Square::all() {
        let centre =
            t.bishop_centre_base[fold(sq.file())] + t.bishop_centre_base[fold(sq.rank())];
        m[wb][sq.index()] += centre * t.bishop_centre_mult_m;
        e[wb][sq.index()] += centre * t.bishop_centre_mult_e;
    }
    // ## Back rank
    for i in Square::A1.index()..=Square::H1.index() {
        m[wb][i] -= t.bishop_backrank_base_m;
    }
    // ## Main diagonals
    for sq in [
        Square::A1,
        Square::B2,
        Square::C3,
        Square::D4,
        Square::E5,
        Square::F6,
        Square::G7,
        Square::H8,
        Square::H1,
        Square::G2,
        Square::F3,
        Square::E4,
        Square::D5,
        Square::C6,
        Square::B7,
        Square::A8,
    ] {
        m[wb][sq.index()] += t.bishop_diagonal_base_m;
    }
    // ## Weight
    weight(&mut m, wb, t.piece_weight);
    weight(&mut e, wb, t.piece_weight);

    // # Rooks
    // ## File
    for sq in Square::all() {
        m[wr][sq.index()] += t.rook_file_base[fold(sq.file())] * t.rook_file_mult_m;
    }
    // ## Weight
    weight(&mut m, wr, t.piece_weight);
    weight(&mut e, wr, t.piece_weight);

    // # Queens
    // ## Centre
    for sq in Square::all() {
        let centre =
            t.queen_centre_base[fold(sq.file())] + t.queen_centre_base[fold(sq.rank())];
        m[wq][sq.index()] += centre * t.queen_centre_mult_m;
        e[wq][sq.index()] += centre * t.queen_centre_mult_e;
    }
    // ## Back rank
    for i in Square::A1.index()..=Square::H1.index() {
        m[wq][i] -= t.queen_backrank_base_m;
    }
    // ## Weight
    weight(&mut m, wq, t.piece_weight);
    weight(&mut e, wq, t.piece_weight);

    // # Kings
    // ## Centre (endgame only: an active king wins endings)
    for sq in Square::all() {
        let centre = t.king_centre_base[fold(sq.file())] + t.king_centre_base[fold(sq.rank())];
        e[wk][sq.index()] += centre * t.king_centre_mult_e;
    }
    // ## File
    for sq in Square::all() {
        m[wk][sq.index()] += t.king_file_base[fold(sq.file())] * t.king_file_mult_m;
    }
    // ## Rank
    for sq in Square::all() {
        m[wk][sq.index()] += t.king_rank_base[sq.rank() as usize] * t.king_rank_mult_m;
    }
    // ## Weight
    weight(&mut m, wk, t.king_weight);
    weight(&mut e, wk, t.piece_weight);

    // Flipped copy for Black.
    for kind_offset in 0..6usize {
        let pb = kind_offset; // Black ids are 0..=5
        let pw = 8 + kind_offset; // White ids are 8..=13
        for sq in Square::all() {
            m[pb][sq.flip().index()] = m[pw][sq.index()];
            e[pb][sq.flip().index()] = e[pw][sq.index()];
        }
    }

    (m, e)
}

#[cfg(test)]
mod tests {
    use super::build;
    use crate::eval::params::Tunables;
    use scacchi_core::{Piece, Square};

    #[test]
    fn knights_prefer_the_centre() {
        let (m, _) = build(&Tunables::default());
        let wn = Piece::WHITE_KNIGHT.id() as usize;
        assert!(m[wn][Square::E5.index()] > m[wn][Square::A8.index()]);
        assert!(m[wn][Square::D4.index()] > m[wn][Square::A1.index()]);
    }

    #[test]
    fn king_hides_in_the_middlegame_and_walks_in_the_endgame() {
        let (m, e) = build(&Tunables::default());
        let wk = Piece::WHITE_KING.id() as usize;
        assert!(m[wk][Square::G1.index()] > m[wk][Square::E4.index()]);
        assert!(e[wk][Square::E4.index()] > e[wk][Square::A1.index()]);
    }

    #[test]
    fn trapped_knight_corner_is_poison() {
        let (m, _) = build(&Tunables::default());
        let wn = Piece::WHITE_KNIGHT.id() as usize;
        assert!(m[wn][Square::A8.index()] < -50);
    }
}
