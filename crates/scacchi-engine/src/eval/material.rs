//! Material-combination terms: piece pairs and pawn-count corrections.

use scacchi_core::{Color, PieceKind, Position};

use crate::eval::params::Parameters;
use crate::score::Score;

/// Combination score for one side: pair bonuses/penalties, plus the
/// classical pawn-count corrections (a knight is worth more with many
/// pawns on the board, a rook more as they disappear).
pub(crate) fn combinations(pos: &Position, side: Color, db: &Parameters) -> Score {
    let t = db.tunables();

    let pawns = pos.piece_count(side, PieceKind::Pawn).min(8) as usize;
    let knights = i32::from(pos.piece_count(side, PieceKind::Knight));
    let bishops = i32::from(pos.piece_count(side, PieceKind::Bishop));
    let rooks = i32::from(pos.piece_count(side, PieceKind::Rook));

    let mut s = 0;

    if bishops >= 2 {
        s += t.bishop_pair;
    }
    if knights >= 2 {
        s += t.knight_pair;
    }
    if rooks >= 2 {
        s += t.rook_pair;
    }

    s += knights * t.knight_pawn_adj[pawns];
    s += rooks * t.rook_pawn_adj[pawns];

    s
}

#[cfg(test)]
mod tests {
    use super::combinations;
    use crate::eval::params::{Parameters, Tunables};
    use scacchi_core::{Color, Position};

    fn db() -> Parameters {
        Parameters::new(Tunables::default())
    }

    #[test]
    fn bishop_pair_beats_single_bishop() {
        let db = db();
        let pair: Position = "4k3/8/8/8/8/8/8/2B1KB2 w - -".parse().unwrap();
        let single: Position = "4k3/8/8/8/8/8/8/2B1K3 w - -".parse().unwrap();
        assert!(
            combinations(&pair, Color::White, &db) > combinations(&single, Color::White, &db)
        );
    }

    #[test]
    fn knights_like_pawns_rooks_do_not() {
        let db = db();
        let many: Position = "4k3/8/8/8/8/8/PPPPPPPP/1N2K2R w - -".parse().unwrap();
        let few: Position = "4k3/8/8/8/8/8/8/1N2K2R w - -".parse().unwrap();
        let t = db.tunables();

        // Knight correction rises with pawns, rook correction falls.
        assert!(t.knight_pawn_adj[8] > t.knight_pawn_adj[0]);
        assert!(t.rook_pawn_adj[8] < t.rook_pawn_adj[0]);

        // With one knight and one rook each, the totals differ by the two
        // corrections.
        let with = combinations(&many, Color::White, &db);
        let without = combinations(&few, Color::White, &db);
        assert_eq!(
            with - without,
            t.knight_pawn_adj[8] - t.knight_pawn_adj[0] + t.rook_pawn_adj[8]
                - t.rook_pawn_adj[0]
        );
    }
}
