//! Perft: the canonical move-generation correctness drill.

use crate::position::Position;

/// Count leaf nodes at exactly `depth` plies. Depth 1 bulk-counts the
/// move list instead of recursing.
pub fn perft(pos: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = pos.moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for m in moves {
        nodes += perft(&pos.after_move(m), depth - 1);
    }
    nodes
}

/// Like [`perft`], but the leaves count only captures and promotions.
pub fn perft_captures(pos: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    if depth == 1 {
        return pos.captures().len() as u64;
    }

    let mut nodes = 0;
    for m in pos.moves() {
        nodes += perft_captures(&pos.after_move(m), depth - 1);
    }
    nodes
}

/// Per-root-move breakdown, for tracking a perft divergence down.
pub fn divide(pos: &Position, depth: u32) -> Vec<(String, u64)> {
    let mut results: Vec<(String, u64)> = pos
        .moves()
        .into_iter()
        .map(|m| {
            let count = if depth <= 1 {
                1
            } else {
                perft(&pos.after_move(m), depth - 1)
            };
            (format!("{m}"), count)
        })
        .collect();
    results.sort();
    results
}

#[cfg(test)]
mod tests {
    use super::{divide, perft, perft_captures};
    use crate::position::Position;

    fn pos(fen: &str) -> Position {
        fen.parse().unwrap()
    }

    // --- Starting position ---

    #[test]
    fn startpos_nodes() {
        let p = Position::startpos();
        assert_eq!(perft(&p, 1), 20);
        assert_eq!(perft(&p, 2), 400);
        assert_eq!(perft(&p, 3), 8_902);
        assert_eq!(perft(&p, 4), 197_281);
    }

    #[test]
    #[ignore] // slow
    fn startpos_nodes_depth_5() {
        assert_eq!(perft(&Position::startpos(), 5), 4_865_609);
    }

    #[test]
    fn startpos_captures() {
        let p = Position::startpos();
        assert_eq!(perft_captures(&p, 1), 0);
        assert_eq!(perft_captures(&p, 2), 0);
        assert_eq!(perft_captures(&p, 3), 34);
        assert_eq!(perft_captures(&p, 4), 1_576);
    }

    // --- Kiwipete (Peter McKenzie) ---

    fn kiwipete() -> Position {
        pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -")
    }

    #[test]
    fn kiwipete_nodes() {
        let p = kiwipete();
        assert_eq!(perft(&p, 1), 48);
        assert_eq!(perft(&p, 2), 2_039);
        assert_eq!(perft(&p, 3), 97_862);
    }

    #[test]
    #[ignore] // slow
    fn kiwipete_nodes_depth_4() {
        assert_eq!(perft(&kiwipete(), 4), 4_085_603);
    }

    #[test]
    fn kiwipete_captures() {
        let p = kiwipete();
        assert_eq!(perft_captures(&p, 1), 8);
        assert_eq!(perft_captures(&p, 2), 351);
        assert_eq!(perft_captures(&p, 3), 17_102);
    }

    // --- Rook endgame with en passant traps ---

    #[test]
    fn endgame_nodes_and_captures() {
        let p = pos("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -");
        assert_eq!(perft(&p, 1), 14);
        assert_eq!(perft(&p, 2), 191);
        assert_eq!(perft(&p, 3), 2_812);
        assert_eq!(perft(&p, 4), 43_238);
        assert_eq!(perft_captures(&p, 1), 1);
        assert_eq!(perft_captures(&p, 2), 14);
        assert_eq!(perft_captures(&p, 3), 209);
    }

    // --- Steven Edwards positions ---

    #[test]
    fn edwards_promotion_tangle() {
        let p = pos("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq -");
        assert_eq!(perft(&p, 1), 6);
        assert_eq!(perft(&p, 2), 264);
        assert_eq!(perft(&p, 3), 9_467);
        assert_eq!(perft_captures(&p, 1), 0);
        assert_eq!(perft_captures(&p, 2), 87);
        assert_eq!(perft_captures(&p, 3), 1_021);
    }

    #[test]
    fn underpromotion_position() {
        let p = pos("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8");
        assert_eq!(perft(&p, 1), 44);
        assert_eq!(perft(&p, 2), 1_486);
        assert_eq!(perft(&p, 3), 62_379);
    }

    #[test]
    fn symmetrical_middlegame() {
        let p = pos("r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10");
        assert_eq!(perft(&p, 1), 46);
        assert_eq!(perft(&p, 2), 2_079);
        assert_eq!(perft(&p, 3), 89_890);
    }

    // --- 218 legal moves (Scott Gasch) ---

    #[test]
    fn maximum_mobility() {
        let p = pos("3Q4/1Q4Q1/4Q3/2Q4R/Q4Q2/3Q4/1Q4Rp/1K1BBNNk w - -");
        assert_eq!(perft(&p, 1), 218);
    }

    #[test]
    fn divide_sums_to_perft() {
        let p = kiwipete();
        let parts = divide(&p, 3);
        assert_eq!(parts.len(), 48);
        let total: u64 = parts.iter().map(|(_, n)| n).sum();
        assert_eq!(total, perft(&p, 3));
    }

    #[test]
    fn hash_tree_consistency() {
        // The incrementally maintained hash matches a recompute at every
        // node of a shallow tree.
        fn walk(pos: &Position, depth: u32) {
            assert_eq!(pos.hash(), crate::zobrist::hash(pos));
            if depth == 0 {
                return;
            }
            for m in pos.moves() {
                walk(&pos.after_move(m), depth - 1);
            }
        }

        walk(&Position::startpos(), 3);
        walk(
            &pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -"),
            2,
        );
    }
}
