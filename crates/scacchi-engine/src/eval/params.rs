//! Evaluation parameters: the tunable profile set, its JSON persistence,
//! and the process-wide read-only instance.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use scacchi_core::{Piece, Square};

use crate::eval::pcsq;
use crate::score::Score;

/// Default parameter file, looked up in the working directory.
pub const PARAMS_FILE: &str = "scacchi.json";

/// The tunable evaluation profile. Piece-square tables are derived from a
/// narrow set of base curves, multipliers, and weights instead of being
/// tuned cell by cell; the remaining terms feed the material and pawn
/// passes directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    // Base curves. File/centre curves are folded (index 0 = edge,
    // 3 = centre); rank curves run 0 = White's back row.
    pub pawn_file_base: [i32; 4],
    pub knight_centre_base: [i32; 4],
    pub knight_rank_base: [i32; 8],
    pub bishop_centre_base: [i32; 4],
    pub rook_file_base: [i32; 4],
    pub queen_centre_base: [i32; 4],
    pub king_centre_base: [i32; 4],
    pub king_file_base: [i32; 4],
    pub king_rank_base: [i32; 8],

    // Multipliers (`_m` middlegame, `_e` endgame).
    pub pawn_file_mult_m: i32,
    pub knight_centre_mult_e: i32,
    pub knight_centre_mult_m: i32,
    pub knight_rank_mult_m: i32,
    pub bishop_centre_mult_e: i32,
    pub bishop_centre_mult_m: i32,
    pub rook_file_mult_m: i32,
    pub queen_centre_mult_e: i32,
    pub queen_centre_mult_m: i32,
    pub king_centre_mult_e: i32,
    pub king_file_mult_m: i32,
    pub king_rank_mult_m: i32,

    // Flat square corrections (middlegame).
    pub knight_backrank_base_m: i32,
    pub knight_trapped_base_m: i32,
    pub bishop_backrank_base_m: i32,
    pub bishop_diagonal_base_m: i32,
    pub queen_backrank_base_m: i32,

    // Percent weights blending the table families.
    pub pawn_weight: i32,
    pub piece_weight: i32,
    pub king_weight: i32,

    // Material combinations.
    pub bishop_pair: i32,
    pub knight_pair: i32,
    pub rook_pair: i32,
    /// Knight value correction indexed by own pawn count 0..=8.
    pub knight_pawn_adj: [i32; 9],
    /// Rook value correction indexed by own pawn count 0..=8.
    pub rook_pawn_adj: [i32; 9],

    // Pawn structure, indexed by side-relative rank / file.
    pub passed_pawn_bonus: [i32; 8],
    pub doubled_pawn_penalty: i32,
    pub weak_pawn_file_penalty: [i32; 8],
    pub weak_pawn_open_file_extra: i32,

    // King shield, per file.
    pub shield_second_rank: i32,
    pub shield_third_rank: i32,
}

impl Default for Tunables {
    fn default() -> Tunables {
        Tunables {
            pawn_file_base: [-3, -1, 0, 1],
            knight_centre_base: [-4, -2, 0, 1],
            knight_rank_base: [-2, -1, 0, 1, 2, 3, 2, 1],
            bishop_centre_base: [-3, -1, 0, 1],
            rook_file_base: [-2, -1, 0, 1],
            queen_centre_base: [-3, -1, 0, 1],
            king_centre_base: [-3, -1, 0, 1],
            king_file_base: [3, 4, 2, 0],
            king_rank_base: [1, 0, -2, -3, -4, -5, -6, -7],

            pawn_file_mult_m: 5,
            knight_centre_mult_e: 5,
            knight_centre_mult_m: 5,
            knight_rank_mult_m: 5,
            bishop_centre_mult_e: 3,
            bishop_centre_mult_m: 2,
            rook_file_mult_m: 3,
            queen_centre_mult_e: 4,
            queen_centre_mult_m: 1,
            king_centre_mult_e: 12,
            king_file_mult_m: 10,
            king_rank_mult_m: 10,

            knight_backrank_base_m: 0,
            knight_trapped_base_m: 100,
            bishop_backrank_base_m: 10,
            bishop_diagonal_base_m: 4,
            queen_backrank_base_m: 5,

            pawn_weight: 100,
            piece_weight: 100,
            king_weight: 100,

            bishop_pair: 30,
            knight_pair: -8,
            rook_pair: -16,
            knight_pawn_adj: [-20, -16, -12, -8, -4, 0, 4, 8, 12],
            rook_pawn_adj: [15, 12, 9, 6, 3, 0, -3, -6, -9],

            passed_pawn_bonus: [0, 10, 20, 40, 60, 90, 130, 0],
            doubled_pawn_penalty: 10,
            weak_pawn_file_penalty: [8, 10, 12, 12, 12, 12, 10, 8],
            weak_pawn_open_file_extra: 4,

            shield_second_rank: 10,
            shield_third_rank: 5,
        }
    }
}

impl Tunables {
    /// Clamp every term into its sane range. A hand-edited parameter file
    /// must not be able to wreck the arithmetic downstream.
    fn clamp(&mut self) {
        fn clamp_all(arr: &mut [i32], lo: i32, hi: i32) {
            for v in arr {
                *v = (*v).clamp(lo, hi);
            }
        }

        clamp_all(&mut self.pawn_file_base, -20, 20);
        clamp_all(&mut self.knight_centre_base, -20, 20);
        clamp_all(&mut self.knight_rank_base, -20, 20);
        clamp_all(&mut self.bishop_centre_base, -20, 20);
        clamp_all(&mut self.rook_file_base, -20, 20);
        clamp_all(&mut self.queen_centre_base, -20, 20);
        clamp_all(&mut self.king_centre_base, -20, 20);
        clamp_all(&mut self.king_file_base, -20, 20);
        clamp_all(&mut self.king_rank_base, -20, 20);

        self.pawn_file_mult_m = self.pawn_file_mult_m.clamp(1, 10);
        self.knight_centre_mult_e = self.knight_centre_mult_e.clamp(1, 10);
        self.knight_centre_mult_m = self.knight_centre_mult_m.clamp(1, 10);
        self.knight_rank_mult_m = self.knight_rank_mult_m.clamp(1, 10);
        self.bishop_centre_mult_e = self.bishop_centre_mult_e.clamp(1, 10);
        self.bishop_centre_mult_m = self.bishop_centre_mult_m.clamp(1, 10);
        self.rook_file_mult_m = self.rook_file_mult_m.clamp(1, 10);
        self.queen_centre_mult_e = self.queen_centre_mult_e.clamp(1, 10);
        self.queen_centre_mult_m = self.queen_centre_mult_m.clamp(1, 10);
        self.king_centre_mult_e = self.king_centre_mult_e.clamp(1, 20);
        self.king_file_mult_m = self.king_file_mult_m.clamp(1, 20);
        self.king_rank_mult_m = self.king_rank_mult_m.clamp(1, 20);

        self.knight_backrank_base_m = self.knight_backrank_base_m.clamp(0, 20);
        self.knight_trapped_base_m = self.knight_trapped_base_m.clamp(0, 120);
        self.bishop_backrank_base_m = self.bishop_backrank_base_m.clamp(0, 20);
        self.bishop_diagonal_base_m = self.bishop_diagonal_base_m.clamp(0, 20);
        self.queen_backrank_base_m = self.queen_backrank_base_m.clamp(0, 20);

        self.pawn_weight = self.pawn_weight.clamp(0, 200);
        self.piece_weight = self.piece_weight.clamp(0, 200);
        self.king_weight = self.king_weight.clamp(0, 200);

        self.bishop_pair = self.bishop_pair.clamp(-50, 50);
        self.knight_pair = self.knight_pair.clamp(-50, 50);
        self.rook_pair = self.rook_pair.clamp(-50, 50);
        clamp_all(&mut self.knight_pawn_adj, -50, 50);
        clamp_all(&mut self.rook_pawn_adj, -50, 50);

        clamp_all(&mut self.passed_pawn_bonus, 0, 200);
        self.doubled_pawn_penalty = self.doubled_pawn_penalty.clamp(0, 50);
        clamp_all(&mut self.weak_pawn_file_penalty, 0, 50);
        self.weak_pawn_open_file_extra = self.weak_pawn_open_file_extra.clamp(0, 50);

        self.shield_second_rank = self.shield_second_rank.clamp(0, 50);
        self.shield_third_rank = self.shield_third_rank.clamp(0, 50);
    }
}

/// The evaluation parameter block: the clamped tunables plus the derived
/// piece-square tables. Initialized once at startup, read-only afterward.
pub struct Parameters {
    tunables: Tunables,
    pcsq_m: [[Score; 64]; Piece::SUP_ID],
    pcsq_e: [[Score; 64]; Piece::SUP_ID],
}

static DB: OnceLock<Parameters> = OnceLock::new();

impl Parameters {
    /// Build a parameter block from a profile.
    pub fn new(mut tunables: Tunables) -> Parameters {
        tunables.clamp();
        let (pcsq_m, pcsq_e) = pcsq::build(&tunables);
        Parameters {
            tunables,
            pcsq_m,
            pcsq_e,
        }
    }

    /// The process-wide instance; built from defaults on first use unless
    /// [`Parameters::install`] ran earlier.
    pub fn global() -> &'static Parameters {
        DB.get_or_init(|| Parameters::new(Tunables::default()))
    }

    /// Install a profile as the process-wide instance. Returns `false`
    /// when the instance was already in use (the call is then a no-op:
    /// parameters never change mid-game).
    pub fn install(tunables: Tunables) -> bool {
        DB.set(Parameters::new(tunables)).is_ok()
    }

    /// Read a profile from a JSON file. `Ok(None)` when the file does not
    /// exist (defaults apply).
    pub fn load(path: &Path) -> anyhow::Result<Option<Tunables>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let tunables = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(tunables))
    }

    /// Write the current profile to a JSON file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let text = serde_json::to_string_pretty(&self.tunables)?;
        fs::write(path, text).with_context(|| format!("writing {}", path.display()))
    }

    /// Middlegame piece-square value.
    #[inline]
    pub fn pcsq_m(&self, p: Piece, sq: Square) -> Score {
        debug_assert!(p.is_piece());
        self.pcsq_m[p.id() as usize][sq.index()]
    }

    /// Endgame piece-square value.
    #[inline]
    pub fn pcsq_e(&self, p: Piece, sq: Square) -> Score {
        debug_assert!(p.is_piece());
        self.pcsq_e[p.id() as usize][sq.index()]
    }

    /// The clamped profile.
    #[inline]
    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }
}
