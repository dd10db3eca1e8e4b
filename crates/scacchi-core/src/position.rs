//! Position state: board, side to move, castling, en passant, fifty-move
//! counter, and the incrementally maintained zobrist hash.

use std::fmt;
use std::ops::Index;

use crate::castle_rights::CastleRights;
use crate::chess_move::Move;
use crate::color::Color;
use crate::piece::{Piece, PieceKind};
use crate::square::{step_fwd, Square};
use crate::zobrist;

/// Verdict of [`Position::mate_or_draw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    Standard,
    Mated,
    DrawStalemate,
    DrawRepetition,
    DrawFifty,
}

/// A chess position.
///
/// Positions are value objects: `after_move` copies, `make_move` mutates
/// in place and reports legality. The hash is kept in sync by
/// `fill_square` / `clear_square` / the side toggle, and must always
/// equal [`zobrist::hash`] recomputed from scratch.
///
/// `piece_cnt[color][kind]` counts pieces of that kind, except that the
/// king slot holds the king's square index instead of a count (there is
/// exactly one king per side).
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    board: [Piece; 64],
    stm: Color,
    castle: CastleRights,
    ep: Option<Square>,
    fifty: u32,
    hash: u64,
    piece_cnt: [[u8; 6]; 2],
}

impl Position {
    /// An empty board, White to move, no rights.
    pub fn empty() -> Position {
        Position {
            board: [Piece::EMPTY; 64],
            stm: Color::White,
            castle: CastleRights::NONE,
            ep: None,
            fifty: 0,
            hash: 0,
            piece_cnt: [[0; 6]; 2],
        }
    }

    /// The standard starting position.
    pub fn startpos() -> Position {
        use Piece as P;
        #[rustfmt::skip]
        const INIT: [Piece; 64] = [
            P::BLACK_ROOK, P::BLACK_KNIGHT, P::BLACK_BISHOP, P::BLACK_QUEEN,
            P::BLACK_KING, P::BLACK_BISHOP, P::BLACK_KNIGHT, P::BLACK_ROOK,
            P::BLACK_PAWN, P::BLACK_PAWN, P::BLACK_PAWN, P::BLACK_PAWN,
            P::BLACK_PAWN, P::BLACK_PAWN, P::BLACK_PAWN, P::BLACK_PAWN,
            P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY,
            P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY,
            P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY,
            P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY, P::EMPTY,
            P::WHITE_PAWN, P::WHITE_PAWN, P::WHITE_PAWN, P::WHITE_PAWN,
            P::WHITE_PAWN, P::WHITE_PAWN, P::WHITE_PAWN, P::WHITE_PAWN,
            P::WHITE_ROOK, P::WHITE_KNIGHT, P::WHITE_BISHOP, P::WHITE_QUEEN,
            P::WHITE_KING, P::WHITE_BISHOP, P::WHITE_KNIGHT, P::WHITE_ROOK,
        ];

        let mut pos = Position::empty();
        for sq in Square::all() {
            if INIT[sq.index()].is_piece() {
                pos.fill_square(INIT[sq.index()], sq);
            }
        }
        pos.castle = CastleRights::ALL;

        // fill_square already folded the piece keys; the remaining state
        // features go in via a full recompute.
        pos.hash = zobrist::hash(&pos);
        pos
    }

    /// Side to move.
    #[inline]
    pub fn side(&self) -> Color {
        self.stm
    }

    /// Castling rights.
    #[inline]
    pub fn castle(&self) -> CastleRights {
        self.castle
    }

    /// En-passant target square, if a double push just happened.
    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.ep
    }

    /// Fifty-move-rule half-move counter.
    #[inline]
    pub fn fifty(&self) -> u32 {
        self.fifty
    }

    /// Zobrist hash of the position.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// The king's square for the given color.
    #[inline]
    pub fn king_square(&self, c: Color) -> Square {
        let sq = Square::from_index(self.piece_cnt[c.index()][PieceKind::King.index()])
            .unwrap_or(Square::A8);
        debug_assert_eq!(self[sq], Piece::new(c, PieceKind::King));
        sq
    }

    /// Number of pieces of the given kind. Not meaningful for kings (that
    /// slot stores the king's square).
    #[inline]
    pub fn piece_count(&self, c: Color, kind: PieceKind) -> u8 {
        debug_assert_ne!(kind, PieceKind::King);
        self.piece_cnt[c.index()][kind.index()]
    }

    /// Toggle the side to move, keeping the hash consistent.
    pub fn switch_side(&mut self) {
        self.stm = !self.stm;
        self.hash ^= zobrist::SIDE;
    }

    // FEN-setup plumbing. The hash is rebuilt from scratch once every
    // field is in place.
    pub(crate) fn set_castle(&mut self, rights: CastleRights) {
        self.castle = rights;
    }

    pub(crate) fn set_en_passant(&mut self, sq: Square) {
        self.ep = Some(sq);
    }

    pub(crate) fn set_fifty(&mut self, fifty: u32) {
        self.fifty = fifty;
    }

    pub(crate) fn rebuild_hash(&mut self) {
        self.hash = zobrist::hash(self);
    }

    /// Erase the piece on a square, updating hash and piece counters.
    pub(crate) fn clear_square(&mut self, sq: Square) {
        let p = self.board[sq.index()];
        debug_assert!(p.is_piece());
        let (Some(c), Some(kind)) = (p.color(), p.kind()) else {
            return;
        };

        self.hash ^= zobrist::PIECE[p.id() as usize][sq.index()];
        self.board[sq.index()] = Piece::EMPTY;

        if kind != PieceKind::King {
            debug_assert!(self.piece_cnt[c.index()][kind.index()] > 0);
            self.piece_cnt[c.index()][kind.index()] -= 1;
        }
    }

    /// Place a piece on a square, updating hash, piece counters, and the
    /// king location.
    pub(crate) fn fill_square(&mut self, p: Piece, sq: Square) {
        debug_assert!(p.is_piece());
        debug_assert!(!self.board[sq.index()].is_piece());
        let (Some(c), Some(kind)) = (p.color(), p.kind()) else {
            return;
        };

        self.hash ^= zobrist::PIECE[p.id() as usize][sq.index()];
        self.board[sq.index()] = p;

        if kind == PieceKind::King {
            self.piece_cnt[c.index()][PieceKind::King.index()] = sq.index() as u8;
        } else {
            self.piece_cnt[c.index()][kind.index()] += 1;
        }
    }

    /// Functional update: the position after `m`. If `m` is illegal the
    /// result is unspecified but valid; callers use [`Position::make_move`]
    /// or the generated move lists when legality matters.
    pub fn after_move(&self, m: Move) -> Position {
        let mut after = self.clone();
        after.make_move(m);
        after
    }

    /// Make a move in place. Returns `false` (leaving the position in an
    /// unspecified valid state) when the move is illegal: a castle through
    /// attacked squares, or any move that leaves the mover's king exposed.
    pub fn make_move(&mut self, m: Move) -> bool {
        debug_assert!(!m.is_sentry());

        let xside = !self.stm;

        // A castle is tested for legality here rather than at generation
        // time; the rook moves now and the king through the usual move
        // code below.
        if m.flags & Move::CASTLE != 0 {
            if self.attack(m.from, xside) || self.attack(m.to, xside) {
                return false;
            }

            let (transit, rook_from, rook_to) = match m.to {
                Square::G1 => (Square::F1, Square::H1, Square::F1),
                Square::C1 => (Square::D1, Square::A1, Square::D1),
                Square::G8 => (Square::F8, Square::H8, Square::F8),
                _ => {
                    debug_assert_eq!(m.to, Square::C8);
                    (Square::D8, Square::A8, Square::D8)
                }
            };
            if self.attack(transit, xside) {
                return false;
            }

            let rook = self.board[rook_from.index()];
            self.clear_square(rook_from);
            self.fill_square(rook, rook_to);
        }

        // Castling rights never grow; fold the per-square clearing masks.
        if self.castle != CastleRights::NONE {
            self.hash ^= zobrist::CASTLE[self.castle.bits() as usize];
        }
        self.castle = self.castle.after_move(m.from, m.to);
        if self.castle != CastleRights::NONE {
            self.hash ^= zobrist::CASTLE[self.castle.bits() as usize];
        }

        // Any existing en-passant square expires; a double push sets a
        // fresh one on the row behind the pawn's destination.
        if let Some(ep) = self.ep.take() {
            self.hash ^= zobrist::EP_FILE[ep.file() as usize];
        }
        if m.flags & Move::TWO_SQUARES != 0 {
            if let Some(ep) = m.to.offset(-step_fwd(self.stm)) {
                self.ep = Some(ep);
                self.hash ^= zobrist::EP_FILE[ep.file() as usize];
            }
        }

        // Fifty-move counter resets on pawn moves and captures.
        if m.flags & (Move::PAWN | Move::CAPTURE) != 0 {
            self.fifty = 0;
        } else {
            self.fifty += 1;
        }

        // Move the piece; a promotion places the promoted piece, not a pawn.
        if self.board[m.to.index()].is_piece() {
            self.clear_square(m.to);
        }
        let p = match m.promote() {
            Some(kind) => Piece::new(self.stm, kind),
            None => self.board[m.from.index()],
        };
        self.clear_square(m.from);
        self.fill_square(p, m.to);

        // An en-passant capture removes the pawn one row behind the
        // destination.
        if m.flags & Move::EN_PASSANT != 0 {
            if let Some(victim) = m.to.offset(-step_fwd(self.stm)) {
                self.clear_square(victim);
            }
        }

        // Switch sides; the move was legal iff the mover did not leave
        // their own king attacked.
        self.stm = xside;
        self.hash ^= zobrist::SIDE;

        !self.in_check(!self.stm)
    }

    /// Classify the position: playable, mated, or drawn. `history` is the
    /// hash path from the game's start up to and including this position;
    /// without it repetition cannot be detected.
    pub fn mate_or_draw(&self, history: Option<&[u64]>) -> GameKind {
        if self.moves().is_empty() {
            return if self.in_check(self.stm) {
                GameKind::Mated
            } else {
                GameKind::DrawStalemate
            };
        }

        if self.fifty >= 100 {
            return GameKind::DrawFifty;
        }

        if let Some(history) = history {
            debug_assert_eq!(history.last(), Some(&self.hash));
            // Threefold: the current hash already occurred at least twice
            // before this node.
            let current = history.len().saturating_sub(1);
            let rep = history[..current]
                .iter()
                .filter(|&&h| h == self.hash)
                .count();
            if rep >= 2 {
                return GameKind::DrawRepetition;
            }
        }

        GameKind::Standard
    }

    /// Parse a coordinate-notation move (`e2e4`, `a7a8q`) against the
    /// legal moves of this position. Returns the sentry when the text is
    /// malformed or no legal move matches.
    pub fn parse_move(&self, s: &str) -> Move {
        if !s.is_ascii() || s.len() < 4 {
            return Move::sentry();
        }

        let (from, to) = match (
            Square::from_algebraic(&s[0..2]),
            Square::from_algebraic(&s[2..4]),
        ) {
            (Some(f), Some(t)) => (f, t),
            _ => return Move::sentry(),
        };

        let promotion = if s.len() > 4 {
            match s.as_bytes()[4].to_ascii_lowercase() {
                b'n' => Move::PROMOTION_N,
                b'b' => Move::PROMOTION_B,
                b'r' => Move::PROMOTION_R,
                _ => Move::PROMOTION_Q,
            }
        } else {
            0
        };

        for m in self.moves() {
            if m.from == from && m.to == to && (promotion == 0 || m.flags & promotion != 0) {
                return m;
            }
        }

        Move::sentry()
    }

    /// Vertical mirror with colors swapped: pieces flip across the
    /// rank-4/5 axis and change color, castling rights swap sides, the
    /// en-passant square mirrors, and the side to move toggles. Used to
    /// verify evaluation symmetry.
    pub fn color_flip(&self) -> Position {
        let mut ret = Position::empty();

        for sq in Square::all() {
            let p = self.board[sq.index()];
            if let (Some(c), Some(kind)) = (p.color(), p.kind()) {
                ret.fill_square(Piece::new(!c, kind), sq.flip());
            }
        }

        ret.stm = !self.stm;

        let mut bits = 0u8;
        if self.castle.has(CastleRights::WHITE_KINGSIDE) {
            bits |= CastleRights::BLACK_KINGSIDE;
        }
        if self.castle.has(CastleRights::WHITE_QUEENSIDE) {
            bits |= CastleRights::BLACK_QUEENSIDE;
        }
        if self.castle.has(CastleRights::BLACK_KINGSIDE) {
            bits |= CastleRights::WHITE_KINGSIDE;
        }
        if self.castle.has(CastleRights::BLACK_QUEENSIDE) {
            bits |= CastleRights::WHITE_QUEENSIDE;
        }
        ret.castle = CastleRights::from_bits(bits);

        ret.ep = self.ep.map(Square::flip);
        ret.fifty = self.fifty;
        ret.hash = zobrist::hash(&ret);

        ret
    }
}

impl Index<Square> for Position {
    type Output = Piece;

    #[inline]
    fn index(&self, sq: Square) -> &Piece {
        &self.board[sq.index()]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for sq in Square::all() {
            if sq.file() == 0 {
                write!(f, "{}", sq.rank() + 1)?;
            }
            write!(f, " {}", self.board[sq.index()].letter())?;
            if sq.file() == 7 {
                writeln!(f)?;
            }
        }
        write!(f, "\n  a b c d e f g h")
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{self}")?;
        write!(
            f,
            "{} {} ep={:?} fifty={} hash={:#018x}",
            self.stm, self.castle, self.ep, self.fifty, self.hash
        )
    }
}
