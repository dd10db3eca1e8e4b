//! Move generation and attack detection.
//!
//! Pseudo-legal moves are produced piece by piece and filtered through
//! `make_move` on a scratch copy, so every move handed out is fully legal.
//! The same `for_*` walkers back `moves`, `captures`, and `is_legal`,
//! which keeps the three views consistent by construction.

use crate::chess_move::Move;
use crate::color::Color;
use crate::mailbox;
use crate::piece::{Piece, PieceKind};
use crate::position::Position;
use crate::square::{step_fwd, Square};

/// Emit a pawn move, fanning out into the four promotions when the
/// destination is a back rank.
fn emit_pawn<F: FnMut(Square, Square, u16)>(f: &mut F, from: Square, to: Square, flags: u16) {
    if to.rank() == 0 || to.rank() == 7 {
        for kind in [
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Rook,
            PieceKind::Queen,
        ] {
            f(from, to, flags | Move::promotion_flag(kind));
        }
    } else {
        f(from, to, flags);
    }
}

impl Position {
    /// Walk the diagonal pawn captures from `from`.
    fn for_pawn_captures<F: FnMut(Square, Square, u16)>(&self, f: &mut F, from: Square) {
        debug_assert_eq!(self[from], Piece::new(self.side(), PieceKind::Pawn));

        for &delta in self[from].offsets() {
            if let Some(to) = mailbox::step(from, delta) {
                if self[to].color() == Some(!self.side()) {
                    emit_pawn(f, from, to, Move::PAWN | Move::CAPTURE);
                }
            }
        }
    }

    /// Walk the en-passant capture(s) onto the current target square.
    fn for_en_passant<F: FnMut(Square, Square, u16)>(&self, f: &mut F) {
        let Some(ep) = self.en_passant() else {
            return;
        };

        let own_pawn = Piece::new(self.side(), PieceKind::Pawn);
        for &delta in own_pawn.offsets() {
            if let Some(from) = mailbox::step(ep, -delta) {
                if self[from] == own_pawn {
                    f(from, ep, Move::PAWN | Move::CAPTURE | Move::EN_PASSANT);
                }
            }
        }
    }

    /// Walk every move of the piece standing on `from` (castling and en
    /// passant excluded; those have their own walkers).
    fn for_piece_moves<F: FnMut(Square, Square, u16)>(&self, f: &mut F, from: Square) {
        debug_assert_eq!(self[from].color(), Some(self.side()));
        let p = self[from];

        if p.kind() == Some(PieceKind::Pawn) {
            self.for_pawn_captures(f, from);

            // Single push, and the double push from the second rank.
            if let Some(to) = from.offset(step_fwd(self.side())) {
                if !self[to].is_piece() {
                    emit_pawn(f, from, to, Move::PAWN);

                    if from.relative_rank(self.side()) == 1 {
                        if let Some(to2) = to.offset(step_fwd(self.side())) {
                            if !self[to2].is_piece() {
                                f(from, to2, Move::PAWN | Move::TWO_SQUARES);
                            }
                        }
                    }
                }
            }
        } else {
            let slides = p.kind().is_some_and(PieceKind::slides);
            for &delta in p.offsets() {
                let mut cur = mailbox::step(from, delta);
                while let Some(to) = cur {
                    if self[to].is_piece() {
                        if self[to].color() == Some(!self.side()) {
                            f(from, to, Move::CAPTURE);
                        }
                        break;
                    }
                    f(from, to, 0);
                    if !slides {
                        break;
                    }
                    cur = mailbox::step(to, delta);
                }
            }
        }
    }

    /// Walk the castling king moves still allowed by rights and empty
    /// squares. Attack checks on the king's path happen in `make_move`.
    fn for_castles<F: FnMut(Square, Square, u16)>(&self, f: &mut F) {
        use crate::castle_rights::CastleRights;

        let empty = |sq: Square| !self[sq].is_piece();

        if self.side() == Color::White {
            if self.castle().has(CastleRights::WHITE_KINGSIDE)
                && empty(Square::F1)
                && empty(Square::G1)
            {
                f(Square::E1, Square::G1, Move::CASTLE);
            }
            if self.castle().has(CastleRights::WHITE_QUEENSIDE)
                && empty(Square::B1)
                && empty(Square::C1)
                && empty(Square::D1)
            {
                f(Square::E1, Square::C1, Move::CASTLE);
            }
        } else {
            if self.castle().has(CastleRights::BLACK_KINGSIDE)
                && empty(Square::F8)
                && empty(Square::G8)
            {
                f(Square::E8, Square::G8, Move::CASTLE);
            }
            if self.castle().has(CastleRights::BLACK_QUEENSIDE)
                && empty(Square::B8)
                && empty(Square::C8)
                && empty(Square::D8)
            {
                f(Square::E8, Square::C8, Move::CASTLE);
            }
        }
    }

    /// Push the move when it survives the make-move legality check.
    fn add_legal(&self, list: &mut Vec<Move>, from: Square, to: Square, flags: u16) {
        let m = Move::new(from, to, flags);
        let mut s1 = self.clone();
        if s1.make_move(m) {
            list.push(m);
        }
    }

    /// Every legal move in this position.
    pub fn moves(&self) -> Vec<Move> {
        // 218 moves is the known pathological maximum; a standard game
        // rarely exceeds 70.
        let mut ret = Vec::with_capacity(80);

        {
            let mut add =
                |from: Square, to: Square, flags: u16| self.add_legal(&mut ret, from, to, flags);

            for from in Square::all() {
                if self[from].color() == Some(self.side()) {
                    self.for_piece_moves(&mut add, from);
                }
            }

            self.for_castles(&mut add);
            self.for_en_passant(&mut add);
        }

        ret
    }

    /// The capture-and-promotion subset used by quiescence search.
    pub fn captures(&self) -> Vec<Move> {
        let mut ret = Vec::with_capacity(40);

        {
            let mut add =
                |from: Square, to: Square, flags: u16| self.add_legal(&mut ret, from, to, flags);

            for from in Square::all() {
                let p = self[from];
                if p.color() != Some(self.side()) {
                    continue;
                }

                if p.kind() == Some(PieceKind::Pawn) {
                    self.for_pawn_captures(&mut add, from);

                    // Quiet promotions are tactical too.
                    if from.relative_rank(self.side()) == 6 {
                        if let Some(to) = from.offset(step_fwd(self.side())) {
                            if !self[to].is_piece() {
                                emit_pawn(&mut add, from, to, Move::PAWN);
                            }
                        }
                    }
                } else {
                    let slides = p.kind().is_some_and(PieceKind::slides);
                    for &delta in p.offsets() {
                        let mut cur = mailbox::step(from, delta);
                        while let Some(to) = cur {
                            if self[to].is_piece() {
                                if self[to].color() == Some(!self.side()) {
                                    add(from, to, Move::CAPTURE);
                                }
                                break;
                            }
                            if !slides {
                                break;
                            }
                            cur = mailbox::step(to, delta);
                        }
                    }
                }
            }

            self.for_en_passant(&mut add);
        }

        ret
    }

    /// `true` when `m` — from, to, and flags exactly — is a legal move
    /// here. Reuses the generation walkers rather than re-deriving the
    /// rules.
    pub fn is_legal(&self, m: Move) -> bool {
        if m.is_sentry() {
            return false;
        }
        if self[m.from].color() != Some(self.side()) {
            return false;
        }

        let mut found = false;
        {
            let mut find = |from: Square, to: Square, flags: u16| {
                if from == m.from && to == m.to && flags == m.flags {
                    found = true;
                }
            };

            if m.flags & (Move::EN_PASSANT | Move::CASTLE) == 0 {
                self.for_piece_moves(&mut find, m.from);
            } else if m.flags & Move::CASTLE != 0 {
                self.for_castles(&mut find);
            } else {
                self.for_en_passant(&mut find);
            }
        }

        if !found {
            return false;
        }

        let mut s1 = self.clone();
        s1.make_move(m)
    }

    /// `true` if `attacker` attacks `target`.
    pub fn attack(&self, target: Square, attacker: Color) -> bool {
        // Leapers probe outward from the target; using the offsets of the
        // opposite-colored pawn flips the capture direction correctly.
        for kind in [PieceKind::Pawn, PieceKind::King, PieceKind::Knight] {
            let probe = Piece::new(!attacker, kind);
            let wanted = Piece::new(attacker, kind);
            for &delta in probe.offsets() {
                if let Some(from) = mailbox::step(target, delta) {
                    if self[from] == wanted {
                        return true;
                    }
                }
            }
        }

        // Bishop and rook rays; queens answer on both.
        for kind in [PieceKind::Bishop, PieceKind::Rook] {
            let wanted = Piece::new(attacker, kind);
            let queen = Piece::new(attacker, PieceKind::Queen);
            for &delta in wanted.offsets() {
                let mut cur = mailbox::step(target, delta);
                while let Some(from) = cur {
                    let p = self[from];
                    if p == wanted || p == queen {
                        return true;
                    }
                    if p.is_piece() {
                        break;
                    }
                    cur = mailbox::step(from, delta);
                }
            }
        }

        false
    }

    /// `true` if the given color's king is attacked.
    #[inline]
    pub fn in_check(&self, c: Color) -> bool {
        self.attack(self.king_square(c), !c)
    }
}
