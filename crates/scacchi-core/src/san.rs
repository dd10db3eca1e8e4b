//! Standard Algebraic Notation parsing.
//!
//! Accepts castling (`O-O`, `O-O-O`) and the pattern
//! `<piece>?<file>?<rank>?x?<dest-file><dest-rank>(=<promotion>)?`.
//! Capture, check, mate, and annotation symbols are ignored. Returns the
//! sentry move when nothing legal matches.

use crate::chess_move::Move;
use crate::piece::PieceKind;
use crate::position::Position;
use crate::square::Square;

fn piece_from_letter(c: u8) -> Option<PieceKind> {
    match c {
        b'P' => Some(PieceKind::Pawn),
        b'N' => Some(PieceKind::Knight),
        b'B' => Some(PieceKind::Bishop),
        b'R' => Some(PieceKind::Rook),
        b'Q' => Some(PieceKind::Queen),
        b'K' => Some(PieceKind::King),
        _ => None,
    }
}

/// Parse `text` as a SAN move in `pos`.
pub fn parse(text: &str, pos: &Position) -> Move {
    let text: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '+' | '#' | '!' | '?' | 'x'))
        .collect();

    let moves = pos.moves();

    // Castling first; the file of the king's destination disambiguates.
    if text == "O-O" || text == "0-0" {
        return moves
            .iter()
            .find(|m| m.flags & Move::CASTLE != 0 && m.to.file() == 6)
            .copied()
            .unwrap_or_else(Move::sentry);
    }
    if text == "O-O-O" || text == "0-0-0" {
        return moves
            .iter()
            .find(|m| m.flags & Move::CASTLE != 0 && m.to.file() == 2)
            .copied()
            .unwrap_or_else(Move::sentry);
    }

    if !text.is_ascii() {
        return Move::sentry();
    }
    let mut bytes = text.as_bytes();

    // Promotion suffix.
    let mut promotion = None;
    if bytes.len() >= 2 && bytes[bytes.len() - 2] == b'=' {
        promotion = piece_from_letter(bytes[bytes.len() - 1]);
        match promotion {
            Some(PieceKind::Pawn) | Some(PieceKind::King) | None => return Move::sentry(),
            _ => {}
        }
        bytes = &bytes[..bytes.len() - 2];
    }

    // Destination square comes last.
    if bytes.len() < 2 {
        return Move::sentry();
    }
    let dest_str = std::str::from_utf8(&bytes[bytes.len() - 2..]).unwrap_or("");
    let Some(to) = Square::from_algebraic(dest_str) else {
        return Move::sentry();
    };
    bytes = &bytes[..bytes.len() - 2];

    // Leading piece letter, then optional disambiguation file/rank.
    let mut piece = PieceKind::Pawn;
    if let Some(&c) = bytes.first() {
        if let Some(kind) = piece_from_letter(c) {
            piece = kind;
            bytes = &bytes[1..];
        }
    }

    let mut from_file = None;
    let mut from_rank = None;
    for &c in bytes {
        match c {
            b'a'..=b'h' => from_file = Some(c - b'a'),
            b'1'..=b'8' => from_rank = Some(c - b'1'),
            _ => return Move::sentry(),
        }
    }

    for m in moves {
        if m.to == to
            && pos[m.from].kind() == Some(piece)
            && from_file.map_or(true, |f| m.from.file() == f)
            && from_rank.map_or(true, |r| m.from.rank() == r)
            && m.promote() == promotion
        {
            return m;
        }
    }

    Move::sentry()
}
