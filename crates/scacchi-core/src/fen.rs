//! FEN (Forsyth-Edwards Notation) parsing.
//!
//! `<FEN> ::= <placement> ' ' <side> ' ' <castling> ' ' <ep target>
//!            [' ' <half-move clock> [' ' <full-move counter>]]`
//!
//! The last two fields are optional; the full-move counter is ignored.

use std::str::FromStr;

use crate::castle_rights::CastleRights;
use crate::error::FenError;
use crate::piece::Piece;
use crate::position::Position;
use crate::square::Square;

/// The FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -";

impl FromStr for Position {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<Position, FenError> {
        let mut fields = fen.split_whitespace();
        let mut pos = Position::empty();

        // Board: squares arrive in index order (a8 first), `/` is noise,
        // digits skip empty squares.
        let board = fields.next().ok_or(FenError::MissingField { field: "board" })?;
        let mut i: usize = 0;
        for c in board.chars() {
            match c {
                '/' => continue,
                '1'..='8' => {
                    i += c as usize - '0' as usize;
                }
                _ => {
                    let piece = Piece::from_letter(c)
                        .ok_or(FenError::InvalidPieceChar { character: c })?;
                    let sq = Square::from_index(i as u8).ok_or(FenError::BoardOverflow)?;
                    pos.fill_square(piece, sq);
                    i += 1;
                }
            }
            if i > 64 {
                return Err(FenError::BoardOverflow);
            }
        }

        // Side to move.
        let side = fields.next().ok_or(FenError::MissingField { field: "side" })?;
        match side {
            "w" => {}
            "b" => pos.switch_side(),
            other => {
                return Err(FenError::InvalidSide {
                    found: other.to_string(),
                })
            }
        }

        // Castling rights.
        let castling = fields
            .next()
            .ok_or(FenError::MissingField { field: "castling" })?;
        let rights = CastleRights::from_fen(castling).ok_or_else(|| FenError::InvalidCastling {
            found: castling.to_string(),
        })?;
        pos.set_castle(rights);

        // En-passant target; only rank-3/6 squares qualify.
        let ep = fields
            .next()
            .ok_or(FenError::MissingField { field: "en passant" })?;
        if ep != "-" {
            if let Some(sq) = Square::from_algebraic(ep) {
                if sq.rank() == 2 || sq.rank() == 5 {
                    pos.set_en_passant(sq);
                }
            }
        }

        // Optional half-move clock; the full-move counter is ignored.
        if let Some(half) = fields.next() {
            let fifty = half.parse::<u32>().map_err(|_| FenError::InvalidCounter {
                found: half.to_string(),
            })?;
            pos.set_fifty(fifty);
        }

        pos.rebuild_hash();
        Ok(pos)
    }
}
