//! Core chess types: board representation, move generation, and game rules.

mod castle_rights;
mod chess_move;
mod color;
mod error;
mod fen;
mod mailbox;
mod movegen;
mod piece;
mod position;
mod square;

pub mod perft;
pub mod san;
pub mod zobrist;

pub use castle_rights::CastleRights;
pub use chess_move::Move;
pub use color::Color;
pub use error::FenError;
pub use fen::STARTING_FEN;
pub use piece::{Piece, PieceKind};
pub use position::{GameKind, Position};
pub use square::{step_fwd, Square};
