//! Errors reported by the core parsing boundaries.

/// Errors raised while parsing a FEN description.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FenError {
    /// The description ran out of fields before the en-passant entry.
    #[error("missing FEN field: {field}")]
    MissingField { field: &'static str },

    /// A character in the board field is neither a piece nor a skip digit.
    #[error("invalid character in FEN board: {character:?}")]
    InvalidPieceChar { character: char },

    /// The board field describes more than 64 squares.
    #[error("FEN board overflows the 64 squares")]
    BoardOverflow,

    /// The side-to-move field is neither `w` nor `b`.
    #[error("invalid side to move: {found:?}")]
    InvalidSide { found: String },

    /// The castling field holds letters outside `KQkq`.
    #[error("invalid castling field: {found:?}")]
    InvalidCastling { found: String },

    /// The half-move counter is not a number.
    #[error("invalid half-move counter: {found:?}")]
    InvalidCounter { found: String },
}
