//! Search scores.
//!
//! The unit is the centipawn. A fixed-point integer keeps every piece
//! value and positional term on one scale with enough granularity for
//! positional play.

/// Centipawn score, from the side to move's point of view.
pub type Score = i32;

/// Unreachable bound; no real score ever equals it.
pub const INF: Score = 32_000;

/// Scores at or beyond this magnitude encode a forced mate; the offset
/// from `INF` is the distance in plies.
pub const MATE: Score = 31_000;

/// `true` when the score encodes a mate for either side.
#[inline]
pub fn is_mate(s: Score) -> bool {
    s.abs() >= MATE
}

#[cfg(test)]
mod tests {
    use super::{is_mate, INF, MATE};

    #[test]
    fn mate_band() {
        assert!(is_mate(MATE));
        assert!(is_mate(-MATE));
        assert!(is_mate(-INF + 3));
        assert!(!is_mate(MATE - 1));
        assert!(!is_mate(0));
    }
}
