//! The "mailbox" board augmentation: a 10x12 virtual grid whose two-row
//! border turns off-board arithmetic into a constant-time table lookup.
//!
//! A knight moves up to two ranks or files in one step, which is why the
//! border must be two squares deep on top and bottom; left and right get
//! away with one column because the rightmost spill lands in the leftmost
//! border cell of the next row.

use crate::square::Square;

const INVALID: i8 = -1;

/// Maps 120-cell indices back to real squares; `-1` marks the border.
#[rustfmt::skip]
const MAILBOX: [i8; 120] = [
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1,  0,  1,  2,  3,  4,  5,  6,  7, -1,
    -1,  8,  9, 10, 11, 12, 13, 14, 15, -1,
    -1, 16, 17, 18, 19, 20, 21, 22, 23, -1,
    -1, 24, 25, 26, 27, 28, 29, 30, 31, -1,
    -1, 32, 33, 34, 35, 36, 37, 38, 39, -1,
    -1, 40, 41, 42, 43, 44, 45, 46, 47, -1,
    -1, 48, 49, 50, 51, 52, 53, 54, 55, -1,
    -1, 56, 57, 58, 59, 60, 61, 62, 63, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
];

/// Maps each real square to its 120-cell index.
#[rustfmt::skip]
const MAILBOX64: [u8; 64] = [
    21, 22, 23, 24, 25, 26, 27, 28,
    31, 32, 33, 34, 35, 36, 37, 38,
    41, 42, 43, 44, 45, 46, 47, 48,
    51, 52, 53, 54, 55, 56, 57, 58,
    61, 62, 63, 64, 65, 66, 67, 68,
    71, 72, 73, 74, 75, 76, 77, 78,
    81, 82, 83, 84, 85, 86, 87, 88,
    91, 92, 93, 94, 95, 96, 97, 98,
];

/// Apply a mailbox delta to a square. `None` when the step leaves the board.
#[inline]
pub(crate) fn step(from: Square, delta: i8) -> Option<Square> {
    let i = MAILBOX64[from.index()] as i16 + delta as i16;
    debug_assert!((0..120).contains(&i));
    let sq = MAILBOX[i as usize];
    if sq == INVALID {
        None
    } else {
        Square::from_index(sq as u8)
    }
}
