use crate::bitboard::Bitboard;
use crate::types::{CastlingSide, Color, Coord};

/// Squares between the king and the rook, which must be empty
#[inline]
pub const fn path(c: Color, s: CastlingSide) -> Bitboard {
    let x: u64 = match s {
        CastlingSide::King => 0x60,
        CastlingSide::Queen => 0x0e,
    };
    Bitboard::from_raw(match c {
        Color::White => x,
        Color::Black => x << 56,
    })
}

/// Squares the king stands on or crosses, which must not be attacked
#[inline]
pub const fn pass(c: Color, s: CastlingSide) -> Bitboard {
    let x: u64 = match s {
        CastlingSide::King => 0x70,
        CastlingSide::Queen => 0x1c,
    };
    Bitboard::from_raw(match c {
        Color::White => x,
        Color::Black => x << 56,
    })
}

/// Rook source and destination squares for the given castling
#[inline]
pub const fn rook_move(c: Color, s: CastlingSide) -> (Coord, Coord) {
    let base = match c {
        Color::White => 0,
        Color::Black => 56,
    };
    match s {
        CastlingSide::King => (Coord::from_index(base + 7), Coord::from_index(base + 5)),
        CastlingSide::Queen => (Coord::from_index(base), Coord::from_index(base + 3)),
    }
}

/// Castling rights kept after a piece leaves or enters a square
///
/// Touching a king's home square drops both rights of that color, touching a rook's
/// home square drops the matching side.
pub const RIGHTS_MASK: [u8; 64] = {
    let mut res = [0b1111_u8; 64];
    res[0] = 0b1101;
    res[4] = 0b1100;
    res[7] = 0b1110;
    res[56] = 0b0111;
    res[60] = 0b0011;
    res[63] = 0b1011;
    res
};

#[inline]
pub fn rights_mask(c: Coord) -> u8 {
    unsafe { *RIGHTS_MASK.get_unchecked(c.index()) }
}
