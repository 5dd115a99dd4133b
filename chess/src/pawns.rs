use crate::bitboard::Bitboard;
use crate::bitboard_consts;
use crate::types::{Color, File};

#[inline]
pub fn advance_forward(c: Color, b: Bitboard) -> Bitboard {
    match c {
        Color::White => b.shl(8),
        Color::Black => b.shr(8),
    }
}

/// Captures towards the a-file
#[inline]
pub fn advance_left(c: Color, b: Bitboard) -> Bitboard {
    let b = b & !bitboard_consts::file(File::A);
    match c {
        Color::White => b.shl(7),
        Color::Black => b.shr(9),
    }
}

/// Captures towards the h-file
#[inline]
pub fn advance_right(c: Color, b: Bitboard) -> Bitboard {
    let b = b & !bitboard_consts::file(File::H);
    match c {
        Color::White => b.shl(9),
        Color::Black => b.shr(7),
    }
}

/// Squares attacked by all the pawns in `b`
#[inline]
pub fn attacks(c: Color, b: Bitboard) -> Bitboard {
    advance_left(c, b) | advance_right(c, b)
}
