//! Zobrist keys, generated by the build script from a fixed seed
//!
//! A position hash XORs the keys of every occupied square, the castling rights, the en
//! passant file if any and [`MOVE_SIDE`] when Black is to move.

use crate::types::{CastlingRights, Cell, Coord, File};

include!(concat!(env!("OUT_DIR"), "/zobrist.rs"));

/// Key for `cell` standing on `coord`; zero for an empty cell
#[inline]
pub fn pieces(cell: Cell, coord: Coord) -> u64 {
    unsafe {
        *PIECES
            .get_unchecked(cell.index())
            .get_unchecked(coord.index())
    }
}

#[inline]
pub fn enpassant(file: File) -> u64 {
    unsafe { *ENPASSANT.get_unchecked(file.index()) }
}

#[inline]
pub fn castling(rights: CastlingRights) -> u64 {
    unsafe { *CASTLING.get_unchecked(rights.index()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, Piece};
    use std::collections::HashSet;

    #[test]
    fn test_keys_distinct() {
        let mut keys = HashSet::new();
        for coord in Coord::iter() {
            assert_eq!(pieces(Cell::EMPTY, coord), 0);
            for color in [Color::White, Color::Black] {
                for piece in Piece::iter() {
                    assert!(keys.insert(pieces(Cell::from_parts(color, piece), coord)));
                }
            }
        }
        for file in File::iter() {
            assert!(keys.insert(enpassant(file)));
        }
        assert_eq!(castling(CastlingRights::EMPTY), 0);
        for idx in 1..16 {
            assert!(keys.insert(castling(CastlingRights::from_index(idx))));
        }
        assert!(keys.insert(MOVE_SIDE));
        assert!(!keys.contains(&0));
    }
}
