//! Attack lookups for every piece kind
//!
//! Knights, kings and pawns use per-square tables. Sliders use magic bitboards: the
//! blockers relevant to a square are multiplied by a per-square constant, and the top
//! bits of the product index a dense table of attack sets. All tables are generated by
//! the build script and are read-only.

use crate::bitboard::Bitboard;
use crate::types::{Color, Coord};

#[inline]
const fn bb(val: u64) -> Bitboard {
    Bitboard::from_raw(val)
}

include!(concat!(env!("OUT_DIR"), "/near_attacks.rs"));

struct MagicEntry {
    mask: Bitboard,
    magic: u64,
    shift: u32,
    offset: usize,
}

impl MagicEntry {
    #[inline]
    fn index(&self, occupied: Bitboard) -> usize {
        self.offset + ((occupied & self.mask).as_raw().wrapping_mul(self.magic) >> self.shift) as usize
    }
}

include!(concat!(env!("OUT_DIR"), "/magic.rs"));

#[inline]
pub fn king(coord: Coord) -> Bitboard {
    unsafe { *KING_ATTACKS.get_unchecked(coord.index()) }
}

#[inline]
pub fn knight(coord: Coord) -> Bitboard {
    unsafe { *KNIGHT_ATTACKS.get_unchecked(coord.index()) }
}

/// Squares attacked by a pawn of color `color` standing on `coord`
#[inline]
pub fn pawn(color: Color, coord: Coord) -> Bitboard {
    match color {
        Color::White => unsafe { *WHITE_PAWN_ATTACKS.get_unchecked(coord.index()) },
        Color::Black => unsafe { *BLACK_PAWN_ATTACKS.get_unchecked(coord.index()) },
    }
}

#[inline]
pub fn rook(coord: Coord, occupied: Bitboard) -> Bitboard {
    // Each square owns `1 << (64 - shift)` slots starting at `offset`, so the index is in range
    unsafe {
        let entry = MAGIC_ROOK.get_unchecked(coord.index());
        *MAGIC_LOOKUP_ROOK.get_unchecked(entry.index(occupied))
    }
}

#[inline]
pub fn bishop(coord: Coord, occupied: Bitboard) -> Bitboard {
    unsafe {
        let entry = MAGIC_BISHOP.get_unchecked(coord.index());
        *MAGIC_LOOKUP_BISHOP.get_unchecked(entry.index(occupied))
    }
}

#[inline]
pub fn queen(coord: Coord, occupied: Bitboard) -> Bitboard {
    rook(coord, occupied) | bishop(coord, occupied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{File, Rank};
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    fn ray_cast(c: Coord, occupied: Bitboard, dirs: &[(isize, isize)]) -> Bitboard {
        let mut res = Bitboard::EMPTY;
        for &(df, dr) in dirs {
            let mut p = c;
            while let Some(np) = p.shift(df, dr) {
                res.set(np);
                if occupied.has(np) {
                    break;
                }
                p = np;
            }
        }
        res
    }

    const ROOK_DIRS: [(isize, isize); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
    const BISHOP_DIRS: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

    #[test]
    fn test_sliders_match_ray_cast() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for i in 0..12_000 {
            // Vary density so that both crowded and open boards get sampled
            let occupied = match i % 3 {
                0 => Bitboard::from_raw(rng.gen::<u64>()),
                1 => Bitboard::from_raw(rng.gen::<u64>() & rng.gen::<u64>()),
                _ => Bitboard::from_raw(rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>()),
            };
            for c in Coord::iter() {
                assert_eq!(rook(c, occupied), ray_cast(c, occupied, &ROOK_DIRS));
                assert_eq!(bishop(c, occupied), ray_cast(c, occupied, &BISHOP_DIRS));
            }
        }
    }

    #[test]
    fn test_empty_board() {
        for c in Coord::iter() {
            assert_eq!(rook(c, Bitboard::EMPTY).len(), 14);
            assert_eq!(
                queen(c, Bitboard::EMPTY),
                ray_cast(c, Bitboard::EMPTY, &ROOK_DIRS) | ray_cast(c, Bitboard::EMPTY, &BISHOP_DIRS)
            );
        }
    }

    #[test]
    fn test_near() {
        let a1 = Coord::from_parts(File::A, Rank::R1);
        let e4 = Coord::from_parts(File::E, Rank::R4);
        assert_eq!(king(a1).len(), 3);
        assert_eq!(king(e4).len(), 8);
        assert_eq!(knight(a1).len(), 2);
        assert_eq!(knight(e4).len(), 8);
        assert_eq!(
            pawn(Color::White, e4),
            Bitboard::EMPTY
                .with(Coord::from_parts(File::D, Rank::R5))
                .with(Coord::from_parts(File::F, Rank::R5))
        );
        assert_eq!(
            pawn(Color::Black, a1.add(8)),
            Bitboard::from_coord(Coord::from_parts(File::B, Rank::R1))
        );
    }
}
