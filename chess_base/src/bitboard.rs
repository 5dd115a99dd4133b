//! Sets of squares packed into a `u64`

use crate::types::Coord;
use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use std::fmt;

/// Set of squares, bit `i` standing for [`Coord::from_index(i)`](Coord::from_index)
///
/// Iterating a bitboard yields its squares from a1 towards h8.
#[derive(
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
    Not,
)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const FULL: Bitboard = Bitboard(u64::MAX);

    #[inline]
    pub const fn from_raw(val: u64) -> Bitboard {
        Bitboard(val)
    }

    #[inline]
    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn from_coord(coord: Coord) -> Bitboard {
        Bitboard(1_u64 << coord.index())
    }

    #[inline]
    pub const fn with(self, coord: Coord) -> Bitboard {
        Bitboard(self.0 | Self::from_coord(coord).0)
    }

    #[inline]
    pub const fn without(self, coord: Coord) -> Bitboard {
        Bitboard(self.0 & !Self::from_coord(coord).0)
    }

    #[inline]
    pub fn set(&mut self, coord: Coord) {
        self.0 |= Self::from_coord(coord).0;
    }

    #[inline]
    pub fn unset(&mut self, coord: Coord) {
        self.0 &= !Self::from_coord(coord).0;
    }

    #[inline]
    pub const fn has(&self, coord: Coord) -> bool {
        (self.0 & Self::from_coord(coord).0) != 0
    }

    /// Moves every square `by` indices up, i.e. towards the 8th rank
    #[inline]
    pub const fn shl(self, by: usize) -> Bitboard {
        Bitboard(self.0 << by)
    }

    /// Moves every square `by` indices down, i.e. towards the 1st rank
    #[inline]
    pub const fn shr(self, by: usize) -> Bitboard {
        Bitboard(self.0 >> by)
    }

    /// Spreads the low bits of `x` over the squares of this set, lowest first
    ///
    /// Enumerating `x` from 0 to `2^len` yields every subset of the set exactly once,
    /// which is how the magic tables walk blocker configurations.
    pub fn deposit_bits(&self, mut x: u64) -> Bitboard {
        let mut res = 0;
        for coord in *self {
            if x == 0 {
                break;
            }
            if x & 1 != 0 {
                res |= 1_u64 << coord.index();
            }
            x >>= 1;
        }
        Bitboard(res)
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }

    /// Returns the lowest square, if any
    #[inline]
    pub fn first(&self) -> Option<Coord> {
        match self.0 {
            0 => None,
            v => Some(Coord::from_index(v.trailing_zeros() as usize)),
        }
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Bitboard({})", self)
    }
}

/// Ranks from the 8th down to the 1st, separated by `/`, files from a to h
impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in (0..8).rev() {
            let row = ((self.0 >> (rank * 8)) & 0xff) as u8;
            write!(f, "{:08b}", row.reverse_bits())?;
            if rank != 0 {
                write!(f, "/")?;
            }
        }
        Ok(())
    }
}

/// Iterator over the squares of a [`Bitboard`]
pub struct Iter(u64);

impl Iterator for Iter {
    type Item = Coord;

    #[inline]
    fn next(&mut self) -> Option<Coord> {
        if self.0 == 0 {
            return None;
        }
        let idx = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        // `idx` is below 64 since `self.0` is nonzero
        unsafe { Some(Coord::from_index_unchecked(idx)) }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Iter {}

impl IntoIterator for Bitboard {
    type Item = Coord;
    type IntoIter = Iter;

    #[inline]
    fn into_iter(self) -> Iter {
        Iter(self.0)
    }
}

impl FromIterator<Coord> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Bitboard {
        iter.into_iter().fold(Bitboard::EMPTY, Bitboard::with)
    }
}
