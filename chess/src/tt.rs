//! Transposition table
//!
//! A fixed array of slots indexed by the high bits of the Zobrist hash. Each slot
//! remembers the low 16 bits of the hash as a tag, so probes for a different
//! position sharing the slot miss instead of returning foreign data. Collisions on
//! the full (index, tag) pair are possible and accepted.

use crate::moves::Move;

/// How a stored score relates to the true score of the position
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bound {
    /// The search failed high, the true score is at least the stored one
    Lower,
    /// The score is exact
    Exact,
    /// The search failed low, the true score is at most the stored one
    Upper,
    /// Pinned entry that is never overwritten, used for repeated game positions
    Const,
}

const FLAG_MASK: u8 = 0xc0;
const DEPTH_MASK: u8 = 0x3f;

const FLAG_CONST: u8 = 0xc0;
const FLAG_UPPER: u8 = 0x80;
const FLAG_EXACT: u8 = 0x40;
const FLAG_LOWER: u8 = 0x00;

/// Depth recorded for pinned entries, deeper than any search goes
pub const PIN_DEPTH: u8 = 47;

pub const DEFAULT_INDEX_BITS: u32 = 22;

impl Bound {
    #[inline]
    fn flag(self) -> u8 {
        match self {
            Bound::Lower => FLAG_LOWER,
            Bound::Exact => FLAG_EXACT,
            Bound::Upper => FLAG_UPPER,
            Bound::Const => FLAG_CONST,
        }
    }

    #[inline]
    fn from_flag(info: u8) -> Bound {
        match info & FLAG_MASK {
            FLAG_CONST => Bound::Const,
            FLAG_UPPER => Bound::Upper,
            FLAG_EXACT => Bound::Exact,
            _ => Bound::Lower,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
struct Slot {
    tag: u16,
    mv: Move,
    score: i32,
    // Bound flag in the top two bits, depth in the rest. Zero marks an empty slot,
    // which is unambiguous as stored depths are at least one.
    info: u8,
}

/// Result of a successful probe
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Entry {
    pub mv: Move,
    pub score: i32,
    pub bound: Bound,
    pub depth: u8,
}

pub struct TranspositionTable {
    slots: Box<[Slot]>,
    shift: u32,
}

impl TranspositionTable {
    /// Creates a table of `2^index_bits` slots
    pub fn new(index_bits: u32) -> TranspositionTable {
        assert!((1..=32).contains(&index_bits), "bad table size");
        TranspositionTable {
            slots: vec![Slot::default(); 1 << index_bits].into_boxed_slice(),
            shift: 64 - index_bits,
        }
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key >> self.shift) as usize
    }

    #[inline]
    fn tag(key: u64) -> u16 {
        (key & 0xffff) as u16
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Records a search result, unless the slot holds a pinned entry
    ///
    /// `depth` must be in `1..=63`.
    pub fn store(&mut self, key: u64, mv: Move, score: i32, bound: Bound, depth: u8) {
        debug_assert!((1..=DEPTH_MASK).contains(&depth));
        debug_assert!(bound != Bound::Const);
        let idx = self.index(key);
        let slot = &mut self.slots[idx];
        if Bound::from_flag(slot.info) == Bound::Const {
            return;
        }
        *slot = Slot {
            tag: Self::tag(key),
            mv,
            score,
            info: bound.flag() | (depth & DEPTH_MASK),
        };
    }

    /// Pins a drawn position so that reaching it again scores zero
    pub fn pin(&mut self, key: u64) {
        let idx = self.index(key);
        self.slots[idx] = Slot {
            tag: Self::tag(key),
            mv: Move::NULL,
            score: 0,
            info: FLAG_CONST | PIN_DEPTH,
        };
    }

    pub fn probe(&self, key: u64) -> Option<Entry> {
        let slot = &self.slots[self.index(key)];
        if slot.info == 0 || slot.tag != Self::tag(key) {
            return None;
        }
        Some(Entry {
            mv: slot.mv,
            score: slot.score,
            bound: Bound::from_flag(slot.info),
            depth: slot.info & DEPTH_MASK,
        })
    }

    pub fn clear(&mut self) {
        self.slots.fill(Slot::default());
    }

    /// Share of occupied slots in a sample of the table, in per-mille
    pub fn fill_permille(&self) -> u32 {
        let sample = self.slots.len().min(1000);
        let used = self.slots[..sample].iter().filter(|s| s.info != 0).count();
        (used * 1000 / sample) as u32
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        TranspositionTable::new(DEFAULT_INDEX_BITS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn test_store_probe() {
        let mut tt = TranspositionTable::new(8);
        let b = Board::initial();
        let mv = Move::from_uci("e2e4", &b).unwrap();
        let key = b.zobrist_hash();

        assert_eq!(tt.probe(key), None);
        tt.store(key, mv, 35, Bound::Exact, 5);
        assert_eq!(
            tt.probe(key),
            Some(Entry {
                mv,
                score: 35,
                bound: Bound::Exact,
                depth: 5
            })
        );

        tt.store(key, mv, -20, Bound::Upper, 63);
        let e = tt.probe(key).unwrap();
        assert_eq!((e.score, e.bound, e.depth), (-20, Bound::Upper, 63));

        tt.store(key, mv, 100, Bound::Lower, 1);
        let e = tt.probe(key).unwrap();
        assert_eq!((e.score, e.bound, e.depth), (100, Bound::Lower, 1));
    }

    #[test]
    fn test_tag_mismatch() {
        let mut tt = TranspositionTable::new(8);
        let key = 0x1234_5678_9abc_def0;
        tt.store(key, Move::NULL, 7, Bound::Exact, 3);
        // Same slot, different tag
        assert_eq!(tt.probe(key ^ 1), None);
        assert!(tt.probe(key).is_some());
    }

    #[test]
    fn test_pin() {
        let mut tt = TranspositionTable::new(8);
        let key = 0xdead_beef_0000_0042;
        tt.store(key, Move::NULL, 500, Bound::Exact, 4);
        tt.pin(key);
        tt.store(key, Move::NULL, 300, Bound::Lower, 9);
        let e = tt.probe(key).unwrap();
        assert_eq!(e.bound, Bound::Const);
        assert_eq!(e.score, 0);
        assert_eq!(e.depth, PIN_DEPTH);

        tt.clear();
        assert_eq!(tt.probe(key), None);
    }

    #[test]
    fn test_fill() {
        let mut tt = TranspositionTable::new(4);
        assert_eq!(tt.fill_permille(), 0);
        for i in 0..8_u64 {
            tt.store(i << 60, Move::NULL, 0, Bound::Exact, 1);
        }
        assert_eq!(tt.fill_permille(), 500);
    }
}
