//! Staged move ordering
//!
//! [`MovePicker`] yields the hint move first, then captures sorted by MVV/LVA, then
//! quiet moves. Each stream is generated only once the previous one runs dry, so a
//! beta cutoff on an early move saves the cost of generating the rest.

use crate::board::Board;
use crate::movegen::{self, MoveList};
use crate::moves::{Move, MoveKind};
use crate::types::Piece;

use std::cmp::Reverse;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Stage {
    Hint,
    GenCaptures,
    Captures,
    GenQuiets,
    Quiets,
    Done,
}

const VICTIM_VALUE: [u8; Piece::COUNT] = [10, 20, 30, 40, 50, 0];
const ATTACKER_VALUE: [u8; Piece::COUNT] = [5, 4, 3, 2, 1, 0];

/// Piece captured by `mv`, if any
#[inline]
pub fn victim(b: &Board, mv: Move) -> Option<Piece> {
    match mv.kind() {
        MoveKind::Enpassant => Some(Piece::Pawn),
        _ => b.get(mv.dst()).piece(),
    }
}

/// Ordering key of a capture: more valuable victims first, then cheaper attackers
#[inline]
pub fn mvv_lva(b: &Board, mv: Move) -> u8 {
    let victim = victim(b, mv).map_or(0, |p| VICTIM_VALUE[p.index()]);
    let attacker = b.get(mv.src()).piece().map_or(0, |p| ATTACKER_VALUE[p.index()]);
    victim + attacker
}

pub struct MovePicker {
    stage: Stage,
    hint: Option<Move>,
    with_quiets: bool,
    moves: MoveList,
    pos: usize,
}

impl MovePicker {
    /// Picker over all the moves, trying `hint` first
    ///
    /// The hint must be pseudolegal in the position passed to [`MovePicker::next()`].
    pub fn new(hint: Option<Move>) -> MovePicker {
        MovePicker {
            stage: Stage::Hint,
            hint: hint.filter(|mv| !mv.is_null()),
            with_quiets: true,
            moves: MoveList::new(),
            pos: 0,
        }
    }

    /// Picker over captures only, for quiescence search
    pub fn captures() -> MovePicker {
        MovePicker {
            stage: Stage::GenCaptures,
            hint: None,
            with_quiets: false,
            moves: MoveList::new(),
            pos: 0,
        }
    }

    fn next_generated(&mut self) -> Option<Move> {
        while let Some(&mv) = self.moves.get(self.pos) {
            self.pos += 1;
            if Some(mv) != self.hint {
                return Some(mv);
            }
        }
        None
    }

    pub fn next(&mut self, b: &Board) -> Option<Move> {
        loop {
            match self.stage {
                Stage::Hint => {
                    self.stage = Stage::GenCaptures;
                    if self.hint.is_some() {
                        return self.hint;
                    }
                }
                Stage::GenCaptures => {
                    self.moves.clear();
                    movegen::gen_captures_into(b, &mut self.moves);
                    self.moves.sort_by_key(|&mv| Reverse(mvv_lva(b, mv)));
                    self.pos = 0;
                    self.stage = Stage::Captures;
                }
                Stage::Captures => {
                    if let Some(mv) = self.next_generated() {
                        return Some(mv);
                    }
                    self.stage = match self.with_quiets {
                        true => Stage::GenQuiets,
                        false => Stage::Done,
                    };
                }
                Stage::GenQuiets => {
                    self.moves.clear();
                    movegen::gen_quiet_into(b, &mut self.moves);
                    self.pos = 0;
                    self.stage = Stage::Quiets;
                }
                Stage::Quiets => {
                    if let Some(mv) = self.next_generated() {
                        return Some(mv);
                    }
                    self.stage = Stage::Done;
                }
                Stage::Done => return None,
            }
        }
    }
}
