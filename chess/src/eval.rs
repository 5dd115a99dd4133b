//! Static evaluation: material plus piece-square tables
//!
//! Kings and pawns have separate middlegame and endgame tables. The two are blended
//! by game phase, which is measured by the non-pawn material left on the board.
//! Tables are laid out as seen from White with rank 8 on top, so White squares are
//! looked up with the rank flipped.

use crate::board::Board;
use crate::types::{Cell, Color, Piece};

pub const PIECE_VALUE: [i32; Piece::COUNT] = [100, 320, 330, 500, 900, 0];

const PHASE_VALUE: [i32; Piece::COUNT] = [0, 1, 1, 2, 4, 0];
pub const TOTAL_PHASE: i32 = 24;

#[rustfmt::skip]
const PAWN: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     50,  50,  50,  50,  50,  50,  50,  50,
     10,  10,  20,  30,  30,  20,  10,  10,
      5,   5,  10,  25,  25,  10,   5,   5,
      0,   0,   0,  20,  20,   0,   0,   0,
      5,  -5, -10,   0,   0, -10,  -5,   5,
      5,  10,  10, -20, -20,  10,  10,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const PAWN_END: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     80,  80,  80,  80,  80,  80,  80,  80,
     50,  50,  50,  50,  50,  50,  50,  50,
     30,  30,  30,  30,  30,  30,  30,  30,
     20,  20,  20,  20,  20,  20,  20,  20,
     10,  10,  10,  10,  10,  10,  10,  10,
     10,  10,  10,  10,  10,  10,  10,  10,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOP: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const ROOK: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  10,  10,  10,  10,  10,   5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      0,   0,   0,   5,   5,   0,   0,   0,
];

#[rustfmt::skip]
const QUEEN: [i32; 64] = [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
     -5,   0,   5,   5,   5,   5,   0,  -5,
      0,   0,   5,   5,   5,   5,   0,  -5,
    -10,   5,   5,   5,   5,   5,   0, -10,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

#[rustfmt::skip]
const KING: [i32; 64] = [
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -20, -20, -20, -20, -10,
     20,  20,   0,   0,   0,   0,  20,  20,
     20,  30,  10,   0,   0,  10,  30,  20,
];

#[rustfmt::skip]
const KING_END: [i32; 64] = [
    -50, -40, -30, -20, -20, -30, -40, -50,
    -30, -20, -10,   0,   0, -10, -20, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -30,   0,   0,   0,   0, -30, -30,
    -50, -30, -30, -30, -30, -30, -30, -50,
];

const MIDGAME: [&[i32; 64]; Piece::COUNT] = [&PAWN, &KNIGHT, &BISHOP, &ROOK, &QUEEN, &KING];
const ENDGAME: [&[i32; 64]; Piece::COUNT] =
    [&PAWN_END, &KNIGHT, &BISHOP, &ROOK, &QUEEN, &KING_END];

/// Game phase, from `TOTAL_PHASE` in the opening down to zero with bare kings and pawns
pub fn phase(b: &Board) -> i32 {
    let mut phase = 0;
    for p in Piece::iter() {
        let count = b.piece(Cell::from_parts(Color::White, p)).len()
            + b.piece(Cell::from_parts(Color::Black, p)).len();
        phase += count as i32 * PHASE_VALUE[p.index()];
    }
    phase.min(TOTAL_PHASE)
}

/// Evaluates the position in centipawns from the side to move's point of view
pub fn evaluate(b: &Board) -> i32 {
    let phase = phase(b);
    let mut mg = 0;
    let mut eg = 0;
    for c in [Color::White, Color::Black] {
        let (sign, flip) = match c {
            Color::White => (1, 56),
            Color::Black => (-1, 0),
        };
        for p in Piece::iter() {
            let (mid, end) = (MIDGAME[p.index()], ENDGAME[p.index()]);
            for sq in b.piece(Cell::from_parts(c, p)) {
                let idx = sq.index() ^ flip;
                let value = PIECE_VALUE[p.index()];
                mg += sign * (value + mid[idx]);
                eg += sign * (value + end[idx]);
            }
        }
    }
    let score = (mg * phase + eg * (TOTAL_PHASE - phase)) / TOTAL_PHASE;
    match b.side() {
        Color::White => score,
        Color::Black => -score,
    }
}
