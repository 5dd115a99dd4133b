//! # Magpie
//!
//! Bitboard chess engine core. Attack tables for sliding pieces use magic
//! bitboards generated by the build script, boards are mutated in place by
//! reversible [`moves::make_move()`] and [`moves::unmake_move()`] with an
//! incrementally updated Zobrist hash, and [`search::Searcher`] runs iterative
//! deepening alpha-beta with quiescence and a transposition table.
//!
//! ```no_run
//! use magpie::{search, Board};
//!
//! let b = Board::initial();
//! let mv = search::search(&b, 4).unwrap();
//! println!("{}", mv);
//! ```

pub mod attack;
pub mod board;
pub mod chain;
pub mod eval;
pub mod movegen;
pub mod movepick;
pub mod moves;
pub mod perft;
pub mod search;
pub mod tt;
pub mod zobrist;

mod castling;
mod generic;
mod pawns;

pub use magpie_base::{bitboard, bitboard_consts, geometry, types};

pub use bitboard::Bitboard;
pub use board::{Board, RawBoard};
pub use chain::MoveChain;
pub use moves::{Move, MoveKind};
pub use search::{SearchLimits, SearchResult, Searcher};
pub use types::{
    CastlingRights, CastlingSide, Cell, Color, Coord, DrawKind, File, Outcome, Piece, Rank,
};
