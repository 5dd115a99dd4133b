//! Game history: a board together with the moves that led to it

use crate::board::{self, Board};
use crate::moves::{self, uci, Move, Undo, ValidateError};
use crate::types::{DrawKind, Outcome};

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot parse UCI move #{}: {}", .pos + 1, .source)]
pub struct UciListParseError {
    pub pos: usize,
    pub source: uci::ParseError,
}

/// Sequence of legal moves from a starting position
///
/// Besides the current board, the chain counts how many times each position
/// occurred, to detect threefold repetition, and exposes the hashes of the earlier
/// positions for the search to treat as draws.
#[derive(Debug, Clone)]
pub struct MoveChain {
    board: Board,
    stack: Vec<Undo>,
    history: Vec<u64>,
    repeat: HashMap<u64, usize>,
}

impl MoveChain {
    pub fn new(b: Board) -> MoveChain {
        let mut repeat = HashMap::new();
        repeat.insert(b.zobrist_hash(), 1);
        MoveChain {
            board: b,
            stack: Vec::new(),
            history: Vec::new(),
            repeat,
        }
    }

    pub fn new_initial() -> MoveChain {
        MoveChain::new(Board::initial())
    }

    pub fn from_fen(s: &str) -> Result<MoveChain, board::FenParseError> {
        Ok(MoveChain::new(Board::from_fen(s)?))
    }

    pub fn from_uci_list(b: Board, uci_list: &str) -> Result<MoveChain, UciListParseError> {
        let mut res = MoveChain::new(b);
        res.push_uci_list(uci_list)?;
        Ok(res)
    }

    pub fn last(&self) -> &Board {
        &self.board
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.stack.iter().map(Undo::mv)
    }

    /// Hashes of the positions before the current one, oldest first
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    /// Number of times the current position occurred, including now
    pub fn repeat_count(&self) -> usize {
        self.repeat
            .get(&self.board.zobrist_hash())
            .copied()
            .unwrap_or(0)
    }

    pub fn calc_outcome(&self) -> Option<Outcome> {
        if self.repeat_count() >= 3 {
            return Some(Outcome::Draw(DrawKind::Repeat3));
        }
        self.board.calc_outcome()
    }

    pub fn push(&mut self, mv: Move) -> Result<(), ValidateError> {
        if !self.board.is_pseudolegal(mv) {
            return Err(ValidateError::NotPseudolegal);
        }
        let prev = self.board.zobrist_hash();
        let u = moves::make_move(&mut self.board, mv);
        if self.board.is_opponent_king_attacked() {
            moves::unmake_move(&mut self.board, u);
            return Err(ValidateError::NotLegal);
        }
        self.stack.push(u);
        self.history.push(prev);
        *self.repeat.entry(self.board.zobrist_hash()).or_insert(0) += 1;
        Ok(())
    }

    pub fn push_uci(&mut self, s: &str) -> Result<(), uci::ParseError> {
        let mv = Move::from_uci(s, &self.board)?;
        self.push(mv)?;
        Ok(())
    }

    /// Pushes space-separated UCI moves, stopping at the first bad one
    pub fn push_uci_list(&mut self, uci_list: &str) -> Result<(), UciListParseError> {
        for (pos, s) in uci_list.split_ascii_whitespace().enumerate() {
            self.push_uci(s)
                .map_err(|source| UciListParseError { pos, source })?;
        }
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Move> {
        let u = self.stack.pop()?;
        let hash = self.board.zobrist_hash();
        if let Some(r) = self.repeat.get_mut(&hash) {
            *r -= 1;
            if *r == 0 {
                self.repeat.remove(&hash);
            }
        }
        self.history.pop();
        moves::unmake_move(&mut self.board, u);
        Some(u.mv())
    }

    pub fn uci_list(&self) -> UciList<'_> {
        UciList(self)
    }
}

/// Space-separated moves of a [`MoveChain`] in UCI notation
pub struct UciList<'a>(&'a MoveChain);

impl fmt::Display for UciList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mv) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", mv)?;
        }
        Ok(())
    }
}
