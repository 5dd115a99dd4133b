//! Board and related things

use crate::bitboard::Bitboard;
use crate::moves::{self, Move};
use crate::types::{
    self, CastlingRights, CastlingSide, Cell, Color, Coord, DrawKind, File, Outcome, Piece, Rank,
};
use crate::{attack, bitboard_consts, geometry, movegen, pawns, zobrist};

use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Board validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// En passant square is located on a wrong rank for the side to move
    #[error("invalid enpassant position {0}")]
    InvalidEnpassant(Coord),
    /// Too many pieces of given color
    ///
    /// No more than 16 pieces of each color is allowed.
    #[error("too many pieces of color {0:?}")]
    TooManyPieces(Color),
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the 1st or on the 8th rank
    #[error("invalid pawn position {0}")]
    InvalidPawn(Coord),
    /// The side which has just moved left its king under attack
    #[error("opponent's king is attacked")]
    OpponentKingAttacked,
}

/// Error parsing the first part of FEN (i.e. the positions of pieces on the board)
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum CellsParseError {
    #[error("too many items in rank {0}")]
    RankOverflow(Rank),
    #[error("not enough items in rank {0}")]
    RankUnderflow(Rank),
    #[error("too many ranks")]
    Overflow,
    #[error("not enough ranks")]
    Underflow,
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error parsing [`RawBoard`] from FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawFenParseError {
    #[error("non-ASCII data in FEN")]
    NonAscii,
    #[error("board not specified")]
    NoBoard,
    #[error("bad board: {0}")]
    Board(#[from] CellsParseError),
    #[error("no move side")]
    NoMoveSide,
    #[error("bad move side: {0}")]
    MoveSide(#[from] types::ColorParseError),
    #[error("no castling rights")]
    NoCastling,
    #[error("bad castling rights: {0}")]
    Castling(#[from] types::CastlingRightsParseError),
    #[error("no enpassant")]
    NoEnpassant,
    #[error("bad enpassant: {0}")]
    Enpassant(#[from] types::CoordParseError),
    #[error("invalid enpassant rank {0}")]
    InvalidEnpassantRank(Rank),
    #[error("bad halfmove clock: {0}")]
    HalfmoveClock(ParseIntError),
    #[error("bad fullmove number: {0}")]
    FullmoveNumber(ParseIntError),
    #[error("extra data in FEN")]
    ExtraData,
}

/// Error parsing [`Board`] from FEN
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FenParseError {
    #[error("cannot parse fen: {0}")]
    Fen(#[from] RawFenParseError),
    #[error("invalid position: {0}")]
    Valid(#[from] ValidateError),
}

/// Raw chess board
///
/// Contains everything that describes a position, but is not validated. Build or edit
/// positions here, then convert into [`Board`] via [`Board::try_from()`].
///
/// # Example
///
/// ```
/// # use magpie::{RawBoard, Board, File, Rank, Color, Piece, Cell};
/// #
/// let mut raw = RawBoard::empty();
/// raw.halfmove = 10;
/// raw.fullmove = 42;
/// raw.put2(File::B, Rank::R2, Cell::from_parts(Color::White, Piece::King));
/// raw.put2(File::D, Rank::R5, Cell::from_parts(Color::Black, Piece::King));
///
/// let board: Board = raw.try_into().unwrap();
/// assert_eq!(board.as_fen(), "8/8/8/3k4/8/8/1K6/8 w - - 10 42");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawBoard {
    /// Mailbox, indexed by [`Coord::index()`]
    pub cells: [Cell; 64],
    /// Side to move
    pub side: Color,
    pub castling: CastlingRights,
    /// En passant target square, i.e. the square skipped by the last double pawn move
    pub ep: Option<Coord>,
    /// Number of half-moves since the last capture or pawn move
    pub halfmove: u16,
    /// Move number, incremented after each move by Black
    pub fullmove: u16,
}

impl RawBoard {
    #[inline]
    pub const fn empty() -> RawBoard {
        RawBoard {
            cells: [Cell::EMPTY; 64],
            side: Color::White,
            castling: CastlingRights::EMPTY,
            ep: None,
            halfmove: 0,
            fullmove: 1,
        }
    }

    pub fn initial() -> RawBoard {
        let mut res = RawBoard {
            castling: CastlingRights::FULL,
            ..RawBoard::empty()
        };
        for file in File::iter() {
            res.put2(file, Rank::R2, Cell::from_parts(Color::White, Piece::Pawn));
            res.put2(file, Rank::R7, Cell::from_parts(Color::Black, Piece::Pawn));
        }
        for (color, rank) in [(Color::White, Rank::R1), (Color::Black, Rank::R8)] {
            for (file, piece) in File::iter().zip([
                Piece::Rook,
                Piece::Knight,
                Piece::Bishop,
                Piece::Queen,
                Piece::King,
                Piece::Bishop,
                Piece::Knight,
                Piece::Rook,
            ]) {
                res.put2(file, rank, Cell::from_parts(color, piece));
            }
        }
        res
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<RawBoard, RawFenParseError> {
        RawBoard::from_str(fen)
    }

    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        unsafe { *self.cells.get_unchecked(c.index()) }
    }

    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.get(Coord::from_parts(file, rank))
    }

    #[inline]
    pub fn put(&mut self, c: Coord, cell: Cell) {
        unsafe {
            *self.cells.get_unchecked_mut(c.index()) = cell;
        }
    }

    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, cell: Cell) {
        self.put(Coord::from_parts(file, rank), cell);
    }

    /// Computes the Zobrist hash from scratch
    ///
    /// The hash covers piece placement, side to move, castling rights and the en passant
    /// file. Move counters are not included, so equal hashes indicate repeated positions.
    pub fn zobrist_hash(&self) -> u64 {
        let mut hash = match self.side {
            Color::White => 0,
            Color::Black => zobrist::MOVE_SIDE,
        };
        if let Some(p) = self.ep {
            hash ^= zobrist::enpassant(p.file());
        }
        hash ^= zobrist::castling(self.castling);
        for (i, cell) in self.cells.iter().enumerate() {
            hash ^= zobrist::pieces(*cell, Coord::from_index(i));
        }
        hash
    }

    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }
}

impl Default for RawBoard {
    #[inline]
    fn default() -> RawBoard {
        RawBoard::empty()
    }
}

/// Board that contains a valid position
///
/// Alongside the [`RawBoard`] mailbox it keeps per-piece and per-color bitboards and the
/// incrementally updated Zobrist hash. Only [`moves::make_move()`] and
/// [`moves::unmake_move()`] mutate a board, and they keep all the views in sync.
///
/// The only invalid state a board may take is the one right after a pseudolegal move
/// that leaves the mover's king attacked. Check it with [`Board::is_opponent_king_attacked()`]
/// and unmake such a move before doing anything else.
#[derive(Debug, Clone)]
pub struct Board {
    pub(crate) r: RawBoard,
    pub(crate) hash: u64,
    pub(crate) white: Bitboard,
    pub(crate) black: Bitboard,
    pub(crate) all: Bitboard,
    pub(crate) pieces: [Bitboard; Cell::COUNT],
}

impl Board {
    pub fn initial() -> Board {
        match RawBoard::initial().try_into() {
            Ok(b) => b,
            Err(e) => unreachable!("initial position is invalid: {}", e),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Board, FenParseError> {
        Board::from_str(fen)
    }

    #[inline]
    pub fn raw(&self) -> &RawBoard {
        &self.r
    }

    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.r.get(c)
    }

    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.r.get2(file, rank)
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.r.side
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.r.castling
    }

    #[inline]
    pub fn ep(&self) -> Option<Coord> {
        self.r.ep
    }

    #[inline]
    pub fn halfmove(&self) -> u16 {
        self.r.halfmove
    }

    /// Returns the bitboard over all the pieces with color `c`
    #[inline]
    pub fn color(&self, c: Color) -> Bitboard {
        match c {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    #[inline]
    pub(crate) fn color_mut(&mut self, c: Color) -> &mut Bitboard {
        match c {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.all
    }

    #[inline]
    pub fn empty(&self) -> Bitboard {
        !self.all
    }

    /// Returns the bitboard over all the cells equal to `c`
    ///
    /// **Note**: for an empty cell this is an empty bitboard, not the set of empty squares.
    #[inline]
    pub fn piece(&self, c: Cell) -> Bitboard {
        unsafe { *self.pieces.get_unchecked(c.index()) }
    }

    #[inline]
    pub fn piece2(&self, c: Color, p: Piece) -> Bitboard {
        self.piece(Cell::from_parts(c, p))
    }

    #[inline]
    pub(crate) fn piece_diag(&self, c: Color) -> Bitboard {
        self.piece2(c, Piece::Bishop) | self.piece2(c, Piece::Queen)
    }

    #[inline]
    pub(crate) fn piece_line(&self, c: Color) -> Bitboard {
        self.piece2(c, Piece::Rook) | self.piece2(c, Piece::Queen)
    }

    #[inline]
    pub(crate) fn piece_mut(&mut self, c: Cell) -> &mut Bitboard {
        unsafe { self.pieces.get_unchecked_mut(c.index()) }
    }

    /// Returns the position of the king of color `c`
    #[inline]
    pub fn king_pos(&self, c: Color) -> Coord {
        match self.piece2(c, Piece::King).first() {
            Some(coord) => coord,
            None => unreachable!("board has no {:?} king", c),
        }
    }

    /// Returns the incrementally maintained Zobrist hash
    ///
    /// It always equals [`RawBoard::zobrist_hash()`] of [`Board::raw()`], which recomputes it.
    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.hash
    }

    /// Union of all squares attacked by pieces of color `c`
    ///
    /// Sliders are blocked by the current occupancy. This is not a check test, use
    /// [`Board::checkers()`] for that.
    pub fn attacked_squares(&self, c: Color) -> Bitboard {
        let mut res = pawns::attacks(c, self.piece2(c, Piece::Pawn));
        for src in self.piece2(c, Piece::Knight) {
            res |= attack::knight(src);
        }
        for src in self.piece_diag(c) {
            res |= attack::bishop(src, self.all);
        }
        for src in self.piece_line(c) {
            res |= attack::rook(src, self.all);
        }
        res | attack::king(self.king_pos(c))
    }

    /// Returns the enemy pieces attacking the king of color `c`
    #[inline]
    pub fn checkers(&self, c: Color) -> Bitboard {
        movegen::cell_attackers(self, self.king_pos(c), c.inv())
    }

    /// Returns `true` if the side to move is in check
    #[inline]
    pub fn is_check(&self) -> bool {
        let c = self.r.side;
        movegen::is_cell_attacked(self, self.king_pos(c), c.inv())
    }

    /// Returns `true` if the side which has just moved left its king attacked
    #[inline]
    pub fn is_opponent_king_attacked(&self) -> bool {
        let c = self.r.side;
        movegen::is_cell_attacked(self, self.king_pos(c.inv()), c)
    }

    #[inline]
    pub fn has_legal_moves(&self) -> bool {
        movegen::has_legal_moves(self)
    }

    /// Returns `true` if `mv` is pseudolegal in this position
    ///
    /// Much cheaper than generating all the moves, so it is used to check moves coming
    /// from the transposition table.
    #[inline]
    pub fn is_pseudolegal(&self, mv: Move) -> bool {
        moves::is_pseudolegal(self, mv)
    }

    /// Returns a copy of the board with the legal move `mv` applied
    pub fn make_move(&self, mv: Move) -> Result<Board, moves::ValidateError> {
        if !self.is_pseudolegal(mv) {
            return Err(moves::ValidateError::NotPseudolegal);
        }
        let mut res = self.clone();
        moves::make_move(&mut res, mv);
        if res.is_opponent_king_attacked() {
            return Err(moves::ValidateError::NotLegal);
        }
        Ok(res)
    }

    /// Calculates checkmate, stalemate and the fifty-move rule
    ///
    /// Repetitions need the game history and are detected by
    /// [`MoveChain`](crate::chain::MoveChain).
    pub fn calc_outcome(&self) -> Option<Outcome> {
        if !self.has_legal_moves() {
            return if self.is_check() {
                Some(Outcome::Checkmate(self.r.side.inv()))
            } else {
                Some(Outcome::Draw(DrawKind::Stalemate))
            };
        }
        if self.r.halfmove >= 100 {
            return Some(Outcome::Draw(DrawKind::Moves50));
        }
        None
    }

    #[inline]
    pub fn as_fen(&self) -> String {
        self.to_string()
    }

    /// Panics if the redundant views of the position disagree
    #[cfg(feature = "selftest")]
    pub(crate) fn selftest(&self) {
        let mut white = Bitboard::EMPTY;
        let mut black = Bitboard::EMPTY;
        let mut pieces = [Bitboard::EMPTY; Cell::COUNT];
        for c in Coord::iter() {
            let cell = self.get(c);
            match cell.color() {
                Some(Color::White) => white.set(c),
                Some(Color::Black) => black.set(c),
                None => continue,
            }
            pieces[cell.index()].set(c);
        }
        assert_eq!(white, self.white);
        assert_eq!(black, self.black);
        assert_eq!(white | black, self.all);
        assert_eq!(pieces[1..], self.pieces[1..]);
        assert_eq!(self.hash, self.r.zobrist_hash());
    }
}

impl PartialEq for Board {
    #[inline]
    fn eq(&self, other: &Board) -> bool {
        self.r == other.r
    }
}

impl Eq for Board {}

impl Hash for Board {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.r.hash(state)
    }
}

impl TryFrom<RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(mut raw: RawBoard) -> Result<Board, ValidateError> {
        if let Some(p) = raw.ep {
            if p.rank() != geometry::enpassant_dst_rank(raw.side) {
                return Err(ValidateError::InvalidEnpassant(p));
            }

            // Drop en passant unless a pawn has really just made a double move across `p`
            let fwd = geometry::pawn_forward_delta(raw.side);
            if raw.get(p.add(-fwd)) != Cell::from_parts(raw.side.inv(), Piece::Pawn)
                || raw.get(p).is_occupied()
                || raw.get(p.add(fwd)).is_occupied()
            {
                raw.ep = None;
            }
        }

        for color in [Color::White, Color::Black] {
            let rank = geometry::castling_rank(color);
            if raw.get2(File::E, rank) != Cell::from_parts(color, Piece::King) {
                raw.castling.unset_color(color);
            }
            if raw.get2(File::A, rank) != Cell::from_parts(color, Piece::Rook) {
                raw.castling.unset(color, CastlingSide::Queen);
            }
            if raw.get2(File::H, rank) != Cell::from_parts(color, Piece::Rook) {
                raw.castling.unset(color, CastlingSide::King);
            }
        }

        let mut white = Bitboard::EMPTY;
        let mut black = Bitboard::EMPTY;
        let mut pieces = [Bitboard::EMPTY; Cell::COUNT];
        for (idx, cell) in raw.cells.iter().enumerate() {
            let coord = Coord::from_index(idx);
            if let Some(color) = cell.color() {
                match color {
                    Color::White => white.set(coord),
                    Color::Black => black.set(coord),
                };
                pieces[cell.index()].set(coord);
            }
        }

        for (color, bb) in [(Color::White, white), (Color::Black, black)] {
            if bb.len() > 16 {
                return Err(ValidateError::TooManyPieces(color));
            }
            let kings = pieces[Cell::from_parts(color, Piece::King).index()];
            if kings.is_empty() {
                return Err(ValidateError::NoKing(color));
            }
            if kings.len() > 1 {
                return Err(ValidateError::TooManyKings(color));
            }
        }

        let pawns = pieces[Cell::from_parts(Color::White, Piece::Pawn).index()]
            | pieces[Cell::from_parts(Color::Black, Piece::Pawn).index()];
        if let Some(bad) = (pawns & bitboard_consts::BACK_RANKS).first() {
            return Err(ValidateError::InvalidPawn(bad));
        }

        let res = Board {
            r: raw,
            hash: raw.zobrist_hash(),
            white,
            black,
            all: white | black,
            pieces,
        };
        if res.is_opponent_king_attacked() {
            return Err(ValidateError::OpponentKingAttacked);
        }

        Ok(res)
    }
}

impl TryFrom<&RawBoard> for Board {
    type Error = ValidateError;

    fn try_from(raw: &RawBoard) -> Result<Board, ValidateError> {
        (*raw).try_into()
    }
}

fn parse_cells(s: &str) -> Result<[Cell; 64], CellsParseError> {
    type Error = CellsParseError;

    // FEN lists ranks from the 8th down to the 1st
    let rank_of = |row: usize| Rank::from_index(7 - row);
    let mut file = 0_usize;
    let mut row = 0_usize;
    let mut cells = [Cell::EMPTY; 64];
    for b in s.bytes() {
        match b {
            b'1'..=b'8' => {
                let add = (b - b'0') as usize;
                if file + add > 8 {
                    return Err(Error::RankOverflow(rank_of(row)));
                }
                file += add;
            }
            b'/' => {
                if file < 8 {
                    return Err(Error::RankUnderflow(rank_of(row)));
                }
                row += 1;
                file = 0;
                if row >= 8 {
                    return Err(Error::Overflow);
                }
            }
            _ => {
                if file >= 8 {
                    return Err(Error::RankOverflow(rank_of(row)));
                }
                let cell = Cell::from_char(b as char).ok_or(Error::UnexpectedChar(b as char))?;
                cells[(7 - row) * 8 + file] = cell;
                file += 1;
            }
        };
    }

    if file < 8 {
        return Err(Error::RankUnderflow(rank_of(row)));
    }
    if row < 7 {
        return Err(Error::Underflow);
    }

    Ok(cells)
}

fn parse_ep(s: &str, side: Color) -> Result<Option<Coord>, RawFenParseError> {
    if s == "-" {
        return Ok(None);
    }
    let ep = Coord::from_str(s)?;
    if ep.rank() != geometry::enpassant_dst_rank(side) {
        return Err(RawFenParseError::InvalidEnpassantRank(ep.rank()));
    }
    Ok(Some(ep))
}

impl FromStr for RawBoard {
    type Err = RawFenParseError;

    fn from_str(s: &str) -> Result<RawBoard, Self::Err> {
        type Error = RawFenParseError;

        if !s.is_ascii() {
            return Err(Error::NonAscii);
        }
        let mut iter = s.split_ascii_whitespace().fuse();

        let cells = parse_cells(iter.next().ok_or(Error::NoBoard)?)?;
        let side = Color::from_str(iter.next().ok_or(Error::NoMoveSide)?)?;
        let castling = CastlingRights::from_str(iter.next().ok_or(Error::NoCastling)?)?;
        let ep = parse_ep(iter.next().ok_or(Error::NoEnpassant)?, side)?;
        let halfmove = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::HalfmoveClock)?,
            None => 0,
        };
        let fullmove = match iter.next() {
            Some(s) => u16::from_str(s).map_err(Error::FullmoveNumber)?,
            None => 1,
        };

        if iter.next().is_some() {
            return Err(Error::ExtraData);
        }

        Ok(RawBoard {
            cells,
            side,
            castling,
            ep,
            halfmove,
            fullmove,
        })
    }
}

impl FromStr for Board {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Board, Self::Err> {
        Ok(RawBoard::from_str(s)?.try_into()?)
    }
}

fn format_cells(cells: &[Cell; 64], f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
    for rank in Rank::iter().rev() {
        if rank != Rank::R8 {
            write!(f, "/")?;
        }
        let mut empty = 0;
        for file in File::iter() {
            let cell = cells[Coord::from_parts(file, rank).index()];
            if cell.is_empty() {
                empty += 1;
                continue;
            }
            if empty != 0 {
                write!(f, "{}", (b'0' + empty) as char)?;
                empty = 0;
            }
            write!(f, "{}", cell)?;
        }
        if empty != 0 {
            write!(f, "{}", (b'0' + empty) as char)?;
        }
    }
    Ok(())
}

impl Display for RawBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        format_cells(&self.cells, f)?;
        write!(f, " {} {}", self.side, self.castling)?;
        match self.ep {
            Some(p) => write!(f, " {}", p)?,
            None => write!(f, " -")?,
        };
        write!(f, " {} {}", self.halfmove, self.fullmove)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        self.r.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INI_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_initial() {
        assert_eq!(RawBoard::initial().to_string(), INI_FEN);
        assert_eq!(Board::initial().to_string(), INI_FEN);
        assert_eq!(RawBoard::from_str(INI_FEN), Ok(RawBoard::initial()));
        assert_eq!(Board::from_str(INI_FEN), Ok(Board::initial()));

        let b = Board::initial();
        assert_eq!(b.get(Coord::from_index(0)), Cell::from_parts(Color::White, Piece::Rook));
        assert_eq!(b.get(Coord::from_index(60)), Cell::from_parts(Color::Black, Piece::King));
        assert_eq!(b.occupied().len(), 32);
        assert_eq!(b.empty().len(), 32);
        assert_eq!(b.zobrist_hash(), b.raw().zobrist_hash());
    }

    #[test]
    fn test_midgame() {
        const FEN: &str = "1rq1r1k1/1p3ppp/pB3n2/3ppP2/Pbb1P3/1PN2B2/2P2QPP/R1R4K w - - 1 21";

        let board = Board::from_fen(FEN).unwrap();
        assert_eq!(board.as_fen(), FEN);
        assert_eq!(
            board.get2(File::B, Rank::R4),
            Cell::from_parts(Color::Black, Piece::Bishop)
        );
        assert_eq!(
            board.get2(File::F, Rank::R2),
            Cell::from_parts(Color::White, Piece::Queen)
        );
        assert_eq!(
            board.king_pos(Color::White),
            Coord::from_parts(File::H, Rank::R1)
        );
        assert_eq!(
            board.king_pos(Color::Black),
            Coord::from_parts(File::G, Rank::R8)
        );
        assert_eq!(board.side(), Color::White);
        assert_eq!(board.castling(), CastlingRights::EMPTY);
        assert_eq!(board.ep(), None);
        assert_eq!(board.raw().halfmove, 1);
        assert_eq!(board.raw().fullmove, 21);
    }

    #[test]
    fn test_fixes() {
        const FEN: &str = "r1bq1b1r/ppppkppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK1R1 w KQkq c6 6 5";

        let raw = RawBoard::from_fen(FEN).unwrap();
        assert_eq!(raw.castling, CastlingRights::FULL);
        assert_eq!(raw.ep, Some(Coord::from_parts(File::C, Rank::R6)));
        assert_eq!(raw.as_fen(), FEN);

        let board: Board = raw.try_into().unwrap();
        assert_eq!(
            board.castling(),
            CastlingRights::EMPTY.with(Color::White, CastlingSide::Queen)
        );
        assert_eq!(board.ep(), None);
        assert_eq!(
            board.as_fen(),
            "r1bq1b1r/ppppkppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK1R1 w Q - 6 5"
        );
    }

    #[test]
    fn test_enpassant_kept() {
        const FEN: &str = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        let board = Board::from_fen(FEN).unwrap();
        assert_eq!(board.ep(), Some(Coord::from_parts(File::F, Rank::R6)));
        assert_eq!(board.as_fen(), FEN);
        assert_ne!(
            board.zobrist_hash(),
            Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 3")
                .unwrap()
                .zobrist_hash()
        );
    }

    #[test]
    fn test_incomplete() {
        assert_eq!(
            RawBoard::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"),
            Err(RawFenParseError::NoMoveSide)
        );
        assert_eq!(
            RawBoard::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w"),
            Err(RawFenParseError::NoCastling)
        );
        assert_eq!(
            RawBoard::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq"),
            Err(RawFenParseError::NoEnpassant)
        );

        let raw =
            RawBoard::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -").unwrap();
        assert_eq!(raw.halfmove, 0);
        assert_eq!(raw.fullmove, 1);
    }

    #[test]
    fn test_invalid() {
        assert_eq!(
            Board::from_fen("8/8/8/8/8/8/8/K7 w - - 0 1"),
            Err(FenParseError::Valid(ValidateError::NoKing(Color::Black)))
        );
        assert_eq!(
            Board::from_fen("k6P/8/8/8/8/8/8/K7 w - - 0 1"),
            Err(FenParseError::Valid(ValidateError::InvalidPawn(
                Coord::from_index(63)
            )))
        );
        assert_eq!(
            Board::from_fen("k6R/8/8/8/8/8/8/K7 w - - 0 1"),
            Err(FenParseError::Valid(ValidateError::OpponentKingAttacked))
        );
        assert_eq!(
            Board::from_fen("kk6/8/8/8/8/8/8/K7 w - - 0 1"),
            Err(FenParseError::Valid(ValidateError::TooManyKings(Color::Black)))
        );
        assert_eq!(
            RawBoard::from_fen("rnbqkbnr/pppppppp/7pp/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(RawFenParseError::Board(CellsParseError::RankOverflow(Rank::R6)))
        );
    }

    #[test]
    fn test_attacks_and_checkers() {
        let b = Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
        let h4 = Coord::from_parts(File::H, Rank::R4);
        assert_eq!(b.checkers(Color::White), Bitboard::from_coord(h4));
        assert_eq!(b.checkers(Color::Black), Bitboard::EMPTY);
        assert!(b.is_check());
        assert!(b
            .attacked_squares(Color::Black)
            .has(Coord::from_parts(File::E, Rank::R1)));

        let b = Board::initial();
        let attacked = b.attacked_squares(Color::White);
        assert!(!attacked.has(Coord::from_parts(File::E, Rank::R4)));
        assert_eq!(
            attacked & bitboard_consts::rank(Rank::R3),
            bitboard_consts::rank(Rank::R3)
        );
    }

    #[test]
    fn test_outcome() {
        let b = Board::initial();
        assert_eq!(b.calc_outcome(), None);

        let b = Board::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .unwrap();
        assert!(!b.has_legal_moves());
        assert_eq!(b.calc_outcome(), Some(Outcome::Checkmate(Color::Black)));

        let b = Board::from_fen("7K/8/5n2/5n2/8/8/7k/8 w - - 0 1").unwrap();
        assert!(!b.has_legal_moves());
        assert!(b.checkers(Color::White).is_empty());
        assert_eq!(b.calc_outcome(), Some(Outcome::Draw(DrawKind::Stalemate)));

        let b = Board::from_fen("NNK4k/8/8/8/8/8/8/8 w - - 99 80").unwrap();
        assert_eq!(b.calc_outcome(), None);

        let b = Board::from_fen("NNK4k/8/8/8/8/8/8/8 w - - 100 80").unwrap();
        assert_eq!(b.calc_outcome(), Some(Outcome::Draw(DrawKind::Moves50)));
    }

    #[test]
    fn test_make_move() {
        let b = Board::initial();
        let e2e4 = Move::from_uci("e2e4", &b).unwrap();
        let after = b.make_move(e2e4).unwrap();
        assert_eq!(
            after.as_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
        assert_eq!(
            b.make_move(Move::from_uci("e2e5", &b).unwrap()),
            Err(moves::ValidateError::NotPseudolegal)
        );

        let pinned = Board::from_fen("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        let mv = Move::from_uci("e2d3", &pinned).unwrap();
        assert_eq!(pinned.make_move(mv), Err(moves::ValidateError::NotLegal));
    }
}
