use super::uci;
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::types::{CastlingRights, CastlingSide, Cell, Color, Coord, File, Piece};
use crate::{attack, castling, generic, geometry, zobrist};

use std::fmt;

use thiserror::Error;

/// Kind of a [`Move`], stored in the upper four bits of its encoding
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// Any move not covered by the other kinds, including captures
    #[default]
    Normal = 0,
    PawnDouble = 1,
    Enpassant = 2,
    PromoteKnight = 3,
    PromoteBishop = 4,
    PromoteRook = 5,
    PromoteQueen = 6,
    Castling = 8,
}

impl MoveKind {
    #[inline]
    pub const fn from_promote(p: Piece) -> Option<MoveKind> {
        match p {
            Piece::Knight => Some(MoveKind::PromoteKnight),
            Piece::Bishop => Some(MoveKind::PromoteBishop),
            Piece::Rook => Some(MoveKind::PromoteRook),
            Piece::Queen => Some(MoveKind::PromoteQueen),
            Piece::Pawn | Piece::King => None,
        }
    }

    /// Piece a pawn turns into, if this is a promotion
    #[inline]
    pub const fn promote(self) -> Option<Piece> {
        match self {
            MoveKind::PromoteKnight
            | MoveKind::PromoteBishop
            | MoveKind::PromoteRook
            | MoveKind::PromoteQueen => Some(Piece::from_index(self as usize - 2)),
            _ => None,
        }
    }

    #[inline]
    const fn from_flag(flag: u16) -> Option<MoveKind> {
        Some(match flag {
            0 => MoveKind::Normal,
            1 => MoveKind::PawnDouble,
            2 => MoveKind::Enpassant,
            3 => MoveKind::PromoteKnight,
            4 => MoveKind::PromoteBishop,
            5 => MoveKind::PromoteRook,
            6 => MoveKind::PromoteQueen,
            8 => MoveKind::Castling,
            _ => return None,
        })
    }
}

/// Error validating a move against a position
#[derive(Debug, Copy, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    #[error("move is not pseudolegal")]
    NotPseudolegal,
    #[error("move leaves the king in check")]
    NotLegal,
}

/// Chess move packed into 16 bits
///
/// Bits 0-5 hold the source square, bits 6-11 the destination square and bits
/// 12-15 the [`MoveKind`]. The all-zero value is [`Move::NULL`], which is never
/// generated for a real position.
///
/// A move carries no information about the moving or the captured piece, so it is
/// meaningful only together with the position it was created for.
#[derive(Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Move(u16);

impl Move {
    pub const NULL: Move = Move(0);

    #[inline]
    pub const fn new(kind: MoveKind, src: Coord, dst: Coord) -> Move {
        Move(src.index() as u16 | (dst.index() as u16) << 6 | (kind as u16) << 12)
    }

    /// Rebuilds a move from its 16-bit encoding, rejecting unknown kinds
    #[inline]
    pub const fn from_raw(raw: u16) -> Option<Move> {
        match MoveKind::from_flag(raw >> 12) {
            Some(_) => Some(Move(raw)),
            None => None,
        }
    }

    #[inline]
    pub const fn as_raw(&self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn src(&self) -> Coord {
        Coord::from_index((self.0 & 63) as usize)
    }

    #[inline]
    pub const fn dst(&self) -> Coord {
        Coord::from_index(((self.0 >> 6) & 63) as usize)
    }

    #[inline]
    pub const fn kind(&self) -> MoveKind {
        match MoveKind::from_flag(self.0 >> 12) {
            Some(k) => k,
            None => MoveKind::Normal,
        }
    }

    #[inline]
    pub const fn promote(&self) -> Option<Piece> {
        self.kind().promote()
    }

    /// King move for the given castling, e.g. `e1g1` for White kingside
    #[inline]
    pub const fn from_castling(c: Color, s: CastlingSide) -> Move {
        let base = match c {
            Color::White => 0,
            Color::Black => 56,
        };
        let dst = match s {
            CastlingSide::King => base + 6,
            CastlingSide::Queen => base + 2,
        };
        Move::new(
            MoveKind::Castling,
            Coord::from_index(base + 4),
            Coord::from_index(dst),
        )
    }

    #[inline]
    pub fn castling_side(&self) -> Option<CastlingSide> {
        if self.kind() != MoveKind::Castling {
            return None;
        }
        match self.dst().file() {
            File::G => Some(CastlingSide::King),
            File::C => Some(CastlingSide::Queen),
            _ => None,
        }
    }

    /// Parses a UCI string, inferring the move kind from the position
    ///
    /// The resulting move is not validated; use [`Move::from_uci_legal()`] when the
    /// string comes from an untrusted source.
    pub fn from_uci(s: &str, b: &Board) -> Result<Move, uci::RawParseError> {
        Ok(s.parse::<uci::Move>()?.into_move(b))
    }

    /// Parses a UCI string and checks that the move is legal in `b`
    pub fn from_uci_legal(s: &str, b: &Board) -> Result<Move, uci::ParseError> {
        let mv = Move::from_uci(s, b)?;
        mv.validate(b)?;
        Ok(mv)
    }

    pub fn validate(&self, b: &Board) -> Result<(), ValidateError> {
        b.make_move(*self).map(|_| ())
    }

    #[inline]
    pub fn uci(&self) -> uci::Move {
        (*self).into()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.uci().fmt(f)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}, {:?})", self.uci(), self.kind())
    }
}

/// State needed to take back a move made with [`make_move()`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Undo {
    mv: Move,
    moved: Cell,
    captured: Cell,
    ep: Option<Coord>,
    castling: CastlingRights,
    hash: u64,
    halfmove: u16,
}

impl Undo {
    #[inline]
    pub fn mv(&self) -> Move {
        self.mv
    }

    #[inline]
    pub fn moved(&self) -> Cell {
        self.moved
    }

    /// Piece removed from the board by the move, also for en passant
    #[inline]
    pub fn captured(&self) -> Cell {
        self.captured
    }
}

#[inline]
fn castling_masks(s: CastlingSide, home: usize) -> (Bitboard, Bitboard) {
    let (king, rook) = match s {
        CastlingSide::King => (0x50_u64, 0xa0_u64),
        CastlingSide::Queen => (0x14_u64, 0x09_u64),
    };
    (Bitboard::from_raw(king << home), Bitboard::from_raw(rook << home))
}

fn do_make_move<C: generic::Color>(b: &mut Board, mv: Move) -> Undo {
    let src = mv.src();
    let dst = mv.dst();
    let src_bb = Bitboard::from_coord(src);
    let dst_bb = Bitboard::from_coord(dst);
    let change = src_bb | dst_bb;
    let moved = b.get(src);
    let pawn = Cell::from_parts(C::COLOR, Piece::Pawn);

    let mut undo = Undo {
        mv,
        moved,
        captured: b.get(dst),
        ep: b.r.ep,
        castling: b.r.castling,
        hash: b.hash,
        halfmove: b.r.halfmove,
    };

    if let Some(p) = b.r.ep.take() {
        b.hash ^= zobrist::enpassant(p.file());
    }

    match mv.kind() {
        MoveKind::Normal => {
            let captured = undo.captured;
            b.r.put(src, Cell::EMPTY);
            b.r.put(dst, moved);
            b.hash ^= zobrist::pieces(moved, src)
                ^ zobrist::pieces(moved, dst)
                ^ zobrist::pieces(captured, dst);
            *b.color_mut(C::COLOR) ^= change;
            *b.piece_mut(moved) ^= change;
            if captured.is_occupied() {
                *b.color_mut(C::COLOR.inv()) &= !dst_bb;
                *b.piece_mut(captured) &= !dst_bb;
            }
        }
        MoveKind::PawnDouble => {
            b.r.put(src, Cell::EMPTY);
            b.r.put(dst, moved);
            b.hash ^= zobrist::pieces(moved, src) ^ zobrist::pieces(moved, dst);
            *b.color_mut(C::COLOR) ^= change;
            *b.piece_mut(moved) ^= change;
            let ep = src.add(geometry::pawn_forward_delta(C::COLOR));
            b.r.ep = Some(ep);
            b.hash ^= zobrist::enpassant(ep.file());
        }
        MoveKind::Enpassant => {
            let taken = dst.add(-geometry::pawn_forward_delta(C::COLOR));
            let their_pawn = Cell::from_parts(C::COLOR.inv(), Piece::Pawn);
            undo.captured = their_pawn;
            b.r.put(src, Cell::EMPTY);
            b.r.put(dst, moved);
            b.r.put(taken, Cell::EMPTY);
            b.hash ^= zobrist::pieces(moved, src)
                ^ zobrist::pieces(moved, dst)
                ^ zobrist::pieces(their_pawn, taken);
            let taken_bb = Bitboard::from_coord(taken);
            *b.color_mut(C::COLOR) ^= change;
            *b.piece_mut(moved) ^= change;
            *b.color_mut(C::COLOR.inv()) ^= taken_bb;
            *b.piece_mut(their_pawn) ^= taken_bb;
        }
        MoveKind::PromoteKnight
        | MoveKind::PromoteBishop
        | MoveKind::PromoteRook
        | MoveKind::PromoteQueen => {
            let captured = undo.captured;
            let promoted = match mv.promote() {
                Some(p) => Cell::from_parts(C::COLOR, p),
                None => unreachable!(),
            };
            b.r.put(src, Cell::EMPTY);
            b.r.put(dst, promoted);
            b.hash ^= zobrist::pieces(moved, src)
                ^ zobrist::pieces(promoted, dst)
                ^ zobrist::pieces(captured, dst);
            *b.color_mut(C::COLOR) ^= change;
            *b.piece_mut(pawn) ^= src_bb;
            *b.piece_mut(promoted) ^= dst_bb;
            if captured.is_occupied() {
                *b.color_mut(C::COLOR.inv()) &= !dst_bb;
                *b.piece_mut(captured) &= !dst_bb;
            }
        }
        MoveKind::Castling => {
            let side = match mv.castling_side() {
                Some(s) => s,
                None => unreachable!(),
            };
            let (rook_src, rook_dst) = castling::rook_move(C::COLOR, side);
            let rook = Cell::from_parts(C::COLOR, Piece::Rook);
            let (king_bb, rook_bb) = castling_masks(side, C::HOME_OFFSET);
            b.r.put(src, Cell::EMPTY);
            b.r.put(rook_src, Cell::EMPTY);
            b.r.put(dst, moved);
            b.r.put(rook_dst, rook);
            b.hash ^= zobrist::pieces(moved, src)
                ^ zobrist::pieces(moved, dst)
                ^ zobrist::pieces(rook, rook_src)
                ^ zobrist::pieces(rook, rook_dst);
            *b.color_mut(C::COLOR) ^= king_bb | rook_bb;
            *b.piece_mut(moved) ^= king_bb;
            *b.piece_mut(rook) ^= rook_bb;
        }
    }

    let castling = b
        .r
        .castling
        .masked(castling::rights_mask(src) & castling::rights_mask(dst));
    if castling != b.r.castling {
        b.hash ^= zobrist::castling(b.r.castling) ^ zobrist::castling(castling);
        b.r.castling = castling;
    }

    if undo.captured.is_occupied() || moved == pawn {
        b.r.halfmove = 0;
    } else {
        b.r.halfmove = b.r.halfmove.saturating_add(1);
    }
    if C::COLOR == Color::Black {
        b.r.fullmove = b.r.fullmove.saturating_add(1);
    }
    b.r.side = C::COLOR.inv();
    b.hash ^= zobrist::MOVE_SIDE;
    b.all = b.white | b.black;

    #[cfg(feature = "selftest")]
    b.selftest();

    undo
}

fn do_unmake_move<C: generic::Color>(b: &mut Board, u: Undo) {
    let mv = u.mv;
    let src = mv.src();
    let dst = mv.dst();
    let src_bb = Bitboard::from_coord(src);
    let dst_bb = Bitboard::from_coord(dst);
    let change = src_bb | dst_bb;
    let moved = u.moved;
    let captured = u.captured;

    match mv.kind() {
        MoveKind::Normal => {
            b.r.put(src, moved);
            b.r.put(dst, captured);
            *b.color_mut(C::COLOR) ^= change;
            *b.piece_mut(moved) ^= change;
            if captured.is_occupied() {
                *b.color_mut(C::COLOR.inv()) |= dst_bb;
                *b.piece_mut(captured) |= dst_bb;
            }
        }
        MoveKind::PawnDouble => {
            b.r.put(src, moved);
            b.r.put(dst, Cell::EMPTY);
            *b.color_mut(C::COLOR) ^= change;
            *b.piece_mut(moved) ^= change;
        }
        MoveKind::Enpassant => {
            let taken = dst.add(-geometry::pawn_forward_delta(C::COLOR));
            let taken_bb = Bitboard::from_coord(taken);
            b.r.put(src, moved);
            b.r.put(dst, Cell::EMPTY);
            b.r.put(taken, captured);
            *b.color_mut(C::COLOR) ^= change;
            *b.piece_mut(moved) ^= change;
            *b.color_mut(C::COLOR.inv()) |= taken_bb;
            *b.piece_mut(captured) |= taken_bb;
        }
        MoveKind::PromoteKnight
        | MoveKind::PromoteBishop
        | MoveKind::PromoteRook
        | MoveKind::PromoteQueen => {
            let promoted = b.get(dst);
            b.r.put(src, moved);
            b.r.put(dst, captured);
            *b.color_mut(C::COLOR) ^= change;
            *b.piece_mut(moved) ^= src_bb;
            *b.piece_mut(promoted) ^= dst_bb;
            if captured.is_occupied() {
                *b.color_mut(C::COLOR.inv()) |= dst_bb;
                *b.piece_mut(captured) |= dst_bb;
            }
        }
        MoveKind::Castling => {
            let side = match mv.castling_side() {
                Some(s) => s,
                None => unreachable!(),
            };
            let (rook_src, rook_dst) = castling::rook_move(C::COLOR, side);
            let rook = Cell::from_parts(C::COLOR, Piece::Rook);
            let (king_bb, rook_bb) = castling_masks(side, C::HOME_OFFSET);
            b.r.put(dst, Cell::EMPTY);
            b.r.put(rook_dst, Cell::EMPTY);
            b.r.put(src, moved);
            b.r.put(rook_src, rook);
            *b.color_mut(C::COLOR) ^= king_bb | rook_bb;
            *b.piece_mut(moved) ^= king_bb;
            *b.piece_mut(rook) ^= rook_bb;
        }
    }

    b.hash = u.hash;
    b.r.ep = u.ep;
    b.r.castling = u.castling;
    b.r.halfmove = u.halfmove;
    if C::COLOR == Color::Black {
        b.r.fullmove = b.r.fullmove.saturating_sub(1);
    }
    b.r.side = C::COLOR;
    b.all = b.white | b.black;

    #[cfg(feature = "selftest")]
    b.selftest();
}

/// Applies a pseudolegal move in place
///
/// The move may leave the mover's king in check; callers test that with
/// [`Board::is_opponent_king_attacked()`] afterwards. Passing a move that is not
/// pseudolegal for `b` corrupts the board.
pub fn make_move(b: &mut Board, mv: Move) -> Undo {
    match b.r.side {
        Color::White => do_make_move::<generic::White>(b, mv),
        Color::Black => do_make_move::<generic::Black>(b, mv),
    }
}

/// Takes back the move recorded in `u`, which must be the last move made on `b`
pub fn unmake_move(b: &mut Board, u: Undo) {
    match b.r.side {
        Color::White => do_unmake_move::<generic::Black>(b, u),
        Color::Black => do_unmake_move::<generic::White>(b, u),
    }
}

fn do_is_pseudolegal<C: generic::Color>(b: &Board, mv: Move) -> bool {
    if mv.is_null() {
        return false;
    }
    let src = mv.src();
    let dst = mv.dst();
    let src_cell = b.get(src);
    let dst_cell = b.get(dst);
    if src_cell.color() != Some(C::COLOR) || dst_cell.color() == Some(C::COLOR) {
        return false;
    }

    let pawn = Cell::from_parts(C::COLOR, Piece::Pawn);
    let pawn_step = || {
        if dst_cell.is_occupied() {
            attack::pawn(C::COLOR, src).has(dst)
        } else {
            dst.index() as isize == src.index() as isize + geometry::pawn_forward_delta(C::COLOR)
        }
    };
    let promote_rank = geometry::promote_dst_rank(C::COLOR);

    match mv.kind() {
        MoveKind::Normal => match src_cell.piece() {
            Some(Piece::Pawn) => dst.rank() != promote_rank && pawn_step(),
            Some(Piece::Knight) => attack::knight(src).has(dst),
            Some(Piece::Bishop) => attack::bishop(src, b.all).has(dst),
            Some(Piece::Rook) => attack::rook(src, b.all).has(dst),
            Some(Piece::Queen) => attack::queen(src, b.all).has(dst),
            Some(Piece::King) => attack::king(src).has(dst),
            None => false,
        },
        MoveKind::PromoteKnight
        | MoveKind::PromoteBishop
        | MoveKind::PromoteRook
        | MoveKind::PromoteQueen => src_cell == pawn && dst.rank() == promote_rank && pawn_step(),
        MoveKind::PawnDouble => {
            if src_cell != pawn || src.rank() != geometry::double_move_src_rank(C::COLOR) {
                return false;
            }
            let fwd = geometry::pawn_forward_delta(C::COLOR);
            let mid = src.add(fwd);
            dst == mid.add(fwd) && b.get(mid).is_empty() && dst_cell.is_empty()
        }
        MoveKind::Enpassant => {
            src_cell == pawn && b.r.ep == Some(dst) && attack::pawn(C::COLOR, src).has(dst)
        }
        MoveKind::Castling => {
            let Some(side) = mv.castling_side() else {
                return false;
            };
            mv == Move::from_castling(C::COLOR, side)
                && b.r.castling.has(C::COLOR, side)
                && (castling::path(C::COLOR, side) & b.all).is_empty()
                && (castling::pass(C::COLOR, side) & b.attacked_squares(C::COLOR.inv()))
                    .is_empty()
        }
    }
}

/// Checks that `mv` could be produced by the move generator for `b`
///
/// Useful to verify moves coming from the transposition table, which may belong to
/// a different position with the same hash tag.
pub fn is_pseudolegal(b: &Board, mv: Move) -> bool {
    match b.r.side {
        Color::White => do_is_pseudolegal::<generic::White>(b, mv),
        Color::Black => do_is_pseudolegal::<generic::Black>(b, mv),
    }
}
