//! Pseudolegal move generation
//!
//! Generated moves may leave the mover's king in check. The search and perft reject
//! such moves after applying them, see [`Board::is_opponent_king_attacked()`].

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::moves::{self, Move, MoveKind};
use crate::types::{CastlingSide, Color, Coord, Piece};
use crate::{attack, bitboard_consts, castling, generic, geometry, pawns};

use std::convert::Infallible;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::slice;

use arrayvec::ArrayVec;

fn do_is_cell_attacked<C: generic::Color>(b: &Board, coord: Coord) -> bool {
    // Attacks are traced back from the target square, so the pawn map of the other
    // color is used
    let pawn_attacks = attack::pawn(C::COLOR.inv(), coord);

    if (b.piece2(C::COLOR, Piece::Pawn) & pawn_attacks).is_nonempty()
        || (b.piece2(C::COLOR, Piece::King) & attack::king(coord)).is_nonempty()
        || (b.piece2(C::COLOR, Piece::Knight) & attack::knight(coord)).is_nonempty()
    {
        return true;
    }

    (attack::bishop(coord, b.all) & b.piece_diag(C::COLOR)).is_nonempty()
        || (attack::rook(coord, b.all) & b.piece_line(C::COLOR)).is_nonempty()
}

fn do_cell_attackers<C: generic::Color>(b: &Board, coord: Coord) -> Bitboard {
    let pawn_attacks = attack::pawn(C::COLOR.inv(), coord);
    (b.piece2(C::COLOR, Piece::Pawn) & pawn_attacks)
        | (b.piece2(C::COLOR, Piece::King) & attack::king(coord))
        | (b.piece2(C::COLOR, Piece::Knight) & attack::knight(coord))
        | (attack::bishop(coord, b.all) & b.piece_diag(C::COLOR))
        | (attack::rook(coord, b.all) & b.piece_line(C::COLOR))
}

/// Returns `true` if any piece of `color` attacks `coord`
pub fn is_cell_attacked(b: &Board, coord: Coord, color: Color) -> bool {
    match color {
        Color::White => do_is_cell_attacked::<generic::White>(b, coord),
        Color::Black => do_is_cell_attacked::<generic::Black>(b, coord),
    }
}

/// Pieces of `color` attacking `coord`
pub fn cell_attackers(b: &Board, coord: Coord, color: Color) -> Bitboard {
    match color {
        Color::White => do_cell_attackers::<generic::White>(b, coord),
        Color::Black => do_cell_attackers::<generic::Black>(b, coord),
    }
}

trait MaybeMovePush {
    type Err;

    fn push(&mut self, m: Move) -> Result<(), Self::Err>;
}

/// Fixed-capacity list of moves
///
/// No reachable position has more than 256 pseudolegal moves, so pushes never
/// reallocate. Overflowing the list panics.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Move, 256>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, 256>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

/// Sink for generated moves
pub trait MovePush {
    fn push(&mut self, m: Move);
}

impl MovePush for MoveList {
    #[inline]
    fn push(&mut self, m: Move) {
        self.0.push(m);
    }
}

impl MovePush for Vec<Move> {
    #[inline]
    fn push(&mut self, m: Move) {
        self.push(m);
    }
}

impl<T: MovePush> MaybeMovePush for T {
    type Err = Infallible;

    #[inline]
    fn push(&mut self, m: Move) -> Result<(), Self::Err> {
        <Self as MovePush>::push(self, m);
        Ok(())
    }
}

/// Forwards only the moves that keep the mover's king safe
struct LegalFilter<'a, P> {
    board: Board,
    inner: &'a mut P,
}

impl<'a, P: MaybeMovePush> MaybeMovePush for LegalFilter<'a, P> {
    type Err = P::Err;

    fn push(&mut self, mv: Move) -> Result<(), Self::Err> {
        let u = moves::make_move(&mut self.board, mv);
        let is_legal = !self.board.is_opponent_king_attacked();
        moves::unmake_move(&mut self.board, u);
        match is_legal {
            true => self.inner.push(mv),
            false => Ok(()),
        }
    }
}

struct MoveGenImpl<'a, P, C> {
    board: &'a Board,
    dst: &'a mut P,
    _c: PhantomData<C>,
}

impl<'a, P: MaybeMovePush, C: generic::Color> MoveGenImpl<'a, P, C> {
    fn new(board: &'a Board, dst: &'a mut P) -> Self {
        MoveGenImpl {
            board,
            dst,
            _c: PhantomData,
        }
    }

    #[inline]
    fn add_move(&mut self, kind: MoveKind, src: Coord, dst: Coord) -> Result<(), P::Err> {
        self.dst.push(Move::new(kind, src, dst))
    }

    #[inline]
    fn add_pawn_with_promote<const IS_PROMOTE: bool>(
        &mut self,
        src: Coord,
        dst: Coord,
    ) -> Result<(), P::Err> {
        if IS_PROMOTE {
            self.add_move(MoveKind::PromoteKnight, src, dst)?;
            self.add_move(MoveKind::PromoteBishop, src, dst)?;
            self.add_move(MoveKind::PromoteRook, src, dst)?;
            self.add_move(MoveKind::PromoteQueen, src, dst)?;
        } else {
            self.add_move(MoveKind::Normal, src, dst)?;
        }
        Ok(())
    }

    fn do_gen_pawn_push<const IS_PROMOTE: bool>(&mut self, pawns: Bitboard) -> Result<(), P::Err> {
        let back = -geometry::pawn_forward_delta(C::COLOR);
        for dst in pawns::advance_forward(C::COLOR, pawns) & !self.board.all {
            self.add_pawn_with_promote::<IS_PROMOTE>(dst.add(back), dst)?;
        }
        Ok(())
    }

    fn do_gen_pawn_double(&mut self, pawns: Bitboard) -> Result<(), P::Err> {
        let tmp = pawns::advance_forward(C::COLOR, pawns) & !self.board.all;
        let back = -2 * geometry::pawn_forward_delta(C::COLOR);
        for dst in pawns::advance_forward(C::COLOR, tmp) & !self.board.all {
            self.add_move(MoveKind::PawnDouble, dst.add(back), dst)?;
        }
        Ok(())
    }

    fn do_gen_pawn_capture<const IS_PROMOTE: bool>(
        &mut self,
        pawns: Bitboard,
    ) -> Result<(), P::Err> {
        let allowed = self.board.color(C::COLOR.inv());
        let left_delta = geometry::pawn_left_delta(C::COLOR);
        for dst in pawns::advance_left(C::COLOR, pawns) & allowed {
            self.add_pawn_with_promote::<IS_PROMOTE>(dst.add(-left_delta), dst)?;
        }
        let right_delta = geometry::pawn_right_delta(C::COLOR);
        for dst in pawns::advance_right(C::COLOR, pawns) & allowed {
            self.add_pawn_with_promote::<IS_PROMOTE>(dst.add(-right_delta), dst)?;
        }
        Ok(())
    }

    fn gen_pawn_quiet(&mut self) -> Result<(), P::Err> {
        let promote_mask = bitboard_consts::rank(geometry::promote_src_rank(C::COLOR));
        let double_mask = bitboard_consts::rank(geometry::double_move_src_rank(C::COLOR));
        let pawns = self.board.piece2(C::COLOR, Piece::Pawn);
        self.do_gen_pawn_push::<false>(pawns & !promote_mask)?;
        self.do_gen_pawn_double(pawns & double_mask)?;
        self.do_gen_pawn_push::<true>(pawns & promote_mask)?;
        Ok(())
    }

    fn gen_pawn_capture(&mut self) -> Result<(), P::Err> {
        let promote_mask = bitboard_consts::rank(geometry::promote_src_rank(C::COLOR));
        let pawns = self.board.piece2(C::COLOR, Piece::Pawn);
        self.do_gen_pawn_capture::<false>(pawns & !promote_mask)?;
        self.do_gen_pawn_capture::<true>(pawns & promote_mask)?;
        Ok(())
    }

    fn gen_pawn_enpassant(&mut self) -> Result<(), P::Err> {
        if let Some(dst) = self.board.r.ep {
            // Own pawns that could capture onto the target are exactly the squares a
            // pawn of the other color on the target would attack
            let srcs =
                attack::pawn(C::COLOR.inv(), dst) & self.board.piece2(C::COLOR, Piece::Pawn);
            for src in srcs {
                self.add_move(MoveKind::Enpassant, src, dst)?;
            }
        }
        Ok(())
    }

    fn allowed_mask<const QUIET: bool, const CAPTURE: bool>(&self) -> Bitboard {
        match (QUIET, CAPTURE) {
            (true, true) => !self.board.color(C::COLOR),
            (true, false) => !self.board.all,
            (false, true) => self.board.color(C::COLOR.inv()),
            (false, false) => Bitboard::EMPTY,
        }
    }

    fn gen_knight<const QUIET: bool, const CAPTURE: bool>(&mut self) -> Result<(), P::Err> {
        let allowed = self.allowed_mask::<QUIET, CAPTURE>();
        for src in self.board.piece2(C::COLOR, Piece::Knight) {
            for dst in attack::knight(src) & allowed {
                self.add_move(MoveKind::Normal, src, dst)?;
            }
        }
        Ok(())
    }

    fn gen_king<const QUIET: bool, const CAPTURE: bool>(&mut self) -> Result<(), P::Err> {
        let allowed = self.allowed_mask::<QUIET, CAPTURE>();
        let src = self.board.king_pos(C::COLOR);
        for dst in attack::king(src) & allowed {
            self.add_move(MoveKind::Normal, src, dst)?;
        }
        Ok(())
    }

    #[inline]
    fn do_gen_slider<const QUIET: bool, const CAPTURE: bool, const IS_DIAG: bool>(
        &mut self,
        b: Bitboard,
    ) -> Result<(), P::Err> {
        let allowed = self.allowed_mask::<QUIET, CAPTURE>();
        for src in b {
            let attack = match IS_DIAG {
                true => attack::bishop(src, self.board.all),
                false => attack::rook(src, self.board.all),
            };
            for dst in attack & allowed {
                self.add_move(MoveKind::Normal, src, dst)?;
            }
        }
        Ok(())
    }

    fn gen_sliders<const QUIET: bool, const CAPTURE: bool>(&mut self) -> Result<(), P::Err> {
        self.do_gen_slider::<QUIET, CAPTURE, true>(self.board.piece_diag(C::COLOR))?;
        self.do_gen_slider::<QUIET, CAPTURE, false>(self.board.piece_line(C::COLOR))?;
        Ok(())
    }

    fn gen_castling(&mut self) -> Result<(), P::Err> {
        let rights = self.board.r.castling;
        let mut attacked = None;
        for side in [CastlingSide::King, CastlingSide::Queen] {
            if !rights.has(C::COLOR, side)
                || (castling::path(C::COLOR, side) & self.board.all).is_nonempty()
            {
                continue;
            }
            let opp =
                *attacked.get_or_insert_with(|| self.board.attacked_squares(C::COLOR.inv()));
            if (castling::pass(C::COLOR, side) & opp).is_empty() {
                self.dst.push(Move::from_castling(C::COLOR, side))?;
            }
        }
        Ok(())
    }

    fn gen<const QUIET: bool, const CAPTURE: bool>(&mut self) -> Result<(), P::Err> {
        if CAPTURE {
            self.gen_pawn_capture()?;
            self.gen_pawn_enpassant()?;
        }
        if QUIET {
            self.gen_pawn_quiet()?;
        }
        self.gen_knight::<QUIET, CAPTURE>()?;
        self.gen_sliders::<QUIET, CAPTURE>()?;
        self.gen_king::<QUIET, CAPTURE>()?;
        if QUIET {
            self.gen_castling()?;
        }
        Ok(())
    }

    fn gen_for_detect(&mut self) -> Result<(), P::Err> {
        self.gen_king::<true, true>()?;
        self.gen_sliders::<true, true>()?;
        self.gen_knight::<true, true>()?;
        self.gen_pawn_quiet()?;
        self.gen_pawn_capture()?;
        self.gen_pawn_enpassant()?;
        // Castling is skipped: whenever it is legal, the one-square king move towards
        // the rook is legal as well
        Ok(())
    }
}

macro_rules! do_impl {
    ($($(#[$attr:meta])* $name:ident, $name_into:ident, $quiet:expr, $capture:expr;)*) => {
        $(
            $(#[$attr])*
            pub fn $name_into<P: MovePush>(b: &Board, dst: &mut P) {
                let _ = match b.r.side {
                    Color::White => {
                        MoveGenImpl::<_, generic::White>::new(b, dst).gen::<{ $quiet }, { $capture }>()
                    }
                    Color::Black => {
                        MoveGenImpl::<_, generic::Black>::new(b, dst).gen::<{ $quiet }, { $capture }>()
                    }
                };
            }

            $(#[$attr])*
            pub fn $name(b: &Board) -> MoveList {
                let mut res = MoveList::new();
                $name_into(b, &mut res);
                res
            }
        )*
    }
}

do_impl! {
    /// All pseudolegal moves
    gen_all, gen_all_into, true, true;
    /// Captures, capturing promotions and en passant
    gen_captures, gen_captures_into, false, true;
    /// Pushes, double pushes, non-capturing promotions and castling
    gen_quiet, gen_quiet_into, true, false;
}

/// Generators that filter out the moves leaving the king in check
pub mod legal {
    use super::MoveList;
    use crate::board::Board;
    use crate::moves;

    macro_rules! do_impl {
        ($($name:ident;)*) => {
            $(
                pub fn $name(b: &Board) -> MoveList {
                    let mut res = super::$name(b);
                    let mut b_copy = b.clone();
                    res.retain(|mv| {
                        let u = moves::make_move(&mut b_copy, *mv);
                        let ok = !b_copy.is_opponent_king_attacked();
                        moves::unmake_move(&mut b_copy, u);
                        ok
                    });
                    res
                }
            )*
        }
    }

    do_impl! {
        gen_all;
        gen_captures;
        gen_quiet;
    }
}

struct ErrOnFirst;

impl MaybeMovePush for ErrOnFirst {
    type Err = ();

    fn push(&mut self, _mv: Move) -> Result<(), ()> {
        Err(())
    }
}

/// Returns `true` if the side to move has at least one legal move
pub fn has_legal_moves(b: &Board) -> bool {
    let mut err_on_first = ErrOnFirst;
    let mut p = LegalFilter {
        board: b.clone(),
        inner: &mut err_on_first,
    };
    (match b.r.side {
        Color::White => MoveGenImpl::<_, generic::White>::new(b, &mut p).gen_for_detect(),
        Color::Black => MoveGenImpl::<_, generic::Black>::new(b, &mut p).gen_for_detect(),
    })
    .is_err()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{File, Rank};
    use std::collections::BTreeSet;

    fn move_set(ml: &MoveList) -> BTreeSet<String> {
        ml.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_cell_attackers() {
        let b = Board::from_fen("3R3B/8/3R4/1NP1Q3/3p4/1NP5/5B2/3R1K1k w - - 0 1").unwrap();
        let d4 = Coord::from_parts(File::D, Rank::R4);
        assert!(is_cell_attacked(&b, d4, Color::White));
        let attackers = Bitboard::EMPTY
            .with(Coord::from_parts(File::D, Rank::R6))
            .with(Coord::from_parts(File::B, Rank::R5))
            .with(Coord::from_parts(File::E, Rank::R5))
            .with(Coord::from_parts(File::B, Rank::R3))
            .with(Coord::from_parts(File::C, Rank::R3))
            .with(Coord::from_parts(File::F, Rank::R2))
            .with(Coord::from_parts(File::D, Rank::R1));
        assert_eq!(cell_attackers(&b, d4, Color::White), attackers);
        assert!(!is_cell_attacked(&b, d4, Color::Black));
        assert_eq!(cell_attackers(&b, d4, Color::Black), Bitboard::EMPTY);

        let b = Board::from_fen("8/8/8/2KPk3/8/8/8/8 w - - 0 1").unwrap();
        let d5 = Coord::from_parts(File::D, Rank::R5);
        assert_eq!(
            cell_attackers(&b, d5, Color::White),
            Bitboard::from_coord(Coord::from_parts(File::C, Rank::R5)),
        );
        assert_eq!(
            cell_attackers(&b, d5, Color::Black),
            Bitboard::from_coord(Coord::from_parts(File::E, Rank::R5)),
        );
    }

    #[test]
    fn test_initial() {
        let b = Board::initial();
        assert_eq!(gen_all(&b).len(), 20);
        assert_eq!(gen_quiet(&b).len(), 20);
        assert_eq!(gen_captures(&b).len(), 0);
        assert_eq!(legal::gen_all(&b).len(), 20);
    }

    #[test]
    fn test_streams_partition() {
        let b = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let all = move_set(&gen_all(&b));
        let captures = move_set(&gen_captures(&b));
        let quiet = move_set(&gen_quiet(&b));
        assert_eq!(all.len(), 48);
        assert!(captures.is_disjoint(&quiet));
        assert_eq!(
            captures.union(&quiet).cloned().collect::<BTreeSet<_>>(),
            all
        );
        assert_eq!(captures.len(), 8);
        assert!(quiet.contains("e1g1"));
        assert!(quiet.contains("e1c1"));
        for mv in gen_captures(&b).iter() {
            assert!(b.get(mv.dst()).is_occupied() || mv.kind() == MoveKind::Enpassant);
        }
    }

    #[test]
    fn test_promote_and_enpassant() {
        let b = Board::from_fen("1n2k3/P7/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let captures = move_set(&gen_captures(&b));
        let quiet = move_set(&gen_quiet(&b));
        for s in ["a7b8q", "a7b8r", "a7b8b", "a7b8n", "e5d6"] {
            assert!(captures.contains(s), "{}", s);
        }
        for s in ["a7a8q", "a7a8r", "a7a8b", "a7a8n", "e5e6"] {
            assert!(quiet.contains(s), "{}", s);
        }
    }

    #[test]
    fn test_castling_through_check() {
        // The bishop on c4 covers f1 but not d1, so only the long castling is allowed
        let b = Board::from_fen("4k3/8/8/8/2b5/8/8/R3K2R w KQ - 0 1").unwrap();
        let quiet = move_set(&gen_quiet(&b));
        assert!(!quiet.contains("e1g1"));
        assert!(quiet.contains("e1c1"));

        // In check: no castling at all
        let b = Board::from_fen("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1").unwrap();
        let quiet = move_set(&gen_quiet(&b));
        assert!(!quiet.contains("e1g1"));
        assert!(!quiet.contains("e1c1"));

        // Attacked b1 does not matter for the long castling
        let b = Board::from_fen("4k3/8/8/8/8/8/1r6/R3K2R w KQ - 0 1").unwrap();
        let quiet = move_set(&gen_quiet(&b));
        assert!(quiet.contains("e1c1"));
    }

    #[test]
    fn test_legal() {
        let b = Board::from_fen("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        let legal = move_set(&legal::gen_all(&b));
        assert!(!legal.contains("e2d3"));
        assert!(legal.contains("e1d1"));
        assert!(has_legal_moves(&b));
    }
}
