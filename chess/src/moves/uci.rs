//! Moves in UCI notation, like `e2e4`, `e7e8q` or `0000`

use super::base::{self, MoveKind, ValidateError};
use crate::board::Board;
use crate::types::{Cell, Color, Coord, CoordParseError, File, Piece};
use crate::{generic, geometry};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing a UCI string
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum RawParseError {
    #[error("bad string length")]
    BadLength,
    #[error("bad source: {0}")]
    BadSrc(CoordParseError),
    #[error("bad destination: {0}")]
    BadDst(CoordParseError),
    #[error("bad promote char {0:?}")]
    BadPromote(char),
}

/// Error parsing a UCI string into a legal [`base::Move`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("cannot parse move: {0}")]
    Parse(#[from] RawParseError),
    #[error("invalid move: {0}")]
    Validate(#[from] ValidateError),
}

/// Move in UCI notation, detached from any position
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Move {
    Null,
    Move {
        src: Coord,
        dst: Coord,
        promote: Option<Piece>,
    },
}

impl Move {
    fn do_into_move<C: generic::Color>(&self, b: &Board) -> base::Move {
        let (src, dst, promote) = match *self {
            Move::Null => return base::Move::NULL,
            Move::Move { src, dst, promote } => (src, dst, promote),
        };
        if let Some(kind) = promote.and_then(MoveKind::from_promote) {
            return base::Move::new(kind, src, dst);
        }

        let cell = b.get(src);
        if cell == Cell::from_parts(C::COLOR, Piece::Pawn) {
            let fwd = geometry::pawn_forward_delta(C::COLOR);
            if src.rank() == geometry::double_move_src_rank(C::COLOR)
                && dst.index() as isize == src.index() as isize + 2 * fwd
            {
                return base::Move::new(MoveKind::PawnDouble, src, dst);
            }
            if src.file() != dst.file() && b.ep() == Some(dst) {
                return base::Move::new(MoveKind::Enpassant, src, dst);
            }
        }

        if cell == Cell::from_parts(C::COLOR, Piece::King) {
            let rank = geometry::castling_rank(C::COLOR);
            if src == Coord::from_parts(File::E, rank)
                && (dst == Coord::from_parts(File::G, rank)
                    || dst == Coord::from_parts(File::C, rank))
            {
                return base::Move::new(MoveKind::Castling, src, dst);
            }
        }

        base::Move::new(MoveKind::Normal, src, dst)
    }

    /// Converts into [`base::Move`], inferring the move kind from position `b`
    ///
    /// No legality checks are made.
    pub fn into_move(self, b: &Board) -> base::Move {
        match b.side() {
            Color::White => self.do_into_move::<generic::White>(b),
            Color::Black => self.do_into_move::<generic::Black>(b),
        }
    }
}

impl From<base::Move> for Move {
    #[inline]
    fn from(mv: base::Move) -> Move {
        if mv.is_null() {
            return Move::Null;
        }
        Move::Move {
            src: mv.src(),
            dst: mv.dst(),
            promote: mv.promote(),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Move::Null => write!(f, "0000"),
            Move::Move { src, dst, promote } => {
                write!(f, "{}{}", src, dst)?;
                match promote {
                    Some(Piece::Knight) => write!(f, "n"),
                    Some(Piece::Bishop) => write!(f, "b"),
                    Some(Piece::Rook) => write!(f, "r"),
                    Some(Piece::Queen) => write!(f, "q"),
                    _ => Ok(()),
                }
            }
        }
    }
}

impl FromStr for Move {
    type Err = RawParseError;

    fn from_str(s: &str) -> Result<Move, Self::Err> {
        if s == "0000" {
            return Ok(Move::Null);
        }
        if !s.is_ascii() || !matches!(s.len(), 4 | 5) {
            return Err(RawParseError::BadLength);
        }
        let src = Coord::from_str(&s[0..2]).map_err(RawParseError::BadSrc)?;
        let dst = Coord::from_str(&s[2..4]).map_err(RawParseError::BadDst)?;
        let promote = if s.len() == 5 {
            Some(match s.as_bytes()[4] {
                b'n' => Piece::Knight,
                b'b' => Piece::Bishop,
                b'r' => Piece::Rook,
                b'q' => Piece::Queen,
                b => return Err(RawParseError::BadPromote(b as char)),
            })
        } else {
            None
        };
        Ok(Move::Move { src, dst, promote })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rank;

    #[test]
    fn test_simple() {
        let b = Board::initial();
        assert_eq!(Move::from_str("0000").unwrap(), Move::Null);
        assert_eq!(Move::Null.into_move(&b), base::Move::NULL);

        let e2 = Coord::from_parts(File::E, Rank::R2);
        let e4 = Coord::from_parts(File::E, Rank::R4);
        let mv = Move::from_str("e2e4").unwrap();
        assert_eq!(
            mv,
            Move::Move {
                src: e2,
                dst: e4,
                promote: None
            }
        );
        assert_eq!(
            mv.into_move(&b),
            base::Move::new(MoveKind::PawnDouble, e2, e4)
        );
        assert_eq!(mv.to_string(), "e2e4");
    }

    #[test]
    fn test_kinds() {
        let b = Board::from_fen("r3k2r/1P6/8/3pP3/8/8/8/R3K2R w KQkq d6 0 1").unwrap();
        for (s, kind) in [
            ("e1g1", MoveKind::Castling),
            ("e1c1", MoveKind::Castling),
            ("e1f1", MoveKind::Normal),
            ("e5d6", MoveKind::Enpassant),
            ("e5e6", MoveKind::Normal),
            ("b7a8q", MoveKind::PromoteQueen),
            ("b7b8n", MoveKind::PromoteKnight),
        ] {
            let mv = Move::from_str(s).unwrap().into_move(&b);
            assert_eq!(mv.kind(), kind, "{}", s);
            assert_eq!(mv.to_string(), s);
        }
    }

    #[test]
    fn test_errors() {
        assert_eq!(Move::from_str("e2e"), Err(RawParseError::BadLength));
        assert_eq!(Move::from_str("e2e4qq"), Err(RawParseError::BadLength));
        assert!(matches!(
            Move::from_str("i2e4"),
            Err(RawParseError::BadSrc(_))
        ));
        assert!(matches!(
            Move::from_str("e2e9"),
            Err(RawParseError::BadDst(_))
        ));
        assert_eq!(
            Move::from_str("e7e8k"),
            Err(RawParseError::BadPromote('k'))
        );
    }
}
