//! Move path enumeration, the standard move generator self-check

use crate::board::Board;
use crate::movegen::{self, MoveList};
use crate::moves::{self, Move};

fn do_perft(b: &mut Board, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut moves = MoveList::new();
    movegen::gen_all_into(b, &mut moves);
    let mut res = 0;
    for &mv in &moves {
        let u = moves::make_move(b, mv);
        if !b.is_opponent_king_attacked() {
            res += match depth {
                1 => 1,
                _ => do_perft(b, depth - 1),
            };
        }
        moves::unmake_move(b, u);
    }
    res
}

/// Number of legal move sequences of length `depth` from `b`
pub fn perft(b: &Board, depth: usize) -> u64 {
    do_perft(&mut b.clone(), depth)
}

/// Perft split by the first move, in generation order
pub fn divide(b: &Board, depth: usize) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    let mut b = b.clone();
    let mut res = Vec::new();
    for &mv in &movegen::gen_all(&b) {
        let u = moves::make_move(&mut b, mv);
        if !b.is_opponent_king_attacked() {
            res.push((mv, do_perft(&mut b, depth - 1)));
        }
        moves::unmake_move(&mut b, u);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial() {
        let b = Board::initial();
        assert_eq!(perft(&b, 0), 1);
        assert_eq!(perft(&b, 1), 20);
        assert_eq!(perft(&b, 2), 400);
        assert_eq!(perft(&b, 3), 8902);
        assert_eq!(perft(&b, 4), 197281);
    }

    #[test]
    fn test_tricky() {
        for (fen, counts) in [
            (
                "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
                &[48, 2039, 97862][..],
            ),
            ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", &[14, 191, 2812, 43238][..]),
            (
                "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
                &[6, 264, 9467][..],
            ),
            (
                "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
                &[44, 1486, 62379][..],
            ),
        ] {
            let b = Board::from_fen(fen).unwrap();
            for (depth, &count) in counts.iter().enumerate() {
                assert_eq!(perft(&b, depth + 1), count, "{} at depth {}", fen, depth + 1);
            }
        }
    }

    #[test]
    fn test_divide() {
        let b = Board::initial();
        let split = divide(&b, 3);
        assert_eq!(split.len(), 20);
        assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), 8902);
        let e2e4 = Move::from_uci("e2e4", &b).unwrap();
        assert_eq!(split.iter().find(|(m, _)| *m == e2e4).map(|x| x.1), Some(600));
    }
}
