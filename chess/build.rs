use std::path::Path;
use std::{env, io};

use rand_core::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub fn default_gen() -> impl RngCore {
    Xoshiro256PlusPlus::seed_from_u64(0x800D_BA5E_5EED_1234_u64)
}

mod zobrist {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use magpie_base::types::Cell;
    use rand_core::RngCore;

    struct Zobrist {
        pieces: [[u64; 64]; Cell::COUNT],
        move_side: u64,
        castling: [u64; 16],
        enpassant: [u64; 8],
    }

    impl Zobrist {
        fn generate<R: RngCore>(gen: &mut R) -> Zobrist {
            let pieces = {
                let mut res = [[0_u64; 64]; Cell::COUNT];
                // Empty cell keeps zero keys, so captures of nothing hash to nothing
                for sub in res.iter_mut().skip(1) {
                    for x in sub {
                        *x = gen.next_u64();
                    }
                }
                res
            };
            let castling = {
                let base = [(); 4].map(|_| gen.next_u64());
                let mut res = [0_u64; 16];
                for (i, val) in res.iter_mut().enumerate() {
                    for (j, base_val) in base.iter().enumerate() {
                        if (i >> j) & 1 != 0 {
                            *val ^= base_val;
                        }
                    }
                }
                res
            };
            Zobrist {
                pieces,
                move_side: gen.next_u64(),
                castling,
                enpassant: [(); 8].map(|_| gen.next_u64()),
            }
        }

        fn generate_default() -> Zobrist {
            Self::generate(&mut super::default_gen())
        }

        fn output<W: Write>(&self, w: &mut W) -> io::Result<()> {
            writeln!(w, "const PIECES: [[u64; 64]; Cell::COUNT] = [")?;
            for (i, sub) in self.pieces.iter().enumerate() {
                writeln!(w, "    /*{:2}*/ [", i)?;
                for (i, hsh) in sub.iter().enumerate() {
                    writeln!(w, "        /*{:2}*/ {:#x},", i, hsh)?;
                }
                writeln!(w, "    ],")?;
            }
            writeln!(w, "];\n")?;

            writeln!(w, "pub const MOVE_SIDE: u64 = {:#x};\n", self.move_side)?;

            writeln!(w, "const CASTLING: [u64; 16] = [")?;
            for (i, sub) in self.castling.iter().enumerate() {
                writeln!(w, "    /*{:2}*/ {:#x},", i, sub)?;
            }
            writeln!(w, "];\n")?;

            writeln!(w, "const ENPASSANT: [u64; 8] = [")?;
            for (i, sub) in self.enpassant.iter().enumerate() {
                writeln!(w, "    /*{}*/ {:#x},", i, sub)?;
            }
            writeln!(w, "];")?;

            Ok(())
        }
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        Zobrist::generate_default().output(&mut BufWriter::new(&fs::File::create(out_path)?))?;
        Ok(())
    }
}

mod near_attacks {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use magpie_base::bitboard::Bitboard;
    use magpie_base::types::Coord;

    fn generate_directed<const N: usize>(d_file: [isize; N], d_rank: [isize; N]) -> [Bitboard; 64] {
        let mut res = [Bitboard::EMPTY; 64];
        for c in Coord::iter() {
            let mut bb = Bitboard::EMPTY;
            for (&delta_file, &delta_rank) in d_file.iter().zip(d_rank.iter()) {
                if let Some(nc) = c.shift(delta_file, delta_rank) {
                    bb.set(nc);
                }
            }
            res[c.index()] = bb;
        }
        res
    }

    fn print_bitboards<W: Write>(w: &mut W, name: &str, bs: [Bitboard; 64]) -> io::Result<()> {
        writeln!(w, "const {}: [Bitboard; 64] = [", name)?;
        for (i, b) in bs.iter().enumerate() {
            writeln!(w, "    /*{:2}*/ bb(0x{:016x}),", i, b.as_raw())?;
        }
        writeln!(w, "];")?;
        Ok(())
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        let f = fs::File::create(out_path)?;
        let mut w = BufWriter::new(&f);

        print_bitboards(
            &mut w,
            "KING_ATTACKS",
            generate_directed([-1, -1, -1, 0, 0, 1, 1, 1], [-1, 0, 1, -1, 1, -1, 0, 1]),
        )?;
        writeln!(&mut w)?;
        print_bitboards(
            &mut w,
            "KNIGHT_ATTACKS",
            generate_directed([-2, -2, -1, -1, 2, 2, 1, 1], [-1, 1, -2, 2, -1, 1, -2, 2]),
        )?;
        writeln!(&mut w)?;
        print_bitboards(
            &mut w,
            "WHITE_PAWN_ATTACKS",
            generate_directed([-1, 1], [1, 1]),
        )?;
        writeln!(&mut w)?;
        print_bitboards(
            &mut w,
            "BLACK_PAWN_ATTACKS",
            generate_directed([-1, 1], [-1, -1]),
        )?;

        Ok(())
    }
}

mod magic {
    use std::io::{self, BufWriter, Write};
    use std::{fs, path::Path};

    use magpie_base::bitboard::Bitboard;
    use magpie_base::types::Coord;
    use rand_core::RngCore;

    trait Magic {
        const NAME: &'static str;
        const DIRS: [(isize, isize); 4];

        /// Squares whose occupancy affects the attack from `c`
        ///
        /// The last square of every ray is dropped, as the ray stops there regardless
        /// of whether it is occupied.
        fn build_mask(c: Coord) -> Bitboard {
            let mut res = Bitboard::EMPTY;
            for &(delta_file, delta_rank) in &Self::DIRS {
                let mut p = c;
                while let Some(np) = p.shift(delta_file, delta_rank) {
                    if np.shift(delta_file, delta_rank).is_none() {
                        break;
                    }
                    res.set(np);
                    p = np;
                }
            }
            res
        }

        fn attack(c: Coord, occupied: Bitboard) -> Bitboard {
            let mut res = Bitboard::EMPTY;
            for &(delta_file, delta_rank) in &Self::DIRS {
                let mut p = c;
                while let Some(np) = p.shift(delta_file, delta_rank) {
                    res.set(np);
                    if occupied.has(np) {
                        break;
                    }
                    p = np;
                }
            }
            res
        }
    }

    struct BishopMagic;
    struct RookMagic;

    impl Magic for RookMagic {
        const NAME: &'static str = "ROOK";
        const DIRS: [(isize, isize); 4] = [(0, 1), (0, -1), (-1, 0), (1, 0)];
    }

    impl Magic for BishopMagic {
        const NAME: &'static str = "BISHOP";
        const DIRS: [(isize, isize); 4] = [(-1, 1), (-1, -1), (1, -1), (1, 1)];
    }

    struct Found {
        magic: u64,
        bits: u32,
        lookup: Vec<Bitboard>,
    }

    fn gen_sparse_number<R: RngCore>(r: &mut R) -> u64 {
        r.next_u64() & r.next_u64() & r.next_u64()
    }

    fn magic_index(occupied: Bitboard, magic: u64, bits: u32) -> usize {
        (occupied.as_raw().wrapping_mul(magic) >> (64 - bits)) as usize
    }

    /// Searches for a magic constant that maps every blocker subset of the mask into
    /// a slot holding its attack set
    ///
    /// Two subsets may share a slot only if their attacks are equal.
    fn find_magic<M: Magic, R: RngCore>(c: Coord, r: &mut R) -> Found {
        let mask = M::build_mask(c);
        let bits = mask.len();
        let count = 1_usize << bits;
        let occupancies: Vec<Bitboard> = (0..count as u64).map(|i| mask.deposit_bits(i)).collect();
        let attacks: Vec<Bitboard> = occupancies.iter().map(|&o| M::attack(c, o)).collect();

        let mut lookup = vec![Bitboard::EMPTY; count];
        let mut epoch = vec![0_u32; count];
        let mut attempt = 0_u32;
        loop {
            let magic = gen_sparse_number(r);
            if (mask.as_raw().wrapping_mul(magic) & 0xff00_0000_0000_0000).count_ones() < 6 {
                continue;
            }
            attempt += 1;
            let ok = occupancies.iter().zip(attacks.iter()).all(|(&occ, &att)| {
                let idx = magic_index(occ, magic, bits);
                if epoch[idx] != attempt {
                    epoch[idx] = attempt;
                    lookup[idx] = att;
                    true
                } else {
                    lookup[idx] == att
                }
            });
            if ok {
                return Found {
                    magic,
                    bits,
                    lookup,
                };
            }
        }
    }

    fn gen_magic_tables<M: Magic, W: Write, R: RngCore>(w: &mut W, r: &mut R) -> io::Result<()> {
        let found: Vec<Found> = Coord::iter().map(|c| find_magic::<M, _>(c, r)).collect();

        writeln!(w, "static MAGIC_{}: [MagicEntry; 64] = [", M::NAME)?;
        let mut offset = 0;
        for (c, f) in Coord::iter().zip(found.iter()) {
            writeln!(
                w,
                "    /*{:2}*/ MagicEntry {{ mask: bb(0x{:016x}), magic: 0x{:016x}, shift: {}, offset: {} }},",
                c.index(),
                M::build_mask(c).as_raw(),
                f.magic,
                64 - f.bits,
                offset,
            )?;
            offset += f.lookup.len();
        }
        writeln!(w, "];")?;

        writeln!(w)?;

        writeln!(
            w,
            "static MAGIC_LOOKUP_{}: [Bitboard; {}] = [",
            M::NAME,
            offset
        )?;
        for (c, f) in Coord::iter().zip(found.iter()) {
            writeln!(w, "    // {}", c)?;
            for b in &f.lookup {
                writeln!(w, "    bb(0x{:016x}),", b.as_raw())?;
            }
        }
        writeln!(w, "];")?;

        Ok(())
    }

    pub fn gen(out_path: &Path) -> io::Result<()> {
        let f = fs::File::create(out_path)?;
        let mut w = BufWriter::new(&f);
        let mut r = super::default_gen();
        gen_magic_tables::<BishopMagic, _, _>(&mut w, &mut r)?;
        writeln!(w)?;
        gen_magic_tables::<RookMagic, _, _>(&mut w, &mut r)?;
        Ok(())
    }
}

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = env::var("OUT_DIR").map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    zobrist::gen(&Path::new(&out_dir).join("zobrist.rs"))?;
    near_attacks::gen(&Path::new(&out_dir).join("near_attacks.rs"))?;
    magic::gen(&Path::new(&out_dir).join("magic.rs"))?;

    Ok(())
}
