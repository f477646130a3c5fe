// SPDX-License-Identifier: GPL-3.0-or-later

use crate::misc;
use crate::types::*;

use std::sync::OnceLock;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Bitboard(pub u64);

// popcount() counts the set bits with the classic SWAR reduction: pairs,
// nibbles, bytes, then a multiply that sums all bytes into the top one.
pub fn popcount(bb: Bitboard) -> u32 {
    const K1: u64 = 0x5555555555555555;
    const K2: u64 = 0x3333333333333333;
    const K4: u64 = 0x0f0f0f0f0f0f0f0f;
    const KF: u64 = 0x0101010101010101;

    let mut x = bb.0;
    x -= (x >> 1) & K1;
    x = (x & K2) + ((x >> 2) & K2);
    x = (x + (x >> 4)) & K4;
    (u64::wrapping_mul(x, KF) >> 56) as u32
}

pub const ALL_SQUARES: Bitboard = Bitboard(!0u64);

pub const FILEA_BB: Bitboard = Bitboard(0x0101010101010101);
pub const FILEH_BB: Bitboard = Bitboard(0x8080808080808080);

pub const RANK1_BB: Bitboard = Bitboard(0xff);
pub const RANK3_BB: Bitboard = Bitboard(0xff0000);
pub const RANK6_BB: Bitboard = Bitboard(0xff0000000000);
pub const RANK8_BB: Bitboard = Bitboard(0xff00000000000000);

impl std::convert::From<Square> for Bitboard {
    fn from(s: Square) -> Self {
        debug_assert!(s.is_ok());
        Bitboard(1u64 << s.0)
    }
}

impl Square {
    pub fn bb(self) -> Bitboard {
        Bitboard::from(self)
    }
}

impl std::ops::BitOr<Bitboard> for Bitboard {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Bitboard(self.0 | rhs.0)
    }
}

impl std::ops::BitOr<Square> for Bitboard {
    type Output = Bitboard;
    fn bitor(self, rhs: Square) -> Self {
        self | Bitboard::from(rhs)
    }
}

impl std::ops::BitAnd<Bitboard> for Bitboard {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Bitboard(self.0 & rhs.0)
    }
}

impl std::ops::BitAnd<Square> for Bitboard {
    type Output = Bitboard;
    fn bitand(self, rhs: Square) -> Self {
        self & Bitboard::from(rhs)
    }
}

impl std::ops::BitXor<Bitboard> for Bitboard {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl std::ops::BitXor<Square> for Bitboard {
    type Output = Bitboard;
    fn bitxor(self, rhs: Square) -> Self {
        self ^ Bitboard::from(rhs)
    }
}

impl std::ops::Not for Bitboard {
    type Output = Bitboard;
    fn not(self) -> Self {
        Bitboard(!self.0)
    }
}

impl std::ops::Shl<i32> for Bitboard {
    type Output = Bitboard;
    fn shl(self, rhs: i32) -> Self {
        Bitboard(self.0 << rhs)
    }
}

impl std::ops::Shr<i32> for Bitboard {
    type Output = Bitboard;
    fn shr(self, rhs: i32) -> Self {
        Bitboard(self.0 >> rhs)
    }
}

impl<RHS> std::ops::BitOrAssign<RHS> for Bitboard
    where Bitboard: std::ops::BitOr<RHS, Output=Bitboard>
{
    fn bitor_assign(&mut self, rhs: RHS) {
        *self = *self | rhs;
    }
}

impl<RHS> std::ops::BitAndAssign<RHS> for Bitboard
    where Bitboard: std::ops::BitAnd<RHS, Output=Bitboard>
{
    fn bitand_assign(&mut self, rhs: RHS) {
        *self = *self & rhs;
    }
}

impl<RHS> std::ops::BitXorAssign<RHS> for Bitboard
    where Bitboard: std::ops::BitXor<RHS, Output=Bitboard>
{
    fn bitxor_assign(&mut self, rhs: RHS) {
        *self = *self ^ rhs;
    }
}

impl std::cmp::PartialEq<u64> for Bitboard {
    fn eq(&self, rhs: &u64) -> bool {
        debug_assert!(*rhs == 0);
        self.0 == *rhs
    }
}

impl std::fmt::Display for Bitboard {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for s in *self {
            write!(f, "{} ", s)?;
        }
        Ok(())
    }
}

pub fn more_than_one(b: Bitboard) -> bool {
    (b.0 & u64::wrapping_sub(b.0, 1)) != 0
}

pub fn lsb(b: Bitboard) -> Square {
    debug_assert!(b != 0);
    Square(u64::trailing_zeros(b.0))
}

pub fn pop_lsb(b: &mut Bitboard) -> Square {
    let s = lsb(*b);
    b.0 &= u64::wrapping_sub(b.0, 1);
    s
}

impl Iterator for Bitboard {
    type Item = Square;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 != 0 {
            Some(pop_lsb(self))
        } else {
            None
        }
    }
}

pub fn rank_bb(r: Rank) -> Bitboard {
    RANK1_BB << (8 * r as i32)
}

pub fn file_bb(f: File) -> Bitboard {
    FILEA_BB << (f as i32)
}

// shift() moves a bitboard one step along direction D. Mainly for pawns.

impl Bitboard {
    pub fn shift(self, d: Direction) -> Bitboard {
        match d {
            NORTH => self << 8,
            SOUTH => self >> 8,
            NORTH_EAST => (self & !FILEH_BB) << 9,
            SOUTH_EAST => (self & !FILEH_BB) >> 7,
            NORTH_WEST => (self & !FILEA_BB) << 7,
            SOUTH_WEST => (self & !FILEA_BB) >> 9,
            _ => Bitboard(0)
        }
    }
}

pub trait Distance {
    fn distance(x: Self, y: Self) -> u32;
}

impl Distance for u32 {
    fn distance(x: Self, y: Self) -> u32 {
        if x > y { x - y } else { y - x }
    }
}

impl Distance for Square {
    fn distance(x: Self, y: Self) -> u32 {
        std::cmp::max(File::distance(x.file(), y.file()),
                      Rank::distance(x.rank(), y.rank()))
    }
}

const ROOK_DIRS: [Direction; 4] = [NORTH, EAST, SOUTH, WEST];
const BISHOP_DIRS: [Direction; 4] =
    [NORTH_EAST, SOUTH_EAST, SOUTH_WEST, NORTH_WEST];

// Magic holds all data relevant to magic bitboards for a single square.
// The attack sets of all squares of one slider kind share a single table,
// 'offset' locates the slice of this square.
#[derive(Clone, Copy, Default)]
struct Magic {
    mask: Bitboard,
    magic: u64,
    offset: usize,
    shift: u32,
}

impl Magic {
    fn index(&self, occupied: Bitboard) -> usize {
        self.offset
            + (u64::wrapping_mul((occupied & self.mask).0, self.magic)
                >> self.shift) as usize
    }
}

// AttackTables answers "which squares does a piece on s attack, given the
// blockers b" in constant time. Built once, read-only afterwards.
pub struct AttackTables {
    pseudo: [[Bitboard; 64]; 8],
    pawn: [[Bitboard; 64]; 2],
    rook_magics: [Magic; 64],
    bishop_magics: [Magic; 64],
    rook_table: Vec<Bitboard>,
    bishop_table: Vec<Bitboard>,
    between: Vec<[Bitboard; 64]>,
    direction: Vec<[Option<Direction>; 64]>,
}

static TABLES: OnceLock<AttackTables> = OnceLock::new();

// tables() returns the process-wide attack tables, building them on first
// use. OnceLock serializes a racing first call, later calls only read.
pub fn tables() -> &'static AttackTables {
    TABLES.get_or_init(AttackTables::new)
}

// init() forces the tables to be built. Calling it more than once is
// harmless.
pub fn init() {
    let _ = tables();
}

impl AttackTables {
    pub fn new() -> AttackTables {
        let mut t = AttackTables {
            pseudo: [[Bitboard(0); 64]; 8],
            pawn: [[Bitboard(0); 64]; 2],
            rook_magics: [Magic::default(); 64],
            bishop_magics: [Magic::default(); 64],
            rook_table: Vec::new(),
            bishop_table: Vec::new(),
            between: vec![[Bitboard(0); 64]; 64],
            direction: vec![[None; 64]; 64],
        };

        for c in WHITE.take(2) {
            for pt in [PAWN, KNIGHT, KING] {
                let steps: &[i32] = match pt {
                    PAWN => &[7, 9],
                    KNIGHT => &[6, 10, 15, 17],
                    _ => &[1, 7, 8, 9],
                };
                for s in ALL_SQUARES {
                    for &d in steps {
                        let to = s
                            + if c == WHITE { Direction(d) } else { -Direction(d) };
                        if to.is_ok() && Square::distance(s, to) < 3 {
                            if pt == PAWN {
                                t.pawn[c.0 as usize][s.0 as usize] |= to;
                            } else {
                                t.pseudo[pt.0 as usize][s.0 as usize] |= to;
                            }
                        }
                    }
                }
            }
        }

        init_magics(&mut t.rook_table, &mut t.rook_magics, &ROOK_DIRS);
        init_magics(&mut t.bishop_table, &mut t.bishop_magics, &BISHOP_DIRS);

        for s1 in ALL_SQUARES {
            let b_att = t.attacks_bb(BISHOP, s1, Bitboard(0));
            let r_att = t.attacks_bb(ROOK, s1, Bitboard(0));
            t.pseudo[BISHOP.0 as usize][s1.0 as usize] = b_att;
            t.pseudo[ROOK.0   as usize][s1.0 as usize] = r_att;
            t.pseudo[QUEEN.0  as usize][s1.0 as usize] = b_att | r_att;

            for pt in [BISHOP, ROOK] {
                for s2 in t.pseudo[pt.0 as usize][s1.0 as usize] {
                    t.between[s1.0 as usize][s2.0 as usize] =
                        t.attacks_bb(pt, s1, s2.bb())
                        & t.attacks_bb(pt, s2, s1.bb());
                }
            }

            for &d in ROOK_DIRS.iter().chain(BISHOP_DIRS.iter()) {
                for s2 in sliding_attack(&[d], s1, Bitboard(0)) {
                    t.direction[s1.0 as usize][s2.0 as usize] = Some(d);
                }
            }
        }

        tracing::debug!(
            rook_entries = t.rook_table.len(),
            bishop_entries = t.bishop_table.len(),
            "attack tables built"
        );

        t
    }

    // attacks_bb() returns a bitboard representing all the squares attacked
    // by a piece of type pt placed on 's'. Pawns need pawn_attacks().
    pub fn attacks_bb(&self, pt: PieceType, s: Square, occupied: Bitboard)
        -> Bitboard
    {
        match pt {
            BISHOP => {
                let m = &self.bishop_magics[s.0 as usize];
                self.bishop_table[m.index(occupied)]
            }
            ROOK => {
                let m = &self.rook_magics[s.0 as usize];
                self.rook_table[m.index(occupied)]
            }
            QUEEN => {
                self.attacks_bb(BISHOP, s, occupied)
                    | self.attacks_bb(ROOK, s, occupied)
            }
            _ => self.pseudo_attacks(pt, s)
        }
    }

    pub fn pseudo_attacks(&self, pt: PieceType, s: Square) -> Bitboard {
        self.pseudo[pt.0 as usize][s.0 as usize]
    }

    pub fn pawn_attacks(&self, c: Color, s: Square) -> Bitboard {
        self.pawn[c.0 as usize][s.0 as usize]
    }

    pub fn between_bb(&self, s1: Square, s2: Square) -> Bitboard {
        self.between[s1.0 as usize][s2.0 as usize]
    }

    pub fn direction(&self, s1: Square, s2: Square) -> Option<Direction> {
        self.direction[s1.0 as usize][s2.0 as usize]
    }
}

impl Default for AttackTables {
    fn default() -> Self {
        AttackTables::new()
    }
}

// between_bb() returns a bitboard representing all the squares between the
// two given ones. For instance, between_bb(Square::C4, Square::F7) returns
// a bitboard with the bits for squares d5 and e6 set. If s1 and s2 are not
// on the same rank, file or diagonal, an empty bitboard is returned.

pub fn between_bb(s1: Square, s2: Square) -> Bitboard {
    tables().between_bb(s1, s2)
}

// direction() gives the ray step leading from s1 to s2, None if the two
// squares share no rank, file or diagonal.

pub fn direction(s1: Square, s2: Square) -> Option<Direction> {
    tables().direction(s1, s2)
}

pub fn pseudo_attacks(pt: PieceType, s: Square) -> Bitboard {
    tables().pseudo_attacks(pt, s)
}

pub fn pawn_attacks(c: Color, s: Square) -> Bitboard {
    tables().pawn_attacks(c, s)
}

pub fn attacks_bb(pt: PieceType, s: Square, occupied: Bitboard) -> Bitboard {
    tables().attacks_bb(pt, s, occupied)
}

pub fn sliding_attack(
    directions: &[Direction], sq: Square, occupied: Bitboard
) -> Bitboard {
    let mut attack = Bitboard(0);
    for &d in directions {
        let mut s = sq + d;
        while s.is_ok() && Square::distance(s, s - d) == 1 {
            attack |= s;
            if occupied & s != 0 {
                break;
            }
            s += d;
        }
    }
    attack
}

// init_magics() computes all rook or bishop attacks. Magic bitboards are
// used to look up attacks of sliding pieces. As a reference see
// chessprogramming.org/Magic_Bitboards. In particular, here we use the
// so-called "fancy" approach.

fn init_magics(
    table: &mut Vec<Bitboard>, magics: &mut [Magic; 64],
    directions: &[Direction]
) {
    // PRNG seeds per rank that find working magics quickly
    const SEEDS: [u64; 8] = [728, 10316, 55013, 32803, 12281, 15100, 16645, 255];

    let mut occupancy = [Bitboard(0); 4096];
    let mut reference = [Bitboard(0); 4096];
    let mut epoch = [0u32; 4096];
    let mut cnt = 0;

    for s in ALL_SQUARES {
        // Board edges are not considered in the relevant occupancies
        let edges =
            ((RANK1_BB | RANK8_BB) & !rank_bb(s.rank()))
            | ((FILEA_BB | FILEH_BB) & !file_bb(s.file()));

        // The mask is the bitboard of sliding attacks from 's' on an empty
        // board without the edges. The table slice of 's' holds one entry
        // for each subset of the mask, hence the shift.
        let m = &mut magics[s.0 as usize];
        m.mask = sliding_attack(directions, s, Bitboard(0)) & !edges;
        m.shift = 64 - popcount(m.mask);
        m.offset = table.len();

        // Carry-Rippler trick to enumerate all subsets of the mask and
        // store the corresponding sliding attack bitboard in reference[].
        let mut b = Bitboard(0);
        let mut size: usize = 0;
        loop {
            occupancy[size] = b;
            reference[size] = sliding_attack(directions, s, b);
            size += 1;
            b = Bitboard(u64::wrapping_sub(b.0, m.mask.0) & m.mask.0);
            if b == 0 { break; }
        }
        table.resize(m.offset + size, Bitboard(0));

        let mut rng = misc::Prng::new(SEEDS[s.rank() as usize]);
        loop {
            loop {
                m.magic = rng.sparse_rand();
                if (u64::wrapping_mul(m.magic, m.mask.0) >> 56).count_ones()
                    >= 6
                {
                    break;
                }
            }

            // A good magic maps every occupancy to an index that looks up
            // the correct sliding attack. The slice is filled while the
            // magic is verified; epoch[] marks entries written during the
            // current attempt so a failed attempt needs no reset.
            cnt += 1;
            let mut i = 0;
            while i < size {
                let idx = m.index(occupancy[i]) - m.offset;
                if epoch[idx] < cnt {
                    epoch[idx] = cnt;
                    table[m.offset + idx] = reference[i];
                } else if table[m.offset + idx] != reference[i] {
                    break;
                }
                i += 1;
            }
            if i >= size {
                break;
            }
        }
    }
}
