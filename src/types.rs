// SPDX-License-Identifier: GPL-3.0-or-later

// Upper bound on the number of pseudo-legal moves in any reachable position
pub const MAX_MOVES: usize = 256;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Color(pub u32);

pub const WHITE: Color = Color(0);
pub const BLACK: Color = Color(1);

impl std::ops::Not for Color {
    type Output = Color;
    fn not(self) -> Self { Color(self.0 ^ 1) }
}

impl Iterator for Color {
    type Item = Self;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.0;
        self.0 += 1;
        Some(Color(c))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CastlingSide {
    King,
    Queen,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CastlingRight(pub u32);

pub const NO_CASTLING : CastlingRight = CastlingRight(0);
pub const WHITE_OO    : CastlingRight = CastlingRight(1);
pub const WHITE_OOO   : CastlingRight = CastlingRight(2);
pub const BLACK_OO    : CastlingRight = CastlingRight(4);
pub const BLACK_OOO   : CastlingRight = CastlingRight(8);
pub const ANY_CASTLING: CastlingRight = CastlingRight(15);

impl CastlingRight {
    // Both rights of one color
    pub fn both(c: Color) -> CastlingRight {
        CastlingRight(3 << (2 * c.0))
    }
}

impl std::ops::BitOr<CastlingSide> for Color {
    type Output = CastlingRight;
    fn bitor(self, rhs: CastlingSide) -> CastlingRight {
        CastlingRight(1u32 << ((rhs as u32) + 2 * self.0))
    }
}

impl std::ops::BitAnd<CastlingRight> for CastlingRight {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self { CastlingRight(self.0 & rhs.0) }
}

impl std::ops::BitOr<CastlingRight> for CastlingRight {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self { CastlingRight(self.0 | rhs.0) }
}

impl std::ops::BitAndAssign<CastlingRight> for CastlingRight {
    fn bitand_assign(&mut self, rhs: Self) { *self = *self & rhs; }
}

impl std::ops::BitOrAssign<CastlingRight> for CastlingRight {
    fn bitor_assign(&mut self, rhs: Self) { *self = *self | rhs; }
}

impl std::ops::Not for CastlingRight {
    type Output = CastlingRight;
    fn not(self) -> Self { CastlingRight(!self.0 & ANY_CASTLING.0) }
}

impl std::cmp::PartialEq<u32> for CastlingRight {
    fn eq(&self, rhs: &u32) -> bool {
        debug_assert!(*rhs == 0);
        self.0 == *rhs
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct PieceType(pub u32);

pub const NO_PIECE_TYPE: PieceType = PieceType(0);

pub const PAWN  : PieceType = PieceType(1);
pub const KNIGHT: PieceType = PieceType(2);
pub const BISHOP: PieceType = PieceType(3);
pub const ROOK  : PieceType = PieceType(4);
pub const QUEEN : PieceType = PieceType(5);
pub const KING  : PieceType = PieceType(6);

pub const ALL_PIECES: PieceType = PieceType(0);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece(pub u32);

pub const NO_PIECE: Piece = Piece(0);

pub const W_PAWN  : Piece = Piece(1);
pub const W_KNIGHT: Piece = Piece(2);
pub const W_BISHOP: Piece = Piece(3);
pub const W_ROOK  : Piece = Piece(4);
pub const W_QUEEN : Piece = Piece(5);
pub const W_KING  : Piece = Piece(6);

pub const B_PAWN  : Piece = Piece(9);
pub const B_KNIGHT: Piece = Piece(10);
pub const B_BISHOP: Piece = Piece(11);
pub const B_ROOK  : Piece = Piece(12);
pub const B_QUEEN : Piece = Piece(13);
pub const B_KING  : Piece = Piece(14);

pub const PIECES: [Piece; 12] = [
    W_PAWN, W_KNIGHT, W_BISHOP, W_ROOK, W_QUEEN, W_KING,
    B_PAWN, B_KNIGHT, B_BISHOP, B_ROOK, B_QUEEN, B_KING,
];

impl Piece {
    pub fn piece_type(self) -> PieceType { PieceType(self.0 & 7) }

    pub fn color(self) -> Color { Color(self.0 >> 3) }

    pub fn make(c: Color, pt: PieceType) -> Piece { Piece((c.0 << 3) + pt.0) }

    // is_ok() accepts the empty square and the twelve real pieces
    pub fn is_ok(self) -> bool {
        self == NO_PIECE || PIECES.contains(&self)
    }
}

impl std::ops::Not for Piece {
    type Output = Self;
    fn not(self) -> Self { Piece(self.0 ^ 8) }
}

pub type File = u32;
pub type Rank = u32;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Square(pub u32);

pub const FILE_A: File = 0;
pub const FILE_B: File = 1;
pub const FILE_C: File = 2;
pub const FILE_D: File = 3;
pub const FILE_E: File = 4;
pub const FILE_F: File = 5;
pub const FILE_G: File = 6;
pub const FILE_H: File = 7;

pub const RANK_1: Rank = 0;
pub const RANK_2: Rank = 1;
pub const RANK_3: Rank = 2;
pub const RANK_4: Rank = 3;
pub const RANK_5: Rank = 4;
pub const RANK_6: Rank = 5;
pub const RANK_7: Rank = 6;
pub const RANK_8: Rank = 7;

pub fn relative_rank(c: Color, r: Rank) -> Rank {
    r ^ (c.0 * 7)
}

impl Square {
    pub const A1: Square = Square(0);
    pub const B1: Square = Square(1);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const A2: Square = Square(8);
    pub const B2: Square = Square(9);
    pub const C2: Square = Square(10);
    pub const D2: Square = Square(11);
    pub const E2: Square = Square(12);
    pub const F2: Square = Square(13);
    pub const G2: Square = Square(14);
    pub const H2: Square = Square(15);
    pub const A3: Square = Square(16);
    pub const B3: Square = Square(17);
    pub const C3: Square = Square(18);
    pub const D3: Square = Square(19);
    pub const E3: Square = Square(20);
    pub const F3: Square = Square(21);
    pub const G3: Square = Square(22);
    pub const H3: Square = Square(23);
    pub const A4: Square = Square(24);
    pub const B4: Square = Square(25);
    pub const C4: Square = Square(26);
    pub const D4: Square = Square(27);
    pub const E4: Square = Square(28);
    pub const F4: Square = Square(29);
    pub const G4: Square = Square(30);
    pub const H4: Square = Square(31);
    pub const A5: Square = Square(32);
    pub const B5: Square = Square(33);
    pub const C5: Square = Square(34);
    pub const D5: Square = Square(35);
    pub const E5: Square = Square(36);
    pub const F5: Square = Square(37);
    pub const G5: Square = Square(38);
    pub const H5: Square = Square(39);
    pub const A6: Square = Square(40);
    pub const B6: Square = Square(41);
    pub const C6: Square = Square(42);
    pub const D6: Square = Square(43);
    pub const E6: Square = Square(44);
    pub const F6: Square = Square(45);
    pub const G6: Square = Square(46);
    pub const H6: Square = Square(47);
    pub const A7: Square = Square(48);
    pub const B7: Square = Square(49);
    pub const C7: Square = Square(50);
    pub const D7: Square = Square(51);
    pub const E7: Square = Square(52);
    pub const F7: Square = Square(53);
    pub const G7: Square = Square(54);
    pub const H7: Square = Square(55);
    pub const A8: Square = Square(56);
    pub const B8: Square = Square(57);
    pub const C8: Square = Square(58);
    pub const D8: Square = Square(59);
    pub const E8: Square = Square(60);
    pub const F8: Square = Square(61);
    pub const G8: Square = Square(62);
    pub const H8: Square = Square(63);

    pub const NONE: Square = Square(64);

    pub fn file(self) -> File {
        self.0 & 7
    }

    pub fn rank(self) -> Rank {
        self.0 >> 3
    }

    pub fn relative(self, c: Color) -> Self {
        Square(self.0 ^ (c.0 * 56))
    }

    pub fn relative_rank(self, c: Color) -> Rank {
        relative_rank(c, self.rank())
    }

    pub fn is_ok(self) -> bool {
        self >= Square::A1 && self <= Square::H8
    }

    pub fn make(f: File, r: Rank) -> Square {
        Square((r << 3) | f)
    }
}

pub fn relative_square(c: Color, s: Square) -> Square {
    s.relative(c)
}

// Vertical flip, a1 <-> a8
impl std::ops::Not for Square {
    type Output = Self;
    fn not(self) -> Self { Square(self.0 ^ Square::A8.0) }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if !self.is_ok() {
            return write!(f, "-");
        }
        write!(f, "{}{}",
            (b'a' + self.file() as u8) as char,
            (b'1' + self.rank() as u8) as char)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Direction(pub i32);

impl std::ops::Neg for Direction {
    type Output = Self;
    fn neg(self) -> Self { Direction(-self.0) }
}

pub const NORTH: Direction = Direction( 8);
pub const EAST : Direction = Direction( 1);
pub const SOUTH: Direction = Direction(-8);
pub const WEST : Direction = Direction(-1);

pub const NORTH_EAST: Direction = Direction( 9);
pub const NORTH_WEST: Direction = Direction( 7);
pub const SOUTH_EAST: Direction = Direction(-7);
pub const SOUTH_WEST: Direction = Direction(-9);

impl std::ops::Add<Direction> for Direction {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { Direction(self.0 + rhs.0) }
}

impl std::ops::Add<Direction> for Square {
    type Output = Square;
    fn add(self, rhs: Direction) -> Self {
        Square(u32::wrapping_add(self.0, rhs.0 as u32))
    }
}

impl std::ops::Sub<Direction> for Square {
    type Output = Square;
    fn sub(self, rhs: Direction) -> Self {
        Square(u32::wrapping_sub(self.0, rhs.0 as u32))
    }
}

impl std::ops::AddAssign<Direction> for Square {
    fn add_assign(&mut self, rhs: Direction) { *self = *self + rhs; }
}

impl std::ops::SubAssign<Direction> for Square {
    fn sub_assign(&mut self, rhs: Direction) { *self = *self - rhs; }
}

impl std::ops::Mul<Direction> for i32 {
    type Output = Direction;
    fn mul(self, rhs: Direction) -> Direction { Direction(self * rhs.0) }
}

pub fn pawn_push(c: Color) -> Direction {
    match c {
        WHITE => NORTH,
        _     => SOUTH
    }
}

// A move needs 15 bits to be stored
//
// bit  0- 5: destination square (from 0 to 63)
// bit  6-11: origin square (from 0 to 63)
// bit 12-14: promotion piece type (NO_PIECE_TYPE if not a promotion)
//
// Castling is a king move of two files, en passant is a pawn move onto
// the en-passant square. Neither needs a flag of its own.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Move(pub u32);

impl Move {
    pub const NONE: Move = Move(0);

    pub fn from(self) -> Square {
        Square((self.0 >> 6) & 0x3f)
    }

    pub fn to(self) -> Square {
        Square(self.0 & 0x3f)
    }

    pub fn promotion(self) -> PieceType {
        PieceType((self.0 >> 12) & 7)
    }

    pub fn is_promotion(self) -> bool {
        self.promotion() != NO_PIECE_TYPE
    }

    pub fn is_ok(self) -> bool {
        self.from() != self.to()
    }

    pub fn make(from: Square, to: Square) -> Move {
        Move((from.0 << 6) + to.0)
    }

    pub fn make_prom(from: Square, to: Square, pt: PieceType) -> Move {
        debug_assert!(pt >= KNIGHT && pt <= QUEEN);
        Move((pt.0 << 12) + (from.0 << 6) + to.0)
    }
}

// Coordinate notation (g1f3, a7a8q)
impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if *self == Move::NONE {
            return write!(f, "(none)");
        }
        write!(f, "{}{}", self.from(), self.to())?;
        if self.is_promotion() {
            let c = b" pnbrqk"[self.promotion().0 as usize] as char;
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_make_splits_back() {
        for &pc in PIECES.iter() {
            assert_eq!(Piece::make(pc.color(), pc.piece_type()), pc);
        }
        assert_eq!(!W_ROOK, B_ROOK);
        assert!(!Piece(7).is_ok());
        assert!(NO_PIECE.is_ok());
    }

    #[test]
    fn move_fields() {
        let m = Move::make_prom(Square::B7, Square::A8, KNIGHT);
        assert_eq!(m.from(), Square::B7);
        assert_eq!(m.to(), Square::A8);
        assert_eq!(m.promotion(), KNIGHT);
        assert_eq!(m.to_string(), "b7a8n");

        let m = Move::make(Square::E2, Square::E4);
        assert!(!m.is_promotion());
        assert_eq!(m.to_string(), "e2e4");
    }

    #[test]
    fn castling_rights_by_color() {
        assert_eq!(WHITE | CastlingSide::King, WHITE_OO);
        assert_eq!(WHITE | CastlingSide::Queen, WHITE_OOO);
        assert_eq!(BLACK | CastlingSide::King, BLACK_OO);
        assert_eq!(BLACK | CastlingSide::Queen, BLACK_OOO);
        assert_eq!(CastlingRight::both(BLACK), BLACK_OO | BLACK_OOO);
        assert_eq!(!WHITE_OO, WHITE_OOO | BLACK_OO | BLACK_OOO);
    }
}
