// SPDX-License-Identifier: GPL-3.0-or-later

use crate::bitboard::*;
use crate::material::MaterialId;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("expected 64 squares, got {0}")]
    SquareCount(usize),

    #[error("unknown piece code {code} on square {square}")]
    UnknownPiece { square: Square, code: u8 },

    #[error("{0:?} has no king")]
    MissingKing(Color),

    #[error("{0:?} has more than one king")]
    DuplicateKing(Color),

    #[error("invalid en passant square {0}")]
    BadEpSquare(i32),

    #[error("invalid castle mask {0:#x}")]
    BadCastleMask(u32),
}

// RawBoard is a board snapshot in the flat form a GUI hands over: one byte
// per square (0 empty, 1-6 white K Q R B N P, 7-12 black K Q R B N P), the
// en passant square or -1, and a castle mask with bit 0 for White's long
// castle, bit 1 White's short, bit 2 Black's long and bit 3 Black's short.
#[derive(Debug, Clone, Copy)]
pub struct RawBoard<'a> {
    pub squares: &'a [u8],
    pub white_to_move: bool,
    pub ep_square: i32,
    pub castle_mask: u32,
    pub half_move_clock: i32,
    pub full_move_counter: i32,
}

const RAW_PIECES: [Piece; 13] = [
    NO_PIECE,
    W_KING, W_QUEEN, W_ROOK, W_BISHOP, W_KNIGHT, W_PAWN,
    B_KING, B_QUEEN, B_ROOK, B_BISHOP, B_KNIGHT, B_PAWN,
];

const RAW_CASTLING: [CastlingRight; 4] =
    [WHITE_OOO, WHITE_OO, BLACK_OOO, BLACK_OO];

// UndoInfo holds what make_move() cannot recompute when the move is taken
// back. It is only meaningful for the move that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct UndoInfo {
    pub captured: Piece,
    pub castling_rights: CastlingRight,
    pub ep_square: Square,
    pub rule50: i32,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Position {
    board: [Piece; 64],
    by_color_bb: [Bitboard; 2],
    by_type_bb: [Bitboard; 8],
    king_sq: [Square; 2],
    material: MaterialId,
    side_to_move: Color,
    castling_rights: CastlingRight,
    ep_square: Square,
    rule50: i32,
    fullmove: i32,
}

// castling_rights_mask() gives the rights lost when a piece leaves or
// arrives on s: king moves give up both, rook moves and rook captures on a
// corner give up that side.
fn castling_rights_mask(s: Square) -> CastlingRight {
    match s {
        Square::E1 => WHITE_OO | WHITE_OOO,
        Square::H1 => WHITE_OO,
        Square::A1 => WHITE_OOO,
        Square::E8 => BLACK_OO | BLACK_OOO,
        Square::H8 => BLACK_OO,
        Square::A8 => BLACK_OOO,
        _ => NO_CASTLING,
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}

impl Position {
    pub const PIECE_TO_CHAR: &'static str = " PNBRQK  pnbrqk";

    // new() returns an empty board, White to move
    pub fn new() -> Position {
        Position {
            board: [NO_PIECE; 64],
            by_color_bb: [Bitboard(0); 2],
            by_type_bb: [Bitboard(0); 8],
            king_sq: [Square::NONE; 2],
            material: MaterialId::EMPTY,
            side_to_move: WHITE,
            castling_rights: NO_CASTLING,
            ep_square: Square::NONE,
            rule50: 0,
            fullmove: 1,
        }
    }

    // start() returns the standard initial position
    pub fn start() -> Position {
        let mut pos = Position::new();
        let back = [ROOK, KNIGHT, BISHOP, QUEEN, KING, BISHOP, KNIGHT, ROOK];
        for f in FILE_A..=FILE_H {
            let pt = back[f as usize];
            pos.set_piece(Square::make(f, RANK_1), Piece::make(WHITE, pt));
            pos.set_piece(Square::make(f, RANK_2), W_PAWN);
            pos.set_piece(Square::make(f, RANK_7), B_PAWN);
            pos.set_piece(Square::make(f, RANK_8), Piece::make(BLACK, pt));
        }
        pos.castling_rights = ANY_CASTLING;
        pos
    }

    // from_raw() builds a position from a flat board snapshot. Everything is
    // validated before the position is touched. An en passant square that
    // no pawn can capture onto is dropped.
    pub fn from_raw(raw: &RawBoard) -> Result<Position, PositionError> {
        if raw.squares.len() != 64 {
            return Err(PositionError::SquareCount(raw.squares.len()));
        }
        if raw.castle_mask > 15 {
            return Err(PositionError::BadCastleMask(raw.castle_mask));
        }

        let mut pieces = [NO_PIECE; 64];
        for (i, &code) in raw.squares.iter().enumerate() {
            pieces[i] = *RAW_PIECES.get(code as usize).ok_or(
                PositionError::UnknownPiece { square: Square(i as u32), code }
            )?;
        }

        for c in WHITE.take(2) {
            let king = Piece::make(c, KING);
            match pieces.iter().filter(|&&pc| pc == king).count() {
                0 => return Err(PositionError::MissingKing(c)),
                1 => {}
                _ => return Err(PositionError::DuplicateKing(c)),
            }
        }

        let us = if raw.white_to_move { WHITE } else { BLACK };

        let mut ep = Square::NONE;
        if raw.ep_square != -1 {
            if raw.ep_square < 0 || raw.ep_square > 63 {
                return Err(PositionError::BadEpSquare(raw.ep_square));
            }
            ep = Square(raw.ep_square as u32);
            if ep.relative_rank(us) != RANK_6
                || pieces[ep.0 as usize] != NO_PIECE
                || pieces[(ep - pawn_push(us)).0 as usize]
                    != Piece::make(!us, PAWN)
            {
                return Err(PositionError::BadEpSquare(raw.ep_square));
            }
        }

        let mut pos = Position::new();
        for (i, &pc) in pieces.iter().enumerate() {
            if pc != NO_PIECE {
                pos.set_piece(Square(i as u32), pc);
            }
        }
        pos.side_to_move = us;
        for (bit, &cr) in RAW_CASTLING.iter().enumerate() {
            if raw.castle_mask & (1 << bit) != 0 {
                pos.castling_rights |= cr;
            }
        }
        pos.rule50 = raw.half_move_clock;
        pos.fullmove = raw.full_move_counter;

        if ep != Square::NONE {
            if pawn_attacks(!us, ep) & pos.pieces_cp(us, PAWN) != 0 {
                pos.ep_square = ep;
            } else {
                tracing::trace!(%ep, "en passant square dropped, no capturer");
            }
        }

        Ok(pos)
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn empty(&self, s: Square) -> bool {
        self.piece_on(s) == NO_PIECE
    }

    pub fn piece_on(&self, s: Square) -> Piece {
        self.board[s.0 as usize]
    }

    pub fn pieces(&self) -> Bitboard {
        self.by_type_bb[ALL_PIECES.0 as usize]
    }

    pub fn pieces_p(&self, pt: PieceType) -> Bitboard {
        self.by_type_bb[pt.0 as usize]
    }

    pub fn pieces_pp(&self, pt1: PieceType, pt2: PieceType) -> Bitboard {
        self.pieces_p(pt1) | self.pieces_p(pt2)
    }

    pub fn pieces_c(&self, c: Color) -> Bitboard {
        self.by_color_bb[c.0 as usize]
    }

    pub fn pieces_cp(&self, c: Color, pt: PieceType) -> Bitboard {
        self.pieces_c(c) & self.pieces_p(pt)
    }

    pub fn pieces_cpp(
        &self, c: Color, pt1: PieceType, pt2: PieceType
    ) -> Bitboard {
        self.pieces_c(c) & self.pieces_pp(pt1, pt2)
    }

    pub fn count(&self, c: Color, pt: PieceType) -> u32 {
        self.material.count_of(c, pt)
    }

    // king_square() is Square::NONE while that side has no king
    pub fn king_square(&self, c: Color) -> Square {
        self.king_sq[c.0 as usize]
    }

    pub fn ep_square(&self) -> Square {
        self.ep_square
    }

    pub fn castling_rights(&self) -> CastlingRight {
        self.castling_rights
    }

    pub fn has_castling_right(&self, cr: CastlingRight) -> bool {
        self.castling_rights & cr != 0
    }

    pub fn rule50_count(&self) -> i32 {
        self.rule50
    }

    pub fn fullmove_number(&self) -> i32 {
        self.fullmove
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn set_side_to_move(&mut self, c: Color) {
        self.side_to_move = c;
    }

    pub fn set_castling_rights(&mut self, cr: CastlingRight) {
        self.castling_rights = cr;
    }

    pub fn set_ep_square(&mut self, s: Square) {
        debug_assert!(s == Square::NONE || s.is_ok());
        self.ep_square = s;
    }

    pub fn set_rule50_count(&mut self, n: i32) {
        self.rule50 = n;
    }

    pub fn set_fullmove_number(&mut self, n: i32) {
        self.fullmove = n;
    }

    // set_piece() puts pc (or NO_PIECE) on s, replacing whatever stood
    // there. Bitboards, the king cache and the material id follow along.
    pub fn set_piece(&mut self, s: Square, pc: Piece) {
        debug_assert!(pc.is_ok());
        let old = self.board[s.0 as usize];
        if old != NO_PIECE {
            let b = s.bb();
            self.by_type_bb[ALL_PIECES.0 as usize] ^= b;
            self.by_type_bb[old.piece_type().0 as usize] ^= b;
            self.by_color_bb[old.color().0 as usize] ^= b;
            self.material.remove_piece(old);
            if old.piece_type() == KING && self.king_sq[old.color().0 as usize] == s {
                self.king_sq[old.color().0 as usize] = Square::NONE;
            }
        }
        self.board[s.0 as usize] = pc;
        if pc != NO_PIECE {
            let b = s.bb();
            self.by_type_bb[ALL_PIECES.0 as usize] |= b;
            self.by_type_bb[pc.piece_type().0 as usize] |= b;
            self.by_color_bb[pc.color().0 as usize] |= b;
            self.material.add_piece(pc);
            if pc.piece_type() == KING {
                self.king_sq[pc.color().0 as usize] = s;
            }
        }
    }

    fn move_piece(&mut self, from: Square, to: Square) {
        let pc = self.piece_on(from);
        self.set_piece(from, NO_PIECE);
        self.set_piece(to, pc);
    }

    // make_move() plays a pseudo-legal move and returns what unmake_move()
    // needs to take it back.
    pub fn make_move(&mut self, m: Move) -> UndoInfo {
        let us = self.side_to_move;
        let them = !us;
        let from = m.from();
        let to = m.to();
        let pc = self.piece_on(from);
        let captured = self.piece_on(to);

        debug_assert!(pc != NO_PIECE && pc.color() == us);
        debug_assert!(captured == NO_PIECE || captured.color() == them);

        let ui = UndoInfo {
            captured,
            castling_rights: self.castling_rights,
            ep_square: self.ep_square,
            rule50: self.rule50,
        };

        let prev_ep = self.ep_square;
        self.ep_square = Square::NONE;
        self.castling_rights &=
            !(castling_rights_mask(from) | castling_rights_mask(to));

        if captured != NO_PIECE || pc.piece_type() == PAWN {
            self.rule50 = 0;
            if pc.piece_type() == PAWN {
                if Rank::distance(from.rank(), to.rank()) == 2 {
                    // Only record the square if a pawn can take there
                    let ep = Square((from.0 + to.0) / 2);
                    if pawn_attacks(us, ep) & self.pieces_cp(them, PAWN) != 0 {
                        self.ep_square = ep;
                    }
                } else if to == prev_ep {
                    self.set_piece(to - pawn_push(us), NO_PIECE);
                }
            }
            self.set_piece(from, NO_PIECE);
            self.set_piece(to, if m.is_promotion() {
                Piece::make(us, m.promotion())
            } else {
                pc
            });
        } else {
            self.rule50 += 1;
            if pc.piece_type() == KING {
                if to.0 == from.0 + 2 {
                    self.move_piece(from + 3 * EAST, from + EAST);
                } else if to.0 + 2 == from.0 {
                    self.move_piece(from + 4 * WEST, from + WEST);
                }
            }
            self.move_piece(from, to);
        }

        if us == BLACK {
            self.fullmove += 1;
        }
        self.side_to_move = them;

        ui
    }

    // unmake_move() takes back m. ui must be the value make_move(m)
    // returned, and no other move may have been left on the board since.
    pub fn unmake_move(&mut self, m: Move, ui: &UndoInfo) {
        self.side_to_move = !self.side_to_move;
        let us = self.side_to_move;
        let from = m.from();
        let to = m.to();
        let pc = self.piece_on(to);

        self.set_piece(from, if m.is_promotion() {
            Piece::make(us, PAWN)
        } else {
            pc
        });
        self.set_piece(to, ui.captured);

        self.castling_rights = ui.castling_rights;
        self.ep_square = ui.ep_square;
        self.rule50 = ui.rule50;
        if us == BLACK {
            self.fullmove -= 1;
        }

        if pc.piece_type() == KING {
            if to.0 == from.0 + 2 {
                self.move_piece(from + EAST, from + 3 * EAST);
            } else if to.0 + 2 == from.0 {
                self.move_piece(from + WEST, from + 4 * WEST);
            }
        }

        if pc.piece_type() == PAWN && to == self.ep_square {
            self.set_piece(to - pawn_push(us), Piece::make(!us, PAWN));
        }
    }

    // is_ok() performs consistency checks for the position object. Meant
    // for debug assertions and tests.
    pub fn is_ok(&self) -> bool {
        let mut by_type = [Bitboard(0); 8];
        let mut by_color = [Bitboard(0); 2];
        let mut material = MaterialId::EMPTY;

        for s in ALL_SQUARES {
            let pc = self.piece_on(s);
            if !pc.is_ok() {
                return false;
            }
            if pc != NO_PIECE {
                by_type[ALL_PIECES.0 as usize] |= s;
                by_type[pc.piece_type().0 as usize] |= s;
                by_color[pc.color().0 as usize] |= s;
                material.add_piece(pc);
            }
        }

        if by_type != self.by_type_bb
            || by_color != self.by_color_bb
            || material != self.material
            || by_color[0] & by_color[1] != 0
        {
            return false;
        }

        for c in WHITE.take(2) {
            let kings = self.pieces_cp(c, KING);
            if more_than_one(kings) {
                return false;
            }
            let expected = if kings != 0 { lsb(kings) } else { Square::NONE };
            if self.king_square(c) != expected {
                return false;
            }
        }

        self.ep_square == Square::NONE
            || (self.ep_square.is_ok()
                && self.ep_square.relative_rank(self.side_to_move) == RANK_6)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, " +---+---+---+---+---+---+---+---+")?;
        for r in (RANK_1..=RANK_8).rev() {
            for file in FILE_A..=FILE_H {
                let pc = self.piece_on(Square::make(file, r));
                let c = Position::PIECE_TO_CHAR.as_bytes()[pc.0 as usize];
                write!(f, " | {}", c as char)?;
            }
            writeln!(f, " |\n +---+---+---+---+---+---+---+---+")?;
        }
        write!(f, "{} to move, castling {:#x}, ep {}, rule50 {}, move {}",
            if self.side_to_move == WHITE { "White" } else { "Black" },
            self.castling_rights.0, self.ep_square, self.rule50,
            self.fullmove)
    }
}
