// SPDX-License-Identifier: GPL-3.0-or-later

use crate::types::*;
use crate::bitboard::*;
use crate::position::Position;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GenType {
    Captures,
    Evasions,
    NonEvasions,
    Legal,
}

use crate::movegen::GenType::*;

// The MoveList struct is a simple wrapper around generate_*(). A fixed
// array plus a count, so generation never allocates.
#[derive(Clone)]
pub struct MoveList {
    list: [Move; MAX_MOVES],
    idx: usize,
    num: usize,
}

impl MoveList {
    pub fn new(pos: &Position, gen_type: GenType) -> MoveList {
        let mut moves = MoveList::empty();
        moves.num = match gen_type {
            Captures => pseudo_legal_captures(pos, &mut moves.list, 0),
            Evasions => check_evasions(pos, &mut moves.list, 0),
            NonEvasions => pseudo_legal_moves(pos, &mut moves.list, 0),
            Legal => {
                // The legality test plays moves on a scratch copy
                let mut scratch = pos.clone();
                return legal_moves(&mut scratch);
            }
        };
        moves
    }

    pub fn empty() -> MoveList {
        MoveList {
            list: [Move::NONE; MAX_MOVES],
            idx: 0,
            num: 0,
        }
    }

    pub fn push(&mut self, m: Move) {
        self.list[self.num] = m;
        self.num += 1;
    }

    pub fn size(&self) -> usize {
        self.num
    }

    pub fn is_empty(&self) -> bool {
        self.num == 0
    }

    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.list[..self.num]
    }

    // retain() keeps the moves for which f returns true, in order
    pub fn retain<F: FnMut(Move) -> bool>(&mut self, mut f: F) {
        let mut kept = 0;
        for i in 0..self.num {
            let m = self.list[i];
            if f(m) {
                self.list[kept] = m;
                kept += 1;
            }
        }
        self.num = kept;
        self.idx = 0;
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;
    fn index(&self, i: usize) -> &Move {
        &self.as_slice()[i]
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_list()
            .entries(self.as_slice().iter().map(|m| m.to_string()))
            .finish()
    }
}

impl Iterator for MoveList {
    type Item = Move;
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx == self.num {
            None
        } else {
            self.idx += 1;
            Some(self.list[self.idx - 1])
        }
    }
}

fn add_moves(
    list: &mut [Move], mut idx: usize, from: Square, targets: Bitboard
) -> usize {
    for to in targets {
        list[idx] = Move::make(from, to);
        idx += 1;
    }
    idx
}

// add_pawn_moves() adds the pawn moves landing on 'targets' after one
// step in direction d. Moves onto the last rank become promotions: queen
// and knight always, rook and bishop only with all_promotions.
fn add_pawn_moves(
    list: &mut [Move], mut idx: usize, targets: Bitboard, d: Direction,
    all_promotions: bool
) -> usize {
    for to in targets {
        let from = to - d;
        if (RANK1_BB | RANK8_BB) & to != 0 {
            list[idx    ] = Move::make_prom(from, to, QUEEN);
            list[idx + 1] = Move::make_prom(from, to, KNIGHT);
            idx += 2;
            if all_promotions {
                list[idx    ] = Move::make_prom(from, to, ROOK);
                list[idx + 1] = Move::make_prom(from, to, BISHOP);
                idx += 2;
            }
        } else {
            list[idx] = Move::make(from, to);
            idx += 1;
        }
    }
    idx
}

// generate_pawn_moves() generates pawn moves onto 'target'. Captures mode
// only pushes onto the last rank. En passant is never masked by 'target'.
fn generate_pawn_moves(
    pos: &Position, list: &mut [Move], mut idx: usize, target: Bitboard,
    us: Color, gen_type: GenType
) -> usize {
    let them = !us;
    let trank_8bb = if us == WHITE { RANK8_BB } else { RANK1_BB };
    let trank_3bb = if us == WHITE { RANK3_BB } else { RANK6_BB };
    let up    = if us == WHITE { NORTH      } else { SOUTH      };
    let right = if us == WHITE { NORTH_EAST } else { SOUTH_WEST };
    let left  = if us == WHITE { NORTH_WEST } else { SOUTH_EAST };

    let pawns = pos.pieces_cp(us, PAWN);
    let empty_squares = !pos.pieces();
    let all_promotions = gen_type != Captures;

    let ep_bb = if pos.ep_square() != Square::NONE {
        pos.ep_square().bb()
    } else {
        Bitboard(0)
    };

    // Single and double pawn pushes
    let b1 = pawns.shift(up) & empty_squares;
    if gen_type == Captures {
        idx = add_pawn_moves(list, idx, b1 & trank_8bb, up, false);
    } else {
        let b2 = (b1 & trank_3bb).shift(up) & empty_squares;
        idx = add_pawn_moves(list, idx, b1 & target, up, true);
        for to in b2 & target {
            list[idx] = Move::make(to - up - up, to);
            idx += 1;
        }
    }

    // Standard and en passant captures
    let enemies = (pos.pieces_c(them) & target) | ep_bb;
    idx = add_pawn_moves(
        list, idx, pawns.shift(right) & enemies, right, all_promotions);
    idx = add_pawn_moves(
        list, idx, pawns.shift(left) & enemies, left, all_promotions);

    idx
}

fn generate_moves(
    pos: &Position, list: &mut [Move], mut idx: usize, us: Color,
    target: Bitboard, pt: PieceType
) -> usize {
    debug_assert!(pt != KING && pt != PAWN);

    let occupied = pos.pieces();
    for from in pos.pieces_cp(us, pt) {
        idx = add_moves(list, idx, from, attacks_bb(pt, from, occupied) & target);
    }

    idx
}

// generate_castling() adds the king move of two files when the right is
// still there, the squares between king and rook are empty, the rook is
// at home and neither the king square nor the square it crosses is
// attacked. Whether the destination is attacked is left to is_legal().
fn generate_castling(
    pos: &Position, list: &mut [Move], mut idx: usize, us: Color
) -> usize {
    let k0 = relative_square(us, Square::E1);
    if pos.king_square(us) != k0 {
        return idx;
    }

    let occupied = pos.pieces();
    let rook = Piece::make(us, ROOK);

    let oo_path = Bitboard(0x60) << (56 * us.0 as i32);
    if pos.has_castling_right(us | CastlingSide::King)
        && oo_path & occupied == 0
        && pos.piece_on(k0 + 3 * EAST) == rook
        && !sq_attacked(pos, k0, occupied)
        && !sq_attacked(pos, k0 + EAST, occupied)
    {
        list[idx] = Move::make(k0, k0 + 2 * EAST);
        idx += 1;
    }

    let ooo_path = Bitboard(0x0e) << (56 * us.0 as i32);
    if pos.has_castling_right(us | CastlingSide::Queen)
        && ooo_path & occupied == 0
        && pos.piece_on(k0 + 4 * WEST) == rook
        && !sq_attacked(pos, k0, occupied)
        && !sq_attacked(pos, k0 + WEST, occupied)
    {
        list[idx] = Move::make(k0, k0 + 2 * WEST);
        idx += 1;
    }

    idx
}

// evasion_targets() returns the squares a non-king move must land on to
// resolve the check: the checker and the squares between it and the king
// when there is exactly one checker. The enemy king square is always
// included so that a king capture is never missed.
fn evasion_targets(pos: &Position, us: Color) -> Bitboard {
    let ksq = pos.king_square(us);
    let mut valid = pos.pieces_cp(!us, KING);
    if ksq == Square::NONE {
        return valid;
    }

    let threats = checkers_of(pos, us);
    if threats != 0 && !more_than_one(threats) {
        valid |= threats | between_bb(ksq, lsb(threats));
    }
    valid
}

fn generate_all(
    pos: &Position, list: &mut [Move], mut idx: usize, us: Color,
    gen_type: GenType
) -> usize {
    debug_assert!(gen_type != Legal);

    let valid = match gen_type {
        Evasions => evasion_targets(pos, us),
        _        => ALL_SQUARES,
    };
    let target = match gen_type {
        Captures => pos.pieces_c(!us),
        _        => !pos.pieces_c(us) & valid,
    };

    idx = generate_pawn_moves(pos, list, idx, valid, us, gen_type);
    idx = generate_moves(pos, list, idx, us, target, KNIGHT);
    idx = generate_moves(pos, list, idx, us, target, BISHOP);
    idx = generate_moves(pos, list, idx, us, target, ROOK);
    idx = generate_moves(pos, list, idx, us, target, QUEEN);

    let ksq = pos.king_square(us);
    if ksq != Square::NONE {
        // King moves are never restricted to the evasion targets
        let king_target = match gen_type {
            Captures => pos.pieces_c(!us),
            _        => !pos.pieces_c(us),
        };
        idx = add_moves(list, idx, ksq, pseudo_attacks(KING, ksq) & king_target);
    }

    if gen_type == NonEvasions && pos.has_castling_right(CastlingRight::both(us)) {
        idx = generate_castling(pos, list, idx, us);
    }

    idx
}

fn generate(
    pos: &Position, list: &mut [Move], idx: usize, gen_type: GenType
) -> usize {
    if pos.side_to_move() == WHITE {
        generate_all(pos, list, idx, WHITE, gen_type)
    } else {
        generate_all(pos, list, idx, BLACK, gen_type)
    }
}

// pseudo_legal_moves() generates all moves that follow the piece movement
// rules, including castling. The mover's king may be left in check.
pub fn pseudo_legal_moves(
    pos: &Position, list: &mut [Move], idx: usize
) -> usize {
    generate(pos, list, idx, NonEvasions)
}

// pseudo_legal_captures() generates captures, en passant and pawn pushes
// onto the last rank. Promotions are to queen and knight only.
pub fn pseudo_legal_captures(
    pos: &Position, list: &mut [Move], idx: usize
) -> usize {
    generate(pos, list, idx, Captures)
}

// check_evasions() generates the pseudo-legal moves that may get the side
// to move out of check: any king move, and other moves only if they
// capture or block the single checker. No castling.
pub fn check_evasions(
    pos: &Position, list: &mut [Move], idx: usize
) -> usize {
    generate(pos, list, idx, Evasions)
}

// attackers_of() returns the pieces of color c attacking s, given the
// occupancy for the sliders.
pub fn attackers_of(
    pos: &Position, s: Square, c: Color, occupied: Bitboard
) -> Bitboard {
      (pawn_attacks(!c, s)            & pos.pieces_cp(c, PAWN))
    | (pseudo_attacks(KNIGHT, s)      & pos.pieces_cp(c, KNIGHT))
    | (attacks_bb(ROOK, s, occupied)   & pos.pieces_cpp(c, ROOK, QUEEN))
    | (attacks_bb(BISHOP, s, occupied) & pos.pieces_cpp(c, BISHOP, QUEEN))
    | (pseudo_attacks(KING, s)        & pos.pieces_cp(c, KING))
}

// checkers_of() returns the enemy pieces giving check to the king of c
pub fn checkers_of(pos: &Position, c: Color) -> Bitboard {
    let ksq = pos.king_square(c);
    if ksq == Square::NONE {
        return Bitboard(0);
    }
    attackers_of(pos, ksq, !c, pos.pieces())
}

// sq_attacked() tells whether s is attacked by the side not to move. The
// occupancy is a parameter so that callers can ask about a board with
// some square vacated.
pub fn sq_attacked(pos: &Position, s: Square, occupied: Bitboard) -> bool {
    attackers_of(pos, s, !pos.side_to_move(), occupied) != 0
}

pub fn in_check(pos: &Position) -> bool {
    checkers_of(pos, pos.side_to_move()) != 0
}

// can_take_king() tells whether the side to move attacks the enemy king,
// i.e. whether the last move left its own king in check.
pub fn can_take_king(pos: &Position) -> bool {
    checkers_of(pos, !pos.side_to_move()) != 0
}

// is_legal() tests whether a pseudo-legal move leaves the own king safe.
// Cheap geometric tests settle most moves; the rest are played, tested
// with can_take_king() and taken back.
pub fn is_legal(pos: &mut Position, m: Move, is_in_check: bool) -> bool {
    let us = pos.side_to_move();
    let ksq = pos.king_square(us);
    let ep = pos.ep_square();
    let occupied = pos.pieces();

    // Without a king nothing can be left in check
    if ksq == Square::NONE {
        return true;
    }

    if is_in_check {
        if m.from() != ksq && m.to() != ep {
            let knights = pos.pieces_cp(!us, KNIGHT);
            if attacks_bb(ROOK, ksq, occupied) & m.to() == 0
                && attacks_bb(BISHOP, ksq, occupied) & m.to() == 0
                && pseudo_attacks(KNIGHT, ksq) & knights & m.to() == 0
            {
                return false;
            }
        }
    } else if m.from() == ksq {
        return !sq_attacked(pos, m.to(), occupied ^ m.from());
    } else if m.to() != ep {
        if attacks_bb(ROOK, ksq, occupied) & m.from() == 0
            && attacks_bb(BISHOP, ksq, occupied) & m.from() == 0
        {
            return true;
        }
        if direction(ksq, m.from()) == direction(ksq, m.to()) {
            return true;
        }
    }

    let ui = pos.make_move(m);
    let legal = !can_take_king(pos);
    pos.unmake_move(m, &ui);
    legal
}

// remove_illegal() drops the moves of 'moves' that leave the own king in
// check.
pub fn remove_illegal(pos: &mut Position, moves: &mut MoveList) {
    let is_in_check = in_check(pos);
    moves.retain(|m| is_legal(pos, m, is_in_check));
}

// legal_moves() generates all the legal moves in the given position
pub fn legal_moves(pos: &mut Position) -> MoveList {
    let is_in_check = in_check(pos);
    let mut moves = MoveList::new(pos,
        if is_in_check { Evasions } else { NonEvasions });
    moves.retain(|m| is_legal(pos, m, is_in_check));
    moves
}

// perft() counts the leaf nodes of the legal move tree of the given depth
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let leaf = depth == 2;
    let mut nodes = 0u64;

    for m in legal_moves(pos) {
        if depth == 1 {
            nodes += 1;
            continue;
        }
        let ui = pos.make_move(m);
        nodes += if leaf { legal_moves(pos).size() as u64 }
            else { perft(pos, depth - 1) };
        pos.unmake_move(m, &ui);
    }

    nodes
}

// divide() reports the perft count below each root move
pub fn divide(pos: &mut Position, depth: u32) -> Vec<(Move, u64)> {
    debug_assert!(depth >= 1);

    let mut result = Vec::new();
    for m in legal_moves(pos) {
        let ui = pos.make_move(m);
        let cnt = perft(pos, depth - 1);
        pos.unmake_move(m, &ui);
        tracing::trace!(%m, cnt, "divide");
        result.push((m, cnt));
    }
    result
}
