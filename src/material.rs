// SPDX-License-Identifier: GPL-3.0-or-later

use crate::types::*;

// MaterialId is a compact key of the piece counts of a position. Each of
// the twelve pieces owns a 5-bit counter, so two positions with the same
// material have the same id regardless of where the pieces stand. It is
// maintained incrementally by Position::set_piece().
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialId(pub u64);

const BITS: u32 = 5;

fn slot(pc: Piece) -> u32 {
    debug_assert!(pc != NO_PIECE && pc.is_ok());
    // W_PAWN..W_KING -> 0..5, B_PAWN..B_KING -> 6..11
    pc.color().0 * 6 + pc.piece_type().0 - 1
}

impl MaterialId {
    pub const EMPTY: MaterialId = MaterialId(0);

    pub fn add_piece(&mut self, pc: Piece) {
        debug_assert!(self.count(pc) < 31);
        self.0 = u64::wrapping_add(self.0, 1u64 << (BITS * slot(pc)));
    }

    pub fn remove_piece(&mut self, pc: Piece) {
        debug_assert!(self.count(pc) > 0);
        self.0 = u64::wrapping_sub(self.0, 1u64 << (BITS * slot(pc)));
    }

    pub fn count(self, pc: Piece) -> u32 {
        ((self.0 >> (BITS * slot(pc))) & ((1 << BITS) - 1)) as u32
    }

    pub fn count_of(self, c: Color, pt: PieceType) -> u32 {
        self.count(Piece::make(c, pt))
    }

    pub fn piece_count(self) -> u32 {
        PIECES.iter().map(|&pc| self.count(pc)).sum()
    }

    pub fn from_pieces(pieces: &[Piece]) -> MaterialId {
        let mut id = MaterialId::EMPTY;
        for &pc in pieces {
            id.add_piece(pc);
        }
        id
    }

    // Same material with the colors swapped
    pub fn flip(self) -> MaterialId {
        MaterialId((self.0 >> (6 * BITS)) | ((self.0 & 0x3fffffff) << (6 * BITS)))
    }

    fn value(self, c: Color) -> u32 {
        [(PAWN, 1), (KNIGHT, 3), (BISHOP, 3), (ROOK, 5), (QUEEN, 9)]
            .iter()
            .map(|&(pt, v)| v * self.count_of(c, pt))
            .sum()
    }

    // strong_side() is the side named first in the tablebase name: the one
    // with more material, White on equal material.
    pub fn strong_side(self) -> Color {
        if self.value(BLACK) > self.value(WHITE) { BLACK } else { WHITE }
    }

    fn side_str(self, c: Color) -> String {
        let mut s = String::new();
        for pt in (1..7).rev() {
            for _ in 0..self.count_of(c, PieceType(pt)) {
                s.push(b" PNBRQK"[pt as usize] as char);
            }
        }
        s
    }

    // name() returns the tablebase style name, e.g. "KRPvKR"
    pub fn name(self) -> String {
        let c = self.strong_side();
        format!("{}v{}", self.side_str(c), self.side_str(!c))
    }
}

impl std::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::fmt::Debug for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "MaterialId({})", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_adds_and_removes() {
        let mut id = MaterialId::from_pieces(&[W_KING, B_KING, W_PAWN, W_PAWN]);
        assert_eq!(id.count(W_PAWN), 2);
        assert_eq!(id.piece_count(), 4);
        id.remove_piece(W_PAWN);
        id.add_piece(W_QUEEN);
        assert_eq!(id.count(W_PAWN), 1);
        assert_eq!(id.count(W_QUEEN), 1);
        assert_eq!(id.count(B_QUEEN), 0);
        assert_eq!(id, MaterialId::from_pieces(&[W_QUEEN, W_KING, B_KING, W_PAWN]));
    }

    #[test]
    fn names_put_the_strong_side_first() {
        let kpk = MaterialId::from_pieces(&[W_KING, W_PAWN, B_KING]);
        assert_eq!(kpk.name(), "KPvK");
        assert_eq!(kpk.flip().name(), "KPvK");
        assert_eq!(kpk.flip().strong_side(), BLACK);

        let krpkr = MaterialId::from_pieces(&[B_KING, B_ROOK, B_PAWN, W_KING, W_ROOK]);
        assert_eq!(krpkr.name(), "KRPvKR");
        assert_eq!(MaterialId::from_pieces(&[W_KING, B_KING]).name(), "KvK");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn counter_overflow_is_caught() {
        let mut id = MaterialId::EMPTY;
        for _ in 0..32 {
            id.add_piece(W_PAWN);
        }
    }

    #[test]
    fn flip_swaps_colors() {
        let id = MaterialId::from_pieces(&[W_KING, W_BISHOP, W_KNIGHT, B_KING, B_PAWN]);
        let f = id.flip();
        assert_eq!(f.count(B_BISHOP), 1);
        assert_eq!(f.count(B_KNIGHT), 1);
        assert_eq!(f.count(W_PAWN), 1);
        assert_eq!(f.flip(), id);
    }
}
