// SPDX-License-Identifier: GPL-3.0-or-later

use crate::bitboard::*;
use crate::material::MaterialId;
use crate::position::Position;
use crate::tb::{Prober, TbError, Wdl};
use crate::types::*;

use std::path::PathBuf;

// There are 24 possible pawn squares: the first 4 files and ranks from 2 to 7
const MAX_INDEX: usize = 2*24*64*64;

// A KPK bitbase index is an integer in [0, MAX_INDEX) range
//
// Information is mapped in a way that minimizes the number of iterations:
//
// bit  0- 5: white king square (from A1 to H8)
// bit  6-11: black king square (from A1 to H8)
// bit    12: side to move (WHITE or BLACK)
// bit 13-14: white pawn file (from FILE_A to FILE_D)
// bit 15-17: white pawn RANK_7 - rank
//            (from RANK_7 - RANK_7 to RANK_7 - RANK_2)
fn index(us: Color, bksq: Square, wksq: Square, psq: Square) -> usize {
    (wksq.0 | (bksq.0 << 6) | (us.0 << 12) | (psq.file() << 13)
        | ((RANK_7 - psq.rank()) << 15)) as usize
}

const INVALID: u8 = 0;
const UNKNOWN: u8 = 1;
const DRAW   : u8 = 2;
const WIN    : u8 = 4;

struct KpkPosition {
    us: Color,
    ksq: [Square; 2],
    psq: Square,
    result: u8,
}

impl KpkPosition {
    fn new(idx: u32) -> KpkPosition {
        let ksq = [Square(idx & 0x3f), Square((idx >> 6) & 0x3f)];
        let us = Color((idx >> 12) & 0x01);
        let psq =
            Square::make((idx >> 13) & 0x03, RANK_7 - ((idx >> 15) & 0x07));
        let wk = ksq[WHITE.0 as usize];
        let bk = ksq[BLACK.0 as usize];

        // Two pieces on one square, touching kings, or Black in check with
        // White to move
        let result = if Square::distance(wk, bk) <= 1
            || wk == psq
            || bk == psq
            || (us == WHITE && pawn_attacks(WHITE, psq) & bk != 0)
        {
            INVALID
        }
        // The pawn promotes and the new queen cannot be taken
        else if us == WHITE
            && psq.rank() == RANK_7
            && wk != psq + NORTH
            && (Square::distance(bk, psq + NORTH) > 1
                || pseudo_attacks(KING, wk) & (psq + NORTH) != 0)
        {
            WIN
        }
        // Stalemate, or the black king takes an undefended pawn
        else if us == BLACK
            && ((pseudo_attacks(KING, bk)
                & !(pseudo_attacks(KING, wk) | pawn_attacks(WHITE, psq))) == 0
                || pseudo_attacks(KING, bk) & psq & !pseudo_attacks(KING, wk) != 0)
        {
            DRAW
        }
        else {
            UNKNOWN
        };

        KpkPosition { us, ksq, psq, result }
    }

    // classify() looks one move ahead. The side to move gets its good
    // result if any move reaches it, the bad one if every move does, and
    // stays unknown otherwise.
    fn classify(&self, db: &[KpkPosition]) -> u8 {
        let us = self.us;
        let them = !us;
        let psq = self.psq;
        let ksq_us = self.ksq[us.0 as usize];
        let ksq_them = self.ksq[them.0 as usize];

        let good = if us == WHITE { WIN  } else { DRAW };
        let bad  = if us == WHITE { DRAW } else { WIN  };

        let mut r = INVALID;

        for s in pseudo_attacks(KING, ksq_us) {
            r |= if us == WHITE {
                db[index(them, ksq_them, s, psq)].result
            } else {
                db[index(them, s, ksq_them, psq)].result
            };
        }

        if us == WHITE {
            if psq.rank() < RANK_7 {
                r |= db[index(them, ksq_them, ksq_us, psq + NORTH)].result;
            }

            if psq.rank() == RANK_2
                && psq + NORTH != ksq_us
                && psq + NORTH != ksq_them
            {
                r |= db[index(them, ksq_them, ksq_us, psq + 2 * NORTH)].result;
            }
        }

        if r & good != 0 { good }
        else if r & UNKNOWN != 0 { UNKNOWN }
        else { bad }
    }
}

// KpkProber answers WDL probes for KvK and king and pawn against king from
// a bitbase computed in memory. Each u32 stores 32 results, one per bit,
// set when the side with the pawn wins. It reads no files and knows no
// distances, so DTZ probes never succeed.
pub struct KpkProber {
    bitbase: Vec<u32>,
}

impl KpkProber {
    pub fn new() -> KpkProber {
        let mut db: Vec<KpkPosition> =
            (0..MAX_INDEX).map(|idx| KpkPosition::new(idx as u32)).collect();

        // Iterate until no unknown position can be resolved any more
        let mut cycles = 0;
        let mut repeat = true;
        while repeat {
            repeat = false;
            cycles += 1;
            for idx in 0..MAX_INDEX {
                if db[idx].result == UNKNOWN {
                    let result = db[idx].classify(&db);
                    if result != UNKNOWN {
                        db[idx].result = result;
                        repeat = true;
                    }
                }
            }
        }

        let mut bitbase = vec![0u32; MAX_INDEX / 32];
        for (idx, p) in db.iter().enumerate() {
            if p.result == WIN {
                bitbase[idx / 32] |= 1u32 << (idx & 0x1f);
            }
        }

        tracing::debug!(
            cycles,
            wins = bitbase.iter().map(|w| w.count_ones()).sum::<u32>(),
            "kpk bitbase built"
        );

        KpkProber { bitbase }
    }

    // probe() tells whether White wins with the pawn on a file A-D
    pub fn probe(&self, wksq: Square, wpsq: Square, bksq: Square, us: Color)
        -> bool
    {
        debug_assert!(wpsq.file() <= FILE_D);

        let idx = index(us, bksq, wksq, wpsq);
        self.bitbase[idx / 32] & (1 << (idx & 0x1f)) != 0
    }

    // probe_kpk() probes a KPvK or KvKP position from the point of view of
    // the side to move. The board is flipped so that the pawn is White's
    // and mirrored so that it stands on files A-D. A pawn on its first or
    // last rank has no entry.
    fn probe_kpk(&self, pos: &Position) -> Option<Wdl> {
        let strong = if pos.pieces_cp(WHITE, PAWN) != 0 { WHITE } else { BLACK };
        let weak = !strong;

        let normalize = |s: Square| {
            let s = if strong == WHITE { s } else { !s };
            if lsb(pos.pieces_p(PAWN)).file() >= FILE_E {
                Square(s.0 ^ 7)
            } else {
                s
            }
        };

        let wksq = normalize(pos.king_square(strong));
        let bksq = normalize(pos.king_square(weak));
        let psq = normalize(lsb(pos.pieces_p(PAWN)));
        let us = if pos.side_to_move() == strong { WHITE } else { BLACK };

        if psq.rank() == RANK_1 || psq.rank() == RANK_8 {
            return None;
        }

        // The bitbase answers for the side with the pawn
        let wdl = if self.probe(wksq, psq, bksq, us) { Wdl::Win } else { Wdl::Draw };
        Some(if us == WHITE { wdl } else { -wdl })
    }
}

impl Default for KpkProber {
    fn default() -> Self {
        KpkProber::new()
    }
}

impl Prober for KpkProber {
    fn init(&mut self, _dirs: &[PathBuf]) -> Result<usize, TbError> {
        // KvK and KPvK
        Ok(2)
    }

    fn max_pieces(&self) -> u32 {
        3
    }

    fn probe_wdl(&self, pos: &mut Position) -> Option<Wdl> {
        let kk = MaterialId::from_pieces(&[W_KING, B_KING]);
        let material = pos.material();

        if material == kk {
            Some(Wdl::Draw)
        } else if material == MaterialId::from_pieces(&[W_KING, W_PAWN, B_KING])
            || material == MaterialId::from_pieces(&[W_KING, B_KING, B_PAWN])
        {
            self.probe_kpk(pos)
        } else {
            None
        }
    }

    fn probe_dtz(&self, _pos: &mut Position) -> Option<i32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kpk(wk: Square, wp: Square, bk: Square, us: Color) -> Position {
        let mut pos = Position::new();
        pos.set_piece(wk, W_KING);
        pos.set_piece(wp, W_PAWN);
        pos.set_piece(bk, B_KING);
        pos.set_side_to_move(us);
        pos
    }

    #[test]
    fn known_kpk_results() {
        let kpk_prober = KpkProber::new();

        // The defender holds the opposition only if White has to move
        let mut pos = kpk(Square::E5, Square::E4, Square::E7, WHITE);
        assert_eq!(kpk_prober.probe_wdl(&mut pos), Some(Wdl::Draw));
        pos.set_side_to_move(BLACK);
        assert_eq!(kpk_prober.probe_wdl(&mut pos), Some(Wdl::Loss));

        // King on the sixth in front of the pawn wins either way
        let mut pos = kpk(Square::E6, Square::E5, Square::E8, WHITE);
        assert_eq!(kpk_prober.probe_wdl(&mut pos), Some(Wdl::Win));

        // Rook pawn with the defending king in the corner
        let mut pos = kpk(Square::B6, Square::A6, Square::A8, WHITE);
        assert_eq!(kpk_prober.probe_wdl(&mut pos), Some(Wdl::Draw));

        // Pawn outside the square of the king
        let mut pos = kpk(Square::A1, Square::C5, Square::H6, WHITE);
        assert_eq!(kpk_prober.probe_wdl(&mut pos), Some(Wdl::Win));
    }

    #[test]
    fn colors_and_wings_are_normalized() {
        let kpk_prober = KpkProber::new();

        // The opposition position with colors swapped, White to move
        let mut pos = Position::new();
        pos.set_piece(Square::D4, B_KING);
        pos.set_piece(Square::D5, B_PAWN);
        pos.set_piece(Square::D2, W_KING);
        pos.set_side_to_move(WHITE);
        assert_eq!(kpk_prober.probe_wdl(&mut pos), Some(Wdl::Loss));
        pos.set_side_to_move(BLACK);
        assert_eq!(kpk_prober.probe_wdl(&mut pos), Some(Wdl::Draw));

        let mut pos = kpk(Square::H1, Square::F5, Square::A3, WHITE);
        assert_eq!(kpk_prober.probe_wdl(&mut pos), Some(Wdl::Win));
    }

    #[test]
    fn other_material_has_no_table() {
        let kpk_prober = KpkProber::new();
        let mut pos = Position::new();
        pos.set_piece(Square::E1, W_KING);
        pos.set_piece(Square::E8, B_KING);
        assert_eq!(kpk_prober.probe_wdl(&mut pos), Some(Wdl::Draw));
        pos.set_piece(Square::A1, W_ROOK);
        assert_eq!(kpk_prober.probe_wdl(&mut pos), None);
        assert_eq!(kpk_prober.probe_dtz(&mut pos), None);
    }
}
