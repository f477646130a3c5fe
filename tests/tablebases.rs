// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use tbcore::position::{Position, RawBoard};
use tbcore::tb::{Prober, Tablebases, TbError, TbOptions, TbScores, Wdl};
use tbcore::types::*;
use tbcore::KpkProber;

fn tb_dir() -> String {
    std::env::temp_dir().to_string_lossy().into_owned()
}

fn kpk_tablebases() -> Tablebases<KpkProber> {
    let mut tb = Tablebases::new(KpkProber::new());
    tb.initialize(&tb_dir());
    assert!(tb.is_ready());
    tb
}

// Raw piece codes, 1-6 white K Q R B N P and 7-12 black
fn raw_squares(pieces: &[(Square, u8)]) -> [u8; 64] {
    let mut squares = [0u8; 64];
    for &(s, code) in pieces {
        squares[s.0 as usize] = code;
    }
    squares
}

fn raw<'a>(squares: &'a [u8], white_to_move: bool) -> RawBoard<'a> {
    RawBoard {
        squares,
        white_to_move,
        ep_square: -1,
        castle_mask: 0,
        half_move_clock: 0,
        full_move_counter: 1,
    }
}

#[test]
fn kpk_results_through_raw_boards() {
    let tb = kpk_tablebases();

    // White Ke5 Pe4, Black Ke7
    let squares = raw_squares(&[(Square::E5, 1), (Square::E4, 6), (Square::E7, 7)]);
    assert_eq!(tb.probe_raw(&raw(&squares, true)).wdl, Some(0));
    assert_eq!(tb.probe_raw(&raw(&squares, false)).wdl, Some(-1));

    // White Ke6 Pe5, Black Ke8
    let squares = raw_squares(&[(Square::E6, 1), (Square::E5, 6), (Square::E8, 7)]);
    assert_eq!(tb.probe_raw(&raw(&squares, true)), TbScores { wdl: Some(1), dtz: None });

    // Black Kd4 Pd5, White Kd2 with Black to move: Black cannot make progress
    let squares = raw_squares(&[(Square::D4, 7), (Square::D5, 12), (Square::D2, 1)]);
    assert_eq!(tb.probe_raw(&raw(&squares, false)).wdl, Some(0));
    assert_eq!(tb.probe_raw(&raw(&squares, true)).wdl, Some(-1));
}

#[test]
fn castling_rights_block_probes() {
    let tb = kpk_tablebases();
    let squares = raw_squares(&[(Square::E1, 1), (Square::H1, 3), (Square::E8, 7)]);
    let mut board = raw(&squares, true);
    board.castle_mask = 2;
    assert_eq!(tb.probe_raw(&board), TbScores::default());

    let squares = raw_squares(&[(Square::E1, 1), (Square::E2, 6), (Square::E8, 7)]);
    let mut board = raw(&squares, true);
    assert!(tb.probe_raw(&board).wdl.is_some());
    board.castle_mask = 1;
    assert_eq!(tb.probe_raw(&board).wdl, None);
}

#[test]
fn malformed_boards_have_no_result() {
    let tb = kpk_tablebases();

    let squares = [0u8; 63];
    assert_eq!(tb.probe_raw(&raw(&squares, true)), TbScores::default());

    let squares = raw_squares(&[(Square::E1, 1), (Square::E2, 13), (Square::E8, 7)]);
    assert_eq!(tb.probe_raw(&raw(&squares, true)), TbScores::default());

    let squares = raw_squares(&[(Square::E1, 1), (Square::E2, 6)]);
    assert_eq!(tb.probe_raw(&raw(&squares, true)), TbScores::default());
}

#[test]
fn king_capture_positions_are_rejected() {
    let tb = kpk_tablebases();

    // Black king in check with White to move
    let squares = raw_squares(&[(Square::E5, 1), (Square::D6, 6), (Square::E7, 7)]);
    assert_eq!(tb.probe_raw(&raw(&squares, true)).wdl, None);
    assert!(tb.probe_raw(&raw(&squares, false)).wdl.is_some());
}

#[test]
fn unbound_tablebases_give_no_result() {
    let mut tb = Tablebases::new(KpkProber::new());
    let squares = raw_squares(&[(Square::E6, 1), (Square::E5, 6), (Square::E8, 7)]);
    assert_eq!(tb.probe_raw(&raw(&squares, true)).wdl, None);

    tb.initialize(&tb_dir());
    assert_eq!(tb.probe_raw(&raw(&squares, true)).wdl, Some(1));

    tb.initialize("<empty>");
    assert!(!tb.is_ready());
    assert_eq!(tb.probe_raw(&raw(&squares, true)).wdl, None);

    tb.initialize("/this/directory/does/not/exist");
    assert!(!tb.is_ready());
    assert_eq!(tb.probe_raw(&raw(&squares, true)).wdl, None);
}

// Answers every probe with the same distance
struct FixedDtz(i32);

impl Prober for FixedDtz {
    fn init(&mut self, _dirs: &[PathBuf]) -> Result<usize, TbError> {
        Ok(1)
    }

    fn max_pieces(&self) -> u32 {
        5
    }

    fn probe_wdl(&self, _pos: &mut Position) -> Option<Wdl> {
        Some(if self.0 > 0 { Wdl::Win } else if self.0 < 0 { Wdl::Loss } else { Wdl::Draw })
    }

    fn probe_dtz(&self, _pos: &mut Position) -> Option<i32> {
        Some(self.0)
    }
}

fn dtz_at(dtz: i32, half_move_clock: i32) -> Option<i32> {
    let mut tb = Tablebases::new(FixedDtz(dtz));
    tb.initialize(&tb_dir());
    let squares = raw_squares(&[(Square::A1, 1), (Square::B7, 2), (Square::H8, 7)]);
    let mut board = raw(&squares, true);
    board.half_move_clock = half_move_clock;
    tb.probe_raw(&board).dtz
}

#[test]
fn dtz_at_the_fifty_move_limit() {
    // Mate in one with the clock at 100 may be wrong, give no answer
    assert_eq!(dtz_at(1, 100), None);
    assert_eq!(dtz_at(-2, 99), None);
    assert_eq!(dtz_at(1, 99), Some(1));
    assert_eq!(dtz_at(2, 100), Some(0));

    assert_eq!(dtz_at(30, 70), Some(30));
    assert_eq!(dtz_at(30, 71), Some(0));
    assert_eq!(dtz_at(-30, 71), Some(0));
    assert_eq!(dtz_at(0, 0), Some(0));
}

#[test]
fn rule50_option_passes_dtz_through() {
    let mut tb = Tablebases::with_options(
        FixedDtz(30),
        TbOptions { use_rule_50: false, ..TbOptions::default() },
    );
    tb.initialize(&tb_dir());
    let squares = raw_squares(&[(Square::A1, 1), (Square::B7, 2), (Square::H8, 7)]);
    let mut board = raw(&squares, true);
    board.half_move_clock = 90;
    assert_eq!(tb.probe_raw(&board), TbScores { wdl: Some(1), dtz: Some(30) });
}

#[test]
fn probe_limit_caps_piece_count() {
    let mut tb = Tablebases::with_options(
        FixedDtz(5),
        TbOptions { probe_limit: 3, ..TbOptions::default() },
    );
    tb.initialize(&tb_dir());
    assert_eq!(tb.probe_limit(), 3);

    let squares = raw_squares(&[(Square::A1, 1), (Square::B7, 2), (Square::H8, 7)]);
    assert_eq!(tb.probe_raw(&raw(&squares, true)).dtz, Some(5));

    let squares = raw_squares(&[
        (Square::A1, 1), (Square::B7, 2), (Square::C7, 2), (Square::H8, 7),
    ]);
    assert_eq!(tb.probe_raw(&raw(&squares, true)), TbScores::default());
}
