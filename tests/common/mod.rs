// SPDX-License-Identifier: GPL-3.0-or-later

#![allow(dead_code)]

use tbcore::position::Position;
use tbcore::types::*;

pub const START_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const KIWIPETE_FEN: &str =
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

// from_fen() builds a position from a FEN string. The library has no FEN
// reader of its own, positions reach it as raw boards.
pub fn from_fen(fen: &str) -> Position {
    let mut pos = Position::new();
    let mut fields = fen.split_whitespace();

    let placement = fields.next().expect("missing placement");
    let mut file = FILE_A;
    let mut rank = RANK_8;
    for c in placement.chars() {
        match c {
            '/' => {
                rank -= 1;
                file = FILE_A;
            }
            '1'..='8' => file += c as u32 - '0' as u32,
            _ => {
                let idx = " PNBRQK  pnbrqk".find(c).expect("bad piece");
                pos.set_piece(Square::make(file, rank), Piece(idx as u32));
                file += 1;
            }
        }
    }

    match fields.next().unwrap_or("w") {
        "w" => pos.set_side_to_move(WHITE),
        _ => pos.set_side_to_move(BLACK),
    }

    let mut cr = NO_CASTLING;
    for c in fields.next().unwrap_or("-").chars() {
        cr |= match c {
            'K' => WHITE_OO,
            'Q' => WHITE_OOO,
            'k' => BLACK_OO,
            'q' => BLACK_OOO,
            _ => NO_CASTLING,
        };
    }
    pos.set_castling_rights(cr);

    let ep: Vec<char> = fields.next().unwrap_or("-").chars().collect();
    if ep.len() == 2 {
        let f = ep[0] as u32 - 'a' as u32;
        let r = ep[1] as u32 - '1' as u32;
        pos.set_ep_square(Square::make(f, r));
    }

    pos.set_rule50_count(fields.next().and_then(|s| s.parse().ok()).unwrap_or(0));
    pos.set_fullmove_number(fields.next().and_then(|s| s.parse().ok()).unwrap_or(1));

    assert!(pos.is_ok(), "inconsistent position: {}", fen);
    pos
}

// find_move() looks up a legal move given in coordinate notation
pub fn find_move(pos: &mut Position, uci: &str) -> Move {
    tbcore::movegen::legal_moves(pos)
        .find(|m| m.to_string() == uci)
        .unwrap_or_else(|| panic!("{} is not legal", uci))
}

pub fn play(pos: &mut Position, moves: &[&str]) {
    for uci in moves {
        let m = find_move(pos, uci);
        pos.make_move(m);
    }
}

macro_rules! assert_perft {
    ($($name:ident, $fen:expr, $depth:tt, $expected:tt;)*) => {$(
        #[test]
        fn $name() {
            let mut pos = common::from_fen($fen);
            let actual = tbcore::movegen::perft(&mut pos, $depth);
            assert_eq!(actual, $expected)
        }
    )*};
}

pub(crate) use assert_perft;
