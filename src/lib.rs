// SPDX-License-Identifier: GPL-3.0-or-later

pub mod bitbases;
pub mod bitboard;
pub mod material;
pub mod misc;
pub mod movegen;
pub mod position;
pub mod tb;
pub mod types;

pub use bitbases::KpkProber;
pub use bitboard::Bitboard;
pub use material::MaterialId;
pub use movegen::{GenType, MoveList};
pub use position::{Position, PositionError, RawBoard, UndoInfo};
pub use tb::{Prober, Tablebases, TbError, TbOptions, TbScores, Wdl};
pub use types::{Color, Move, Piece, PieceType, Square};

// init() builds the attack tables up front. Everything also works without
// it, the tables are then built by the first call that needs them.
pub fn init() {
    bitboard::init();
}
