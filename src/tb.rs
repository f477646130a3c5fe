// SPDX-License-Identifier: GPL-3.0-or-later

use crate::bitboard::*;
use crate::movegen;
use crate::position::{Position, RawBoard};
use crate::types::*;

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum TbError {
    #[error("empty tablebase path")]
    EmptyPath,

    #[error("tablebase directory {0} not found")]
    MissingDirectory(String),

    #[error("tablebase prober: {0}")]
    Prober(String),
}

// Outcome of a WDL probe, from the point of view of the side to move.
// Cursed wins and blessed losses are wins and losses that the fifty-move
// rule turns into draws.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(i32)]
pub enum Wdl {
    Loss        = -2,
    BlessedLoss = -1,
    Draw        =  0,
    CursedWin   =  1,
    Win         =  2,
}

impl std::ops::Neg for Wdl {
    type Output = Wdl;
    fn neg(self) -> Wdl {
        match self {
            Wdl::Loss        => Wdl::Win,
            Wdl::BlessedLoss => Wdl::CursedWin,
            Wdl::Draw        => Wdl::Draw,
            Wdl::CursedWin   => Wdl::BlessedLoss,
            Wdl::Win         => Wdl::Loss,
        }
    }
}

// Prober is the interface to an endgame tablebase implementation. The
// bridge only calls it for positions that passed its own pre-checks.
// A probe returning None means "no usable result".
pub trait Prober {
    // init() binds the prober to the given directories and returns the
    // number of tables found.
    fn init(&mut self, dirs: &[PathBuf]) -> Result<usize, TbError>;

    // Largest piece count (kings included) any bound table covers
    fn max_pieces(&self) -> u32;

    fn probe_wdl(&self, pos: &mut Position) -> Option<Wdl>;

    // Signed distance in plies to the next zeroing move, 0 for a draw
    fn probe_dtz(&self, pos: &mut Position) -> Option<i32>;
}

// TbOptions mirror the Syzygy engine options
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TbOptions {
    // Largest number of pieces probed, clamped by the prober's maximum
    pub probe_limit: u32,
    // With the rule off, cursed wins count as wins, blessed losses as
    // losses, and DTZ values are passed on unchanged.
    pub use_rule_50: bool,
}

impl Default for TbOptions {
    fn default() -> Self {
        TbOptions { probe_limit: 7, use_rule_50: true }
    }
}

// Both probe results for one position, None where there is no result
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TbScores {
    pub wdl: Option<i32>,
    pub dtz: Option<i32>,
}

fn sep_char() -> char {
    if cfg!(target_os = "windows") { ';' } else { ':' }
}

// split_paths() splits a tablebase path list into directories. Every
// listed directory must exist.
pub fn split_paths(path: &str) -> Result<Vec<PathBuf>, TbError> {
    let mut dirs = Vec::new();
    for dir in path.split(sep_char()).filter(|d| !d.is_empty()) {
        if !Path::new(dir).is_dir() {
            return Err(TbError::MissingDirectory(dir.to_string()));
        }
        dirs.push(PathBuf::from(dir));
    }
    if dirs.is_empty() {
        return Err(TbError::EmptyPath);
    }
    Ok(dirs)
}

// Tablebases binds a prober to a path and turns its raw answers into the
// scores a GUI shows: WDL in {-1, 0, 1} and fifty-move aware DTZ.
pub struct Tablebases<P: Prober> {
    prober: P,
    path: Option<String>,
    ready: bool,
    options: TbOptions,
}

impl<P: Prober> Tablebases<P> {
    pub fn new(prober: P) -> Tablebases<P> {
        Tablebases::with_options(prober, TbOptions::default())
    }

    pub fn with_options(prober: P, options: TbOptions) -> Tablebases<P> {
        Tablebases { prober, path: None, ready: false, options }
    }

    pub fn options(&self) -> TbOptions {
        self.options
    }

    pub fn set_options(&mut self, options: TbOptions) {
        self.options = options;
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    // is_ready() is true after a successful bind
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    // initialize() binds the prober to 'path'. Nothing happens if the path
    // is the one bound last time, whether that bind worked or not. "" and
    // "<empty>" unbind. A failed bind leaves the handle unusable: every
    // probe reports no result until a bind succeeds.
    pub fn initialize(&mut self, path: &str) {
        if self.path.as_deref() == Some(path) {
            return;
        }

        self.path = Some(path.to_string());
        self.ready = false;

        if path.is_empty() || path == "<empty>" {
            tracing::debug!("tablebases unbound");
            return;
        }

        tracing::debug!(path, "binding tablebases");
        match split_paths(path).and_then(|dirs| self.prober.init(&dirs)) {
            Ok(tables) => {
                self.ready = true;
                tracing::info!(
                    path,
                    tables,
                    max_pieces = self.prober.max_pieces(),
                    "tablebases bound"
                );
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "tablebase bind failed");
            }
        }
    }

    // probe_limit() is the largest piece count that will be probed
    pub fn probe_limit(&self) -> u32 {
        if !self.ready {
            return 0;
        }
        std::cmp::min(self.prober.max_pieces(), self.options.probe_limit)
    }

    // probeable() applies the checks shared by both probes: few enough
    // pieces, no castling rights left and the side to move not able to
    // capture the enemy king.
    fn probeable(&self, pos: &Position) -> bool {
        if !self.ready {
            tracing::trace!("probe rejected: no tablebases bound");
            return false;
        }
        let pieces = popcount(pos.pieces());
        if pieces > self.probe_limit() {
            tracing::trace!(pieces, "probe rejected: too many pieces");
            return false;
        }
        if pos.castling_rights() != NO_CASTLING {
            tracing::trace!("probe rejected: castling rights");
            return false;
        }
        if movegen::can_take_king(pos) {
            tracing::trace!("probe rejected: king can be captured");
            return false;
        }
        true
    }

    // probe_wdl() returns 1 for a win, 0 for a draw and -1 for a loss of
    // the side to move.
    pub fn probe_wdl(&self, pos: &mut Position) -> Option<i32> {
        if !self.probeable(pos) {
            return None;
        }

        let wdl = match self.prober.probe_wdl(pos) {
            Some(wdl) => wdl,
            None => {
                tracing::trace!(material = %pos.material(), "wdl probe failed");
                return None;
            }
        };

        let rule50 = self.options.use_rule_50;
        Some(match wdl {
            Wdl::Win                   => 1,
            Wdl::CursedWin if !rule50  => 1,
            Wdl::BlessedLoss if !rule50 => -1,
            Wdl::Loss                  => -1,
            _                          => 0,
        })
    }

    // probe_dtz() returns the distance to zeroing, or 0 when the game is
    // drawn, the fifty-move rule included. Near mate the tables may count
    // one ply off, so a result landing exactly on the limit is withheld.
    pub fn probe_dtz(&self, pos: &mut Position) -> Option<i32> {
        if !self.probeable(pos) {
            return None;
        }

        let dtz = match self.prober.probe_dtz(pos) {
            Some(dtz) => dtz,
            None => {
                tracing::trace!(material = %pos.material(), "dtz probe failed");
                return None;
            }
        };

        if dtz == 0 || !self.options.use_rule_50 {
            return Some(dtz);
        }

        let max_half_move_clock = dtz.abs() + pos.rule50_count();
        if dtz.abs() <= 2 {
            if max_half_move_clock > 101 {
                return Some(0);
            }
            if max_half_move_clock == 101 {
                tracing::trace!(dtz, "dtz withheld at the fifty-move limit");
                return None;
            }
        } else if max_half_move_clock > 100 {
            return Some(0);
        }

        Some(dtz)
    }

    // probe_raw() probes a board snapshot. A malformed snapshot gives no
    // result for either score.
    pub fn probe_raw(&self, raw: &RawBoard) -> TbScores {
        let mut pos = match Position::from_raw(raw) {
            Ok(pos) => pos,
            Err(e) => {
                tracing::trace!(error = %e, "probe rejected: bad board");
                return TbScores::default();
            }
        };

        TbScores {
            wdl: self.probe_wdl(&mut pos),
            dtz: self.probe_dtz(&mut pos),
        }
    }
}
