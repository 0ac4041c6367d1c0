//! Resumable "does the side to move have a legal move" scan.
//!
//! Positions with many pieces make the full scan expensive. [`LegalMoveScan`]
//! examines one piece per step and keeps its place, so a caller can spread the
//! work across frames or give up on it. A [`ScanDriver`] decides between steps
//! whether to keep going.

use infinite_core::Coord;

use crate::movegen::{calculate, CalcOptions};
use crate::{EngineError, Position, Variant};

/// Decides whether a scan should pause before examining the next piece.
pub trait ScanDriver {
    /// Called before each piece with the number of pieces examined so far.
    /// Returning true suspends the scan.
    fn should_suspend(&mut self, examined: usize) -> bool;
}

impl<F> ScanDriver for F
where
    F: FnMut(usize) -> bool,
{
    fn should_suspend(&mut self, examined: usize) -> bool {
        self(examined)
    }
}

/// A driver that never suspends.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunToCompletion;

impl ScanDriver for RunToCompletion {
    fn should_suspend(&mut self, _examined: usize) -> bool {
        false
    }
}

/// Outcome of one scan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStep {
    /// The examined piece has a legal move.
    Found(Coord),
    /// The examined piece has none; more pieces remain.
    Continue,
    /// Every piece was examined and none can move.
    Exhausted,
}

/// Incremental search for any legal move of the side to move.
#[derive(Debug, Clone)]
pub struct LegalMoveScan {
    pieces: Vec<Coord>,
    next: usize,
}

impl LegalMoveScan {
    /// Prepares a scan over the pieces of the side to move.
    pub fn new(position: &Position) -> Self {
        let pieces = position
            .board()
            .pieces_of_color(position.side_to_move())
            .into_iter()
            .map(|p| p.coord)
            .collect();
        LegalMoveScan { pieces, next: 0 }
    }

    /// Number of pieces examined so far.
    pub fn examined(&self) -> usize {
        self.next
    }

    /// Number of pieces still to examine.
    pub fn remaining(&self) -> usize {
        self.pieces.len() - self.next
    }

    /// Examines the next piece.
    ///
    /// The position must be the one the scan was created for.
    pub fn step(&mut self, variant: &Variant, position: &mut Position) -> Result<ScanStep, EngineError> {
        let Some(&coord) = self.pieces.get(self.next) else {
            return Ok(ScanStep::Exhausted);
        };
        self.next += 1;
        let moves = calculate(variant, position, coord, CalcOptions::default())?;
        if moves.has_any() {
            Ok(ScanStep::Found(coord))
        } else if self.next == self.pieces.len() {
            Ok(ScanStep::Exhausted)
        } else {
            Ok(ScanStep::Continue)
        }
    }

    /// Steps until a verdict or until the driver suspends.
    ///
    /// Returns `Some(true)` if a legal move exists, `Some(false)` if none does,
    /// and `None` if the driver suspended. A suspended scan can be run again
    /// and picks up where it stopped.
    pub fn run(
        &mut self,
        variant: &Variant,
        position: &mut Position,
        driver: &mut impl ScanDriver,
    ) -> Result<Option<bool>, EngineError> {
        loop {
            if self.remaining() > 0 && driver.should_suspend(self.next) {
                return Ok(None);
            }
            match self.step(variant, position)? {
                ScanStep::Found(_) => return Ok(Some(true)),
                ScanStep::Exhausted => return Ok(Some(false)),
                ScanStep::Continue => {}
            }
        }
    }
}
