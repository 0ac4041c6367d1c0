//! Errors raised by the rules engine.

use thiserror::Error;

use crate::board::BoardError;

/// Failures of the legality and conclusion machinery.
///
/// These are never expected outcomes: an empty move list or an ongoing game is
/// returned as a value. An `EngineError` means the caller handed the engine a
/// board state it cannot reason about.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Board(#[from] BoardError),

    /// Check detection was requested for the neutral colour.
    #[error("the neutral colour cannot be attacked")]
    NeutralDefender,
}
