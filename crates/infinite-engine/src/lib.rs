//! Move legality and game termination for infinite chess.
//!
//! This crate provides:
//! - [`BoardIndex`] - sparse board with per-direction line lists
//! - [`Variant`] - immutable per-game rules compiled from a [`GameSetup`]
//! - [`Position`] - game state with reversible move application
//! - [`calculate`] - legal moves of one piece, filtered for check safety
//! - [`evaluate`] - checkmate, stalemate, draws and custom win conditions
//! - [`Game`] - complete game management with history tracking
//!
//! # Architecture
//!
//! Coordinates are unbounded, so the board is a map from square to piece plus,
//! for every slide direction in play, the lists of pieces sharing each line.
//! Sliding moves and attacks are answered from those lists without walking the
//! board square by square. Movement is data-driven: every kind's jumps and
//! slides come from a [`MovesetTable`](moveset::MovesetTable).
//!
//! # Example
//!
//! ```
//! use infinite_core::Coord;
//! use infinite_engine::{Game, GameConclusion};
//!
//! let mut game = Game::classical().unwrap();
//! let moves = game.legal_moves(Coord::new(5, 2)).unwrap();
//! assert_eq!(moves.jumps.len(), 2);
//!
//! let conclusion = game.make_move(Coord::new(5, 2), Coord::new(5, 4), None).unwrap();
//! assert_eq!(conclusion, GameConclusion::Ongoing);
//! ```

pub mod board;
mod error;
mod game;
pub mod movegen;
pub mod moveset;
mod position;
pub mod rules;
mod setup;
mod variant;

pub use board::{BoardError, BoardIndex};
pub use error::EngineError;
pub use game::{Game, GameError};
pub use movegen::attacks::{detect_check, is_in_check, is_square_attacked, Attacker};
pub use movegen::{calculate, CalcOptions, LegalMoves};
pub use moveset::{Extent, Moveset};
pub use position::{BoardChange, CheckState, MoveUndo, Position};
pub use rules::{
    evaluate, evaluate_with, DrawReason, Evaluation, GameConclusion, LegalMoveScan,
    RunToCompletion, ScanDriver, WinReason,
};
pub use setup::{
    ConfigError, GameSetup, MovesetConfig, PieceSpec, PositionConfig, PromotionRanks,
    RightsPolicy, RulesConfig, SlideConfig, WinConditions,
};
pub use variant::{Variant, WinCondition};
