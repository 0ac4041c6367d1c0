//! Core types for infinite chess.
//!
//! This crate provides the value types shared by the rules engine:
//! - [`Coord`], [`Direction`], and the [`CoordKey`] codec for the unbounded board
//! - [`Color`], [`RawType`], and [`PieceType`] with the royal/neutral registry
//! - [`Piece`] for a typed piece standing on a square
//! - [`Move`], [`Destination`], and [`SpecialTag`] for move records

mod color;
mod coord;
mod mov;
mod piece;

pub use color::Color;
pub use coord::{Coord, CoordKey, CoordKeyError, Direction};
pub use mov::{Destination, Move, SpecialTag};
pub use piece::{Piece, PieceType, PieceTypeParseError, RawType};
