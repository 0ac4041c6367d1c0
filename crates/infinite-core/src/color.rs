//! Piece ownership.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::PieceTypeParseError;

/// The owner of a piece.
///
/// White and Black are the players. Neutral owns board furniture (voids and
/// obstacles) that never moves and never gives or receives check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
    Neutral = 2,
}

impl Color {
    /// The two colours that take turns.
    pub const PLAYERS: [Color; 2] = [Color::White, Color::Black];

    /// Returns the opposing player. Neutral has no opponent and maps to itself.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
            Color::Neutral => Color::Neutral,
        }
    }

    /// Returns the index (0 for White, 1 for Black, 2 for Neutral).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns true for White and Black.
    #[inline]
    pub const fn is_player(self) -> bool {
        !matches!(self, Color::Neutral)
    }

    /// Returns the y-step of this colour's pawns (+1 for White, -1 for Black).
    ///
    /// Neutral pawns have no forward direction.
    #[inline]
    pub const fn pawn_direction(self) -> Option<i64> {
        match self {
            Color::White => Some(1),
            Color::Black => Some(-1),
            Color::Neutral => None,
        }
    }

    /// Returns the lowercase name used in type names and configuration.
    pub const fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
            Color::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
            Color::Neutral => write!(f, "Neutral"),
        }
    }
}

impl FromStr for Color {
    type Err = PieceTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(Color::White),
            "black" => Ok(Color::Black),
            "neutral" => Ok(Color::Neutral),
            other => Err(PieceTypeParseError::UnknownColor(other.to_string())),
        }
    }
}
