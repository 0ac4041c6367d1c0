//! Piece kinds, piece types, and the type registry.
//!
//! A [`PieceType`] is a raw kind paired with an owner. The registry
//! constants on [`RawType`] group kinds by the roles the rules care about
//! (royal, jumping royal, sliding royal, neutral furniture).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::{Color, Coord};

/// Errors produced when parsing a piece type name such as `"white-queen"`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PieceTypeParseError {
    #[error("expected '<color>-<kind>', got {0:?}")]
    Malformed(String),

    #[error("unknown color {0:?}")]
    UnknownColor(String),

    #[error("unknown piece kind {0:?}")]
    UnknownKind(String),
}

/// The movement kind of a piece, independent of its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RawType {
    King,
    Giraffe,
    Camel,
    Zebra,
    Knightrider,
    Amazon,
    Queen,
    RoyalQueen,
    Hawk,
    Chancellor,
    Archbishop,
    Knight,
    Guard,
    Rook,
    Bishop,
    Pawn,
    Centaur,
    RoyalCentaur,
    Obstacle,
    Void,
}

impl RawType {
    /// All raw kinds in registry order.
    pub const ALL: [RawType; 20] = [
        RawType::King,
        RawType::Giraffe,
        RawType::Camel,
        RawType::Zebra,
        RawType::Knightrider,
        RawType::Amazon,
        RawType::Queen,
        RawType::RoyalQueen,
        RawType::Hawk,
        RawType::Chancellor,
        RawType::Archbishop,
        RawType::Knight,
        RawType::Guard,
        RawType::Rook,
        RawType::Bishop,
        RawType::Pawn,
        RawType::Centaur,
        RawType::RoyalCentaur,
        RawType::Obstacle,
        RawType::Void,
    ];

    /// Kinds whose loss or mate ends the game.
    pub const ROYALS: [RawType; 3] = [RawType::King, RawType::RoyalQueen, RawType::RoyalCentaur];

    /// Kinds owned by the neutral colour.
    pub const NEUTRALS: [RawType; 2] = [RawType::Obstacle, RawType::Void];

    #[inline]
    pub fn is_royal(self) -> bool {
        Self::ROYALS.contains(&self)
    }

    #[inline]
    pub fn is_neutral(self) -> bool {
        Self::NEUTRALS.contains(&self)
    }

    /// Returns the kebab-case name used in configuration.
    pub const fn name(self) -> &'static str {
        match self {
            RawType::King => "king",
            RawType::Giraffe => "giraffe",
            RawType::Camel => "camel",
            RawType::Zebra => "zebra",
            RawType::Knightrider => "knightrider",
            RawType::Amazon => "amazon",
            RawType::Queen => "queen",
            RawType::RoyalQueen => "royal-queen",
            RawType::Hawk => "hawk",
            RawType::Chancellor => "chancellor",
            RawType::Archbishop => "archbishop",
            RawType::Knight => "knight",
            RawType::Guard => "guard",
            RawType::Rook => "rook",
            RawType::Bishop => "bishop",
            RawType::Pawn => "pawn",
            RawType::Centaur => "centaur",
            RawType::RoyalCentaur => "royal-centaur",
            RawType::Obstacle => "obstacle",
            RawType::Void => "void",
        }
    }
}

impl fmt::Display for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RawType {
    type Err = PieceTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RawType::ALL
            .into_iter()
            .find(|raw| raw.name() == s)
            .ok_or_else(|| PieceTypeParseError::UnknownKind(s.to_string()))
    }
}

/// A raw kind owned by a colour, e.g. a white rook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PieceType {
    pub raw: RawType,
    pub color: Color,
}

impl PieceType {
    #[inline]
    pub const fn new(raw: RawType, color: Color) -> Self {
        PieceType { raw, color }
    }

    /// Iterates every type a colour can own: neutral furniture for Neutral,
    /// every non-neutral kind for the players.
    pub fn all_of_color(color: Color) -> impl Iterator<Item = PieceType> {
        RawType::ALL
            .into_iter()
            .filter(move |raw| raw.is_neutral() != color.is_player())
            .map(move |raw| PieceType::new(raw, color))
    }

    #[inline]
    pub fn is_royal(self) -> bool {
        self.raw.is_royal()
    }

    #[inline]
    pub fn is_void(self) -> bool {
        self.raw == RawType::Void
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.color.name(), self.raw.name())
    }
}

impl FromStr for PieceType {
    type Err = PieceTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (color, raw) = s
            .split_once('-')
            .ok_or_else(|| PieceTypeParseError::Malformed(s.to_string()))?;
        Ok(PieceType::new(raw.parse()?, color.parse()?))
    }
}

impl TryFrom<String> for PieceType {
    type Error = PieceTypeParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PieceType> for String {
    fn from(t: PieceType) -> Self {
        t.to_string()
    }
}

/// A piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceType,
    pub coord: Coord,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceType, coord: Coord) -> Self {
        Piece { kind, coord }
    }

    #[inline]
    pub const fn color(&self) -> Color {
        self.kind.color
    }

    #[inline]
    pub const fn raw(&self) -> RawType {
        self.kind.raw
    }
}
