//! Move records and special-move tags.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Coord, PieceType};

/// Annotation carried by a destination produced by a special-move rule.
///
/// Each tag holds exactly what is needed to apply the move and to take it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialTag {
    /// King displacement of two squares; the partner jumps to the square the
    /// king passed over. `dir` is -1 (towards -x) or +1.
    Castle { dir: i64, partner: Coord },
    /// Pawn advance of two squares; sets the en-passant target.
    DoublePush,
    /// Diagonal pawn capture where the victim stands on `captured`, not on
    /// the destination.
    EnPassant { captured: Coord },
    /// Pawn reaches a promotion rank.
    Promotion,
}

/// A candidate destination square, possibly tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    pub coord: Coord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<SpecialTag>,
}

impl Destination {
    /// An untagged destination.
    #[inline]
    pub const fn plain(coord: Coord) -> Self {
        Destination { coord, tag: None }
    }

    #[inline]
    pub const fn tagged(coord: Coord, tag: SpecialTag) -> Self {
        Destination {
            coord,
            tag: Some(tag),
        }
    }

    /// Copies this destination's tag onto a move record.
    pub fn copy_tag_to_move(&self, mv: &mut Move) {
        mv.tag = self.tag;
    }

    /// Copies this destination's tag onto another destination.
    pub fn copy_tag_to(&self, other: &mut Destination) {
        other.tag = self.tag;
    }
}

impl From<Coord> for Destination {
    fn from(coord: Coord) -> Self {
        Destination::plain(coord)
    }
}

/// A move as applied to a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Type of the moving piece before any promotion.
    pub kind: PieceType,
    pub from: Coord,
    pub to: Coord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<SpecialTag>,
    /// Type of the captured piece, if any (including an en-passant victim).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured: Option<PieceType>,
    /// Type the mover becomes on arrival.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceType>,
}

impl Move {
    /// Creates an untagged, non-capturing move.
    pub const fn new(kind: PieceType, from: Coord, to: Coord) -> Self {
        Move {
            kind,
            from,
            to,
            tag: None,
            captured: None,
            promotion: None,
        }
    }

    /// Creates a move towards a candidate destination, carrying its tag over.
    pub fn towards(kind: PieceType, from: Coord, destination: &Destination) -> Self {
        let mut mv = Move::new(kind, from, destination.coord);
        destination.copy_tag_to_move(&mut mv);
        mv
    }

    /// Copies this move's tag back onto a destination.
    pub fn copy_tag_to_destination(&self, destination: &mut Destination) {
        destination.tag = self.tag;
    }

    /// Returns the destination this move was built from.
    pub fn destination(&self) -> Destination {
        let mut destination = Destination::plain(self.to);
        self.copy_tag_to_destination(&mut destination);
        destination
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub const fn is_castle(&self) -> bool {
        matches!(self.tag, Some(SpecialTag::Castle { .. }))
    }

    /// Returns the square the captured piece stood on, if any.
    pub fn capture_square(&self) -> Option<Coord> {
        self.captured?;
        match self.tag {
            Some(SpecialTag::EnPassant { captured }) => Some(captured),
            _ => Some(self.to),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}>{}", self.kind, self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "={}", promotion.raw)?;
        }
        Ok(())
    }
}
