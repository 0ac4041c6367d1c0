//! Immutable per-game rule configuration.
//!
//! A [`Variant`] is compiled once from a [`GameSetup`](crate::GameSetup) and is
//! passed by reference into every engine call. Nothing in it changes while the
//! game is played.

use std::collections::BTreeSet;

use infinite_core::{Color, Coord, Direction, RawType};
use serde::{Deserialize, Serialize};

use crate::board::BoardIndex;
use crate::moveset::{Moveset, MovesetTable, VicinityTable};

/// A way for a player to win.
///
/// Each colour carries its own list: the conditions under which *that* colour
/// wins against its opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WinCondition {
    Checkmate,
    RoyalCapture,
    AllRoyalsCaptured,
    AllPiecesCaptured,
    ThreeCheck,
    KingOfTheHill,
}

/// Compiled rules of one game.
#[derive(Debug, Clone)]
pub struct Variant {
    movesets: MovesetTable,
    vicinity: VicinityTable,
    directions: BTreeSet<Direction>,
    win_conditions: [Vec<WinCondition>; 2],
    promotion_ranks: [Vec<i64>; 2],
    promotions_allowed: Vec<RawType>,
    koth_squares: Vec<Coord>,
    move_rule: Option<u32>,
}

/// Everything needed to compile a [`Variant`].
pub(crate) struct VariantParts {
    pub movesets: MovesetTable,
    pub kinds_in_play: BTreeSet<RawType>,
    pub win_conditions: [Vec<WinCondition>; 2],
    pub promotion_ranks: [Vec<i64>; 2],
    pub promotions_allowed: Vec<RawType>,
    pub koth_squares: Vec<Coord>,
    pub move_rule: Option<u32>,
}

impl Variant {
    /// Derives the indexed directions and the vicinity table from the kinds
    /// that can appear during the game.
    pub(crate) fn compile(parts: VariantParts) -> Self {
        let VariantParts {
            movesets,
            kinds_in_play,
            win_conditions,
            promotion_ranks,
            promotions_allowed,
            koth_squares,
            move_rule,
        } = parts;

        let mut directions = movesets.slide_directions(kinds_in_play.iter().copied());
        if kinds_in_play.iter().any(|raw| castles(*raw)) {
            directions.insert(Direction::HORIZONTAL);
        }
        let vicinity = VicinityTable::build(&movesets, kinds_in_play.iter().copied());

        Variant {
            movesets,
            vicinity,
            directions,
            win_conditions,
            promotion_ranks,
            promotions_allowed,
            koth_squares,
            move_rule,
        }
    }

    pub fn movesets(&self) -> &MovesetTable {
        &self.movesets
    }

    #[inline]
    pub fn moveset(&self, raw: RawType) -> &Moveset {
        self.movesets.get(raw)
    }

    pub fn vicinity(&self) -> &VicinityTable {
        &self.vicinity
    }

    /// The slide directions the board index keeps lines for.
    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.directions.iter().copied()
    }

    /// Creates an empty board index for this variant.
    pub fn new_board(&self) -> BoardIndex {
        BoardIndex::new(self.directions())
    }

    /// The conditions under which `color` wins. Empty for the neutral colour.
    pub fn win_conditions(&self, color: Color) -> &[WinCondition] {
        match color {
            Color::White | Color::Black => &self.win_conditions[color.index()],
            Color::Neutral => &[],
        }
    }

    /// Returns true if `color` wins by `condition`.
    #[inline]
    pub fn uses(&self, color: Color, condition: WinCondition) -> bool {
        self.win_conditions(color).contains(&condition)
    }

    /// Returns true if the opponent of `color` wins by `condition`.
    #[inline]
    pub fn opponent_uses(&self, color: Color, condition: WinCondition) -> bool {
        self.uses(color.opposite(), condition)
    }

    /// Returns true if a pawn of `color` promotes on rank `y`.
    pub fn is_promotion_rank(&self, color: Color, y: i64) -> bool {
        match color {
            Color::White | Color::Black => self.promotion_ranks[color.index()].contains(&y),
            Color::Neutral => false,
        }
    }

    pub fn promotions_allowed(&self) -> &[RawType] {
        &self.promotions_allowed
    }

    pub fn koth_squares(&self) -> &[Coord] {
        &self.koth_squares
    }

    /// Plies without capture or pawn move after which the game is drawn.
    pub fn move_rule(&self) -> Option<u32> {
        self.move_rule
    }
}

/// Kinds that may castle with a partner.
pub(crate) fn castles(raw: RawType) -> bool {
    matches!(raw, RawType::King | RawType::RoyalCentaur)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(kinds: &[RawType]) -> VariantParts {
        VariantParts {
            movesets: MovesetTable::standard(),
            kinds_in_play: kinds.iter().copied().collect(),
            win_conditions: [vec![WinCondition::Checkmate], vec![WinCondition::RoyalCapture]],
            promotion_ranks: [vec![8], vec![1]],
            promotions_allowed: vec![RawType::Queen],
            koth_squares: Vec::new(),
            move_rule: Some(100),
        }
    }

    #[test]
    fn directions_cover_kinds_in_play() {
        let variant = Variant::compile(parts(&[RawType::Rook, RawType::Knight]));
        let dirs: Vec<_> = variant.directions().collect();
        assert_eq!(dirs, vec![Direction::VERTICAL, Direction::HORIZONTAL]);
    }

    #[test]
    fn castlers_force_horizontal_lines() {
        let variant = Variant::compile(parts(&[RawType::King, RawType::Knight]));
        assert_eq!(
            variant.directions().collect::<Vec<_>>(),
            vec![Direction::HORIZONTAL]
        );
        assert!(variant.new_board().tracks(Direction::HORIZONTAL));
    }

    #[test]
    fn win_condition_lookup() {
        let variant = Variant::compile(parts(&[RawType::King]));
        assert!(variant.uses(Color::White, WinCondition::Checkmate));
        assert!(variant.opponent_uses(Color::White, WinCondition::RoyalCapture));
        assert!(!variant.opponent_uses(Color::Black, WinCondition::RoyalCapture));
        assert!(variant.win_conditions(Color::Neutral).is_empty());
    }

    #[test]
    fn promotion_ranks_per_colour() {
        let variant = Variant::compile(parts(&[RawType::Pawn]));
        assert!(variant.is_promotion_rank(Color::White, 8));
        assert!(!variant.is_promotion_rank(Color::White, 1));
        assert!(variant.is_promotion_rank(Color::Black, 1));
        assert!(!variant.is_promotion_rank(Color::Neutral, 8));
        assert!(variant.vicinity().is_empty());
    }
}
