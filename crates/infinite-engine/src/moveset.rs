//! Data-driven piece movement.
//!
//! A [`Moveset`] lists the jump offsets of a kind and, per slide direction,
//! how far it may travel. Nothing in the engine matches on piece kinds to move
//! them; everything reads these tables. Pawn moves are the exception and come
//! from the special-move detector.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use infinite_core::{Coord, Direction, RawType};
use serde::{Deserialize, Serialize};

/// An inclusive range of step counts along a slide direction.
///
/// `i64::MIN` and `i64::MAX` stand for an unbounded end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    pub min: i64,
    pub max: i64,
}

impl Extent {
    /// A slide with no limit in either direction.
    pub const UNBOUNDED: Extent = Extent {
        min: i64::MIN,
        max: i64::MAX,
    };

    /// The empty slide.
    pub const NONE: Extent = Extent { min: 0, max: 0 };

    #[inline]
    pub const fn new(min: i64, max: i64) -> Self {
        Extent { min, max }
    }

    /// Builds an extent from optional bounds; a missing bound is unbounded.
    pub fn from_bounds(min: Option<i64>, max: Option<i64>) -> Self {
        Extent {
            min: min.unwrap_or(i64::MIN),
            max: max.unwrap_or(i64::MAX),
        }
    }

    #[inline]
    pub const fn is_unbounded_below(self) -> bool {
        self.min == i64::MIN
    }

    #[inline]
    pub const fn is_unbounded_above(self) -> bool {
        self.max == i64::MAX
    }

    /// Returns true if at least one non-zero step lies in the range.
    #[inline]
    pub const fn has_moves(self) -> bool {
        self.min <= self.max && (self.min != 0 || self.max != 0)
    }

    /// Returns true if moving `steps` steps stays inside the range.
    #[inline]
    pub fn contains_step(self, steps: i128) -> bool {
        steps != 0 && i128::from(self.min) <= steps && steps <= i128::from(self.max)
    }
}

/// Movement rules of one raw kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Moveset {
    /// Jump offsets relative to the piece.
    pub jumps: Vec<Coord>,
    /// Slide extent per direction, in steps relative to the piece.
    pub slides: BTreeMap<Direction, Extent>,
}

impl Moveset {
    /// Returns true if the kind cannot move at all from this table.
    pub fn is_empty(&self) -> bool {
        self.jumps.is_empty() && self.slides.is_empty()
    }

    fn with_jumps(mut self, jumps: impl IntoIterator<Item = Coord>) -> Self {
        for jump in jumps {
            if !self.jumps.contains(&jump) {
                self.jumps.push(jump);
            }
        }
        self
    }

    fn with_slides(mut self, dirs: &[Direction]) -> Self {
        for dir in dirs {
            self.slides.insert(*dir, Extent::UNBOUNDED);
        }
        self
    }
}

/// The eight symmetric images of an `(a, b)` leap.
fn leaper(a: i64, b: i64) -> Vec<Coord> {
    let mut out = Vec::with_capacity(8);
    for (x, y) in [(a, b), (b, a)] {
        for sx in [1, -1] {
            for sy in [1, -1] {
                let c = Coord::new(x * sx, y * sy);
                if !out.contains(&c) {
                    out.push(c);
                }
            }
        }
    }
    out
}

fn king_steps() -> Vec<Coord> {
    let mut out = leaper(0, 1);
    out.extend(leaper(1, 1));
    out
}

const ORTHOGONAL: [Direction; 2] = [Direction::HORIZONTAL, Direction::VERTICAL];
const DIAGONALS: [Direction; 2] = [Direction::DIAGONAL, Direction::ANTI_DIAGONAL];
const ROYAL_DIRECTIONS: [Direction; 4] = [
    Direction::HORIZONTAL,
    Direction::VERTICAL,
    Direction::DIAGONAL,
    Direction::ANTI_DIAGONAL,
];

fn knightrider_directions() -> Vec<Direction> {
    [(1, 2), (1, -2), (2, 1), (2, -1)]
        .into_iter()
        .filter_map(|(dx, dy)| Direction::new(dx, dy))
        .collect()
}

/// The built-in moveset of a raw kind.
pub fn default_moveset(raw: RawType) -> Moveset {
    let empty = Moveset::default();
    match raw {
        RawType::King | RawType::Guard => empty.with_jumps(king_steps()),
        RawType::Giraffe => empty.with_jumps(leaper(1, 4)),
        RawType::Camel => empty.with_jumps(leaper(1, 3)),
        RawType::Zebra => empty.with_jumps(leaper(2, 3)),
        RawType::Knight => empty.with_jumps(leaper(1, 2)),
        RawType::Knightrider => empty.with_slides(&knightrider_directions()),
        RawType::Amazon => empty
            .with_jumps(leaper(1, 2))
            .with_slides(&ROYAL_DIRECTIONS),
        RawType::Queen | RawType::RoyalQueen => empty.with_slides(&ROYAL_DIRECTIONS),
        RawType::Hawk => empty
            .with_jumps(leaper(2, 0))
            .with_jumps(leaper(3, 0))
            .with_jumps(leaper(2, 2))
            .with_jumps(leaper(3, 3)),
        RawType::Chancellor => empty.with_jumps(leaper(1, 2)).with_slides(&ORTHOGONAL),
        RawType::Archbishop => empty.with_jumps(leaper(1, 2)).with_slides(&DIAGONALS),
        RawType::Rook => empty.with_slides(&ORTHOGONAL),
        RawType::Bishop => empty.with_slides(&DIAGONALS),
        RawType::Centaur | RawType::RoyalCentaur => {
            empty.with_jumps(king_steps()).with_jumps(leaper(1, 2))
        }
        RawType::Pawn | RawType::Obstacle | RawType::Void => empty,
    }
}

/// Moveset lookup for every raw kind of a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovesetTable {
    sets: HashMap<RawType, Moveset>,
    empty: Moveset,
}

impl MovesetTable {
    /// The built-in movesets for every kind.
    pub fn standard() -> Self {
        MovesetTable {
            sets: RawType::ALL
                .into_iter()
                .map(|raw| (raw, default_moveset(raw)))
                .collect(),
            empty: Moveset::default(),
        }
    }

    /// Replaces the moveset of one kind. Neutral kinds stay immobile.
    pub fn set(&mut self, raw: RawType, moveset: Moveset) {
        if !raw.is_neutral() {
            self.sets.insert(raw, moveset);
        }
    }

    /// Returns the moveset of a kind; empty for kinds that cannot move.
    pub fn get(&self, raw: RawType) -> &Moveset {
        self.sets.get(&raw).unwrap_or(&self.empty)
    }

    /// Returns true if `raw` is royal and can slide. Such royals cannot be
    /// checkmated and are won by capture instead.
    pub fn is_sliding_royal(&self, raw: RawType) -> bool {
        raw.is_royal() && !self.get(raw).slides.is_empty()
    }

    /// Union of the slide directions used by the given kinds.
    pub fn slide_directions(&self, kinds: impl IntoIterator<Item = RawType>) -> BTreeSet<Direction> {
        kinds
            .into_iter()
            .flat_map(|raw| self.get(raw).slides.keys().copied())
            .collect()
    }
}

impl Default for MovesetTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Short-range attack table.
///
/// Maps the displacement from a target square to a potential attacker's square
/// onto the kinds that could jump from there onto the target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VicinityTable {
    entries: BTreeMap<Coord, Vec<RawType>>,
}

impl VicinityTable {
    /// Builds the table from the jump offsets of the kinds in play.
    pub fn build(table: &MovesetTable, kinds: impl IntoIterator<Item = RawType>) -> Self {
        let mut entries: BTreeMap<Coord, Vec<RawType>> = BTreeMap::new();
        for raw in kinds {
            for jump in &table.get(raw).jumps {
                let Some(displacement) = jump.negate() else {
                    continue;
                };
                let kinds = entries.entry(displacement).or_default();
                if !kinds.contains(&raw) {
                    kinds.push(raw);
                }
            }
        }
        VicinityTable { entries }
    }

    /// Iterates displacement -> attacking kinds.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &[RawType])> {
        self.entries.iter().map(|(c, kinds)| (*c, kinds.as_slice()))
    }

    /// Kinds that attack the target from `displacement`.
    pub fn attackers_from(&self, displacement: Coord) -> &[RawType] {
        self.entries.get(&displacement).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaper_images() {
        assert_eq!(leaper(1, 2).len(), 8);
        assert_eq!(leaper(0, 1).len(), 4);
        assert_eq!(leaper(2, 2).len(), 4);
        assert_eq!(king_steps().len(), 8);
    }

    #[test]
    fn default_movesets() {
        let table = MovesetTable::standard();
        assert_eq!(table.get(RawType::Knight).jumps.len(), 8);
        assert!(table.get(RawType::Knight).slides.is_empty());
        assert_eq!(table.get(RawType::Hawk).jumps.len(), 16);
        assert_eq!(table.get(RawType::Centaur).jumps.len(), 16);
        assert_eq!(table.get(RawType::Queen).slides.len(), 4);
        assert_eq!(table.get(RawType::Knightrider).slides.len(), 4);
        assert_eq!(
            table.get(RawType::Rook).slides.get(&Direction::VERTICAL),
            Some(&Extent::UNBOUNDED)
        );
        assert!(table.get(RawType::Pawn).is_empty());
        assert!(table.get(RawType::Void).is_empty());
    }

    #[test]
    fn neutral_kinds_cannot_be_given_moves() {
        let mut table = MovesetTable::standard();
        table.set(RawType::Obstacle, default_moveset(RawType::Queen));
        assert!(table.get(RawType::Obstacle).is_empty());
    }

    #[test]
    fn slide_direction_union() {
        let table = MovesetTable::standard();
        let dirs = table.slide_directions([RawType::Rook, RawType::Bishop, RawType::Knight]);
        assert_eq!(dirs.len(), 4);
        let dirs = table.slide_directions([RawType::King, RawType::Pawn]);
        assert!(dirs.is_empty());
    }

    #[test]
    fn vicinity_lists_jumping_kinds() {
        let table = MovesetTable::standard();
        let vicinity = VicinityTable::build(&table, [RawType::King, RawType::Knight, RawType::Rook]);
        assert_eq!(vicinity.len(), 16);
        assert_eq!(vicinity.attackers_from(Coord::new(-1, 2)), &[RawType::Knight]);
        assert_eq!(vicinity.attackers_from(Coord::new(1, 1)), &[RawType::King]);
        assert!(vicinity.attackers_from(Coord::new(3, 0)).is_empty());
    }

    #[test]
    fn asymmetric_jump_is_inverted() {
        let mut table = MovesetTable::standard();
        table.set(
            RawType::Guard,
            Moveset {
                jumps: vec![Coord::new(0, 1)],
                slides: BTreeMap::new(),
            },
        );
        let vicinity = VicinityTable::build(&table, [RawType::Guard]);
        // A guard that only steps up attacks the target from below.
        assert_eq!(vicinity.attackers_from(Coord::new(0, -1)), &[RawType::Guard]);
        assert!(vicinity.attackers_from(Coord::new(0, 1)).is_empty());
    }

    #[test]
    fn extent_queries() {
        assert!(Extent::UNBOUNDED.has_moves());
        assert!(!Extent::NONE.has_moves());
        assert!(Extent::new(-2, 0).has_moves());
        assert!(!Extent::new(3, 1).has_moves());
        assert!(Extent::new(-2, 2).contains_step(-2));
        assert!(!Extent::new(-2, 2).contains_step(0));
        assert!(!Extent::new(-2, 2).contains_step(3));
        assert!(Extent::from_bounds(None, Some(4)).is_unbounded_below());
    }
}
