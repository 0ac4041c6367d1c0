//! Insufficient-material detection.
//!
//! The material of each side is reduced to a [`Scenario`]: counts per kind,
//! with bishops split by square colour. A position is dead when one side is a
//! lone king and the other side's scenario fits inside an entry of a table of
//! combinations known to be unable to force mate on an unbounded board. There
//! are two tables, depending on whether the stronger side has a king.

use std::collections::BTreeMap;

use infinite_core::{Color, Move, RawType};

use crate::{Position, Variant, WinCondition};

/// Positions with this many pieces or more are never examined.
const MAX_PIECES: usize = 11;

/// Unlimited count in a table entry.
const ANY: u32 = u32::MAX;

/// Material of one side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Scenario {
    /// Counts per kind, bishops and kings excluded.
    counts: BTreeMap<RawType, u32>,
    /// Bishops per square colour, larger bucket first.
    bishops: [u32; 2],
    kings: u32,
}

impl Scenario {
    fn of(position: &Position, color: Color) -> Self {
        let mut scenario = Scenario::default();
        let mut by_parity = [0u32; 2];
        for piece in position.board().pieces_of_color(color) {
            match piece.raw() {
                RawType::King => scenario.kings += 1,
                RawType::Bishop => by_parity[piece.coord.parity()] += 1,
                raw => *scenario.counts.entry(raw).or_default() += 1,
            }
        }
        by_parity.sort_unstable_by(|a, b| b.cmp(a));
        scenario.bishops = by_parity;
        scenario
    }

    fn is_lone_king(&self) -> bool {
        self.kings == 1 && self.counts.is_empty() && self.bishops == [0, 0]
    }

    fn fits(&self, entry: &DrawnMaterial) -> bool {
        let bound = |raw: RawType| {
            entry
                .pieces
                .iter()
                .find(|(kind, _)| *kind == raw)
                .map_or(0, |(_, max)| *max)
        };
        self.counts.iter().all(|(raw, count)| *count <= bound(*raw))
            && self.bishops[0] <= entry.bishops[0]
            && self.bishops[1] <= entry.bishops[1]
    }
}

/// Largest material known to be a draw against a lone king.
#[derive(Debug, Clone, Copy)]
struct DrawnMaterial {
    pieces: &'static [(RawType, u32)],
    /// Bishop bounds per square colour, larger bucket first.
    bishops: [u32; 2],
}

const fn drawn(pieces: &'static [(RawType, u32)], bishops: [u32; 2]) -> DrawnMaterial {
    DrawnMaterial { pieces, bishops }
}

/// Drawn material for a side that still has its king.
const WITH_KING: &[DrawnMaterial] = &[
    drawn(&[(RawType::Queen, 1)], [0, 0]),
    drawn(&[], [ANY, 1]),
    drawn(&[(RawType::Knight, 1)], [ANY, 0]),
    drawn(&[(RawType::Knight, 1)], [1, 1]),
    drawn(&[(RawType::Hawk, 2)], [0, 0]),
    drawn(&[(RawType::Rook, 1), (RawType::Knight, 1)], [0, 0]),
    drawn(&[(RawType::Rook, 1)], [1, 0]),
    drawn(&[(RawType::Archbishop, 1)], [1, 0]),
    drawn(&[(RawType::Archbishop, 1), (RawType::Knight, 1)], [0, 0]),
    drawn(&[(RawType::Guard, 1)], [0, 0]),
    drawn(&[(RawType::Chancellor, 1)], [0, 0]),
    drawn(&[(RawType::Knightrider, 2)], [0, 0]),
];

/// Drawn material for a side without a king.
const WITHOUT_KING: &[DrawnMaterial] = &[
    drawn(&[(RawType::Queen, 1), (RawType::Knight, 1)], [0, 0]),
    drawn(&[(RawType::Queen, 1)], [1, 0]),
    drawn(&[], [ANY, 1]),
    drawn(&[(RawType::Knight, 2)], [0, 0]),
    drawn(&[(RawType::Knight, 1)], [ANY, 0]),
    drawn(&[(RawType::Knight, 1)], [1, 1]),
    drawn(&[(RawType::Rook, 2)], [0, 0]),
    drawn(&[(RawType::Rook, 1), (RawType::Knight, 1)], [0, 0]),
    drawn(&[(RawType::Rook, 1)], [1, 0]),
    drawn(&[(RawType::Archbishop, 1), (RawType::Knight, 1)], [0, 0]),
    drawn(&[(RawType::Archbishop, 1)], [1, 0]),
    drawn(&[(RawType::Hawk, 2)], [0, 0]),
    drawn(&[(RawType::Guard, 2)], [0, 0]),
    drawn(&[(RawType::Chancellor, 1)], [0, 0]),
    drawn(&[(RawType::Knightrider, 2)], [0, 0]),
];

fn is_drawn(attacker: &Scenario, defender: &Scenario) -> bool {
    if !defender.is_lone_king() {
        return false;
    }
    let table = match attacker.kings {
        0 => WITHOUT_KING,
        1 => WITH_KING,
        _ => return false,
    };
    table.iter().any(|entry| attacker.fits(entry))
}

/// Returns true if neither side can force checkmate.
///
/// Only examined for checkmate-only games right after a capture or promotion
/// (or at the start), with few pieces and no neutral pieces on the board.
pub fn is_insufficient(variant: &Variant, position: &Position, last: Option<&Move>) -> bool {
    let checkmate_only = Color::PLAYERS
        .iter()
        .all(|c| variant.win_conditions(*c) == [WinCondition::Checkmate]);
    if !checkmate_only {
        return false;
    }
    if last.is_some_and(|mv| !mv.is_capture() && mv.promotion.is_none()) {
        return false;
    }
    let board = position.board();
    if board.len() >= MAX_PIECES || board.count_of_color(Color::Neutral) > 0 {
        return false;
    }

    let white = Scenario::of(position, Color::White);
    let black = Scenario::of(position, Color::Black);
    is_drawn(&white, &black) || is_drawn(&black, &white)
}
