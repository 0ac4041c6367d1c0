//! Attack and check detection.
//!
//! A square is attacked through three independent paths:
//! - vicinity: an enemy jumper sits at one of the offsets in the variant's
//!   [`VicinityTable`](crate::moveset::VicinityTable)
//! - pawn: an enemy pawn sits diagonally behind the square, as seen from its
//!   own forward direction
//! - sliding: an enemy slider on one of the square's lines reaches it once its
//!   extent is clipped by the pieces in between

use infinite_core::{Color, Coord, Direction, RawType};
use serde::Serialize;

use super::slide_limit;
use crate::board::BoardIndex;
use crate::position::CheckState;
use crate::{EngineError, Variant};

/// An enemy piece threatening a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Attacker {
    pub coord: Coord,
    /// Sliding attacks can be blocked; jump and pawn attacks cannot.
    pub sliding: bool,
}

/// Attacker list with square-level deduplication.
#[derive(Debug, Default)]
struct AttackerSink<'a> {
    out: Option<&'a mut Vec<Attacker>>,
    found: bool,
}

impl AttackerSink<'_> {
    /// Records an attacker. Returns true once the search can stop.
    fn record(&mut self, coord: Coord, sliding: bool) -> bool {
        self.found = true;
        let Some(out) = self.out.as_deref_mut() else {
            return true;
        };
        match out.iter_mut().find(|a| a.coord == coord) {
            Some(existing) => existing.sliding |= sliding,
            None => out.push(Attacker { coord, sliding }),
        }
        false
    }
}

fn is_enemy(kind_color: Color, defender: Color) -> bool {
    kind_color.is_player() && kind_color != defender
}

/// Returns true if `target` is attacked by a player other than `defender`.
///
/// With `attackers` supplied, every path is searched to the end and each
/// attacker is appended once.
pub fn is_square_attacked(
    variant: &Variant,
    board: &BoardIndex,
    target: Coord,
    defender: Color,
    attackers: Option<&mut Vec<Attacker>>,
) -> Result<bool, EngineError> {
    if !defender.is_player() {
        return Err(EngineError::NeutralDefender);
    }
    let mut sink = AttackerSink {
        out: attackers,
        found: false,
    };

    for (displacement, kinds) in variant.vicinity().iter() {
        let Some(square) = target.translate(displacement) else {
            continue;
        };
        let Some(kind) = board.get(square) else {
            continue;
        };
        if is_enemy(kind.color, defender) && kinds.contains(&kind.raw) && sink.record(square, false)
        {
            return Ok(true);
        }
    }

    for attacker in Color::PLAYERS.into_iter().filter(|c| *c != defender) {
        let Some(forward) = attacker.pawn_direction() else {
            continue;
        };
        for dx in [-1, 1] {
            let Some(square) = target.offset(dx, -forward) else {
                continue;
            };
            let is_pawn = board
                .get(square)
                .is_some_and(|k| k.raw == RawType::Pawn && k.color == attacker);
            if is_pawn && sink.record(square, false) {
                return Ok(true);
            }
        }
    }

    for dir in variant.directions() {
        if sliding_attacks_on_line(variant, board, target, defender, dir, &mut sink) {
            return Ok(true);
        }
    }

    Ok(sink.found)
}

/// Returns true if an enemy slider on the `dir` line through `target` reaches it.
pub fn is_attacked_along(
    variant: &Variant,
    board: &BoardIndex,
    target: Coord,
    defender: Color,
    dir: Direction,
) -> Result<bool, EngineError> {
    if !defender.is_player() {
        return Err(EngineError::NeutralDefender);
    }
    let mut sink = AttackerSink::default();
    sliding_attacks_on_line(variant, board, target, defender, dir, &mut sink);
    Ok(sink.found)
}

fn sliding_attacks_on_line(
    variant: &Variant,
    board: &BoardIndex,
    target: Coord,
    defender: Color,
    dir: Direction,
    sink: &mut AttackerSink<'_>,
) -> bool {
    for piece in board.line_at(dir, target) {
        if piece.coord == target || !is_enemy(piece.color(), defender) {
            continue;
        }
        let Some(extent) = variant.moveset(piece.raw()).slides.get(&dir) else {
            continue;
        };
        let reach = slide_limit(board, dir, piece.coord, piece.color(), *extent);
        if reach.contains_step(dir.steps_between(piece.coord, target)) && sink.record(piece.coord, true)
        {
            return true;
        }
    }
    false
}

/// Squares of the royals of `color` that can be checkmated.
pub fn jumping_royals(variant: &Variant, board: &BoardIndex, color: Color) -> Vec<Coord> {
    board
        .pieces_of_color(color)
        .into_iter()
        .filter(|p| p.kind.is_royal() && !variant.movesets().is_sliding_royal(p.raw()))
        .map(|p| p.coord)
        .collect()
}

fn royals(board: &BoardIndex, color: Color) -> Vec<Coord> {
    board
        .pieces_of_color(color)
        .into_iter()
        .filter(|p| p.kind.is_royal())
        .map(|p| p.coord)
        .collect()
}

/// Returns true if any royal of `color` is attacked.
pub fn is_in_check(variant: &Variant, board: &BoardIndex, color: Color) -> Result<bool, EngineError> {
    for royal in royals(board, color) {
        if is_square_attacked(variant, board, royal, color, None)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Collects every attacked royal of `color` and all of their attackers.
pub fn detect_check(
    variant: &Variant,
    board: &BoardIndex,
    color: Color,
) -> Result<CheckState, EngineError> {
    if !color.is_player() {
        return Err(EngineError::NeutralDefender);
    }
    let mut state = CheckState::default();
    for royal in royals(board, color) {
        let mut found = Vec::new();
        if is_square_attacked(variant, board, royal, color, Some(&mut found))? {
            state.royals_in_check.push(royal);
            for attacker in found {
                match state.attackers.iter_mut().find(|a| a.coord == attacker.coord) {
                    Some(existing) => existing.sliding |= attacker.sliding,
                    None => state.attackers.push(attacker),
                }
            }
        }
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moveset::Moveset;
    use crate::GameSetup;
    use infinite_core::PieceType;

    fn w(raw: RawType) -> PieceType {
        PieceType::new(raw, Color::White)
    }

    fn b(raw: RawType) -> PieceType {
        PieceType::new(raw, Color::Black)
    }

    #[test]
    fn sliding_attacker_is_recorded_as_sliding() {
        let (variant, position) = GameSetup::new()
            .with_piece(Coord::new(0, 0), w(RawType::King))
            .with_piece(Coord::new(0, 1_000_000), b(RawType::Rook))
            .with_piece(Coord::new(50, 50), b(RawType::King))
            .build()
            .unwrap();

        let mut found = Vec::new();
        let attacked = is_square_attacked(
            &variant,
            position.board(),
            Coord::new(0, 0),
            Color::White,
            Some(&mut found),
        )
        .unwrap();
        assert!(attacked);
        assert_eq!(
            found,
            vec![Attacker {
                coord: Coord::new(0, 1_000_000),
                sliding: true
            }]
        );
    }

    #[test]
    fn blocked_slider_does_not_attack() {
        let (variant, position) = GameSetup::new()
            .with_piece(Coord::new(0, 0), w(RawType::King))
            .with_piece(Coord::new(0, 3), w(RawType::Knight))
            .with_piece(Coord::new(0, 9), b(RawType::Rook))
            .with_piece(Coord::new(50, 50), b(RawType::King))
            .build()
            .unwrap();
        assert!(!is_in_check(&variant, position.board(), Color::White).unwrap());
        assert!(!position.is_in_check());
    }

    #[test]
    fn vicinity_and_pawn_attacks() {
        let (variant, position) = GameSetup::new()
            .with_piece(Coord::new(0, 0), w(RawType::King))
            .with_piece(Coord::new(1, 2), b(RawType::Knight))
            .with_piece(Coord::new(-1, 1), b(RawType::Pawn))
            .with_piece(Coord::new(1, -1), b(RawType::Pawn))
            .with_piece(Coord::new(50, 50), b(RawType::King))
            .build()
            .unwrap();

        let state = detect_check(&variant, position.board(), Color::White).unwrap();
        assert_eq!(state.royals_in_check, vec![Coord::new(0, 0)]);
        assert_eq!(
            state.attackers,
            vec![
                Attacker {
                    coord: Coord::new(1, 2),
                    sliding: false
                },
                Attacker {
                    coord: Coord::new(-1, 1),
                    sliding: false
                },
            ]
        );
    }

    #[test]
    fn pawn_jump_overrides_attack() {
        let mut lunging_pawn = Moveset::default();
        lunging_pawn.jumps.push(Coord::new(0, -2));
        let (variant, position) = GameSetup::new()
            .with_moveset(RawType::Pawn, &lunging_pawn)
            .with_piece(Coord::new(1, 3), w(RawType::King))
            .with_piece(Coord::new(1, 5), b(RawType::Pawn))
            .with_piece(Coord::new(50, 50), b(RawType::King))
            .build()
            .unwrap();
        assert_eq!(variant.vicinity().attackers_from(Coord::new(0, 2)), &[RawType::Pawn]);
        assert!(is_in_check(&variant, position.board(), Color::White).unwrap());
        assert_eq!(
            position.check().attackers,
            vec![Attacker {
                coord: Coord::new(1, 5),
                sliding: false
            }]
        );
    }

    #[test]
    fn amazon_is_recorded_once() {
        let (_, position) = GameSetup::new()
            .with_piece(Coord::new(0, 0), w(RawType::King))
            .with_piece(Coord::new(0, 1), b(RawType::Amazon))
            .with_piece(Coord::new(50, 50), b(RawType::King))
            .build()
            .unwrap();
        assert_eq!(
            position.check().attackers,
            vec![Attacker {
                coord: Coord::new(0, 1),
                sliding: true
            }]
        );
        assert_eq!(position.check().royals_in_check, vec![Coord::new(0, 0)]);
    }

    #[test]
    fn jump_attacker_is_upgraded_to_sliding() {
        let mut found = Vec::new();
        let mut sink = AttackerSink {
            out: Some(&mut found),
            found: false,
        };
        assert!(!sink.record(Coord::new(2, 1), false));
        assert!(!sink.record(Coord::new(2, 1), true));
        assert!(!sink.record(Coord::new(2, 1), false));
        assert!(sink.found);
        assert_eq!(
            found,
            vec![Attacker {
                coord: Coord::new(2, 1),
                sliding: true
            }]
        );
    }

    #[test]
    fn neutral_pieces_never_attack() {
        let (variant, position) = GameSetup::new()
            .with_piece(Coord::new(0, 0), w(RawType::King))
            .with_piece(Coord::new(0, 1), PieceType::new(RawType::Obstacle, Color::Neutral))
            .with_piece(Coord::new(50, 50), b(RawType::King))
            .build()
            .unwrap();
        assert!(!is_in_check(&variant, position.board(), Color::White).unwrap());
    }

    #[test]
    fn neutral_defender_is_an_error() {
        let (variant, position) = GameSetup::new()
            .with_piece(Coord::new(0, 0), w(RawType::King))
            .with_piece(Coord::new(50, 50), b(RawType::King))
            .build()
            .unwrap();
        assert_eq!(
            is_square_attacked(&variant, position.board(), Coord::new(1, 1), Color::Neutral, None),
            Err(EngineError::NeutralDefender)
        );
    }
}
