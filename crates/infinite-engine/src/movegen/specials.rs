//! Special moves: castling and pawn moves.
//!
//! Each detector appends destinations to the running jump list. Destinations
//! that need more than "move the piece there" carry a [`SpecialTag`].

use infinite_core::{Color, Coord, Destination, Direction, Move, Piece, RawType, SpecialTag};

use super::attacks::is_in_check;
use super::{is_blocked, CalcOptions};
use crate::variant::castles;
use crate::{EngineError, Position, Variant, WinCondition};

/// Signature shared by the special-move detectors.
pub type Detector = fn(
    &Variant,
    &mut Position,
    Piece,
    CalcOptions,
    &mut Vec<Destination>,
) -> Result<(), EngineError>;

/// Returns the detector for a raw kind, if it has special moves.
pub fn detector_for(raw: RawType) -> Option<Detector> {
    if castles(raw) {
        Some(castling)
    } else if raw == RawType::Pawn {
        Some(pawn_moves)
    } else {
        None
    }
}

/// Minimum distance between a castling piece and its partner.
const MIN_PARTNER_DISTANCE: i128 = 3;

/// Appends castling destinations for a king-like piece.
///
/// Premoves skip the check and attacked-passage tests.
pub fn castling(
    variant: &Variant,
    position: &mut Position,
    piece: Piece,
    options: CalcOptions,
    out: &mut Vec<Destination>,
) -> Result<(), EngineError> {
    let king = piece.coord;
    if !position.has_special_right(king) {
        return Ok(());
    }

    let (mut left, mut right): (Option<Piece>, Option<Piece>) = (None, None);
    for other in position.board().line_at(Direction::HORIZONTAL, king) {
        if other.coord.x < king.x && left.map_or(true, |l| other.coord.x > l.coord.x) {
            left = Some(*other);
        } else if other.coord.x > king.x && right.map_or(true, |r| other.coord.x < r.coord.x) {
            right = Some(*other);
        }
    }

    let guarded =
        !options.premove && variant.opponent_uses(piece.color(), WinCondition::Checkmate);
    if guarded {
        let in_check = if position.side_to_move() == piece.color() {
            position.is_in_check()
        } else {
            is_in_check(variant, position.board(), piece.color())?
        };
        if in_check {
            return Ok(());
        }
    }

    for (dir, partner) in [(-1i64, left), (1, right)] {
        let Some(partner) = partner else {
            continue;
        };
        let distance = (i128::from(partner.coord.x) - i128::from(king.x)).abs();
        if !position.has_special_right(partner.coord)
            || partner.color() != piece.color()
            || partner.raw() == RawType::Pawn
            || distance < MIN_PARTNER_DISTANCE
        {
            continue;
        }
        let (Some(passed), Some(landing)) = (king.offset(dir, 0), king.offset(2 * dir, 0)) else {
            continue;
        };
        if guarded {
            let step = Move::new(piece.kind, king, passed);
            let exposed = position.simulate(&step, |board| {
                is_in_check(variant, board, piece.color())
            })??;
            if exposed {
                continue;
            }
        }
        out.push(Destination::tagged(
            landing,
            SpecialTag::Castle {
                dir,
                partner: partner.coord,
            },
        ));
    }
    Ok(())
}

/// Appends pushes, captures, and en passant for a pawn.
///
/// Pawns of a colour without a forward direction have no moves. Premoves
/// offer every push and both diagonals whatever stands there.
pub fn pawn_moves(
    variant: &Variant,
    position: &mut Position,
    piece: Piece,
    options: CalcOptions,
    out: &mut Vec<Destination>,
) -> Result<(), EngineError> {
    let color = piece.color();
    let Some(forward) = color.pawn_direction() else {
        return Ok(());
    };
    let from = piece.coord;
    let board = position.board();
    let free = |square: Coord| options.premove || !board.is_occupied(square);
    let promote = |dest: Coord, tag: Option<SpecialTag>| -> Destination {
        if variant.is_promotion_rank(color, dest.y) {
            Destination::tagged(dest, SpecialTag::Promotion)
        } else {
            Destination { coord: dest, tag }
        }
    };

    if let Some(one) = from.offset(0, forward).filter(|one| free(*one)) {
        out.push(promote(one, None));
        // A double push onto a promotion rank promotes; there is no pawn left
        // to capture en passant.
        if position.has_special_right(from) {
            if let Some(two) = from.offset(0, 2 * forward).filter(|two| free(*two)) {
                out.push(promote(two, Some(SpecialTag::DoublePush)));
            }
        }
    }

    for dx in [-1, 1] {
        let Some(diagonal) = from.offset(dx, forward) else {
            continue;
        };
        let capturable = board.is_occupied(diagonal) && !is_blocked(board, diagonal, color);
        if options.premove || capturable {
            out.push(promote(diagonal, None));
        }
    }
    if options.premove {
        return Ok(());
    }

    if let Some(dest) = en_passant_target(position, from, color, forward) {
        let victim = Coord::new(dest.x, from.y);
        out.push(Destination::tagged(
            dest,
            SpecialTag::EnPassant { captured: victim },
        ));
    }
    Ok(())
}

fn en_passant_target(position: &Position, from: Coord, color: Color, forward: i64) -> Option<Coord> {
    let target = position.en_passant()?;
    let adjacent = from
        .offset(0, forward)
        .is_some_and(|ahead| ahead.y == target.y)
        && (i128::from(target.x) - i128::from(from.x)).abs() == 1;
    if !adjacent {
        return None;
    }
    let victim = position.board().get(Coord::new(target.x, from.y))?;
    let is_enemy_pawn = victim.raw == RawType::Pawn && victim.color == color.opposite();
    is_enemy_pawn.then_some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::{calculate, CalcOptions};
    use crate::GameSetup;
    use infinite_core::PieceType;

    fn w(raw: RawType) -> PieceType {
        PieceType::new(raw, Color::White)
    }

    fn b(raw: RawType) -> PieceType {
        PieceType::new(raw, Color::Black)
    }

    fn castle_setup() -> GameSetup {
        GameSetup::new()
            .with_piece(Coord::new(5, 1), w(RawType::King))
            .with_special_right(Coord::new(5, 1), true)
            .with_piece(Coord::new(8, 1), w(RawType::Rook))
            .with_special_right(Coord::new(8, 1), true)
            .with_piece(Coord::new(1, 1), w(RawType::Rook))
            .with_special_right(Coord::new(1, 1), true)
            .with_piece(Coord::new(5, 20), b(RawType::King))
    }

    fn castles_of(setup: GameSetup) -> Vec<Destination> {
        let (variant, mut position) = setup.build().unwrap();
        calculate(&variant, &mut position, Coord::new(5, 1), CalcOptions::default())
            .unwrap()
            .jumps
            .into_iter()
            .filter(|d| matches!(d.tag, Some(SpecialTag::Castle { .. })))
            .collect()
    }

    #[test]
    fn castles_both_ways() {
        let castles = castles_of(castle_setup());
        assert_eq!(
            castles,
            vec![
                Destination::tagged(
                    Coord::new(3, 1),
                    SpecialTag::Castle {
                        dir: -1,
                        partner: Coord::new(1, 1)
                    }
                ),
                Destination::tagged(
                    Coord::new(7, 1),
                    SpecialTag::Castle {
                        dir: 1,
                        partner: Coord::new(8, 1)
                    }
                ),
            ]
        );
    }

    #[test]
    fn no_castle_after_rights_are_lost() {
        let setup = castle_setup().with_special_right(Coord::new(5, 1), false);
        assert!(castles_of(setup).is_empty());

        let setup = castle_setup().with_special_right(Coord::new(8, 1), false);
        assert_eq!(castles_of(setup).len(), 1);
    }

    #[test]
    fn no_castle_through_an_attacked_square() {
        let setup = castle_setup().with_piece(Coord::new(6, 9), b(RawType::Rook));
        let castles = castles_of(setup);
        assert_eq!(castles.len(), 1);
        assert_eq!(castles[0].coord, Coord::new(3, 1));
    }

    #[test]
    fn attacked_passage_is_fine_under_royal_capture() {
        let setup = castle_setup()
            .with_piece(Coord::new(6, 9), b(RawType::Rook))
            .with_win_conditions(Color::Black, vec![WinCondition::RoyalCapture]);
        assert_eq!(castles_of(setup).len(), 2);
    }

    #[test]
    fn no_castle_with_a_partner_two_squares_away() {
        let setup = GameSetup::new()
            .with_piece(Coord::new(5, 1), w(RawType::King))
            .with_special_right(Coord::new(5, 1), true)
            .with_piece(Coord::new(7, 1), w(RawType::Rook))
            .with_special_right(Coord::new(7, 1), true)
            .with_piece(Coord::new(5, 20), b(RawType::King));
        assert!(castles_of(setup).is_empty());
    }

    #[test]
    fn premove_castles_through_attacked_squares() {
        let (variant, mut position) = castle_setup()
            .with_piece(Coord::new(6, 9), b(RawType::Rook))
            .with_piece(Coord::new(5, 9), b(RawType::Rook))
            .with_side_to_move(Color::Black)
            .build()
            .unwrap();
        let premove = CalcOptions {
            premove: true,
            ..CalcOptions::default()
        };
        let moves = calculate(&variant, &mut position, Coord::new(5, 1), premove).unwrap();
        let castles = moves
            .jumps
            .iter()
            .filter(|d| matches!(d.tag, Some(SpecialTag::Castle { .. })))
            .count();
        assert_eq!(castles, 2);
    }

    #[test]
    fn no_castle_while_in_check() {
        let setup = castle_setup().with_piece(Coord::new(5, 9), b(RawType::Rook));
        assert!(castles_of(setup).is_empty());
    }

    #[test]
    fn pawn_pushes_and_captures() {
        let (variant, mut position) = GameSetup::new()
            .with_piece(Coord::new(0, 2), w(RawType::Pawn))
            .with_special_right(Coord::new(0, 2), true)
            .with_piece(Coord::new(1, 3), b(RawType::Knight))
            .with_piece(Coord::new(-1, 3), w(RawType::Knight))
            .build()
            .unwrap();

        let moves =
            calculate(&variant, &mut position, Coord::new(0, 2), CalcOptions::default()).unwrap();
        assert_eq!(
            moves.jumps,
            vec![
                Destination::plain(Coord::new(0, 3)),
                Destination::tagged(Coord::new(0, 4), SpecialTag::DoublePush),
                Destination::plain(Coord::new(1, 3)),
            ]
        );
    }

    #[test]
    fn blocked_pawn_cannot_double_push() {
        let (variant, mut position) = GameSetup::new()
            .with_piece(Coord::new(0, 2), w(RawType::Pawn))
            .with_special_right(Coord::new(0, 2), true)
            .with_piece(Coord::new(0, 4), b(RawType::Knight))
            .build()
            .unwrap();
        let moves =
            calculate(&variant, &mut position, Coord::new(0, 2), CalcOptions::default()).unwrap();
        assert_eq!(moves.jumps, vec![Destination::plain(Coord::new(0, 3))]);
    }

    #[test]
    fn promotion_rank_tags_the_destination() {
        let (variant, mut position) = GameSetup::new()
            .with_promotion_ranks(Color::White, vec![8])
            .with_piece(Coord::new(3, 7), w(RawType::Pawn))
            .build()
            .unwrap();
        let moves =
            calculate(&variant, &mut position, Coord::new(3, 7), CalcOptions::default()).unwrap();
        assert_eq!(
            moves.jumps,
            vec![Destination::tagged(Coord::new(3, 8), SpecialTag::Promotion)]
        );
    }

    #[test]
    fn premove_pawn_ignores_occupancy() {
        let (variant, mut position) = GameSetup::new()
            .with_piece(Coord::new(0, 2), w(RawType::Pawn))
            .with_special_right(Coord::new(0, 2), true)
            .with_piece(Coord::new(0, 3), w(RawType::Knight))
            .with_side_to_move(Color::Black)
            .build()
            .unwrap();
        let premove = CalcOptions {
            premove: true,
            ..CalcOptions::default()
        };
        let moves = calculate(&variant, &mut position, Coord::new(0, 2), premove).unwrap();
        assert_eq!(
            moves.jumps,
            vec![
                Destination::plain(Coord::new(0, 3)),
                Destination::tagged(Coord::new(0, 4), SpecialTag::DoublePush),
                Destination::plain(Coord::new(-1, 3)),
                Destination::plain(Coord::new(1, 3)),
            ]
        );

        let moves = calculate(
            &variant,
            &mut position,
            Coord::new(0, 2),
            CalcOptions {
                ignore_turn: true,
                ..CalcOptions::default()
            },
        )
        .unwrap();
        assert!(moves.jumps.is_empty());
    }

    #[test]
    fn double_push_onto_a_promotion_rank_promotes() {
        let (variant, mut position) = GameSetup::new()
            .with_promotion_ranks(Color::White, vec![8])
            .with_piece(Coord::new(3, 6), w(RawType::Pawn))
            .with_special_right(Coord::new(3, 6), true)
            .build()
            .unwrap();
        let moves =
            calculate(&variant, &mut position, Coord::new(3, 6), CalcOptions::default()).unwrap();
        assert_eq!(
            moves.jumps,
            vec![
                Destination::plain(Coord::new(3, 7)),
                Destination::tagged(Coord::new(3, 8), SpecialTag::Promotion),
            ]
        );
    }

    #[test]
    fn black_pawns_move_down() {
        let (variant, mut position) = GameSetup::new()
            .with_piece(Coord::new(0, 7), b(RawType::Pawn))
            .with_side_to_move(Color::Black)
            .build()
            .unwrap();
        let moves =
            calculate(&variant, &mut position, Coord::new(0, 7), CalcOptions::default()).unwrap();
        assert_eq!(moves.jumps, vec![Destination::plain(Coord::new(0, 6))]);
    }
}
