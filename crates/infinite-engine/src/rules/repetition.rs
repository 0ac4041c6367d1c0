//! Repetition detection from the move history alone.
//!
//! Walking the history backward, each move is "undone" symbolically: the piece
//! it placed on its destination disappears and the piece it lifted from its
//! source comes back. Two sets track how the earlier position differs from the
//! current one, and a move that cancels an earlier difference removes it. When
//! both sets are empty after an even number of plies, the same position with
//! the same side to move has occurred before.

use std::collections::HashSet;

use infinite_core::{Coord, Move, PieceType, RawType};

/// Earlier occurrences needed for a draw (three occurrences in total).
const RECURRENCES_FOR_DRAW: usize = 2;

/// Returns true if a move can never be reversed by later moves.
fn is_irreversible(mv: &Move) -> bool {
    mv.is_capture() || mv.kind.raw == RawType::Pawn || mv.promotion.is_some() || mv.is_castle()
}

/// Returns true if the position after the last move in `history` has occurred
/// three times.
pub fn is_repetition(history: &[Move]) -> bool {
    // Pieces the earlier position has and the current one lacks.
    let mut deficit: HashSet<(Coord, PieceType)> = HashSet::new();
    // Pieces the current position has and the earlier one lacks.
    let mut surplus: HashSet<(Coord, PieceType)> = HashSet::new();
    let mut recurrences = 0;

    for (undone, mv) in history.iter().rev().enumerate() {
        if is_irreversible(mv) {
            break;
        }

        let placed = (mv.to, mv.promotion.unwrap_or(mv.kind));
        if !deficit.remove(&placed) {
            surplus.insert(placed);
        }
        let lifted = (mv.from, mv.kind);
        if !surplus.remove(&lifted) {
            deficit.insert(lifted);
        }

        let plies = undone + 1;
        if plies % 2 == 0 && deficit.is_empty() && surplus.is_empty() {
            recurrences += 1;
            if recurrences >= RECURRENCES_FOR_DRAW {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use infinite_core::Color;

    fn knight(color: Color, from: (i64, i64), to: (i64, i64)) -> Move {
        Move::new(
            PieceType::new(RawType::Knight, color),
            Coord::new(from.0, from.1),
            Coord::new(to.0, to.1),
        )
    }

    fn shuffle(cycles: usize) -> Vec<Move> {
        let cycle = [
            knight(Color::White, (2, 1), (3, 3)),
            knight(Color::Black, (2, 8), (3, 6)),
            knight(Color::White, (3, 3), (2, 1)),
            knight(Color::Black, (3, 6), (2, 8)),
        ];
        cycle.iter().copied().cycle().take(cycles).collect()
    }

    #[test]
    fn third_occurrence_is_a_repetition() {
        for plies in 0..8 {
            assert!(!is_repetition(&shuffle(plies)), "too early at ply {plies}");
        }
        assert!(is_repetition(&shuffle(8)));
    }

    #[test]
    fn capture_bounds_the_search() {
        let mut history = shuffle(4);
        let mut capture = knight(Color::White, (7, 1), (6, 3));
        capture.captured = Some(PieceType::new(RawType::Pawn, Color::Black));
        history.insert(0, capture);
        history.extend(shuffle(4));
        assert!(is_repetition(&history));

        let mut history = shuffle(4);
        history.push(capture);
        history.extend(shuffle(4));
        assert!(!is_repetition(&history));
    }

    #[test]
    fn same_squares_with_the_other_side_to_move_do_not_count() {
        // The king walks a triangle back home in five plies, so the board
        // matches with black to move instead of white.
        let king = |from: (i64, i64), to: (i64, i64)| {
            Move::new(
                PieceType::new(RawType::King, Color::White),
                Coord::new(from.0, from.1),
                Coord::new(to.0, to.1),
            )
        };
        let history = vec![
            king((0, 0), (1, 0)),
            knight(Color::Black, (5, 5), (6, 7)),
            king((1, 0), (1, 1)),
            knight(Color::Black, (6, 7), (5, 5)),
            king((1, 1), (0, 0)),
        ];
        assert!(!is_repetition(&history));
    }

    #[test]
    fn pawn_moves_and_castling_are_irreversible() {
        let pawn = Move::new(
            PieceType::new(RawType::Pawn, Color::White),
            Coord::new(0, 2),
            Coord::new(0, 3),
        );
        assert!(is_irreversible(&pawn));
        let mut castle = Move::new(
            PieceType::new(RawType::King, Color::White),
            Coord::new(5, 1),
            Coord::new(7, 1),
        );
        assert!(!is_irreversible(&castle));
        castle.tag = Some(infinite_core::SpecialTag::Castle {
            dir: 1,
            partner: Coord::new(8, 1),
        });
        assert!(is_irreversible(&castle));
    }
}
