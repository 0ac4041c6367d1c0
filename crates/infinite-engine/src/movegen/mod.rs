//! Legal move calculation.
//!
//! [`calculate`] produces the candidate moves of one piece: jumps filtered by
//! occupancy, slide extents clipped by the pieces on each line, and the special
//! moves of its kind. For the side to move the result is then passed through
//! the check-safety filter in [`safety`].

pub mod attacks;
pub mod safety;
pub mod specials;

use std::collections::BTreeMap;

use infinite_core::{Color, Coord, Destination, Direction};
use serde::Serialize;

use crate::board::BoardIndex;
use crate::moveset::Extent;
use crate::{EngineError, Position, Variant};

/// Candidate moves of one piece.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LegalMoves {
    /// Individual destinations, possibly tagged by a special-move rule.
    pub jumps: Vec<Destination>,
    /// Reachable step range per slide direction.
    pub slides: BTreeMap<Direction, Extent>,
}

impl LegalMoves {
    /// Returns true if at least one destination exists.
    pub fn has_any(&self) -> bool {
        !self.jumps.is_empty() || self.slides.values().any(|e| e.has_moves())
    }

    /// Returns the destination matching `to` for a piece standing on `from`.
    ///
    /// Jump destinations take precedence so that their tags are kept.
    pub fn find(&self, from: Coord, to: Coord) -> Option<Destination> {
        if let Some(jump) = self.jumps.iter().find(|d| d.coord == to) {
            return Some(*jump);
        }
        self.slides
            .iter()
            .find(|(dir, extent)| {
                dir.is_colinear(from, to) && extent.contains_step(dir.steps_between(from, to))
            })
            .map(|_| Destination::plain(to))
    }
}

/// Switches for [`calculate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalcOptions {
    /// Compute the special moves only.
    pub only_specials: bool,
    /// Skip occupancy and check filtering; the move is validated when played.
    pub premove: bool,
    /// Compute moves for a piece whose side is not to move (board editing).
    pub ignore_turn: bool,
}

/// Computes the candidate moves of the piece on `coord`.
///
/// Returns an empty set for an empty square, a neutral piece, or a piece whose
/// side is not to move (unless `premove` or `ignore_turn` is set).
pub fn calculate(
    variant: &Variant,
    position: &mut Position,
    coord: Coord,
    options: CalcOptions,
) -> Result<LegalMoves, EngineError> {
    let mut moves = LegalMoves::default();
    let Some(piece) = position.board().piece_at(coord) else {
        return Ok(moves);
    };
    let color = piece.color();
    if !color.is_player() {
        return Ok(moves);
    }
    let to_move = color == position.side_to_move();
    if !to_move && !options.premove && !options.ignore_turn {
        return Ok(moves);
    }

    if !options.only_specials {
        let moveset = variant.moveset(piece.raw());
        let board = position.board();
        for jump in &moveset.jumps {
            let Some(dest) = coord.translate(*jump) else {
                continue;
            };
            if options.premove || !is_blocked(board, dest, color) {
                moves.jumps.push(Destination::plain(dest));
            }
        }
        for (dir, extent) in &moveset.slides {
            if !board.tracks(*dir) {
                continue;
            }
            let limit = if options.premove {
                *extent
            } else {
                slide_limit(board, *dir, coord, color, *extent)
            };
            if limit.has_moves() {
                moves.slides.insert(*dir, limit);
            }
        }
    }

    if let Some(detector) = specials::detector_for(piece.raw()) {
        detector(variant, position, piece, options, &mut moves.jumps)?;
    }

    if to_move && !options.premove {
        safety::remove_illegal(variant, position, piece, &mut moves)?;
    }
    Ok(moves)
}

/// Returns true if a piece of `color` cannot land on `square`.
///
/// Friendly pieces and voids block; anything else may be captured.
pub fn is_blocked(board: &BoardIndex, square: Coord, color: Color) -> bool {
    board
        .get(square)
        .is_some_and(|kind| kind.color == color || kind.is_void())
}

/// Clips `extent` by the pieces sharing the `dir` line with `origin`.
///
/// An opposing piece clips the range to include its square; a friendly piece
/// or a void clips it to stop one step short.
pub fn slide_limit(
    board: &BoardIndex,
    dir: Direction,
    origin: Coord,
    color: Color,
    extent: Extent,
) -> Extent {
    let mut limit = extent;
    for piece in board.line_at(dir, origin) {
        if piece.coord == origin {
            continue;
        }
        let steps = dir.steps_between(origin, piece.coord);
        let capturable = piece.color() != color && !piece.kind.is_void();
        if steps < 0 {
            let bound = if capturable { steps } else { steps + 1 };
            limit.min = limit.min.max(saturate(bound));
        } else {
            let bound = if capturable { steps } else { steps - 1 };
            limit.max = limit.max.min(saturate(bound));
        }
    }
    limit
}

fn saturate(steps: i128) -> i64 {
    i64::try_from(steps).unwrap_or(if steps < 0 { i64::MIN } else { i64::MAX })
}
