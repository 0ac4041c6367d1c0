//! Check-safety filter.
//!
//! Removes candidate moves that would leave the mover's royals in check.
//! Slides are handled geometrically, since they may be unbounded:
//! - in check by one slider, slides collapse into the capture and block squares
//!   they can reach, found by intersecting lines
//! - in double check, no slide survives
//! - otherwise, a slide is dropped if lifting the mover opens a line onto one
//!   of its royals and the slide leaves that line
//!
//! Jump destinations are few, so each one is played out on the board and
//! tested directly.

use std::collections::BTreeSet;

use infinite_core::{Color, Coord, Destination, Direction, Move, Piece};
use tracing::trace;

use super::attacks::{is_attacked_along, is_in_check, jumping_royals, Attacker};
use super::LegalMoves;
use crate::moveset::Extent;
use crate::{EngineError, Position, Variant, WinCondition};

/// Strips every move that would leave `piece`'s side in check.
///
/// Does nothing if the opponent cannot win by checkmate or the side has no
/// royal that can be checkmated.
pub fn remove_illegal(
    variant: &Variant,
    position: &mut Position,
    piece: Piece,
    moves: &mut LegalMoves,
) -> Result<(), EngineError> {
    let color = piece.color();
    if !variant.opponent_uses(color, WinCondition::Checkmate) {
        return Ok(());
    }
    let royals = jumping_royals(variant, position.board(), color);
    if royals.is_empty() {
        return Ok(());
    }

    if !moves.slides.is_empty() {
        let check = position.check().clone();
        if check.is_check() {
            respond_to_check(piece, &check.royals_in_check, &check.attackers, moves);
        } else {
            guard_discovered_lines(variant, position, piece, &royals, moves)?;
        }
    }

    let mut kept = Vec::with_capacity(moves.jumps.len());
    for dest in moves.jumps.drain(..) {
        let mv = Move::towards(piece.kind, piece.coord, &dest);
        let exposed = position.simulate(&mv, |board| is_in_check(variant, board, color))??;
        if !exposed {
            kept.push(dest);
        }
    }
    moves.jumps = kept;
    Ok(())
}

/// Replaces slides with the squares that capture a lone checker or block it.
fn respond_to_check(
    piece: Piece,
    royals_in_check: &[Coord],
    attackers: &[Attacker],
    moves: &mut LegalMoves,
) {
    let slides = std::mem::take(&mut moves.slides);
    let [attacker] = attackers else {
        trace!(from = %piece.coord, "multiple checkers, dropping slides");
        return;
    };

    let mut added = Vec::new();
    for (dir, extent) in &slides {
        if reaches(*dir, *extent, piece.coord, attacker.coord) {
            added.push(attacker.coord);
        }
    }

    if let [royal] = royals_in_check {
        if attacker.sliding && royal.chebyshev_distance(attacker.coord) > 1 {
            for (dir, extent) in &slides {
                if let Some(block) = blocking_square(*dir, *extent, piece.coord, *royal, attacker.coord)
                {
                    added.push(block);
                }
            }
        }
    }

    trace!(from = %piece.coord, squares = added.len(), "slides reduced to check responses");
    for square in added {
        if !moves.jumps.iter().any(|d| d.coord == square) {
            moves.jumps.push(Destination::plain(square));
        }
    }
}

/// Keeps only the slides that stay on a line the mover is shielding.
fn guard_discovered_lines(
    variant: &Variant,
    position: &mut Position,
    piece: Piece,
    royals: &[Coord],
    moves: &mut LegalMoves,
) -> Result<(), EngineError> {
    let color = piece.color();
    let shared: Vec<(Coord, Direction)> = royals
        .iter()
        .filter(|royal| **royal != piece.coord)
        .flat_map(move |royal| {
            variant
                .directions()
                .filter(move |dir| dir.is_colinear(piece.coord, *royal))
                .map(move |dir| (*royal, dir))
        })
        .collect();
    if shared.is_empty() {
        return Ok(());
    }

    let opened = position.without_piece(piece.coord, |board| {
        let mut opened = BTreeSet::new();
        for (royal, dir) in &shared {
            if is_attacked_along(variant, board, *royal, color, *dir)? {
                opened.insert(*dir);
            }
        }
        Ok::<_, EngineError>(opened)
    })??;

    match opened.len() {
        0 => {}
        1 => {
            moves.slides.retain(|dir, _| opened.contains(dir));
            trace!(from = %piece.coord, "pinned, slides restricted to the pin line");
        }
        _ => {
            moves.slides.clear();
            trace!(from = %piece.coord, "pinned on several lines, dropping slides");
        }
    }
    Ok(())
}

fn reaches(dir: Direction, extent: Extent, from: Coord, to: Coord) -> bool {
    dir.is_colinear(from, to) && extent.contains_step(dir.steps_between(from, to))
}

/// The square where a slide along `dir` from `from` cuts the segment between
/// `royal` and `attacker`, if it is reachable and strictly between them.
fn blocking_square(
    dir: Direction,
    extent: Extent,
    from: Coord,
    royal: Coord,
    attacker: Coord,
) -> Option<Coord> {
    let attack_dir = Direction::new(
        attacker.x.checked_sub(royal.x)?,
        attacker.y.checked_sub(royal.y)?,
    )?;
    if attack_dir == dir {
        return None;
    }
    let point = intersection(dir, from, attack_dir, royal)?;
    let along = attack_dir.steps_between(royal, point);
    let span = attack_dir.steps_between(royal, attacker);
    let strictly_between = if span > 0 {
        0 < along && along < span
    } else {
        span < along && along < 0
    };
    (strictly_between && reaches(dir, extent, from, point)).then_some(point)
}

/// Integer intersection of the `d1` line through `p1` and the `d2` line through `p2`.
fn intersection(d1: Direction, p1: Coord, d2: Direction, p2: Coord) -> Option<Coord> {
    let (dx1, dy1) = (i128::from(d1.dx()), i128::from(d1.dy()));
    let (dx2, dy2) = (i128::from(d2.dx()), i128::from(d2.dy()));
    let c1 = d1.line_constant(p1);
    let c2 = d2.line_constant(p2);

    let det = dx1.checked_mul(dy2)?.checked_sub(dy1.checked_mul(dx2)?)?;
    if det == 0 {
        return None;
    }
    let x_num = c1.checked_mul(dx2)?.checked_sub(dx1.checked_mul(c2)?)?;
    let y_num = dy2.checked_mul(c1)?.checked_sub(dy1.checked_mul(c2)?)?;
    if x_num % det != 0 || y_num % det != 0 {
        return None;
    }
    let x = i64::try_from(x_num / det).ok()?;
    let y = i64::try_from(y_num / det).ok()?;
    Some(Coord::new(x, y))
}
