//! Game conclusions.
//!
//! [`evaluate`] decides whether the last move ended the game. Win conditions
//! are checked for the player who just moved, in a fixed order; draws come
//! after every win condition except checkmate.

mod material;
mod repetition;
mod scan;

pub use material::is_insufficient;
pub use repetition::is_repetition;
pub use scan::{LegalMoveScan, RunToCompletion, ScanDriver, ScanStep};

use std::fmt;

use infinite_core::{Color, Move, RawType};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{EngineError, Position, Variant, WinCondition};

/// Checks given before the checked side loses under three-check.
const CHECKS_TO_LOSE: u32 = 3;

/// Outcome of a game, as seen after the most recent move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum GameConclusion {
    /// The game continues.
    Ongoing,
    /// A player has won.
    Win { winner: Color, reason: WinReason },
    /// Nobody wins.
    Draw { reason: DrawReason },
}

impl GameConclusion {
    #[inline]
    pub fn is_over(&self) -> bool {
        !matches!(self, GameConclusion::Ongoing)
    }

    /// The winning colour, if any.
    pub fn winner(&self) -> Option<Color> {
        match self {
            GameConclusion::Win { winner, .. } => Some(*winner),
            _ => None,
        }
    }
}

impl fmt::Display for GameConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameConclusion::Ongoing => write!(f, "in progress"),
            GameConclusion::Win { winner, reason } => {
                write!(f, "{} wins by {reason}", winner.name())
            }
            GameConclusion::Draw { reason } => write!(f, "draw by {reason}"),
        }
    }
}

/// How a game was won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WinReason {
    Checkmate,
    RoyalCapture,
    AllRoyalsCaptured,
    AllPiecesCaptured,
    ThreeCheck,
    KingOfTheHill,
}

impl fmt::Display for WinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WinReason::Checkmate => "checkmate",
            WinReason::RoyalCapture => "royal capture",
            WinReason::AllRoyalsCaptured => "capturing all royals",
            WinReason::AllPiecesCaptured => "capturing all pieces",
            WinReason::ThreeCheck => "three checks",
            WinReason::KingOfTheHill => "king of the hill",
        };
        f.write_str(text)
    }
}

/// Why a game was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawReason {
    /// The side to move has no legal move and is not checkmated.
    Stalemate,
    /// The current position occurred for the third time.
    Repetition,
    /// Too many plies without a capture or pawn move.
    MoveRule,
    /// Neither side can force checkmate.
    InsufficientMaterial,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DrawReason::Stalemate => "stalemate",
            DrawReason::Repetition => "repetition",
            DrawReason::MoveRule => "move rule",
            DrawReason::InsufficientMaterial => "insufficient material",
        };
        f.write_str(text)
    }
}

/// Evaluates the position reached after `history`, scanning every piece of
/// the side to move if needed.
pub fn evaluate(
    variant: &Variant,
    position: &mut Position,
    history: &[Move],
) -> Result<GameConclusion, EngineError> {
    let conclusion = Evaluation::default().resume(variant, position, history, &mut RunToCompletion)?;
    Ok(conclusion.unwrap_or(GameConclusion::Ongoing))
}

/// Like [`evaluate`], but lets `driver` suspend the legal-move scan.
///
/// Returns `None` if the driver suspended. Use [`Evaluation`] directly to keep
/// the progress of a suspended scan.
pub fn evaluate_with(
    variant: &Variant,
    position: &mut Position,
    history: &[Move],
    driver: &mut impl ScanDriver,
) -> Result<Option<GameConclusion>, EngineError> {
    Evaluation::default().resume(variant, position, history, driver)
}

/// A conclusion check that can be suspended and resumed.
///
/// The position and history must not change between calls to
/// [`resume`](Evaluation::resume).
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    scan: Option<LegalMoveScan>,
}

impl Evaluation {
    /// Runs the evaluation, continuing a suspended scan if there is one.
    pub fn resume(
        &mut self,
        variant: &Variant,
        position: &mut Position,
        history: &[Move],
        driver: &mut impl ScanDriver,
    ) -> Result<Option<GameConclusion>, EngineError> {
        let last = history.last();
        let side = position.side_to_move();
        let mover = side.opposite();

        if let Some(reason) = decisive_win(variant, position, last, mover) {
            return Ok(Some(concluded(GameConclusion::Win {
                winner: mover,
                reason,
            })));
        }

        if is_repetition(history) {
            return Ok(Some(concluded(GameConclusion::Draw {
                reason: DrawReason::Repetition,
            })));
        }

        let scan = self.scan.get_or_insert_with(|| LegalMoveScan::new(position));
        let Some(has_move) = scan.run(variant, position, driver)? else {
            return Ok(None);
        };
        self.scan = None;
        if !has_move {
            let conclusion = if position.is_in_check() && variant.uses(mover, WinCondition::Checkmate) {
                GameConclusion::Win {
                    winner: mover,
                    reason: WinReason::Checkmate,
                }
            } else {
                GameConclusion::Draw {
                    reason: DrawReason::Stalemate,
                }
            };
            return Ok(Some(concluded(conclusion)));
        }

        if variant
            .move_rule()
            .is_some_and(|limit| position.move_rule_counter() >= limit)
        {
            return Ok(Some(concluded(GameConclusion::Draw {
                reason: DrawReason::MoveRule,
            })));
        }

        if is_insufficient(variant, position, last) {
            return Ok(Some(concluded(GameConclusion::Draw {
                reason: DrawReason::InsufficientMaterial,
            })));
        }

        Ok(Some(GameConclusion::Ongoing))
    }
}

fn concluded(conclusion: GameConclusion) -> GameConclusion {
    debug!(%conclusion, "game concluded");
    conclusion
}

/// Win conditions that need no move search, in precedence order.
fn decisive_win(
    variant: &Variant,
    position: &Position,
    last: Option<&Move>,
    mover: Color,
) -> Option<WinReason> {
    let side = mover.opposite();
    let board = position.board();
    let applies = |condition| variant.uses(mover, condition);
    let captured_royal = last
        .and_then(|mv| mv.captured)
        .is_some_and(|kind| kind.color == side && kind.is_royal());

    if applies(WinCondition::AllPiecesCaptured) && board.count_of_color(side) == 0 {
        return Some(WinReason::AllPiecesCaptured);
    }
    if applies(WinCondition::RoyalCapture) && captured_royal {
        return Some(WinReason::RoyalCapture);
    }
    if applies(WinCondition::AllRoyalsCaptured)
        && captured_royal
        && board.pieces_of_color(side).iter().all(|p| !p.kind.is_royal())
    {
        return Some(WinReason::AllRoyalsCaptured);
    }
    if applies(WinCondition::ThreeCheck) && position.checks_received(side) >= CHECKS_TO_LOSE {
        return Some(WinReason::ThreeCheck);
    }
    if applies(WinCondition::KingOfTheHill)
        && last.is_some_and(|mv| {
            mv.kind.raw == RawType::King
                && mv.kind.color == mover
                && variant.koth_squares().contains(&mv.to)
        })
    {
        return Some(WinReason::KingOfTheHill);
    }
    None
}
