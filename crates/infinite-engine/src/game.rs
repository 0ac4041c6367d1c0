//! Full game management with history tracking.
//!
//! The [`Game`] struct ties the engine together: it owns the compiled
//! [`Variant`] and the current [`Position`], validates moves against the legal
//! move calculator, keeps the history needed for repetition and undo, and
//! re-evaluates the conclusion after every move.

use infinite_core::{Coord, Destination, Move, PieceType, RawType, SpecialTag};
use thiserror::Error;

use crate::movegen::{calculate, CalcOptions, LegalMoves};
use crate::position::MoveUndo;
use crate::rules::{evaluate, GameConclusion};
use crate::{ConfigError, EngineError, GameSetup, Position, Variant};

/// Error type for game operations.
#[derive(Debug, Error)]
pub enum GameError {
    /// The move is not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),
    /// There is no piece on the source square.
    #[error("no piece on {0}")]
    NoPiece(Coord),
    /// The game has already ended.
    #[error("game has already ended")]
    GameAlreadyOver,
    /// A pawn reached a promotion rank without a promotion choice.
    #[error("a promotion kind is required")]
    PromotionRequired,
    /// The promotion choice is not allowed here.
    #[error("cannot promote to {0}")]
    PromotionNotAllowed(RawType),
    /// No move has been played.
    #[error("no move to take back")]
    NothingToUndo,
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A game in progress on the infinite board.
#[derive(Debug, Clone)]
pub struct Game {
    variant: Variant,
    position: Position,
    /// Moves as applied, with captures and promotions filled in.
    history: Vec<Move>,
    undos: Vec<MoveUndo>,
    conclusion: GameConclusion,
}

impl Game {
    /// Starts a game from a setup. The starting position may already be over.
    pub fn from_setup(setup: &GameSetup) -> Result<Self, GameError> {
        let (variant, mut position) = setup.build()?;
        let conclusion = evaluate(&variant, &mut position, &[])?;
        Ok(Game {
            variant,
            position,
            history: Vec::new(),
            undos: Vec::new(),
            conclusion,
        })
    }

    /// Starts a game from the orthodox array.
    pub fn classical() -> Result<Self, GameError> {
        Self::from_setup(&GameSetup::classical())
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns the move history.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Returns the number of plies played.
    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    pub fn conclusion(&self) -> GameConclusion {
        self.conclusion
    }

    pub fn is_over(&self) -> bool {
        self.conclusion.is_over()
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.position.is_in_check()
    }

    /// Legal moves of the piece on `coord`. Empty once the game is over.
    pub fn legal_moves(&mut self, coord: Coord) -> Result<LegalMoves, GameError> {
        if self.is_over() {
            return Ok(LegalMoves::default());
        }
        Ok(calculate(
            &self.variant,
            &mut self.position,
            coord,
            CalcOptions::default(),
        )?)
    }

    /// Plays the piece on `from` to `to` and returns the resulting conclusion.
    ///
    /// `promotion` names the kind a pawn becomes on a promotion rank and must
    /// be absent otherwise.
    pub fn make_move(
        &mut self,
        from: Coord,
        to: Coord,
        promotion: Option<RawType>,
    ) -> Result<GameConclusion, GameError> {
        if self.is_over() {
            return Err(GameError::GameAlreadyOver);
        }
        let kind = self
            .position
            .board()
            .get(from)
            .ok_or(GameError::NoPiece(from))?;
        let destination = self
            .legal_moves(from)?
            .find(from, to)
            .ok_or_else(|| GameError::IllegalMove(format!("{kind} {from}>{to}")))?;

        let mut mv = Move::towards(kind, from, &destination);
        mv.promotion = self.promotion_for(&destination, kind, promotion)?;

        let undo = self.position.make_move(&self.variant, mv)?;
        self.history.push(*undo.mv());
        self.undos.push(undo);
        self.conclusion = evaluate(&self.variant, &mut self.position, &self.history)?;
        Ok(self.conclusion)
    }

    fn promotion_for(
        &self,
        destination: &Destination,
        kind: PieceType,
        choice: Option<RawType>,
    ) -> Result<Option<PieceType>, GameError> {
        let promotes = destination.tag == Some(SpecialTag::Promotion);
        match (promotes, choice) {
            (false, None) => Ok(None),
            (false, Some(raw)) => Err(GameError::PromotionNotAllowed(raw)),
            (true, None) => Err(GameError::PromotionRequired),
            (true, Some(raw)) if self.variant.promotions_allowed().contains(&raw) => {
                Ok(Some(PieceType::new(raw, kind.color)))
            }
            (true, Some(raw)) => Err(GameError::PromotionNotAllowed(raw)),
        }
    }

    /// Takes back the last move and returns it.
    pub fn undo_move(&mut self) -> Result<Move, GameError> {
        let undo = self.undos.pop().ok_or(GameError::NothingToUndo)?;
        self.position.undo_move(undo)?;
        let mv = self.history.pop().ok_or(GameError::NothingToUndo)?;
        // A move was played from this position, so it was not over.
        self.conclusion = GameConclusion::Ongoing;
        Ok(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::WinReason;
    use infinite_core::Color;

    fn w(raw: RawType) -> PieceType {
        PieceType::new(raw, Color::White)
    }

    fn b(raw: RawType) -> PieceType {
        PieceType::new(raw, Color::Black)
    }

    #[test]
    fn new_game() {
        let mut game = Game::classical().unwrap();
        assert_eq!(game.conclusion(), GameConclusion::Ongoing);
        assert_eq!(game.ply_count(), 0);
        // The infinite board leaves room behind the back rank.
        assert_eq!(game.legal_moves(Coord::new(2, 1)).unwrap().jumps.len(), 7);
        assert!(!game.legal_moves(Coord::new(2, 8)).unwrap().has_any());
    }

    #[test]
    fn illegal_move() {
        let mut game = Game::classical().unwrap();
        let result = game.make_move(Coord::new(1, 1), Coord::new(1, 5), None);
        assert!(matches!(result, Err(GameError::IllegalMove(_))));
        let result = game.make_move(Coord::new(3, 3), Coord::new(3, 4), None);
        assert!(matches!(result, Err(GameError::NoPiece(_))));
        assert_eq!(game.ply_count(), 0);
    }

    #[test]
    fn double_push_then_undo() {
        let mut game = Game::classical().unwrap();
        let before = game.position().clone();
        game.make_move(Coord::new(5, 2), Coord::new(5, 4), None).unwrap();
        assert_eq!(game.position().en_passant(), Some(Coord::new(5, 3)));
        assert_eq!(game.history()[0].tag, Some(SpecialTag::DoublePush));

        let mv = game.undo_move().unwrap();
        assert_eq!(mv.to, Coord::new(5, 4));
        assert_eq!(game.position(), &before);
        assert!(matches!(game.undo_move(), Err(GameError::NothingToUndo)));
    }

    #[test]
    fn promotion_choice() {
        let setup = GameSetup::new()
            .with_promotion_ranks(Color::White, vec![8])
            .with_piece(Coord::new(3, 7), w(RawType::Pawn))
            .with_piece(Coord::new(0, 0), w(RawType::King))
            .with_piece(Coord::new(20, 20), b(RawType::King));
        let mut game = Game::from_setup(&setup).unwrap();
        let (from, to) = (Coord::new(3, 7), Coord::new(3, 8));

        assert!(matches!(
            game.make_move(from, to, None),
            Err(GameError::PromotionRequired)
        ));
        assert!(matches!(
            game.make_move(from, to, Some(RawType::Amazon)),
            Err(GameError::PromotionNotAllowed(RawType::Amazon))
        ));
        game.make_move(from, to, Some(RawType::Queen)).unwrap();
        assert_eq!(game.position().board().get(to), Some(w(RawType::Queen)));
        assert_eq!(game.history()[0].promotion, Some(w(RawType::Queen)));

        game.undo_move().unwrap();
        assert_eq!(game.position().board().get(from), Some(w(RawType::Pawn)));
        assert!(matches!(
            game.make_move(Coord::new(0, 0), Coord::new(1, 1), Some(RawType::Queen)),
            Err(GameError::PromotionNotAllowed(RawType::Queen))
        ));
    }

    #[test]
    fn double_push_onto_the_last_rank_needs_a_choice() {
        let setup = GameSetup::new()
            .with_promotion_ranks(Color::White, vec![8])
            .with_piece(Coord::new(3, 6), w(RawType::Pawn))
            .with_special_right(Coord::new(3, 6), true)
            .with_piece(Coord::new(0, 0), w(RawType::King))
            .with_piece(Coord::new(20, 20), b(RawType::King));
        let mut game = Game::from_setup(&setup).unwrap();
        let (from, to) = (Coord::new(3, 6), Coord::new(3, 8));

        assert!(matches!(
            game.make_move(from, to, None),
            Err(GameError::PromotionRequired)
        ));
        game.make_move(from, to, Some(RawType::Knight)).unwrap();
        assert_eq!(game.position().board().get(to), Some(w(RawType::Knight)));
        assert_eq!(game.position().en_passant(), None);
    }

    #[test]
    fn cannot_move_after_checkmate() {
        let setup = GameSetup::new()
            .with_piece(Coord::new(0, 0), b(RawType::King))
            .with_piece(Coord::new(10, 1), w(RawType::Rook))
            .with_piece(Coord::new(10, -1), w(RawType::Rook))
            .with_piece(Coord::new(5, 5), w(RawType::Rook))
            .with_piece(Coord::new(100, 100), w(RawType::King));
        let mut game = Game::from_setup(&setup).unwrap();

        let conclusion = game
            .make_move(Coord::new(5, 5), Coord::new(5, 0), None)
            .unwrap();
        assert_eq!(
            conclusion,
            GameConclusion::Win {
                winner: Color::White,
                reason: WinReason::Checkmate
            }
        );
        assert!(game.is_over());
        assert!(game.is_check());
        assert!(!game.legal_moves(Coord::new(0, 0)).unwrap().has_any());
        assert!(matches!(
            game.make_move(Coord::new(0, 0), Coord::new(0, 1), None),
            Err(GameError::GameAlreadyOver)
        ));

        game.undo_move().unwrap();
        assert!(!game.is_over());
    }

    #[test]
    fn bare_kings_are_drawn_from_the_start() {
        let setup = GameSetup::new()
            .with_piece(Coord::new(0, 0), w(RawType::King))
            .with_piece(Coord::new(9, 9), b(RawType::King));
        let game = Game::from_setup(&setup).unwrap();
        assert!(game.is_over());
        assert_eq!(game.conclusion().to_string(), "draw by insufficient material");
    }
}
