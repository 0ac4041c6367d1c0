//! Position state and reversible move application.

use std::collections::HashSet;

use infinite_core::{Color, Coord, Move, Piece, RawType, SpecialTag};
use serde::Serialize;
use tracing::debug;

use crate::board::{BoardError, BoardIndex, Removal};
use crate::movegen::attacks::{detect_check, Attacker};
use crate::{EngineError, Variant};

/// Who is in check, and from where.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckState {
    /// Royals of the side to move that are attacked.
    pub royals_in_check: Vec<Coord>,
    /// Every piece attacking one of those royals, deduplicated by square.
    pub attackers: Vec<Attacker>,
}

impl CheckState {
    #[inline]
    pub fn is_check(&self) -> bool {
        !self.royals_in_check.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BoardOp {
    Removed(Removal),
    Added(Coord),
}

/// Board-level effect of one move, recorded so it can be reverted exactly.
///
/// Only touches the board index; turn, rights and counters belong to
/// [`Position::make_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a board change must be reverted or kept in a MoveUndo"]
pub struct BoardChange {
    ops: Vec<BoardOp>,
    captured: Option<Piece>,
}

impl BoardChange {
    /// Applies `mv` to the board. On failure the board is left untouched.
    pub fn apply(board: &mut BoardIndex, mv: &Move) -> Result<Self, BoardError> {
        let mut change = BoardChange {
            ops: Vec::with_capacity(4),
            captured: None,
        };
        if let Err(e) = change.run(board, mv) {
            change.revert(board)?;
            return Err(e);
        }
        Ok(change)
    }

    fn run(&mut self, board: &mut BoardIndex, mv: &Move) -> Result<(), BoardError> {
        let mover = board.get(mv.from).ok_or(BoardError::Vacant(mv.from))?;

        let victim = match mv.tag {
            Some(SpecialTag::EnPassant { captured }) => Some(captured),
            _ => board.is_occupied(mv.to).then_some(mv.to),
        };
        if let Some(square) = victim {
            let removal = board.remove(square)?;
            self.captured = Some(removal.piece());
            self.ops.push(BoardOp::Removed(removal));
        }

        self.ops.push(BoardOp::Removed(board.remove(mv.from)?));
        board.insert(Piece::new(mv.promotion.unwrap_or(mover), mv.to))?;
        self.ops.push(BoardOp::Added(mv.to));

        if let Some(SpecialTag::Castle { dir, partner }) = mv.tag {
            let landing = mv
                .from
                .offset(dir, 0)
                .ok_or(BoardError::OutOfRange(mv.from))?;
            let removal = board.remove(partner)?;
            let kind = removal.piece().kind;
            self.ops.push(BoardOp::Removed(removal));
            board.insert(Piece::new(kind, landing))?;
            self.ops.push(BoardOp::Added(landing));
        }
        Ok(())
    }

    /// The piece removed by the move, if any.
    pub fn captured(&self) -> Option<Piece> {
        self.captured
    }

    /// Undoes the change, restoring every line list to its prior order.
    pub fn revert(self, board: &mut BoardIndex) -> Result<(), BoardError> {
        for op in self.ops.into_iter().rev() {
            match op {
                BoardOp::Added(coord) => {
                    let _ = board.remove(coord)?;
                }
                BoardOp::Removed(removal) => board.restore(removal)?,
            }
        }
        Ok(())
    }
}

/// Everything needed to take back a move made with [`Position::make_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a move can only be taken back with its MoveUndo"]
pub struct MoveUndo {
    mv: Move,
    change: BoardChange,
    cleared_rights: Vec<Coord>,
    en_passant: Option<Coord>,
    move_rule_counter: u32,
    checks_received: [u32; 2],
    check: CheckState,
    side_to_move: Color,
}

impl MoveUndo {
    /// The move as applied, with its captured piece filled in.
    pub fn mv(&self) -> &Move {
        &self.mv
    }
}

/// A game position on the infinite board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: BoardIndex,
    side_to_move: Color,
    /// Squares whose piece still holds its one-time privilege.
    special_rights: HashSet<Coord>,
    en_passant: Option<Coord>,
    /// Plies since the last capture or pawn move.
    move_rule_counter: u32,
    checks_received: [u32; 2],
    check: CheckState,
}

impl Position {
    /// Builds a position and computes its check state.
    pub fn new(
        variant: &Variant,
        pieces: impl IntoIterator<Item = Piece>,
        side_to_move: Color,
        special_rights: HashSet<Coord>,
        en_passant: Option<Coord>,
    ) -> Result<Self, EngineError> {
        let mut board = variant.new_board();
        for piece in pieces {
            board.insert(piece)?;
        }
        let check = detect_check(variant, &board, side_to_move)?;
        Ok(Position {
            board,
            side_to_move,
            special_rights,
            en_passant,
            move_rule_counter: 0,
            checks_received: [0; 2],
            check,
        })
    }

    #[inline]
    pub fn board(&self) -> &BoardIndex {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn has_special_right(&self, coord: Coord) -> bool {
        self.special_rights.contains(&coord)
    }

    /// Squares holding a special right, in no particular order.
    pub fn special_rights(&self) -> impl Iterator<Item = Coord> + '_ {
        self.special_rights.iter().copied()
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Coord> {
        self.en_passant
    }

    #[inline]
    pub fn move_rule_counter(&self) -> u32 {
        self.move_rule_counter
    }

    /// Number of times `color` has been put in check.
    pub fn checks_received(&self, color: Color) -> u32 {
        match color {
            Color::White | Color::Black => self.checks_received[color.index()],
            Color::Neutral => 0,
        }
    }

    /// Check state of the side to move.
    #[inline]
    pub fn check(&self) -> &CheckState {
        &self.check
    }

    #[inline]
    pub fn is_in_check(&self) -> bool {
        self.check.is_check()
    }

    /// Applies a move and hands back what is needed to take it back.
    ///
    /// The moving piece's type and any captured piece are read from the board;
    /// the `kind` and `captured` fields of `mv` are overwritten.
    pub fn make_move(&mut self, variant: &Variant, mut mv: Move) -> Result<MoveUndo, EngineError> {
        mv.kind = self
            .board
            .get(mv.from)
            .ok_or(BoardError::Vacant(mv.from))?;
        let change = BoardChange::apply(&mut self.board, &mv)?;
        mv.captured = change.captured().map(|p| p.kind);

        let mut undo = MoveUndo {
            mv,
            change,
            cleared_rights: Vec::new(),
            en_passant: self.en_passant,
            move_rule_counter: self.move_rule_counter,
            checks_received: self.checks_received,
            check: std::mem::take(&mut self.check),
            side_to_move: self.side_to_move,
        };

        let mut touched = vec![mv.from, mv.to];
        match mv.tag {
            Some(SpecialTag::Castle { partner, .. }) => touched.push(partner),
            Some(SpecialTag::EnPassant { captured }) => touched.push(captured),
            _ => {}
        }
        for square in touched {
            if self.special_rights.remove(&square) {
                undo.cleared_rights.push(square);
            }
        }

        self.en_passant = match mv.tag {
            Some(SpecialTag::DoublePush) => {
                let step = if mv.to.y > mv.from.y { 1 } else { -1 };
                mv.from.offset(0, step)
            }
            _ => None,
        };
        self.move_rule_counter = if mv.is_capture() || mv.kind.raw == RawType::Pawn {
            0
        } else {
            self.move_rule_counter.saturating_add(1)
        };
        self.side_to_move = self.side_to_move.opposite();
        self.check = detect_check(variant, &self.board, self.side_to_move)?;
        if self.check.is_check() {
            let slot = &mut self.checks_received[self.side_to_move.index()];
            *slot = slot.saturating_add(1);
        }

        debug!(mv = %undo.mv, check = self.check.is_check(), "applied move");
        Ok(undo)
    }

    /// Takes back a move, restoring the exact prior state.
    pub fn undo_move(&mut self, undo: MoveUndo) -> Result<(), EngineError> {
        let MoveUndo {
            mv,
            change,
            cleared_rights,
            en_passant,
            move_rule_counter,
            checks_received,
            check,
            side_to_move,
        } = undo;
        change.revert(&mut self.board)?;
        self.special_rights.extend(cleared_rights);
        self.en_passant = en_passant;
        self.move_rule_counter = move_rule_counter;
        self.checks_received = checks_received;
        self.check = check;
        self.side_to_move = side_to_move;
        debug!(mv = %mv, "undid move");
        Ok(())
    }

    /// Plays `mv` on the board only, runs `probe`, and reverts.
    pub fn simulate<R>(
        &mut self,
        mv: &Move,
        probe: impl FnOnce(&BoardIndex) -> R,
    ) -> Result<R, EngineError> {
        let change = BoardChange::apply(&mut self.board, mv)?;
        let result = probe(&self.board);
        change.revert(&mut self.board)?;
        Ok(result)
    }

    /// Temporarily lifts the piece on `coord`, runs `probe`, and puts it back.
    pub fn without_piece<R>(
        &mut self,
        coord: Coord,
        probe: impl FnOnce(&BoardIndex) -> R,
    ) -> Result<R, EngineError> {
        let removal = self.board.remove(coord)?;
        let result = probe(&self.board);
        self.board.restore(removal)?;
        Ok(result)
    }
}
