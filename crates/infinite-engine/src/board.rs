//! Sparse board index ("organized lines").
//!
//! The board cannot be an array, so pieces are kept in two structures that are
//! updated together:
//! - a square -> piece type map, for occupancy queries
//! - for every indexed slide direction, a line -> pieces map, so that every
//!   piece co-linear with a square is one hash lookup away
//!
//! Removals hand back a [`Removal`] record holding the slot the piece had in
//! each line list. Restoring removals in reverse order reproduces the index
//! exactly, list order included.

use std::collections::{BTreeMap, HashMap};

use infinite_core::{Color, Coord, Direction, Piece, PieceType};
use thiserror::Error;

/// Consistency violations in the board index.
///
/// These mean the caller's view of the board has drifted from the index.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("square {0} is already occupied")]
    Occupied(Coord),

    #[error("no piece on square {0}")]
    Vacant(Coord),

    #[error("piece on {0} is missing from its {1} line")]
    LineDesync(Coord, Direction),

    #[error("removal of {0} is being restored out of order")]
    StaleRemoval(Coord),

    #[error("square next to {0} lies outside the representable range")]
    OutOfRange(Coord),
}

/// Identifies one line of a given direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineKey {
    /// The line constant `dx*y - dy*x`.
    pub c: i128,
    /// Tie-break between parallel lines with the same constant.
    pub x: i64,
}

impl LineKey {
    /// Returns the key of the line of `dir` passing through `coord`.
    #[inline]
    pub fn of(dir: Direction, coord: Coord) -> Self {
        LineKey {
            c: dir.line_constant(coord),
            x: dir.line_offset(coord),
        }
    }
}

/// Record of a removed piece, sufficient to put it back exactly where it was.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a removal must be restored or deliberately discarded"]
pub struct Removal {
    piece: Piece,
    slots: Vec<(Direction, usize)>,
}

impl Removal {
    /// The piece that was removed.
    #[inline]
    pub fn piece(&self) -> Piece {
        self.piece
    }
}

/// Pieces of one position, indexed by square and by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardIndex {
    pieces: HashMap<Coord, PieceType>,
    lines: BTreeMap<Direction, HashMap<LineKey, Vec<Piece>>>,
}

impl BoardIndex {
    /// Creates an empty index tracking the given slide directions.
    pub fn new(directions: impl IntoIterator<Item = Direction>) -> Self {
        BoardIndex {
            pieces: HashMap::new(),
            lines: directions
                .into_iter()
                .map(|dir| (dir, HashMap::new()))
                .collect(),
        }
    }

    /// The directions this index keeps line lists for, in sorted order.
    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.lines.keys().copied()
    }

    /// Returns true if lines of `dir` are indexed.
    pub fn tracks(&self, dir: Direction) -> bool {
        self.lines.contains_key(&dir)
    }

    /// Adds a piece. Fails if its square is taken.
    pub fn insert(&mut self, piece: Piece) -> Result<(), BoardError> {
        if self.pieces.contains_key(&piece.coord) {
            return Err(BoardError::Occupied(piece.coord));
        }
        self.pieces.insert(piece.coord, piece.kind);
        for (dir, lines) in self.lines.iter_mut() {
            lines
                .entry(LineKey::of(*dir, piece.coord))
                .or_default()
                .push(piece);
        }
        Ok(())
    }

    /// Removes the piece on `coord`. Fails if the square is empty.
    pub fn remove(&mut self, coord: Coord) -> Result<Removal, BoardError> {
        let kind = self.pieces.remove(&coord).ok_or(BoardError::Vacant(coord))?;
        let mut slots = Vec::with_capacity(self.lines.len());
        for (dir, lines) in self.lines.iter_mut() {
            let key = LineKey::of(*dir, coord);
            let list = lines
                .get_mut(&key)
                .ok_or(BoardError::LineDesync(coord, *dir))?;
            let slot = list
                .iter()
                .position(|p| p.coord == coord)
                .ok_or(BoardError::LineDesync(coord, *dir))?;
            list.remove(slot);
            if list.is_empty() {
                lines.remove(&key);
            }
            slots.push((*dir, slot));
        }
        Ok(Removal {
            piece: Piece::new(kind, coord),
            slots,
        })
    }

    /// Puts a removed piece back at the exact slot it held in every line.
    pub fn restore(&mut self, removal: Removal) -> Result<(), BoardError> {
        let piece = removal.piece;
        if self.pieces.contains_key(&piece.coord) {
            return Err(BoardError::Occupied(piece.coord));
        }
        for (dir, slot) in &removal.slots {
            let len = self
                .lines
                .get(dir)
                .and_then(|lines| lines.get(&LineKey::of(*dir, piece.coord)))
                .map_or(0, Vec::len);
            if *slot > len {
                return Err(BoardError::StaleRemoval(piece.coord));
            }
        }
        self.pieces.insert(piece.coord, piece.kind);
        for (dir, slot) in removal.slots {
            if let Some(lines) = self.lines.get_mut(&dir) {
                lines
                    .entry(LineKey::of(dir, piece.coord))
                    .or_default()
                    .insert(slot, piece);
            }
        }
        Ok(())
    }

    /// Returns the type of the piece on `coord`.
    #[inline]
    pub fn get(&self, coord: Coord) -> Option<PieceType> {
        self.pieces.get(&coord).copied()
    }

    #[inline]
    pub fn piece_at(&self, coord: Coord) -> Option<Piece> {
        self.get(coord).map(|kind| Piece::new(kind, coord))
    }

    #[inline]
    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.pieces.contains_key(&coord)
    }

    /// Returns every piece on the line of `dir` through `coord`.
    ///
    /// Empty if the line holds no pieces or the direction is not indexed.
    pub fn line_at(&self, dir: Direction, coord: Coord) -> &[Piece] {
        self.lines
            .get(&dir)
            .and_then(|lines| lines.get(&LineKey::of(dir, coord)))
            .map_or(&[], Vec::as_slice)
    }

    /// Number of pieces on the board.
    #[inline]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Iterates over all pieces in no particular order.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.pieces
            .iter()
            .map(|(coord, kind)| Piece::new(*kind, *coord))
    }

    /// Returns the pieces of one type, sorted by square.
    pub fn pieces_of_type(&self, kind: PieceType) -> Vec<Piece> {
        let mut found: Vec<Piece> = self.pieces().filter(|p| p.kind == kind).collect();
        found.sort_by_key(|p| p.coord);
        found
    }

    /// Returns the pieces owned by `color`, grouped by type in registry order.
    pub fn pieces_of_color(&self, color: Color) -> Vec<Piece> {
        PieceType::all_of_color(color)
            .flat_map(|kind| self.pieces_of_type(kind))
            .collect()
    }

    /// Counts the pieces owned by `color`.
    pub fn count_of_color(&self, color: Color) -> usize {
        self.pieces.values().filter(|t| t.color == color).count()
    }
}
