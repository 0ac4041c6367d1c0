//! Game setup: rules, movesets and the starting position.
//!
//! A [`GameSetup`] is plain data. It can be loaded from TOML, built in code
//! with the `with_*` methods, or started from [`GameSetup::classical`].
//! [`GameSetup::build`] validates it and compiles the immutable [`Variant`]
//! together with the initial [`Position`].
//!
//! ```toml
//! [rules]
//! win_conditions = { white = ["checkmate"], black = ["royal-capture"] }
//! move_rule = 100
//!
//! [movesets.hawk]
//! jumps = [[2, 0], [-2, 0]]
//! slides."1,1" = { min = -3, max = 3 }
//!
//! [position]
//! side_to_move = "white"
//! pieces."5,1" = { kind = "white-king", special_right = true }
//! pieces."5,8" = "black-king"
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use infinite_core::{
    Color, Coord, CoordKey, CoordKeyError, Direction, Piece, PieceType, PieceTypeParseError,
    RawType,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::moveset::{Extent, Moveset, MovesetTable};
use crate::variant::VariantParts;
use crate::{EngineError, Position, Variant, WinCondition};

/// Errors that can occur when loading or compiling a game setup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the setup file from disk.
    #[error("Failed to read setup file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the setup as valid TOML.
    #[error("Failed to parse setup: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Failed to write the setup as TOML.
    #[error("Failed to serialise setup: {0}")]
    SerializeError(#[from] toml::ser::Error),
    /// A square key is not a canonical `x,y` pair.
    #[error("Invalid square {key:?}: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: CoordKeyError,
    },
    /// A slide key is not a reduced, sign-normalised direction.
    #[error("Invalid slide direction {key:?}: {source}")]
    InvalidDirection {
        key: String,
        #[source]
        source: CoordKeyError,
    },
    /// A piece or kind name could not be parsed.
    #[error("Unknown piece: {0}")]
    UnknownKind(#[from] PieceTypeParseError),
    /// Board furniture owned by a player, or a player piece owned by neutral.
    #[error("{0} cannot be placed: neutral kinds and the neutral colour go together")]
    MismatchedOwner(PieceType),
    /// A moveset lists the zero jump.
    #[error("Moveset of {0} contains the zero jump")]
    ZeroJump(RawType),
    /// Pawns cannot promote to this kind.
    #[error("Cannot promote to {0}")]
    InvalidPromotion(RawType),
    /// Only the players take turns.
    #[error("The neutral colour cannot be to move")]
    NeutralToMove,
    /// The position could not be set up on the board.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// How to treat pieces whose special right is not given explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RightsPolicy {
    /// Unspecified means no right.
    #[default]
    Restrictive,
    /// Pawns may double-push; kings, royal centaurs and rooks may castle.
    Permissive,
}

impl RightsPolicy {
    fn grants(self, raw: RawType) -> bool {
        match self {
            RightsPolicy::Restrictive => false,
            RightsPolicy::Permissive => matches!(
                raw,
                RawType::Pawn | RawType::King | RawType::RoyalCentaur | RawType::Rook
            ),
        }
    }
}

/// Win conditions per player. Defaults to checkmate for both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinConditions {
    #[serde(default = "default_win_conditions")]
    pub white: Vec<WinCondition>,
    #[serde(default = "default_win_conditions")]
    pub black: Vec<WinCondition>,
}

fn default_win_conditions() -> Vec<WinCondition> {
    vec![WinCondition::Checkmate]
}

impl Default for WinConditions {
    fn default() -> Self {
        WinConditions {
            white: default_win_conditions(),
            black: default_win_conditions(),
        }
    }
}

/// Promotion ranks per player. Empty means that player's pawns never promote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionRanks {
    #[serde(default)]
    pub white: Vec<i64>,
    #[serde(default)]
    pub black: Vec<i64>,
}

/// The `[rules]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub win_conditions: WinConditions,
    /// Plies without capture or pawn move before a draw. No limit if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_rule: Option<u32>,
    #[serde(default)]
    pub promotion_ranks: PromotionRanks,
    /// Kinds a pawn may promote to. Defaults to queen, rook, bishop, knight.
    #[serde(default = "default_promotions")]
    pub promotions_allowed: Vec<RawType>,
    /// Squares a king must reach under king of the hill.
    #[serde(default = "default_koth_squares")]
    pub koth_squares: Vec<String>,
}

fn default_promotions() -> Vec<RawType> {
    vec![RawType::Queen, RawType::Rook, RawType::Bishop, RawType::Knight]
}

fn default_koth_squares() -> Vec<String> {
    ["4,4", "5,4", "4,5", "5,5"].map(String::from).to_vec()
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            win_conditions: WinConditions::default(),
            move_rule: None,
            promotion_ranks: PromotionRanks::default(),
            promotions_allowed: default_promotions(),
            koth_squares: default_koth_squares(),
        }
    }
}

/// Bounds of one slide. A missing bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

/// Replacement moveset for one kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovesetConfig {
    #[serde(default)]
    pub jumps: Vec<[i64; 2]>,
    /// Slides keyed by direction, e.g. `"1,0"`.
    #[serde(default)]
    pub slides: BTreeMap<String, SlideConfig>,
}

impl MovesetConfig {
    fn to_moveset(&self, raw: RawType) -> Result<Moveset, ConfigError> {
        let mut moveset = Moveset::default();
        for [dx, dy] in &self.jumps {
            if *dx == 0 && *dy == 0 {
                return Err(ConfigError::ZeroJump(raw));
            }
            moveset.jumps.push(Coord::new(*dx, *dy));
        }
        for (key, slide) in &self.slides {
            let dir: Direction = key.parse().map_err(|source| ConfigError::InvalidDirection {
                key: key.clone(),
                source,
            })?;
            moveset
                .slides
                .insert(dir, Extent::from_bounds(slide.min, slide.max));
        }
        Ok(moveset)
    }
}

impl From<&Moveset> for MovesetConfig {
    fn from(moveset: &Moveset) -> Self {
        MovesetConfig {
            jumps: moveset.jumps.iter().map(|c| [c.x, c.y]).collect(),
            slides: moveset
                .slides
                .iter()
                .map(|(dir, extent)| {
                    let slide = SlideConfig {
                        min: (!extent.is_unbounded_below()).then_some(extent.min),
                        max: (!extent.is_unbounded_above()).then_some(extent.max),
                    };
                    (dir.to_string(), slide)
                })
                .collect(),
        }
    }
}

/// A piece entry: a bare type name, or a table with an explicit special right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PieceSpec {
    Kind(String),
    Detailed {
        kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        special_right: Option<bool>,
    },
}

impl PieceSpec {
    fn kind(&self) -> &str {
        match self {
            PieceSpec::Kind(kind) | PieceSpec::Detailed { kind, .. } => kind,
        }
    }

    fn special_right(&self) -> Option<bool> {
        match self {
            PieceSpec::Kind(_) => None,
            PieceSpec::Detailed { special_right, .. } => *special_right,
        }
    }
}

/// The `[position]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionConfig {
    #[serde(default = "default_side_to_move")]
    pub side_to_move: Color,
    /// Square a pawn may capture onto en passant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en_passant: Option<String>,
    #[serde(default)]
    pub undetermined_rights: RightsPolicy,
    /// Pieces keyed by square, e.g. `"5,1"`.
    #[serde(default)]
    pub pieces: BTreeMap<String, PieceSpec>,
}

fn default_side_to_move() -> Color {
    Color::White
}

impl Default for PositionConfig {
    fn default() -> Self {
        PositionConfig {
            side_to_move: default_side_to_move(),
            en_passant: None,
            undetermined_rights: RightsPolicy::default(),
            pieces: BTreeMap::new(),
        }
    }
}

/// Everything needed to start a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSetup {
    #[serde(default)]
    pub rules: RulesConfig,
    /// Moveset overrides keyed by kind name, e.g. `"knightrider"`.
    #[serde(default)]
    pub movesets: BTreeMap<String, MovesetConfig>,
    #[serde(default)]
    pub position: PositionConfig,
}

fn parse_square(key: &str) -> Result<Coord, ConfigError> {
    key.parse::<CoordKey>()
        .map(|k| k.decode())
        .map_err(|source| ConfigError::InvalidKey {
            key: key.to_string(),
            source,
        })
}

impl GameSetup {
    /// An empty board with default rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// The orthodox army on ranks 1 to 8 of the infinite board.
    pub fn classical() -> Self {
        const BACK_RANK: [RawType; 8] = [
            RawType::Rook,
            RawType::Knight,
            RawType::Bishop,
            RawType::Queen,
            RawType::King,
            RawType::Bishop,
            RawType::Knight,
            RawType::Rook,
        ];
        let mut setup = GameSetup::new()
            .with_promotion_ranks(Color::White, vec![8])
            .with_promotion_ranks(Color::Black, vec![1])
            .with_move_rule(100)
            .with_undetermined_rights(RightsPolicy::Permissive);
        for (x, raw) in (1..).zip(BACK_RANK) {
            setup = setup
                .with_piece(Coord::new(x, 1), PieceType::new(raw, Color::White))
                .with_piece(Coord::new(x, 2), PieceType::new(RawType::Pawn, Color::White))
                .with_piece(Coord::new(x, 7), PieceType::new(RawType::Pawn, Color::Black))
                .with_piece(Coord::new(x, 8), PieceType::new(raw, Color::Black));
        }
        setup
    }

    /// Parses a setup from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads a setup from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file cannot be read, or
    /// [`ConfigError::ParseError`] if it is not a valid setup.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Places a piece, replacing whatever stood on the square.
    pub fn with_piece(mut self, coord: Coord, kind: PieceType) -> Self {
        self.position
            .pieces
            .insert(coord.key().to_string(), PieceSpec::Kind(kind.to_string()));
        self
    }

    /// Sets the special right of the piece on `coord` explicitly.
    ///
    /// Has no effect on an empty square.
    pub fn with_special_right(mut self, coord: Coord, right: bool) -> Self {
        if let Some(spec) = self.position.pieces.get_mut(coord.key().as_str()) {
            *spec = PieceSpec::Detailed {
                kind: spec.kind().to_string(),
                special_right: Some(right),
            };
        }
        self
    }

    pub fn with_side_to_move(mut self, color: Color) -> Self {
        self.position.side_to_move = color;
        self
    }

    pub fn with_en_passant(mut self, square: Coord) -> Self {
        self.position.en_passant = Some(square.key().to_string());
        self
    }

    pub fn with_undetermined_rights(mut self, policy: RightsPolicy) -> Self {
        self.position.undetermined_rights = policy;
        self
    }

    /// Replaces the win conditions of a player. Ignored for neutral.
    pub fn with_win_conditions(mut self, color: Color, conditions: Vec<WinCondition>) -> Self {
        match color {
            Color::White => self.rules.win_conditions.white = conditions,
            Color::Black => self.rules.win_conditions.black = conditions,
            Color::Neutral => {}
        }
        self
    }

    /// Replaces the promotion ranks of a player. Ignored for neutral.
    pub fn with_promotion_ranks(mut self, color: Color, ranks: Vec<i64>) -> Self {
        match color {
            Color::White => self.rules.promotion_ranks.white = ranks,
            Color::Black => self.rules.promotion_ranks.black = ranks,
            Color::Neutral => {}
        }
        self
    }

    pub fn with_promotions_allowed(mut self, kinds: Vec<RawType>) -> Self {
        self.rules.promotions_allowed = kinds;
        self
    }

    pub fn with_move_rule(mut self, plies: u32) -> Self {
        self.rules.move_rule = Some(plies);
        self
    }

    pub fn with_koth_squares(mut self, squares: impl IntoIterator<Item = Coord>) -> Self {
        self.rules.koth_squares = squares.into_iter().map(|c| c.key().to_string()).collect();
        self
    }

    /// Overrides the moveset of a kind.
    pub fn with_moveset(mut self, raw: RawType, moveset: &Moveset) -> Self {
        self.movesets
            .insert(raw.name().to_string(), MovesetConfig::from(moveset));
        self
    }

    /// Validates the setup and compiles the variant and starting position.
    pub fn build(&self) -> Result<(Variant, Position), ConfigError> {
        let mut movesets = MovesetTable::standard();
        for (name, config) in &self.movesets {
            let raw: RawType = name.parse()?;
            movesets.set(raw, config.to_moveset(raw)?);
        }

        let policy = self.position.undetermined_rights;
        let mut pieces = Vec::with_capacity(self.position.pieces.len());
        let mut rights = HashSet::new();
        for (key, spec) in &self.position.pieces {
            let coord = parse_square(key)?;
            let kind: PieceType = spec.kind().parse()?;
            if kind.raw.is_neutral() == kind.color.is_player() {
                return Err(ConfigError::MismatchedOwner(kind));
            }
            if spec.special_right().unwrap_or_else(|| policy.grants(kind.raw)) {
                rights.insert(coord);
            }
            pieces.push(Piece::new(kind, coord));
        }

        let side_to_move = self.position.side_to_move;
        if !side_to_move.is_player() {
            return Err(ConfigError::NeutralToMove);
        }
        let en_passant = self
            .position
            .en_passant
            .as_deref()
            .map(parse_square)
            .transpose()?;

        let promotions_allowed = self.rules.promotions_allowed.clone();
        if let Some(bad) = promotions_allowed
            .iter()
            .find(|raw| raw.is_neutral() || **raw == RawType::Pawn)
        {
            return Err(ConfigError::InvalidPromotion(*bad));
        }

        let koth_squares = self
            .rules
            .koth_squares
            .iter()
            .map(|key| parse_square(key))
            .collect::<Result<Vec<_>, _>>()?;

        let mut kinds_in_play: BTreeSet<RawType> = pieces.iter().map(|p| p.raw()).collect();
        if kinds_in_play.contains(&RawType::Pawn) {
            kinds_in_play.extend(promotions_allowed.iter().copied());
        }

        let win_conditions = downgrade_for_sliding_royals(
            [
                self.rules.win_conditions.white.clone(),
                self.rules.win_conditions.black.clone(),
            ],
            &pieces,
            &movesets,
            &promotions_allowed,
        );

        let variant = Variant::compile(VariantParts {
            movesets,
            kinds_in_play,
            win_conditions,
            promotion_ranks: [
                self.rules.promotion_ranks.white.clone(),
                self.rules.promotion_ranks.black.clone(),
            ],
            promotions_allowed,
            koth_squares,
            move_rule: self.rules.move_rule,
        });
        let position = Position::new(&variant, pieces, side_to_move, rights, en_passant)?;
        Ok((variant, position))
    }
}

/// Sliding royals cannot be checkmated reliably; their opponent wins by
/// capturing them instead. A pawn owner counts the kinds it may promote to.
fn downgrade_for_sliding_royals(
    mut win_conditions: [Vec<WinCondition>; 2],
    pieces: &[Piece],
    movesets: &MovesetTable,
    promotions_allowed: &[RawType],
) -> [Vec<WinCondition>; 2] {
    for color in Color::PLAYERS {
        let owned = pieces.iter().filter(|p| p.color() == color);
        let owns_sliding_royal = owned.clone().any(|p| movesets.is_sliding_royal(p.raw()))
            || (owned.clone().any(|p| p.raw() == RawType::Pawn)
                && promotions_allowed
                    .iter()
                    .any(|raw| movesets.is_sliding_royal(*raw)));
        let opponent = &mut win_conditions[color.opposite().index()];
        if !owns_sliding_royal || !opponent.contains(&WinCondition::Checkmate) {
            continue;
        }
        warn!(
            %color,
            "sliding royal present; opponent wins by royal capture instead of checkmate"
        );
        opponent.retain(|wc| *wc != WinCondition::Checkmate);
        if !opponent.contains(&WinCondition::RoyalCapture) {
            opponent.push(WinCondition::RoyalCapture);
        }
    }
    win_conditions
}
