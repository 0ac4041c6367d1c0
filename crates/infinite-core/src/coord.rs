//! Board coordinates, slide directions, and the coordinate-key codec.
//!
//! The board is unbounded, so squares are plain integer pairs rather than
//! indices into a fixed array. Arithmetic on them is checked: a destination
//! that would leave the `i64` range is treated as a square that does not exist.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when decoding coordinate or direction keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordKeyError {
    #[error("malformed coordinate key: {0:?}")]
    Malformed(String),

    #[error("coordinate key is not in canonical form: {0:?}")]
    NonCanonical(String),

    #[error("a slide direction cannot be the zero step")]
    ZeroDirection,

    #[error("slide direction {0:?} is not reduced and sign-normalised")]
    UnreducedDirection(String),
}

/// A square on the infinite board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    /// Creates a coordinate.
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Coord { x, y }
    }

    /// Returns this square shifted by `(dx, dy)`, or `None` on overflow.
    #[inline]
    pub fn offset(self, dx: i64, dy: i64) -> Option<Coord> {
        Some(Coord {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }

    /// Returns this square shifted by a delta expressed as a coordinate.
    #[inline]
    pub fn translate(self, delta: Coord) -> Option<Coord> {
        self.offset(delta.x, delta.y)
    }

    /// Returns the negated delta.
    #[inline]
    pub fn negate(self) -> Option<Coord> {
        Some(Coord {
            x: self.x.checked_neg()?,
            y: self.y.checked_neg()?,
        })
    }

    /// Chebyshev (king-move) distance between two squares.
    pub fn chebyshev_distance(self, other: Coord) -> u128 {
        let dx = (i128::from(self.x) - i128::from(other.x)).unsigned_abs();
        let dy = (i128::from(self.y) - i128::from(other.y)).unsigned_abs();
        dx.max(dy)
    }

    /// Returns 0 or 1 depending on the colour of the square.
    #[inline]
    pub fn parity(self) -> usize {
        (i128::from(self.x) + i128::from(self.y)).rem_euclid(2) as usize
    }

    /// Encodes this coordinate as its canonical key.
    #[inline]
    pub fn key(self) -> CoordKey {
        CoordKey::encode(self)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Canonical string key for a [`Coord`], of the form `"x,y"`.
///
/// Decoding accepts exactly the strings that encoding produces, so the key
/// and the coordinate stand in one-to-one correspondence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CoordKey {
    text: String,
    /// The coordinate `text` encodes.
    coord: Coord,
}

impl CoordKey {
    /// Encodes a coordinate.
    pub fn encode(coord: Coord) -> Self {
        CoordKey {
            text: format!("{},{}", coord.x, coord.y),
            coord,
        }
    }

    /// Decodes the key back into its coordinate.
    #[inline]
    pub fn decode(&self) -> Coord {
        self.coord
    }

    /// Returns the key text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

fn parse_pair(s: &str) -> Option<Coord> {
    let (x, y) = s.split_once(',')?;
    Some(Coord::new(x.parse().ok()?, y.parse().ok()?))
}

impl FromStr for CoordKey {
    type Err = CoordKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let coord = parse_pair(s).ok_or_else(|| CoordKeyError::Malformed(s.to_string()))?;
        let key = CoordKey::encode(coord);
        if key.text != s {
            return Err(CoordKeyError::NonCanonical(s.to_string()));
        }
        Ok(key)
    }
}

impl TryFrom<String> for CoordKey {
    type Error = CoordKeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CoordKey> for String {
    fn from(key: CoordKey) -> Self {
        key.text
    }
}

impl From<Coord> for CoordKey {
    fn from(coord: Coord) -> Self {
        CoordKey::encode(coord)
    }
}

impl From<&CoordKey> for Coord {
    fn from(key: &CoordKey) -> Self {
        key.decode()
    }
}

impl fmt::Display for CoordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A slide step reduced to lowest terms.
///
/// Directions are sign-normalised so that a line has exactly one direction:
/// `dx > 0`, or `dx == 0` and `dy > 0`. Sliding "backwards" along the line is
/// expressed with negative step counts.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Direction {
    dx: i64,
    dy: i64,
}

impl Direction {
    pub const HORIZONTAL: Direction = Direction { dx: 1, dy: 0 };
    pub const VERTICAL: Direction = Direction { dx: 0, dy: 1 };
    pub const DIAGONAL: Direction = Direction { dx: 1, dy: 1 };
    pub const ANTI_DIAGONAL: Direction = Direction { dx: 1, dy: -1 };

    /// Reduces and normalises an arbitrary non-zero step.
    pub fn new(dx: i64, dy: i64) -> Option<Self> {
        if dx == 0 && dy == 0 {
            return None;
        }
        let g = gcd(dx.unsigned_abs(), dy.unsigned_abs());
        let mut rx = i64::try_from(dx.unsigned_abs() / g).ok()?;
        let mut ry = i64::try_from(dy.unsigned_abs() / g).ok()?;
        if dx < 0 {
            rx = -rx;
        }
        if dy < 0 {
            ry = -ry;
        }
        if rx < 0 || (rx == 0 && ry < 0) {
            rx = -rx;
            ry = -ry;
        }
        Some(Direction { dx: rx, dy: ry })
    }

    #[inline]
    pub const fn dx(self) -> i64 {
        self.dx
    }

    #[inline]
    pub const fn dy(self) -> i64 {
        self.dy
    }

    #[inline]
    pub const fn is_vertical(self) -> bool {
        self.dx == 0
    }

    /// The standard-form constant `dx*y - dy*x`, shared by every square on a line.
    #[inline]
    pub fn line_constant(self, c: Coord) -> i128 {
        i128::from(self.dx) * i128::from(c.y) - i128::from(self.dy) * i128::from(c.x)
    }

    /// Tie-break between parallel lines sharing a constant.
    #[inline]
    pub fn line_offset(self, c: Coord) -> i64 {
        if self.is_vertical() {
            c.y.rem_euclid(self.dy)
        } else {
            c.x.rem_euclid(self.dx)
        }
    }

    /// Number of steps from `from` to `to`, measured along the comparison axis.
    ///
    /// Exact when the squares share a line of this direction.
    #[inline]
    pub fn steps_between(self, from: Coord, to: Coord) -> i128 {
        let (a, b, step) = if self.is_vertical() {
            (from.y, to.y, self.dy)
        } else {
            (from.x, to.x, self.dx)
        };
        (i128::from(b) - i128::from(a)).div_euclid(i128::from(step))
    }

    /// Returns the square `steps` steps away from `origin`, if representable.
    pub fn step_from(self, origin: Coord, steps: i64) -> Option<Coord> {
        let x = i128::from(origin.x) + i128::from(self.dx) * i128::from(steps);
        let y = i128::from(origin.y) + i128::from(self.dy) * i128::from(steps);
        Some(Coord::new(i64::try_from(x).ok()?, i64::try_from(y).ok()?))
    }

    /// Returns true if `target` lies on the line of this direction through `origin`.
    pub fn is_colinear(self, origin: Coord, target: Coord) -> bool {
        self.line_constant(origin) == self.line_constant(target)
    }

    /// Encodes the step as a coordinate key.
    pub fn key(self) -> CoordKey {
        CoordKey::encode(Coord::new(self.dx, self.dy))
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl fmt::Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Direction({},{})", self.dx, self.dy)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.dx, self.dy)
    }
}

impl FromStr for Direction {
    type Err = CoordKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let step = s.parse::<CoordKey>()?.decode();
        let dir = Direction::new(step.x, step.y).ok_or(CoordKeyError::ZeroDirection)?;
        if dir.dx != step.x || dir.dy != step.y {
            return Err(CoordKeyError::UnreducedDirection(s.to_string()));
        }
        Ok(dir)
    }
}

impl TryFrom<String> for Direction {
    type Error = CoordKeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Direction> for String {
    fn from(dir: Direction) -> Self {
        dir.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn key_encoding() {
        assert_eq!(Coord::new(3, -7).key().as_str(), "3,-7");
        assert_eq!("-12,40".parse::<CoordKey>().unwrap().decode(), Coord::new(-12, 40));
    }

    #[test]
    fn key_rejects_noncanonical_forms() {
        assert!(matches!(
            "+1,2".parse::<CoordKey>(),
            Err(CoordKeyError::NonCanonical(_))
        ));
        assert!(matches!(
            "01,2".parse::<CoordKey>(),
            Err(CoordKeyError::NonCanonical(_))
        ));
        assert!(matches!(
            "1;2".parse::<CoordKey>(),
            Err(CoordKeyError::Malformed(_))
        ));
        assert!("1,2,3".parse::<CoordKey>().is_err());
    }

    #[test]
    fn deserialized_key_decodes_to_its_text() {
        let key = CoordKey::try_from("-4,1000000000000".to_string()).unwrap();
        assert_eq!(key.decode(), Coord::new(-4, 1_000_000_000_000));
        assert_eq!(String::from(key), "-4,1000000000000");
        assert!(CoordKey::try_from("x,0".to_string()).is_err());
    }

    #[test]
    fn key_handles_values_beyond_float_precision() {
        let c = Coord::new(9_007_199_254_740_993, -9_007_199_254_740_993);
        assert_eq!(c.key().decode(), c);
    }

    #[test]
    fn direction_normalisation() {
        assert_eq!(Direction::new(-2, 0), Some(Direction::HORIZONTAL));
        assert_eq!(Direction::new(0, -5), Some(Direction::VERTICAL));
        assert_eq!(Direction::new(-3, 3), Some(Direction::ANTI_DIAGONAL));
        let knightrider = Direction::new(-2, -4).unwrap();
        assert_eq!((knightrider.dx(), knightrider.dy()), (1, 2));
        assert_eq!(Direction::new(0, 0), None);
    }

    #[test]
    fn direction_parsing_requires_reduced_form() {
        assert_eq!("1,-1".parse::<Direction>(), Ok(Direction::ANTI_DIAGONAL));
        assert_eq!(
            "2,0".parse::<Direction>(),
            Err(CoordKeyError::UnreducedDirection("2,0".to_string()))
        );
        assert_eq!("0,0".parse::<Direction>(), Err(CoordKeyError::ZeroDirection));
    }

    #[test]
    fn line_constant_is_shared_along_a_line() {
        let dir = Direction::new(1, 2).unwrap();
        let origin = Coord::new(3, 4);
        let far = dir.step_from(origin, -9).unwrap();
        assert_eq!(dir.line_constant(origin), dir.line_constant(far));
        assert_eq!(dir.steps_between(origin, far), -9);
        assert!(!dir.is_colinear(origin, Coord::new(4, 4)));
    }

    #[test]
    fn checked_offsets() {
        assert_eq!(Coord::new(i64::MAX, 0).offset(1, 0), None);
        assert_eq!(Coord::new(1, 1).offset(-2, 3), Some(Coord::new(-1, 4)));
        assert_eq!(Coord::new(-2, 0).parity(), 0);
        assert_eq!(Coord::new(-1, 0).parity(), 1);
    }

    proptest! {
        #[test]
        fn key_roundtrip(x in any::<i64>(), y in any::<i64>()) {
            let c = Coord::new(x, y);
            let parsed: CoordKey = c.key().as_str().parse().unwrap();
            prop_assert_eq!(parsed.decode(), c);
        }

        #[test]
        fn direction_is_idempotent(dx in -50i64..50, dy in -50i64..50) {
            prop_assume!(dx != 0 || dy != 0);
            let dir = Direction::new(dx, dy).unwrap();
            prop_assert_eq!(Direction::new(dir.dx(), dir.dy()), Some(dir));
        }
    }
}
