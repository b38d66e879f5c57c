//! Quantized 3D positions and rotations.
//!
//! Internally every vector is kept in (X, Y, Z) order. The save format stores
//! vectors as comma-joined triples in (X, Z, Y) order, so the external codec
//! helpers here swap the last two components on every read and write.

use crate::error::{ExperimentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Round a coordinate to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // Normalize -0.0 so it formats and hashes like 0.0.
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// A point in space, always stored rounded to 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0, z: 0.0 };

    /// Create a quantized position.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: round2(x),
            y: round2(y),
            z: round2(z),
        }
    }

    /// Hashable key of the quantized position.
    pub fn key(&self) -> PositionKey {
        PositionKey([
            (self.x * 100.0).round() as i64,
            (self.y * 100.0).round() as i64,
            (self.z * 100.0).round() as i64,
        ])
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Parse an external `"x,z,y"` triple.
    pub fn from_external(text: &str) -> Result<Self> {
        let [x, z, y] = parse_triple(text)?;
        Ok(Self::new(x, y, z))
    }

    /// Encode as an external `"x,z,y"` triple.
    pub fn to_external(&self) -> String {
        format!("{},{},{}", self.x, self.z, self.y)
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Integer key (hundredths) of a quantized position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionKey([i64; 3]);

/// Rotation angles in degrees around each axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Rotation {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: round2(x),
            y: round2(y),
            z: round2(z),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Parse an external `"x,z,y"` triple.
    pub fn from_external(text: &str) -> Result<Self> {
        let [x, z, y] = parse_triple(text)?;
        Ok(Self::new(x, y, z))
    }

    /// Encode as an external `"x,z,y"` triple.
    pub fn to_external(&self) -> String {
        format!("{},{},{}", self.x, self.z, self.y)
    }
}

/// Split a comma-joined triple into its three numbers, in stored order.
pub(crate) fn parse_triple(text: &str) -> Result<[f64; 3]> {
    let trimmed = text.trim().trim_start_matches('(').trim_end_matches(')');
    let mut parts = trimmed.split(',').map(|part| part.trim().parse::<f64>());
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Ok(a)), Some(Ok(b)), Some(Ok(c)), None)
            if a.is_finite() && b.is_finite() && c.is_finite() =>
        {
            Ok([a, b, c])
        }
        _ => Err(ExperimentError::Format(format!("expected a numeric triple, got {:?}", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_is_quantized() {
        let pos = Position::new(0.1 + 0.2, 1.004, -0.001);
        assert_eq!(pos, Position::new(0.3, 1.0, 0.0));
        assert_eq!(pos.key(), Position::new(0.30000001, 0.999999, 0.0).key());
    }

    #[test]
    fn test_external_order_is_xzy() {
        let pos = Position::from_external("1.5,2.25,-3").unwrap();
        assert_eq!(pos, Position::new(1.5, -3.0, 2.25));
        assert_eq!(pos.to_external(), "1.5,2.25,-3");
    }

    #[test]
    fn test_rotation_external_order() {
        let rot = Rotation::from_external("0,180,90").unwrap();
        assert_eq!(rot, Rotation::new(0.0, 90.0, 180.0));
        assert_eq!(rot.to_external(), "0,180,90");
    }

    #[test]
    fn test_malformed_triple() {
        assert!(matches!(
            Position::from_external("1,2"),
            Err(ExperimentError::Format(_))
        ));
        assert!(matches!(
            Position::from_external("1,a,2"),
            Err(ExperimentError::Format(_))
        ));
    }

    #[test]
    fn test_non_finite_triple_rejected() {
        for text in ["NaN,0,0", "0,inf,0", "0,0,-inf"] {
            assert!(matches!(
                Position::from_external(text),
                Err(ExperimentError::Format(_))
            ));
            assert!(matches!(
                Rotation::from_external(text),
                Err(ExperimentError::Format(_))
            ));
        }
        assert!(!Position::new(f64::NAN, 0.0, 0.0).is_finite());
        assert!(Position::ORIGIN.is_finite());
    }

    #[test]
    fn test_negative_zero_key() {
        assert_eq!(Position::new(-0.001, 0.0, 0.0).key(), Position::ORIGIN.key());
    }
}
