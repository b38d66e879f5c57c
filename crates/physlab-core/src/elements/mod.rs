//! Element definitions for experiments.

mod kind;
mod pin;

pub use kind::{
    DECIMAL_PROPERTY, ElementKind, HIGH_LEVEL_PROPERTY, LOCK_PROPERTY, LOW_LEVEL_PROPERTY,
    SWITCH_PROPERTY,
};
pub use pin::{PinDirection, PinRef, PinSpec};

use crate::error::{ExperimentError, Result};
use crate::grid::Footprint;
use crate::position::{Position, Rotation};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Identifier of an element, unique within one experiment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A placed component.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub(crate) id: ElementId,
    pub(crate) kind: ElementKind,
    /// World position, quantized.
    pub(crate) position: Position,
    pub(crate) rotation: Rotation,
    pub(crate) properties: BTreeMap<String, f64>,
    /// Whether the element was placed with grid coordinates.
    pub(crate) placed_in_grid: bool,
    /// Persisted fields carried through without interpretation.
    pub(crate) extras: Map<String, Value>,
}

impl Element {
    /// Build a fresh element of `kind` with default properties and a new identifier.
    pub fn new(kind: ElementKind, position: Position) -> Self {
        Self {
            id: ElementId::generate(),
            kind,
            position,
            rotation: kind.default_rotation(),
            properties: kind
                .default_properties()
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
            placed_in_grid: false,
            extras: kind.default_extras(),
        }
    }

    /// Reconstruct an element with a specific identifier (for loading).
    pub(crate) fn reconstruct(
        id: ElementId,
        kind: ElementKind,
        position: Position,
        rotation: Rotation,
        properties: BTreeMap<String, f64>,
        extras: Map<String, Value>,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            rotation,
            properties,
            placed_in_grid: false,
            extras,
        }
    }

    /// Copy this element's data under a fresh identifier.
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            id: ElementId::generate(),
            ..self.clone()
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn footprint(&self) -> Footprint {
        self.kind.footprint()
    }

    /// World position.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn placed_in_grid(&self) -> bool {
        self.placed_in_grid
    }

    pub fn properties(&self) -> &BTreeMap<String, f64> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<f64> {
        self.properties.get(key).copied()
    }

    pub fn extras(&self) -> &Map<String, Value> {
        &self.extras
    }

    /// Reference a pin of this element by index.
    pub fn pin(&self, index: u32) -> Result<PinRef> {
        if self.kind.has_pin(index) {
            Ok(PinRef::new(self.id.clone(), index))
        } else {
            Err(ExperimentError::InvalidPin {
                element: self.id.to_string(),
                pin: index,
            })
        }
    }

    /// Reference a pin of this element by its table name.
    pub fn pin_named(&self, name: &str) -> Result<PinRef> {
        self.kind
            .pin(name)
            .map(|spec| PinRef::new(self.id.clone(), spec.index))
            .ok_or_else(|| ExperimentError::NotFound(format!("pin {} on {}", name, self.kind.model_id())))
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn set_property(&mut self, key: &str, value: f64) {
        self.properties.insert(key.to_string(), value);
    }

    /// Set the logic high voltage; must not fall below the low level.
    pub fn set_high_level(&mut self, value: f64) -> Result<()> {
        self.require_logic()?;
        let low = self.property(LOW_LEVEL_PROPERTY).unwrap_or(0.0);
        if value < low {
            return Err(ExperimentError::InvalidValue(format!(
                "high level {} is below low level {}",
                value, low
            )));
        }
        self.set_property(HIGH_LEVEL_PROPERTY, value);
        Ok(())
    }

    /// Set the logic low voltage; must not exceed the high level.
    pub fn set_low_level(&mut self, value: f64) -> Result<()> {
        self.require_logic()?;
        let high = self.property(HIGH_LEVEL_PROPERTY).unwrap_or(f64::INFINITY);
        if value > high {
            return Err(ExperimentError::InvalidValue(format!(
                "low level {} is above high level {}",
                value, high
            )));
        }
        self.set_property(LOW_LEVEL_PROPERTY, value);
        Ok(())
    }

    /// Switch a logic input to the high state.
    pub fn set_logic_input_high(&mut self) -> Result<()> {
        if self.kind != ElementKind::LogicInput {
            return Err(ExperimentError::TypeMismatch);
        }
        self.set_property(SWITCH_PROPERTY, 1.0);
        Ok(())
    }

    /// Set the number shown by an 8-bit input.
    pub fn set_eight_bit_value(&mut self, value: u32) -> Result<()> {
        if self.kind != ElementKind::EightBitInput {
            return Err(ExperimentError::TypeMismatch);
        }
        if value > 255 {
            return Err(ExperimentError::InvalidValue(format!(
                "8-bit value {} is out of range",
                value
            )));
        }
        self.set_property(DECIMAL_PROPERTY, value as f64);
        Ok(())
    }

    fn require_logic(&self) -> Result<()> {
        if self.kind.is_logic() {
            Ok(())
        } else {
            Err(ExperimentError::TypeMismatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_element_defaults() {
        let element = Element::new(ElementKind::LogicInput, Position::ORIGIN);
        assert_eq!(element.property(HIGH_LEVEL_PROPERTY), Some(3.0));
        assert_eq!(element.property(SWITCH_PROPERTY), Some(0.0));
        assert_eq!(element.rotation(), Rotation::new(0.0, 0.0, 180.0));
        assert_eq!(element.id().as_str().len(), 32);
    }

    #[test]
    fn test_duplicate_gets_new_id() {
        let element = Element::new(ElementKind::AndGate, Position::ORIGIN);
        let copy = element.duplicate();
        assert_ne!(copy.id(), element.id());
        assert_eq!(copy.kind(), element.kind());
        assert_eq!(copy.properties(), element.properties());
    }

    #[test]
    fn test_logic_input_high() {
        let mut input = Element::new(ElementKind::LogicInput, Position::ORIGIN);
        input.set_logic_input_high().unwrap();
        assert_eq!(input.property(SWITCH_PROPERTY), Some(1.0));

        let mut gate = Element::new(ElementKind::AndGate, Position::ORIGIN);
        assert!(matches!(gate.set_logic_input_high(), Err(ExperimentError::TypeMismatch)));
        assert_eq!(gate.property(SWITCH_PROPERTY), None);
    }

    #[test]
    fn test_pin_lookup() {
        let element = Element::new(ElementKind::FullAdder, Position::ORIGIN);
        assert_eq!(element.pin(4).unwrap().pin, 4);
        assert!(matches!(element.pin(7), Err(ExperimentError::InvalidPin { pin: 7, .. })));
        assert_eq!(element.pin_named("i_mid").unwrap().pin, 3);
        assert!(element.pin_named("nope").is_err());
    }

    #[test]
    fn test_level_range_checks() {
        let mut element = Element::new(ElementKind::OrGate, Position::ORIGIN);
        element.set_high_level(5.0).unwrap();
        assert!(element.set_low_level(6.0).is_err());
        element.set_low_level(1.0).unwrap();
        assert!(element.set_high_level(0.5).is_err());
        assert_eq!(element.property(HIGH_LEVEL_PROPERTY), Some(5.0));
        assert_eq!(element.property(LOW_LEVEL_PROPERTY), Some(1.0));

        let mut resistor = Element::new(ElementKind::Resistor, Position::ORIGIN);
        assert!(matches!(resistor.set_high_level(5.0), Err(ExperimentError::TypeMismatch)));
    }

    #[test]
    fn test_eight_bit_value() {
        let mut element = Element::new(ElementKind::EightBitInput, Position::ORIGIN);
        element.set_eight_bit_value(255).unwrap();
        assert_eq!(element.property(DECIMAL_PROPERTY), Some(255.0));
        assert!(element.set_eight_bit_value(256).is_err());
    }
}
