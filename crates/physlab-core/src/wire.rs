//! Wires between element pins.

use crate::elements::{ElementId, PinRef};
use crate::error::{ExperimentError, Result};
use crate::registry::ElementRegistry;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Suffix the save format appends to a color word ("colored wire").
pub const WIRE_SUFFIX: &str = "色导线";

/// The five wire colors the application recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WireColor {
    Black,
    #[default]
    Blue,
    Red,
    Green,
    Yellow,
}

impl WireColor {
    pub const ALL: [WireColor; 5] = [
        WireColor::Black,
        WireColor::Blue,
        WireColor::Red,
        WireColor::Green,
        WireColor::Yellow,
    ];

    /// The color word used in save files.
    pub fn word(self) -> &'static str {
        match self {
            WireColor::Black => "黑",
            WireColor::Blue => "蓝",
            WireColor::Red => "红",
            WireColor::Green => "绿",
            WireColor::Yellow => "黄",
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            WireColor::Black => "black",
            WireColor::Blue => "blue",
            WireColor::Red => "red",
            WireColor::Green => "green",
            WireColor::Yellow => "yellow",
        }
    }

    /// The full `ColorName` value, e.g. `蓝色导线`.
    pub fn color_name(self) -> String {
        format!("{}{}", self.word(), WIRE_SUFFIX)
    }
}

impl FromStr for WireColor {
    type Err = ExperimentError;

    /// Accepts the color word, the full `ColorName`, or the English name.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let word = trimmed.strip_suffix(WIRE_SUFFIX).unwrap_or(trimmed);
        WireColor::ALL
            .into_iter()
            .find(|color| color.word() == word || color.english_name().eq_ignore_ascii_case(word))
            .ok_or_else(|| ExperimentError::InvalidColor(s.to_string()))
    }
}

impl fmt::Display for WireColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.english_name())
    }
}

/// A directed, colored connection between two pins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Wire {
    pub source: PinRef,
    pub target: PinRef,
    pub color: WireColor,
}

impl Wire {
    pub fn new(source: PinRef, target: PinRef, color: WireColor) -> Self {
        Self { source, target, color }
    }

    /// Whether either end sits on `element`.
    pub fn touches(&self, element: &ElementId) -> bool {
        &self.source.element == element || &self.target.element == element
    }
}

/// Deduplicated wires of one experiment, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct WireSet {
    wires: Vec<Wire>,
    index: HashSet<Wire>,
}

impl WireSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect two pins. Returns `false` if the identical wire already exists.
    pub fn connect(
        &mut self,
        registry: &ElementRegistry,
        source: PinRef,
        target: PinRef,
        color: WireColor,
    ) -> Result<bool> {
        validate_pin(registry, &source)?;
        validate_pin(registry, &target)?;

        let wire = Wire::new(source, target, color);
        if self.index.contains(&wire) {
            return Ok(false);
        }
        self.index.insert(wire.clone());
        self.wires.push(wire);
        Ok(true)
    }

    /// Remove the exact (source, target, color) wire.
    pub fn disconnect(&mut self, source: &PinRef, target: &PinRef, color: WireColor) -> Result<Wire> {
        let wire = Wire::new(source.clone(), target.clone(), color);
        if !self.index.remove(&wire) {
            return Err(ExperimentError::NotFound(format!(
                "wire {} -> {} ({})",
                source, target, color
            )));
        }
        self.wires.retain(|existing| existing != &wire);
        Ok(wire)
    }

    /// Remove every wire with an end on `element`. Returns how many were removed.
    pub fn remove_touching(&mut self, element: &ElementId) -> usize {
        let before = self.wires.len();
        self.wires.retain(|wire| !wire.touches(element));
        self.index.retain(|wire| !wire.touches(element));
        before - self.wires.len()
    }

    pub fn contains(&self, wire: &Wire) -> bool {
        self.index.contains(wire)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wire> {
        self.wires.iter()
    }

    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    pub fn clear(&mut self) {
        self.wires.clear();
        self.index.clear();
    }
}

fn validate_pin(registry: &ElementRegistry, pin: &PinRef) -> Result<()> {
    let invalid = || ExperimentError::InvalidPin {
        element: pin.element.to_string(),
        pin: pin.pin,
    };
    let element = registry.lookup_by_identifier(&pin.element).map_err(|_| invalid())?;
    if element.kind().has_pin(pin.pin) {
        Ok(())
    } else {
        Err(invalid())
    }
}
