//! Pins and pin references.

use super::ElementId;
use std::fmt;

/// Signal direction of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
    /// Plain terminal of a two-terminal part (switches, sources, resistors).
    Passive,
}

/// One entry of a kind's pin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinSpec {
    /// Short accessor name, e.g. `i_up` or `o`.
    pub name: &'static str,
    /// Index stored in wire records.
    pub index: u32,
    pub direction: PinDirection,
}

/// A pin on a specific element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PinRef {
    pub element: ElementId,
    pub pin: u32,
}

impl PinRef {
    pub fn new(element: ElementId, pin: u32) -> Self {
        Self { element, pin }
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.element, self.pin)
    }
}
