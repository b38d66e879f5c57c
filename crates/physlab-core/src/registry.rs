//! Element registry: placed elements indexed by identifier and position.

use crate::elements::{Element, ElementId, ElementKind};
use crate::error::{ExperimentError, Result};
use crate::position::{Position, PositionKey, Rotation};
use std::collections::HashMap;

/// Owns all elements of one experiment.
///
/// Elements are kept in insertion order (the order they are saved in) and
/// indexed both by identifier and by quantized world position. No two
/// elements may register at the same quantized position.
#[derive(Debug, Clone, Default)]
pub struct ElementRegistry {
    elements: HashMap<ElementId, Element>,
    order: Vec<ElementId>,
    by_position: HashMap<PositionKey, Vec<ElementId>>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new element of `kind` at a world position.
    pub fn place(&mut self, kind: ElementKind, position: Position, rotation: Rotation) -> Result<&Element> {
        let mut element = Element::new(kind, position);
        element.set_rotation(rotation);
        self.insert(element)
    }

    /// Insert an already built element, keeping its identifier.
    pub fn insert(&mut self, mut element: Element) -> Result<&Element> {
        element.position = Position::new(element.position.x, element.position.y, element.position.z);
        let key = element.position.key();
        if self.by_position.get(&key).is_some_and(|ids| !ids.is_empty()) {
            return Err(ExperimentError::PositionOccupied(element.position));
        }
        if self.elements.contains_key(&element.id) {
            return Err(ExperimentError::DuplicateIdentifier(element.id.to_string()));
        }

        let id = element.id.clone();
        self.by_position.entry(key).or_default().push(id.clone());
        self.order.push(id.clone());
        Ok(self.elements.entry(id).or_insert(element))
    }

    /// Remove an element from every index.
    ///
    /// Wires are not owned here; callers cascade the removal to the wire set.
    pub fn remove(&mut self, id: &ElementId) -> Result<Element> {
        let element = self
            .elements
            .remove(id)
            .ok_or_else(|| ExperimentError::NotFound(format!("element {}", id)))?;
        self.order.retain(|existing| existing != id);
        let key = element.position.key();
        if let Some(ids) = self.by_position.get_mut(&key) {
            ids.retain(|existing| existing != id);
            if ids.is_empty() {
                self.by_position.remove(&key);
            }
        }
        Ok(element)
    }

    /// Get the element at a world position.
    pub fn lookup_by_position(&self, position: Position) -> Result<&Element> {
        let position = Position::new(position.x, position.y, position.z);
        self.by_position
            .get(&position.key())
            .and_then(|ids| ids.first())
            .and_then(|id| self.elements.get(id))
            .ok_or_else(|| ExperimentError::NotFound(format!("element at {}", position)))
    }

    /// Get an element by identifier.
    pub fn lookup_by_identifier(&self, id: &ElementId) -> Result<&Element> {
        self.elements
            .get(id)
            .ok_or_else(|| ExperimentError::NotFound(format!("element {}", id)))
    }

    /// Get a mutable element by identifier.
    pub fn get_mut(&mut self, id: &ElementId) -> Result<&mut Element> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| ExperimentError::NotFound(format!("element {}", id)))
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.lookup_by_position(position).is_ok()
    }

    /// Elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.order.clear();
        self.by_position.clear();
    }
}
