//! Merging one experiment's elements and wires into another.

use crate::elements::{ElementId, PinRef};
use crate::error::{ExperimentError, Result};
use crate::experiment::Experiment;
use crate::position::Position;
use std::collections::HashMap;

/// Identifier remap produced by a merge: source element → copy in the destination.
pub type RemapTable = HashMap<ElementId, ElementId>;

/// Copy every element and wire of `source` into `destination`.
///
/// Each element keeps the coordinate mode it was placed in; its position in
/// that mode is converted to `use_grid` mode if needed, shifted by `offset`
/// and placed into `destination` relative to its grid origin. Copies get
/// fresh identifiers and wires are rewired through the returned table.
///
/// On failure nothing is added to `destination`.
pub fn merge(
    destination: &mut Experiment,
    source: &Experiment,
    offset: Position,
    use_grid: bool,
) -> Result<RemapTable> {
    if !destination.is_open() || !source.is_open() {
        return Err(ExperimentError::NotOpen);
    }
    if destination.experiment_type() != source.experiment_type() {
        return Err(ExperimentError::TypeMismatch);
    }
    if !offset.is_finite() {
        return Err(ExperimentError::InvalidValue(format!("merge offset {}", offset)));
    }

    let source_grid = source.grid();
    let destination_grid = destination.grid();
    let mut remap = RemapTable::new();
    let mut inserted = Vec::new();

    let result = (|| -> Result<()> {
        for element in source.registry().iter() {
            let footprint = element.footprint();
            let own = source_grid.express(element.position(), footprint, element.placed_in_grid());
            let coords = if element.placed_in_grid() == use_grid {
                own
            } else {
                let world = source_grid.resolve_in(own, footprint, element.placed_in_grid());
                source_grid.express(world, footprint, use_grid)
            };

            let mut copy = element.duplicate();
            copy.position = destination_grid.resolve_in(coords + offset, footprint, use_grid);
            copy.placed_in_grid = use_grid;
            let new_id = destination.insert_element(copy)?.id().clone();
            inserted.push(new_id.clone());
            remap.insert(element.id().clone(), new_id);
        }

        for wire in source.wires().iter() {
            let rewire = |pin: &PinRef| -> Result<PinRef> {
                remap
                    .get(&pin.element)
                    .map(|id| PinRef::new(id.clone(), pin.pin))
                    .ok_or_else(|| ExperimentError::NotFound(format!("element {}", pin.element)))
            };
            destination.connect(rewire(&wire.source)?, rewire(&wire.target)?, wire.color)?;
        }
        Ok(())
    })();

    if let Err(e) = result {
        for id in &inserted {
            let _ = destination.remove_element(id);
        }
        return Err(e);
    }

    log::debug!(
        "Merged {} elements and {} wires from {} into {}",
        remap.len(),
        source.count_wires(),
        source.name(),
        destination.name()
    );
    Ok(remap)
}
