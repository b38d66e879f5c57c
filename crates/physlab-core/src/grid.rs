//! Component grid coordinates.
//!
//! The component grid is an alternate placement basis: integer cell offsets
//! from a per-experiment origin, with a per-axis pitch chosen by the element's
//! footprint. Conversions round to 2 decimal places so that grid-aligned
//! inputs survive a round trip through world units.

use crate::position::{Position, round2};

/// Cell pitch along X for every footprint.
pub const GRID_PITCH_X: f64 = 0.16;
/// Cell pitch along Y for small elements.
pub const GRID_PITCH_Y_SMALL: f64 = 0.08;
/// Cell pitch along Y for big elements (two small cells).
pub const GRID_PITCH_Y_BIG: f64 = 0.16;
/// Cell pitch along Z (one element height) for every footprint.
pub const GRID_PITCH_Z: f64 = 0.1;

/// Physical size class of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Footprint {
    /// 0.2 x 0.1 x 0.1
    #[default]
    Small,
    /// 0.2 x 0.2 x 0.1
    Big,
}

impl Footprint {
    pub fn from_is_big(is_big: bool) -> Self {
        if is_big { Footprint::Big } else { Footprint::Small }
    }

    pub fn is_big(self) -> bool {
        self == Footprint::Big
    }

    /// Per-axis cell pitch in world units.
    pub fn pitch(self) -> (f64, f64, f64) {
        match self {
            Footprint::Small => (GRID_PITCH_X, GRID_PITCH_Y_SMALL, GRID_PITCH_Z),
            Footprint::Big => (GRID_PITCH_X, GRID_PITCH_Y_BIG, GRID_PITCH_Z),
        }
    }
}

/// Convert grid coordinates to world coordinates.
pub fn to_world(grid: Position, footprint: Footprint, origin: Position) -> Position {
    let (px, py, pz) = footprint.pitch();
    Position::new(
        round2(origin.x + grid.x * px),
        round2(origin.y + grid.y * py),
        round2(origin.z + grid.z * pz),
    )
}

/// Convert world coordinates to grid coordinates.
pub fn to_grid(world: Position, footprint: Footprint, origin: Position) -> Position {
    let (px, py, pz) = footprint.pitch();
    Position::new(
        (world.x - origin.x) / px,
        (world.y - origin.y) / py,
        (world.z - origin.z) / pz,
    )
}

/// Grid placement state of one experiment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridFrame {
    /// Whether placement coordinates are interpreted as grid cells.
    pub enabled: bool,
    /// World position of grid cell (0, 0, 0).
    pub origin: Position,
}

impl GridFrame {
    /// Resolve coordinates given in the frame's current mode to world units.
    pub fn resolve(&self, coords: Position, footprint: Footprint) -> Position {
        self.resolve_in(coords, footprint, self.enabled)
    }

    /// Resolve coordinates given in an explicit mode to world units.
    pub fn resolve_in(&self, coords: Position, footprint: Footprint, grid: bool) -> Position {
        if grid {
            to_world(coords, footprint, self.origin)
        } else {
            coords
        }
    }

    /// Express a world position in the requested mode.
    pub fn express(&self, world: Position, footprint: Footprint, grid: bool) -> Position {
        if grid {
            to_grid(world, footprint, self.origin)
        } else {
            world
        }
    }
}
