//! physlab Core Library
//!
//! Reading, editing and writing Physics-Lab experiment saves: elements,
//! wires, camera and the `.sav` envelope that carries them.

pub mod camera;
pub mod config;
pub mod elements;
pub mod error;
pub mod experiment;
pub mod format;
pub mod grid;
pub mod lab;
pub mod merge;
pub mod position;
pub mod registry;
pub mod stack;
pub mod storage;
pub mod wire;

pub use camera::Camera;
pub use config::LabConfig;
pub use elements::{Element, ElementId, ElementKind, PinRef};
pub use error::{ExperimentError, Result};
pub use experiment::{Experiment, LifecycleState, OpenMode, ReadOutcome};
pub use format::{Envelope, ExperimentType};
pub use grid::{Footprint, GridFrame, to_grid, to_world};
pub use lab::{Lab, SessionEnd, SessionOptions, WriteOptions};
pub use merge::{RemapTable, merge};
pub use position::{Position, Rotation};
pub use registry::ElementRegistry;
pub use stack::{ExperimentStack, Handle};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use wire::{Wire, WireColor, WireSet};
