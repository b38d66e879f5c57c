//! Error types for experiment documents.

use crate::position::Position;
use crate::storage::StorageError;
use thiserror::Error;

/// Errors raised by document, registry, wire and merge operations.
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("No experiment is open")]
    NotOpen,
    #[error("Experiment is already open")]
    AlreadyOpen,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Experiment already exists: {0}")]
    AlreadyExists(String),
    #[error("Experiment types do not match")]
    TypeMismatch,
    #[error("Position {0} is already occupied")]
    PositionOccupied(Position),
    #[error("Invalid pin {pin} on element {element}")]
    InvalidPin { element: String, pin: u32 },
    #[error("Invalid wire color: {0}")]
    InvalidColor(String),
    #[error("No experiment can be operated (experiment stack is empty)")]
    EmptyStack,
    #[error("Duplicate element identifier: {0}")]
    DuplicateIdentifier(String),
    #[error("Unknown element model: {0}")]
    UnknownModel(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Malformed save data: {0}")]
    Format(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for experiment operations.
pub type Result<T> = std::result::Result<T, ExperimentError>;
