//! Error types for brain persistence and validation.

use thiserror::Error;

/// Errors surfaced by the simulation core.
///
/// Geometry and sensing never fail; only loading parameters or loading and
/// assigning a brain can.
#[derive(Debug, Error)]
pub enum SimError {
    /// A brain does not fit the car it is assigned to.
    #[error("network shape mismatch: expected {expected}, found {found:?}")]
    ShapeMismatch {
        /// Description of the required input/output sizes.
        expected: String,
        /// Layer sizes of the rejected network.
        found: Vec<usize>,
    },
    /// The serialized level list is internally inconsistent.
    #[error("malformed network: {0}")]
    MalformedNetwork(String),
    /// Parameters that would make cars impossible to build.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
